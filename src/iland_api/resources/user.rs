use serde::{Deserialize, Serialize};

use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub crm: String,
    pub user_type: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub country: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub locked: bool,
    pub deleted: bool,
    pub created_date: i64,
    pub deleted_date: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRole {
    pub role: String,
    #[serde(rename = "type")]
    pub role_type: String,
    pub username: String,
    pub org_uuid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub uuid: String,
    pub username: String,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub delivery: AlertDelivery,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertDelivery {
    pub push_enabled: bool,
    pub inbox_enabled: bool,
    pub email_enabled: bool,
}

impl User {
    pub async fn roles(&self) -> Result<Vec<UserRole>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("/user/{}/roles", self.name))
            .await
    }

    pub async fn alerts(&self) -> Result<Vec<Alert>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("/user/{}/alerts", self.name))
            .await
    }
}
