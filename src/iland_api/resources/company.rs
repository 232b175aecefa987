use serde::{Deserialize, Serialize};

use super::User;
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Customer account, keyed by its CRM identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    #[serde(rename = "uuid")]
    pub crm: String,
    pub name: String,
    pub has_iaas: bool,
    pub has_vcc: bool,
    pub deleted: bool,
    pub updated_date: i64,
    pub deleted_date: i64,
}

/// Cloud Connect backup tenant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTenant {
    pub uuid: String,
    pub name: String,
    pub uid: String,
    pub crm: String,
    pub owner_name: String,
    pub contract_uuid: String,
    pub location_id: String,
    pub enabled: bool,
    pub resources: CloudTenantResources,
    pub last_result: String,
    pub last_active: i64,
    pub throttling_enabled: bool,
    pub throttling_speed_limit: i64,
    pub throttling_speed_unit: String,
    pub public_ip_count: i64,
    pub backup_count: i64,
    pub deleted: bool,
    pub updated_date: i64,
    pub deleted_date: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTenantResources {
    pub resources: Vec<CloudTenantResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTenantResource {
    pub repository: CloudTenantRepository,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTenantRepository {
    #[serde(rename = "display_name")]
    pub name: String,
    #[serde(rename = "quota")]
    pub quota_mb: i64,
    #[serde(rename = "used_quota")]
    pub used_quota_mb: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportTicket {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub id: i64,
    pub summary: String,
    pub status: String,
    pub crm: String,
    pub creator_full_name: String,
    #[serde(rename = "creator_user_name")]
    pub creator_username: String,
    pub cc_emails_enabled: bool,
    pub cc_email_addresses: Vec<String>,
    pub creation_date: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketAttachment {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub creator_full_name: String,
    #[serde(rename = "creator_user_name")]
    pub creator_username: String,
    pub creation_date: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketComment {
    pub id: i64,
    pub ticket_id: i64,
    pub text: String,
    pub comment_type: String,
    pub creator_full_name: String,
    pub creator_username: String,
    pub creation_date: i64,
}

impl Company {
    fn path(&self) -> String {
        format!("/companies/{}", self.crm)
    }

    pub async fn users(&self) -> Result<Vec<User>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("{}/users", self.path()))
            .await
    }

    pub async fn cloud_tenants(&self) -> Result<Vec<CloudTenant>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("{}/cloud-tenants", self.path()))
            .await
    }

    pub async fn support_tickets(&self) -> Result<Vec<SupportTicket>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("{}/support-tickets", self.path()))
            .await
    }

    pub async fn support_ticket(&self, ticket_id: i64) -> Result<SupportTicket, IlandError> {
        self.link
            .client()?
            .fetch_one(&format!("{}/support-tickets/{}", self.path(), ticket_id))
            .await
    }
}

impl SupportTicket {
    fn path(&self) -> String {
        format!("/companies/{}/support-tickets/{}", self.crm, self.id)
    }

    pub async fn attachments(&self) -> Result<Vec<TicketAttachment>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("{}/attachments", self.path()))
            .await
    }

    /// Raw bytes of an attachment
    pub async fn download_attachment(&self, attachment_id: i64) -> Result<Vec<u8>, IlandError> {
        self.link
            .client()?
            .get_binary(&format!("{}/attachments/{}", self.path(), attachment_id))
            .await
    }

    pub async fn comments(&self) -> Result<Vec<TicketComment>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("{}/comments", self.path()))
            .await
    }
}
