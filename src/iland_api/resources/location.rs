use serde::{Deserialize, Serialize};

use super::Task;
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// iland data center
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    #[serde(rename = "location_id")]
    pub id: String,
    pub crm: String,
    pub updated_date: i64,
}

impl Location {
    /// Tasks recorded against an entity in this location
    pub async fn entity_tasks(&self, entity_uuid: &str) -> Result<Vec<Task>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/task/{}/entity/{}", self.id, entity_uuid))
            .await
    }
}
