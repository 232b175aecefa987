use serde::{Deserialize, Serialize};

use super::{
    Catalog, Edge, Media, StorageProfile, Task, VApp, VAppNetwork, VAppTemplate, Vdc, VdcNetwork,
    VirtualMachine,
};
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Organization: the tenancy boundary inside a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Org {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub crm: String,
    pub full_name: String,
    pub description: String,
    pub vcloud_href: String,
    pub location_id: String,
    pub zerto_target: bool,
    pub enabled: bool,
    pub updated_date: i64,
}

impl Org {
    pub async fn catalogs(&self) -> Result<Vec<Catalog>, IlandError> {
        self.children("catalogs").await
    }

    pub async fn vdcs(&self) -> Result<Vec<Vdc>, IlandError> {
        self.children("vdcs").await
    }

    pub async fn edges(&self) -> Result<Vec<Edge>, IlandError> {
        self.children("edges").await
    }

    pub async fn vdc_networks(&self) -> Result<Vec<VdcNetwork>, IlandError> {
        self.children("vdc-networks").await
    }

    pub async fn vapp_templates(&self) -> Result<Vec<VAppTemplate>, IlandError> {
        self.children("vapp-templates").await
    }

    pub async fn medias(&self) -> Result<Vec<Media>, IlandError> {
        self.children("medias").await
    }

    pub async fn vapps(&self) -> Result<Vec<VApp>, IlandError> {
        self.children("vapps").await
    }

    pub async fn vapp_networks(&self) -> Result<Vec<VAppNetwork>, IlandError> {
        self.children("vapp-networks").await
    }

    pub async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>, IlandError> {
        self.children("vms").await
    }

    /// Tasks currently running anywhere in this org
    pub async fn active_tasks(&self) -> Result<Vec<Task>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/task/{}/org/{}/active", self.location_id, self.uuid))
            .await
    }

    /// First storage profile flagged as default across the org's VDCs.
    ///
    /// Returns `NotFound` when no VDC has one.
    pub async fn default_storage_profile(&self) -> Result<StorageProfile, IlandError> {
        for vdc in self.vdcs().await? {
            if let Some(profile) = vdc
                .storage_profiles()
                .await?
                .into_iter()
                .find(|p| p.default)
            {
                return Ok(profile);
            }
        }
        Err(IlandError::NotFound(format!(
            "default storage profile in org {}",
            self.uuid
        )))
    }

    async fn children<T>(&self, segment: &str) -> Result<Vec<T>, IlandError>
    where
        T: serde::de::DeserializeOwned + super::Linked,
    {
        self.link
            .client()?
            .fetch_many(&format!("/org/{}/{}", self.uuid, segment))
            .await
    }
}
