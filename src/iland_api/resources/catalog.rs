use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Task, VirtualMachine};
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    pub version: i64,
    pub shared: bool,
    pub public: bool,
    pub location_id: String,
    pub org_uuid: String,
    pub vcloud_href: String,
    pub created_date: i64,
    pub updated_date: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VAppTemplate {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    #[serde(rename = "size")]
    pub size_gb: f64,
    pub gold_master: bool,
    pub public: bool,
    pub is_expired: bool,
    pub location_id: String,
    pub org_uuid: String,
    pub vdc_uuid: String,
    pub catalog_uuid: String,
    pub storage_profile_uuid: String,
    pub vcloud_href: String,
    pub created_date: i64,
    pub updated_date: i64,
}

/// ISO or floppy image stored in a catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    pub public: bool,
    #[serde(rename = "size")]
    pub size_gb: f64,
    pub location_id: String,
    pub org_uuid: String,
    pub vdc_uuid: String,
    pub catalog_uuid: String,
    pub storage_profile_uuid: String,
    pub vcloud_href: String,
    pub created_date: i64,
    pub updated_date: i64,
}

impl Catalog {
    pub async fn vapp_templates(&self) -> Result<Vec<VAppTemplate>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/catalog/{}/vapp-templates", self.uuid))
            .await
    }

    /// Capture a vApp as a new template in this catalog.
    ///
    /// # Arguments
    ///
    /// * `source_vapp_uuid` - vApp to capture
    /// * `template_name` - Name for the template; `None` reuses the vApp's name
    ///
    /// Fails with `InvalidInput` when the catalog already holds a template
    /// with that name.
    pub async fn add_vapp_template(
        &self,
        source_vapp_uuid: &str,
        template_name: Option<&str>,
    ) -> Result<Task, IlandError> {
        let client = self.link.client()?;
        let vapp = client.vapp(source_vapp_uuid).await?;

        let name = match template_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => vapp.name,
        };

        if self.vapp_templates().await?.iter().any(|t| t.name == name) {
            return Err(IlandError::InvalidInput(format!(
                "vApp template with name {} already exists in catalog {}",
                name, self.uuid
            )));
        }

        tracing::debug!(
            "Adding vApp {} to catalog {} as template {}",
            source_vapp_uuid,
            self.uuid,
            name
        );

        client
            .mutate(
                Method::POST,
                &format!("/catalog/{}/add-vapp-template/{}", self.uuid, source_vapp_uuid),
                &serde_json::json!({ "name": name }),
            )
            .await
    }
}

impl VAppTemplate {
    pub async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/vapp-template/{}/vms", self.uuid))
            .await
    }
}
