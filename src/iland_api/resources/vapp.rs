use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ready_client, IpRange, Task, VAppNetwork, VirtualMachine};
use crate::iland_api::client::IlandClient;
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// vApp: a group of virtual machines managed together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VApp {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    pub deployed: bool,
    #[serde(rename = "is_expired")]
    pub expired: bool,
    pub status: String,
    pub location_id: String,
    pub org_uuid: String,
    pub vdc_uuid: String,
    #[serde(rename = "storage_profiles")]
    pub storage_profile_uuids: Vec<String>,
    pub vcloud_href: String,
    pub created_date: i64,
    pub updated_date: i64,
}

/// Payload for [`VApp::add_vapp_network`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddVAppNetworkParams {
    pub name: String,
    #[serde(rename = "gateway_address")]
    pub gateway: String,
    #[serde(rename = "network_mask")]
    pub netmask: String,
    pub primary_dns: String,
    pub secondary_dns: String,
    pub ip_ranges: Vec<IpRange>,
}

/// One VM to instantiate from a vApp template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddVirtualMachineFromTemplateParams {
    #[serde(rename = "name")]
    pub new_vm_name: String,
    #[serde(rename = "vapp_template_uuid")]
    pub source_vapp_template_uuid: String,
    #[serde(rename = "vm_template_uuid")]
    pub source_vm_uuid: String,
}

impl VApp {
    fn path(&self) -> String {
        format!("/vapp/{}", self.uuid)
    }

    async fn ready(&self) -> Result<IlandClient, IlandError> {
        ready_client(&self.link, &self.location_id, &self.uuid).await
    }

    pub async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("{}/vms", self.path()))
            .await
    }

    pub async fn vapp_networks(&self) -> Result<Vec<VAppNetwork>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("{}/networks", self.path()))
            .await
    }

    pub async fn delete(&self) -> Result<Task, IlandError> {
        self.ready().await?.action(Method::DELETE, &self.path()).await
    }

    pub async fn power_on(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/poweron", self.path()))
            .await
    }

    pub async fn power_off(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/poweroff", self.path()))
            .await
    }

    pub async fn suspend(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/suspend", self.path()))
            .await
    }

    pub async fn rename(&self, new_name: &str) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .mutate(
                Method::PUT,
                &format!("{}/name", self.path()),
                &serde_json::json!({ "name": new_name }),
            )
            .await
    }

    /// Restore the vApp to its snapshot
    pub async fn revert_snapshot(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/snapshot/restore", self.path()))
            .await
    }

    /// Copy this vApp into another VDC under a new name
    pub async fn clone_to(&self, target_vdc_uuid: &str, new_name: &str) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .mutate(
                Method::POST,
                &format!("{}/copy/{}", self.path(), target_vdc_uuid),
                &serde_json::json!({ "name": new_name }),
            )
            .await
    }

    pub async fn add_vapp_network(&self, params: &AddVAppNetworkParams) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .mutate(Method::POST, &format!("{}/vapp-network", self.path()), params)
            .await
    }

    pub async fn add_virtual_machines_from_templates(
        &self,
        params: &[AddVirtualMachineFromTemplateParams],
    ) -> Result<Task, IlandError> {
        if params.is_empty() {
            return Err(IlandError::InvalidInput(
                "at least one virtual machine is required".to_string(),
            ));
        }
        self.ready()
            .await?
            .mutate(Method::POST, &format!("{}/vms", self.path()), params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_vm_params_wire_names() {
        let params = AddVirtualMachineFromTemplateParams {
            new_vm_name: "web-2".to_string(),
            source_vapp_template_uuid: "tpl-1".to_string(),
            source_vm_uuid: "vm-tpl-1".to_string(),
        };
        let value = serde_json::to_value([params]).unwrap();
        assert_eq!(value[0]["name"], "web-2");
        assert_eq!(value[0]["vapp_template_uuid"], "tpl-1");
        assert_eq!(value[0]["vm_template_uuid"], "vm-tpl-1");
    }

    #[test]
    fn test_network_params_wire_names() {
        let params = AddVAppNetworkParams {
            name: "isolated".to_string(),
            gateway: "10.0.0.1".to_string(),
            netmask: "255.255.255.0".to_string(),
            ip_ranges: vec![IpRange {
                start: "10.0.0.10".to_string(),
                end: "10.0.0.20".to_string(),
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["gateway_address"], "10.0.0.1");
        assert_eq!(value["network_mask"], "255.255.255.0");
        assert_eq!(value["ip_ranges"][0]["end"], "10.0.0.20");
    }

    #[tokio::test]
    async fn test_empty_vm_list_rejected() {
        let vapp = VApp::default();
        let result = vapp.add_virtual_machines_from_templates(&[]).await;
        assert!(matches!(result, Err(IlandError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_mutation_on_unlinked_vapp() {
        let vapp = VApp::default();
        assert!(matches!(vapp.power_on().await, Err(IlandError::SessionClosed)));
    }
}
