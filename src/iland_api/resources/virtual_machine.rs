use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ready_client, Task};
use crate::iland_api::client::IlandClient;
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Controller type used for disks added through [`VirtualMachine::add_disk`]
pub const DEFAULT_DISK_TYPE: &str = "LSI_LOGIC";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualMachine {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    #[serde(rename = "os")]
    pub operating_system: String,
    #[serde(rename = "cpus_number")]
    pub vcpu: i64,
    pub cores_per_socket: i64,
    #[serde(rename = "memory_size")]
    pub memory_mb: i64,
    #[serde(rename = "storage_profiles")]
    pub storage_profile_uuids: Vec<String>,
    pub hardware_version: String,
    #[serde(rename = "media_inserted")]
    pub media_mounted: bool,
    #[serde(rename = "inserted_media_name")]
    pub mounted_media_name: String,
    pub deployed: bool,
    pub status: String,
    pub location_id: String,
    pub org_uuid: String,
    pub vdc_uuid: String,
    pub vapp_uuid: String,
    pub vcloud_href: String,
    pub created_date: i64,
    pub updated_date: i64,
}

/// Virtual disk, sized in MB
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disk {
    pub name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub disk_type: String,
}

/// Virtual network adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nic {
    #[serde(rename = "nic_id")]
    pub index: i64,
    pub ip_address: String,
    pub mac_address: String,
    #[serde(rename = "address_mode")]
    pub ip_allocation_mode: String,
    #[serde(rename = "primary_cnx")]
    pub primary: bool,
    pub connected: bool,
    pub adapter_type: String,
    #[serde(rename = "net_name")]
    pub network_name: String,
}

/// Remote console ticket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSession {
    pub vmx: String,
    pub ticket: String,
    pub host: String,
    pub port: String,
}

impl VirtualMachine {
    fn path(&self) -> String {
        format!("/vm/{}", self.uuid)
    }

    async fn ready(&self) -> Result<IlandClient, IlandError> {
        ready_client(&self.link, &self.location_id, &self.uuid).await
    }

    pub async fn disks(&self) -> Result<Vec<Disk>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("{}/virtual-disks", self.path()))
            .await
    }

    pub async fn nics(&self) -> Result<Vec<Nic>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("{}/vnics", self.path()))
            .await
    }

    pub async fn delete(&self) -> Result<Task, IlandError> {
        self.ready().await?.action(Method::DELETE, &self.path()).await
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

    pub async fn power_on(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/poweron", self.path()))
            .await
    }

    pub async fn reboot(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/reboot", self.path()))
            .await
    }

    pub async fn power_off(&self) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(Method::POST, &format!("{}/poweroff", self.path()))
            .await
    }

    /// Set the vCPU count. Cores per socket is always 1.
    pub async fn modify_cpu(&self, cpu_count: u32) -> Result<Task, IlandError> {
        if cpu_count == 0 {
            return Err(IlandError::InvalidInput(
                "cpu count must be at least 1".to_string(),
            ));
        }
        self.ready()
            .await?
            .mutate(
                Method::PUT,
                &format!("{}/cpu", self.path()),
                &serde_json::json!({ "cpus_number": cpu_count, "cores_per_socket": 1 }),
            )
            .await
    }

    pub async fn modify_memory(&self, memory_mb: u32) -> Result<Task, IlandError> {
        if memory_mb == 0 {
            return Err(IlandError::InvalidInput(
                "memory size must be greater than zero".to_string(),
            ));
        }
        self.ready()
            .await?
            .mutate(
                Method::PUT,
                &format!("{}/mem", self.path()),
                &serde_json::json!({ "memory_size": memory_mb }),
            )
            .await
    }

    /// Append a NIC to the current adapter list.
    pub async fn add_nic(&self, nic: Nic) -> Result<Task, IlandError> {
        let client = self.ready().await?;
        let mut nics = self.nics().await?;
        nics.push(nic);
        client
            .mutate(Method::PUT, &format!("{}/vnics", self.path()), &nics)
            .await
    }

    /// Replace the whole adapter list.
    pub async fn update_nics(&self, nics: &[Nic]) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .mutate(Method::PUT, &format!("{}/vnics", self.path()), nics)
            .await
    }

    pub async fn delete_nic(&self, nic_index: i64) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .action(
                Method::DELETE,
                &format!("{}/vnics/{}", self.path(), nic_index),
            )
            .await
    }

    pub async fn add_disk(&self, size_mb: i64) -> Result<Task, IlandError> {
        let disk = Disk {
            name: String::new(),
            size: size_mb,
            disk_type: DEFAULT_DISK_TYPE.to_string(),
        };
        self.ready()
            .await?
            .mutate(Method::POST, &format!("{}/virtual-disk", self.path()), &disk)
            .await
    }

    pub async fn modify_disk(&self, disk: &Disk) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .mutate(Method::PUT, &format!("{}/virtual-disk", self.path()), disk)
            .await
    }

    /// Drop the named disk by writing back the remaining list.
    pub async fn remove_disk(&self, disk_name: &str) -> Result<Task, IlandError> {
        let client = self.ready().await?;
        let disks = self.disks().await?;
        let before = disks.len();
        let remaining: Vec<Disk> = disks.into_iter().filter(|d| d.name != disk_name).collect();
        if remaining.len() == before {
            return Err(IlandError::NotFound(format!(
                "disk {} on vm {}",
                disk_name, self.uuid
            )));
        }
        client
            .mutate(
                Method::PUT,
                &format!("{}/virtual-disks", self.path()),
                &remaining,
            )
            .await
    }

    pub async fn console_session(&self) -> Result<ConsoleSession, IlandError> {
        self.link
            .client()?
            .get_record(&format!("{}/mks-screen-ticket", self.path()))
            .await
    }
}
