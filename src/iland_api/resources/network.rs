use serde::{Deserialize, Serialize};

use super::IpRange;
use crate::iland_api::session::SessionLink;

/// Org-level network attached to a VDC
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VdcNetwork {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    pub gateway: String,
    pub netmask: String,
    pub ip_ranges: Vec<IpRange>,
    pub primary_dns: String,
    pub secondary_dns: String,
    pub dns_suffix: String,
    pub fence_mode: String,
    pub location_id: String,
    pub org_uuid: String,
    pub vdc_uuid: String,
    pub edge_uuid: String,
    pub parent_network_uuid: String,
    pub shared: bool,
    pub inherited: bool,
    pub updated_date: i64,
}

/// Network scoped to a single vApp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VAppNetwork {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    pub enabled: bool,
    pub inherited: bool,
    pub shared: bool,
    pub vapp_network: bool,
    pub fence_mode: String,
    pub gateway: String,
    pub netmask: String,
    pub primary_dns: String,
    pub secondary_dns: String,
    pub dns_suffix: String,
    pub ip_ranges: Vec<IpRange>,
    pub parent_network_name: String,
    pub parent_network_uuid: String,
    pub parent_entity_uuid: String,
    pub edge_uuid: String,
    pub router_external_ip: String,
}
