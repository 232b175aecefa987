use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ready_client, NatRule, SubnetParticipation, Task};
use crate::iland_api::client::IlandClient;
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Edge gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Edge {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub description: String,
    pub backward_compatibility_mode: bool,
    pub gateway_backing_config: String,
    pub high_availability_enabled: bool,
    pub default_dns_relay_route: bool,
    pub interfaces: Vec<EdgeInterface>,
    pub location_id: String,
    pub org_uuid: String,
    pub vdc_uuid: String,
    pub updated_date: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeInterface {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub interface_type: String,
    pub subnet_participation: Vec<SubnetParticipation>,
    pub default_route: bool,
    #[serde(rename = "apply_rate_limit")]
    pub limit_enabled: bool,
    #[serde(rename = "in_rate_limit")]
    pub inbound_limit: f64,
    #[serde(rename = "out_rate_limit")]
    pub outbound_limit: f64,
    #[serde(rename = "network")]
    pub network_name: String,
    pub network_uuid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeNatConfig {
    pub enabled: bool,
    pub rules: Vec<NatRule>,
}

/// Edge firewall configuration
///
/// Fields the SDK does not model are kept in `extra` and written back
/// unchanged on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    pub enabled: bool,
    pub default_action: String,
    pub log_default_action: bool,
    pub rules: Vec<FirewallRule>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    pub id: i64,
    pub name: String,
    pub enabled: bool,
    pub action: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Edge {
    fn path(&self) -> String {
        format!("/edge/{}", self.uuid)
    }

    async fn ready(&self) -> Result<IlandClient, IlandError> {
        ready_client(&self.link, &self.location_id, &self.uuid).await
    }

    /// Interface of type `uplink`, if the edge has one
    pub fn uplink_interface(&self) -> Option<&EdgeInterface> {
        self.interfaces
            .iter()
            .find(|i| i.interface_type == "uplink")
    }

    pub async fn nat_config(&self) -> Result<EdgeNatConfig, IlandError> {
        self.link
            .client()?
            .get_record(&format!("{}/nat", self.path()))
            .await
    }

    /// Append a NAT rule and write the whole configuration back.
    pub async fn add_nat_rule(&self, rule: NatRule) -> Result<Task, IlandError> {
        let client = self.ready().await?;
        let mut config = self.nat_config().await?;
        config.rules.push(rule);
        client
            .mutate(Method::PUT, &format!("{}/nat", self.path()), &config)
            .await
    }

    pub async fn delete_nat_rule(&self, rule_id: i64) -> Result<Task, IlandError> {
        let client = self.ready().await?;
        let mut config = self.nat_config().await?;
        let before = config.rules.len();
        config.rules.retain(|r| r.id != rule_id);
        if config.rules.len() == before {
            return Err(IlandError::NotFound(format!(
                "NAT rule {} on edge {}",
                rule_id, self.uuid
            )));
        }
        client
            .mutate(Method::PUT, &format!("{}/nat", self.path()), &config)
            .await
    }

    pub async fn firewall_config(&self) -> Result<FirewallConfig, IlandError> {
        self.link
            .client()?
            .get_record(&format!("{}/firewall", self.path()))
            .await
    }

    pub async fn update_firewall_config(&self, config: &FirewallConfig) -> Result<Task, IlandError> {
        self.ready()
            .await?
            .mutate(Method::PUT, &format!("{}/firewall", self.path()), config)
            .await
    }
}
