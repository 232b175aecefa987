use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BillingSummary, Edge, PerfInterval, PerfMetric, PerfResults, VApp, VdcNetwork, VirtualMachine,
};
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Virtual data center
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vdc {
    #[serde(skip)]
    pub(crate) link: SessionLink,
    pub name: String,
    pub uuid: String,
    pub enabled: bool,
    pub description: String,
    pub org_uuid: String,
    pub location_id: String,
    pub allocation_model: String,
    pub reserved_cpu: i64,
    #[serde(rename = "alloc_cpu")]
    pub allocated_cpu: i64,
    #[serde(rename = "reserved_mem")]
    pub reserved_memory: i64,
    #[serde(rename = "alloc_mem")]
    pub allocated_memory: i64,
    #[serde(rename = "disk_limit")]
    pub storage_limit: i64,
    #[serde(rename = "max_hdw_version")]
    pub max_hardware_version: String,
    pub network_quota: i64,
    pub used_network_count: i64,
    pub vcloud_href: String,
    pub updated_date: i64,
}

/// Storage tier available to a VDC
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageProfile {
    pub name: String,
    pub uuid: String,
    pub vdc_uuid: String,
    pub enabled: bool,
    pub default: bool,
    #[serde(rename = "unit")]
    pub storage_unit: String,
    #[serde(rename = "size_limit")]
    pub storage_limit: i64,
    #[serde(rename = "storage_used_in_mb")]
    pub storage_used_mb: i64,
    #[serde(rename = "href")]
    pub vcloud_href: String,
    pub updated_date: i64,
}

impl Vdc {
    pub async fn edges(&self) -> Result<Vec<Edge>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/vdc/{}/edges", self.uuid))
            .await
    }

    pub async fn storage_profiles(&self) -> Result<Vec<StorageProfile>, IlandError> {
        self.link
            .client()?
            .fetch_records(&format!("/vdc/{}/storage-profiles", self.uuid))
            .await
    }

    pub async fn vdc_networks(&self) -> Result<Vec<VdcNetwork>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/vdc/{}/networks", self.uuid))
            .await
    }

    pub async fn vapps(&self) -> Result<Vec<VApp>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/vdc/{}/vapps", self.uuid))
            .await
    }

    pub async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>, IlandError> {
        self.link
            .client()?
            .fetch_many(&format!("/vdc/{}/vms", self.uuid))
            .await
    }

    /// Performance samples for one metric over `[start, end]`
    ///
    /// The sample limit sent with the query follows the interval.
    ///
    /// # Arguments
    ///
    /// * `start` - Beginning of the window
    /// * `end` - End of the window
    /// * `interval` - Rollup interval
    /// * `metric` - Counter to read, e.g. [`PerfMetric::CPU_USAGE_AVG`]
    pub async fn performance(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: PerfInterval,
        metric: PerfMetric,
    ) -> Result<PerfResults, IlandError> {
        let path = performance_path(&self.uuid, start, end, interval, metric);
        self.link.client()?.get_record(&path).await
    }

    /// Billing summary for the current month
    pub async fn current_bill(&self) -> Result<BillingSummary, IlandError> {
        self.link
            .client()?
            .get_record(&format!("/vdc/{}/bill", self.uuid))
            .await
    }

    /// Billing summary for a past month (`month` is 1-12)
    pub async fn previous_bill(&self, month: u32, year: i32) -> Result<BillingSummary, IlandError> {
        if !(1..=12).contains(&month) {
            return Err(IlandError::InvalidInput(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        self.link
            .client()?
            .get_record(&format!(
                "/vdc/{}/bill?month={}&year={}",
                self.uuid, month, year
            ))
            .await
    }
}

fn performance_path(
    vdc_uuid: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: PerfInterval,
    metric: PerfMetric,
) -> String {
    format!(
        "/vdc/{}/p?group={}&name={}&type={}&start={}&end={}&interval={}&limit={}",
        vdc_uuid,
        metric.group,
        metric.name,
        metric.rollup,
        start.timestamp_millis(),
        end.timestamp_millis(),
        interval,
        interval.sample_limit()
    )
}
