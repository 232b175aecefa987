use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive address range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetParticipation {
    pub gateway: String,
    pub netmask: String,
    pub ip_address: String,
    pub ip_ranges: Vec<IpRange>,
}

/// Edge gateway NAT rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NatRule {
    pub id: i64,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub enabled: bool,
    pub description: String,
    pub original_ip: String,
    pub original_port: String,
    pub translated_ip: String,
    pub translated_port: String,
    pub protocol: String,
    #[serde(rename = "interface")]
    pub interface_name: String,
}

// =============================================================================
// Performance
// =============================================================================

/// Performance counter identifier: `group`, `name` and rollup `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfMetric {
    pub group: &'static str,
    pub name: &'static str,
    pub rollup: &'static str,
}

impl PerfMetric {
    pub const fn new(group: &'static str, name: &'static str, rollup: &'static str) -> Self {
        Self {
            group,
            name,
            rollup,
        }
    }

    pub const CPU_USAGE_AVG: PerfMetric = PerfMetric::new("cpu", "usage", "average");
    pub const CPU_USAGE_MHZ_AVG: PerfMetric = PerfMetric::new("cpu", "usagemhz", "average");
    pub const CPU_READY_SUM: PerfMetric = PerfMetric::new("cpu", "ready", "summation");
    pub const MEMORY_ACTIVE_AVG: PerfMetric = PerfMetric::new("mem", "active", "average");
    pub const MEMORY_CONSUMED_AVG: PerfMetric = PerfMetric::new("mem", "consumed", "average");
    pub const MEMORY_BALLOONED_AVG: PerfMetric = PerfMetric::new("mem", "vmmemctrl", "average");
    pub const MEMORY_SWAPPED_AVG: PerfMetric = PerfMetric::new("mem", "swapped", "average");
    pub const NETWORK_USAGE_AVG: PerfMetric = PerfMetric::new("net", "usage", "average");
    pub const NETWORK_RECEIVED_AVG: PerfMetric = PerfMetric::new("net", "received", "average");
    pub const NETWORK_TRANSMITTED_AVG: PerfMetric =
        PerfMetric::new("net", "transmitted", "average");
    pub const DISK_READ_AVG: PerfMetric = PerfMetric::new("disk", "read", "average");
    pub const DISK_WRITE_AVG: PerfMetric = PerfMetric::new("disk", "write", "average");
    pub const DISK_MAX_LATENCY: PerfMetric = PerfMetric::new("disk", "maxtotallatency", "latest");
    pub const DISK_USAGE_AVG: PerfMetric = PerfMetric::new("disk", "usage", "average");
    pub const DISK_PROVISIONED: PerfMetric = PerfMetric::new("disk", "provisioned", "latest");
    pub const DISK_USED: PerfMetric = PerfMetric::new("disk", "used", "latest");
    pub const DISK_WRITE_IOPS_AVG: PerfMetric =
        PerfMetric::new("disk", "numberwriteaverage", "average");
    pub const DISK_READ_IOPS_AVG: PerfMetric =
        PerfMetric::new("disk", "numberreadaverage", "average");
}

/// Sampling interval for performance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfInterval {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl PerfInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerfInterval::Second => "second",
            PerfInterval::Minute => "minute",
            PerfInterval::Hour => "hour",
            PerfInterval::Day => "day",
            PerfInterval::Week => "week",
            PerfInterval::Month => "month",
        }
    }

    /// Sample cap the API accepts for this interval
    pub fn sample_limit(&self) -> u32 {
        match self {
            PerfInterval::Second => 500,
            PerfInterval::Hour => 1000,
            PerfInterval::Day => 2000,
            PerfInterval::Week => 3000,
            PerfInterval::Month => 5000,
            PerfInterval::Minute => 1000,
        }
    }
}

impl fmt::Display for PerfInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfResults {
    pub summary: String,
    pub interval: i64,
    pub group: String,
    pub name: String,
    #[serde(rename = "type")]
    pub rollup: String,
    pub unit: String,
    pub samples: Vec<PerfSample>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfSample {
    /// Unix milliseconds
    pub time: i64,
    pub value: f64,
}

// =============================================================================
// Billing
// =============================================================================

/// Billing summary for an entity over one month
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSummary {
    #[serde(rename = "total")]
    pub total_cost: f64,
    #[serde(rename = "estimate")]
    pub total_cost_estimate: f64,
    #[serde(rename = "cpu")]
    pub cpu_total_cost: f64,
    pub cpu_usage: f64,
    #[serde(rename = "cpu_burst")]
    pub cpu_burst_cost: f64,
    #[serde(rename = "cpu_res_usage")]
    pub cpu_reserve_usage: f64,
    pub cpu_burst_usage: f64,
    #[serde(rename = "mem")]
    pub memory_total_cost: f64,
    #[serde(rename = "mem_usage")]
    pub memory_usage: f64,
    #[serde(rename = "mem_res_usage")]
    pub memory_reserve_usage: f64,
    #[serde(rename = "mem_burst_usage")]
    pub memory_burst_usage: f64,
    #[serde(rename = "mem_burst")]
    pub memory_burst_cost: f64,
    #[serde(rename = "bandwidth")]
    pub bandwidth_total_cost: f64,
    pub bandwidth_usage: f64,
    #[serde(rename = "bandwidth_burst")]
    pub bandwidth_burst_cost: f64,
    pub bandwidth_burst_usage: f64,
    #[serde(rename = "bandwidth_reserved_cost")]
    pub bandwidth_reserve_cost: f64,
    #[serde(rename = "bandwidth_reserved_usage")]
    pub bandwidth_reserve_usage: f64,
    #[serde(rename = "disk")]
    pub disk_total_cost: f64,
    pub disk_usage: f64,
    pub disk_burst_usage: f64,
    #[serde(rename = "disk_burst")]
    pub disk_burst_cost: f64,
    pub hdd_usage: f64,
    pub hdd_cost: f64,
    pub hdd_burst_usage: f64,
    pub hdd_burst_cost: f64,
    #[serde(rename = "hdd_reserved_cost")]
    pub hdd_reserve_cost: f64,
    #[serde(rename = "hdd_reserved_usage")]
    pub hdd_reserve_usage: f64,
    pub ssd_usage: f64,
    pub ssd_cost: f64,
    pub ssd_burst_usage: f64,
    pub ssd_burst_cost: f64,
    #[serde(rename = "ssd_reserved_cost")]
    pub ssd_reserve_cost: f64,
    #[serde(rename = "ssd_reserved_usage")]
    pub ssd_reserve_usage: f64,
    pub archive_usage: f64,
    pub archive_cost: f64,
    pub archive_burst_usage: f64,
    pub archive_burst_cost: f64,
    #[serde(rename = "archive_reserved_cost")]
    pub archive_reserve_cost: f64,
    #[serde(rename = "archive_reserved_usage")]
    pub archive_reserve_usage: f64,
    pub zerto_archive_usage: f64,
    pub zerto_archive_cost: f64,
    pub zerto_advanced_usage: f64,
    pub zerto_advanced_cost: f64,
    pub entity_uuid: String,
    pub entity_type: String,
    pub entity_name: String,
    pub currency_code: String,
    /// Unix milliseconds at which the summary was computed
    #[serde(rename = "time")]
    pub current_time: i64,
    pub test_drive: bool,
    pub line_items: Vec<BillingLineItem>,
    pub discount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingLineItem {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub product_id: String,
}
