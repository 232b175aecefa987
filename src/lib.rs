//! iland SDK
//!
//! An async Rust client for the iland cloud API.
//!
//! This SDK provides:
//! - OAuth2 password-grant authentication with transparent, single-flight token refresh
//! - Typed records for locations, orgs, VDCs, vApps, VMs, edges, catalogs and more
//! - Task tracking for asynchronous server-side operations
//! - Pre-flight readiness checks so mutations don't collide with running tasks
//!
//! # Example
//!
//! ```no_run
//! use iland_sdk::{ClientConfig, Credentials, IlandClient, TaskStatus};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IlandClient::new(
//!     Credentials::new("client-id", "client-secret", "alice", "password"),
//!     ClientConfig::default(),
//! )?;
//!
//! // Walk the inventory
//! for org in client.orgs().await? {
//!     println!("{} in {}", org.name, org.location_id);
//! }
//!
//! // Rename a VM and wait for the task to finish
//! let vm = client.virtual_machine("vm-uuid").await?;
//! let task = vm.rename("web-01").await?.track().await?;
//! assert_eq!(task.status, TaskStatus::Success);
//! # Ok(())
//! # }
//! ```

pub mod iland_api;

// Re-export commonly used types
pub use iland_api::{
    client::IlandClient,
    config::{ClientConfig, Credentials, DEFAULT_API_BASE_URL, DEFAULT_MEDIA_TYPE, DEFAULT_TOKEN_URL},
    resources::{
        Alert, BillingSummary, Catalog, CloudTenant, Company, ConsoleSession, Disk, Edge,
        EdgeInterface, EdgeNatConfig, FirewallConfig, FirewallRule, Location, Media, NatRule, Nic,
        Org, PerfInterval, PerfMetric, PerfResults, StorageProfile, SupportTicket, Task,
        TaskStatus, User, VApp, VAppNetwork, VAppTemplate, Vdc, VdcNetwork, VirtualMachine,
    },
    session::{strip_json_hijacking_prefix, SessionLink},
    types::{ApiError, AuthError, IlandError},
};
