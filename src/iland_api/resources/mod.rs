//! Domain records returned by the iland cloud API.
//!
//! Every record decodes with missing fields defaulted. Records that can issue
//! follow-up requests carry a [`SessionLink`] that is filled in when the
//! client hands them out.

mod catalog;
mod company;
mod edge;
mod location;
mod network;
mod org;
mod shared;
mod task;
mod user;
mod vapp;
mod vdc;
mod virtual_machine;

pub use catalog::{Catalog, Media, VAppTemplate};
pub use company::{
    CloudTenant, CloudTenantRepository, CloudTenantResource, CloudTenantResources, Company,
    SupportTicket, TicketAttachment, TicketComment,
};
pub use edge::{Edge, EdgeInterface, EdgeNatConfig, FirewallConfig, FirewallRule};
pub use location::Location;
pub use network::{VAppNetwork, VdcNetwork};
pub use org::Org;
pub use shared::{
    BillingLineItem, BillingSummary, IpRange, NatRule, PerfInterval, PerfMetric, PerfResults,
    PerfSample, SubnetParticipation,
};
pub use task::{Task, TaskStatus};
pub use user::{Alert, AlertDelivery, User, UserRole};
pub use vapp::{AddVAppNetworkParams, AddVirtualMachineFromTemplateParams, VApp};
pub use vdc::{StorageProfile, Vdc};
pub use virtual_machine::{ConsoleSession, Disk, Nic, VirtualMachine};

use crate::iland_api::client::IlandClient;
use crate::iland_api::session::SessionLink;
use crate::iland_api::types::IlandError;

/// Client for a mutation on an entity, returned once no task is active
/// against it.
pub(crate) async fn ready_client(
    link: &SessionLink,
    location_id: &str,
    entity_uuid: &str,
) -> Result<IlandClient, IlandError> {
    let client = link.client()?;
    client
        .wait_until_entity_ready(location_id, entity_uuid)
        .await?;
    Ok(client)
}

/// A record holding a link back to the session that fetched it
pub trait Linked {
    fn link(&self) -> &SessionLink;
    fn link_mut(&mut self) -> &mut SessionLink;
}

macro_rules! impl_linked {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Linked for $record {
                fn link(&self) -> &SessionLink {
                    &self.link
                }

                fn link_mut(&mut self) -> &mut SessionLink {
                    &mut self.link
                }
            }
        )+
    };
}

impl_linked!(
    Catalog,
    Company,
    Edge,
    Location,
    Media,
    Org,
    SupportTicket,
    Task,
    User,
    VApp,
    VAppNetwork,
    VAppTemplate,
    Vdc,
    VdcNetwork,
    VirtualMachine,
);
