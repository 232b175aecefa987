use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::iland_api::config::{ClientConfig, Credentials};
use crate::iland_api::resources::{
    Catalog, Company, Edge, Linked, Location, Media, Org, StorageProfile, Task, User, VApp,
    VAppTemplate, Vdc, VdcNetwork, VirtualMachine,
};
use crate::iland_api::session::{Session, SessionLink};
use crate::iland_api::types::{ApiError, IlandError};

/// HTTP client for the iland cloud API
///
/// Cheap to clone; every clone shares one [`Session`] and therefore one
/// token. Records fetched through the client keep a weak link back to it so
/// they can issue follow-up requests.
#[derive(Debug, Clone)]
pub struct IlandClient {
    session: Arc<Session>,
}

impl IlandClient {
    /// Create a new iland cloud API client
    ///
    /// No network traffic happens here; the first request authenticates.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use iland_sdk::{ClientConfig, Credentials, IlandClient};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = IlandClient::new(
    ///     Credentials::new("client-id", "client-secret", "alice", "password"),
    ///     ClientConfig::default(),
    /// )?;
    ///
    /// for vm in client.virtual_machines().await? {
    ///     println!("{} ({})", vm.name, vm.status);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, IlandError> {
        Ok(Self {
            session: Arc::new(Session::new(credentials, config)?),
        })
    }

    /// Build a client from `ILAND_*` environment variables
    pub fn from_env() -> Result<Self, IlandError> {
        Self::new(Credentials::from_env()?, ClientConfig::from_env()?)
    }

    pub(crate) fn from_session(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        self.session.config()
    }

    /// Make sure a currently-valid token is held.
    pub async fn ensure_valid_token(&self) -> Result<(), IlandError> {
        self.session.ensure_valid_token().await
    }

    // =========================================================================
    // Raw verbs
    // =========================================================================

    pub async fn request(
        &self,
        method: Method,
        relative_path: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, IlandError> {
        self.session
            .authenticated_request(method, relative_path, body)
            .await
    }

    pub async fn get(&self, relative_path: &str) -> Result<Vec<u8>, IlandError> {
        self.request(Method::GET, relative_path, Vec::new()).await
    }

    pub async fn post(&self, relative_path: &str, body: Vec<u8>) -> Result<Vec<u8>, IlandError> {
        self.request(Method::POST, relative_path, body).await
    }

    pub async fn put(&self, relative_path: &str, body: Vec<u8>) -> Result<Vec<u8>, IlandError> {
        self.request(Method::PUT, relative_path, body).await
    }

    pub async fn delete(&self, relative_path: &str) -> Result<Vec<u8>, IlandError> {
        self.request(Method::DELETE, relative_path, Vec::new()).await
    }

    /// GET a non-JSON payload
    pub async fn get_binary(&self, relative_path: &str) -> Result<Vec<u8>, IlandError> {
        self.session.get_binary(relative_path).await
    }

    // =========================================================================
    // Request shapes
    // =========================================================================

    pub(crate) fn attach<T: Linked>(&self, mut record: T) -> T {
        *record.link_mut() = SessionLink::new(&self.session);
        record
    }

    /// GET a single JSON object without attaching a link
    pub(crate) async fn get_record<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, IlandError> {
        let body = self.get(path).await?;
        decode_record(path, &body)
    }

    /// GET a JSON array of objects without attaching links
    pub(crate) async fn get_records<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, IlandError> {
        let body = self.get(path).await?;
        decode_records(path, &body)
    }

    /// Fetch-one: decode a single record and link it
    pub(crate) async fn fetch_one<T>(&self, path: &str) -> Result<T, IlandError>
    where
        T: DeserializeOwned + Linked,
    {
        let record = self.get_record(path).await?;
        Ok(self.attach(record))
    }

    /// Decode a collection in source order. Honors `lenient_collections`.
    pub(crate) async fn fetch_records<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, IlandError> {
        match self.get_records(path).await {
            Ok(records) => Ok(records),
            Err(e) if self.config().lenient_collections => {
                tracing::warn!("Ignoring failed collection read {}: {}", path, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch-many: decode a collection and link every record
    pub(crate) async fn fetch_many<T>(&self, path: &str) -> Result<Vec<T>, IlandError>
    where
        T: DeserializeOwned + Linked,
    {
        let records = self.fetch_records(path).await?;
        Ok(records.into_iter().map(|r| self.attach(r)).collect())
    }

    /// Aggregate-fetch: one fetch-many per parent, concatenated in parent order
    pub(crate) async fn fetch_across<P, T, F>(
        &self,
        parents: &[P],
        path_for: F,
    ) -> Result<Vec<T>, IlandError>
    where
        T: DeserializeOwned + Linked,
        F: Fn(&P) -> String,
    {
        let mut all = Vec::new();
        for parent in parents {
            all.extend(self.fetch_many(&path_for(parent)).await?);
        }
        Ok(all)
    }

    /// Mutate with a JSON payload, returning the linked task
    pub(crate) async fn mutate<B>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<Task, IlandError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(|e| {
            ApiError::Request(format!("Failed to serialize request body: {}", e))
        })?;
        let response = self.request(method, path, body).await?;
        let task = decode_record(path, &response)?;
        Ok(self.attach(task))
    }

    /// Mutate with an empty body (power operations, deletes)
    pub(crate) async fn action(&self, method: Method, path: &str) -> Result<Task, IlandError> {
        let response = self.request(method, path, Vec::new()).await?;
        let task = decode_record(path, &response)?;
        Ok(self.attach(task))
    }

    /// Run a polling future under `poll_timeout`, if one is configured.
    pub(crate) async fn with_poll_timeout<T, F>(&self, poll: F) -> Result<T, IlandError>
    where
        F: Future<Output = Result<T, IlandError>>,
    {
        match self.config().poll_timeout {
            Some(limit) => tokio::time::timeout(limit, poll)
                .await
                .map_err(|_| IlandError::Timeout(limit))?,
            None => poll.await,
        }
    }

    /// Block until no task is active against the entity.
    ///
    /// Polls `/task/{location}/entity/{uuid}/active` every
    /// `readiness_poll_interval`. This only avoids server-side conflicts
    /// between our own successive calls; it is not a lock.
    pub async fn wait_until_entity_ready(
        &self,
        location_id: &str,
        entity_uuid: &str,
    ) -> Result<(), IlandError> {
        let path = format!("/task/{}/entity/{}/active", location_id, entity_uuid);
        let interval = self.config().readiness_poll_interval;

        self.with_poll_timeout(async {
            loop {
                let active: Vec<Task> = self.get_records(&path).await?;
                if active.is_empty() {
                    return Ok(());
                }
                tracing::debug!(
                    "{} active task(s) on entity {}, waiting {:?}",
                    active.len(),
                    entity_uuid,
                    interval
                );
                tokio::time::sleep(interval).await;
            }
        })
        .await
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Locations visible to the authenticated user
    pub async fn locations(&self) -> Result<Vec<Location>, IlandError> {
        let path = format!("/user/{}/inventory", self.session.username());
        self.fetch_many(&path).await
    }

    pub async fn location(&self, location_id: &str) -> Result<Location, IlandError> {
        self.locations()
            .await?
            .into_iter()
            .find(|l| l.id == location_id)
            .ok_or_else(|| IlandError::NotFound(format!("location with ID {}", location_id)))
    }

    /// Orgs across every location
    pub async fn orgs(&self) -> Result<Vec<Org>, IlandError> {
        let locations = self.locations().await?;
        self.fetch_across(&locations, |l| format!("/location/{}/orgs", l.id))
            .await
    }

    pub async fn org(&self, org_uuid: &str) -> Result<Org, IlandError> {
        self.fetch_one(&format!("/org/{}", org_uuid)).await
    }

    /// Catalogs across every org
    pub async fn catalogs(&self) -> Result<Vec<Catalog>, IlandError> {
        let orgs = self.orgs().await?;
        self.fetch_across(&orgs, |o| format!("/org/{}/catalogs", o.uuid))
            .await
    }

    pub async fn catalog(&self, catalog_uuid: &str) -> Result<Catalog, IlandError> {
        self.fetch_one(&format!("/catalog/{}", catalog_uuid)).await
    }

    /// VDCs across every location
    pub async fn vdcs(&self) -> Result<Vec<Vdc>, IlandError> {
        let locations = self.locations().await?;
        self.fetch_across(&locations, |l| format!("/location/{}/vdcs", l.id))
            .await
    }

    pub async fn vdc(&self, vdc_uuid: &str) -> Result<Vdc, IlandError> {
        self.fetch_one(&format!("/vdc/{}", vdc_uuid)).await
    }

    /// Storage profiles across every VDC
    pub async fn storage_profiles(&self) -> Result<Vec<StorageProfile>, IlandError> {
        let mut profiles = Vec::new();
        for vdc in self.vdcs().await? {
            profiles.extend(
                self.fetch_records(&format!("/vdc/{}/storage-profiles", vdc.uuid))
                    .await?,
            );
        }
        Ok(profiles)
    }

    pub async fn storage_profile(&self, profile_uuid: &str) -> Result<StorageProfile, IlandError> {
        self.storage_profiles()
            .await?
            .into_iter()
            .find(|p| p.uuid == profile_uuid)
            .ok_or_else(|| IlandError::NotFound(format!("storage profile with UUID {}", profile_uuid)))
    }

    /// Edge gateways across every org
    pub async fn edges(&self) -> Result<Vec<Edge>, IlandError> {
        let orgs = self.orgs().await?;
        self.fetch_across(&orgs, |o| format!("/org/{}/edges", o.uuid))
            .await
    }

    pub async fn edge(&self, edge_uuid: &str) -> Result<Edge, IlandError> {
        self.fetch_one(&format!("/edge/{}", edge_uuid)).await
    }

    /// VDC networks across every org
    pub async fn vdc_networks(&self) -> Result<Vec<VdcNetwork>, IlandError> {
        let orgs = self.orgs().await?;
        self.fetch_across(&orgs, |o| format!("/org/{}/vdc-networks", o.uuid))
            .await
    }

    pub async fn vdc_network(&self, network_uuid: &str) -> Result<VdcNetwork, IlandError> {
        self.vdc_networks()
            .await?
            .into_iter()
            .find(|n| n.uuid == network_uuid)
            .ok_or_else(|| IlandError::NotFound(format!("vdc network with UUID {}", network_uuid)))
    }

    /// vApp templates across every catalog
    pub async fn vapp_templates(&self) -> Result<Vec<VAppTemplate>, IlandError> {
        let catalogs = self.catalogs().await?;
        self.fetch_across(&catalogs, |c| format!("/catalog/{}/vapp-templates", c.uuid))
            .await
    }

    pub async fn vapp_template(&self, template_uuid: &str) -> Result<VAppTemplate, IlandError> {
        self.fetch_one(&format!("/vapp-template/{}", template_uuid))
            .await
    }

    /// vApps across every location
    pub async fn vapps(&self) -> Result<Vec<VApp>, IlandError> {
        let locations = self.locations().await?;
        self.fetch_across(&locations, |l| format!("/location/{}/vapps", l.id))
            .await
    }

    pub async fn vapp(&self, vapp_uuid: &str) -> Result<VApp, IlandError> {
        self.fetch_one(&format!("/vapp/{}", vapp_uuid)).await
    }

    /// Virtual machines across every location
    pub async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>, IlandError> {
        let locations = self.locations().await?;
        self.fetch_across(&locations, |l| format!("/location/{}/vms", l.id))
            .await
    }

    pub async fn virtual_machine(&self, vm_uuid: &str) -> Result<VirtualMachine, IlandError> {
        self.fetch_one(&format!("/vm/{}", vm_uuid)).await
    }

    /// Media across every catalog
    pub async fn medias(&self) -> Result<Vec<Media>, IlandError> {
        let catalogs = self.catalogs().await?;
        self.fetch_across(&catalogs, |c| format!("/catalog/{}/medias", c.uuid))
            .await
    }

    pub async fn media(&self, media_uuid: &str) -> Result<Media, IlandError> {
        self.fetch_one(&format!("/media/{}", media_uuid)).await
    }

    pub async fn task(&self, location_id: &str, task_uuid: &str) -> Result<Task, IlandError> {
        self.fetch_one(&format!("/task/{}/{}", location_id, task_uuid))
            .await
    }

    /// The authenticated user's profile
    pub async fn user(&self) -> Result<User, IlandError> {
        self.fetch_one(&format!("/user/{}", self.session.username()))
            .await
    }

    pub async fn company(&self, company_id: &str) -> Result<Company, IlandError> {
        self.fetch_one(&format!("/companies/{}", company_id)).await
    }
}

/// Decode a body that must hold exactly one JSON object.
///
/// Derived record deserializers also accept a positional array, so the
/// shape is checked before decoding.
fn decode_record<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, IlandError> {
    from_object(path, parse_body(path, body)?)
}

/// Decode a body that must hold a JSON array of objects, in source order.
fn decode_records<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<Vec<T>, IlandError> {
    match parse_body(path, body)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| from_object(path, item))
            .collect(),
        other => Err(parse_failure(
            path,
            format!("expected a JSON array, found {}", json_kind(&other)),
        )),
    }
}

fn parse_body(path: &str, body: &[u8]) -> Result<Value, IlandError> {
    let mut value: Value = serde_json::from_slice(body).map_err(|e| parse_failure(path, e))?;
    drop_nulls(&mut value);
    Ok(value)
}

fn from_object<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, IlandError> {
    if !value.is_object() {
        return Err(parse_failure(
            path,
            format!("expected a JSON object, found {}", json_kind(&value)),
        ));
    }
    serde_json::from_value(value).map_err(|e| parse_failure(path, e))
}

/// Remove `null` members so they decode as the field default, the same as
/// an absent key.
fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, member| !member.is_null());
            members.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_failure(path: &str, detail: impl std::fmt::Display) -> IlandError {
    tracing::error!("Failed to parse response from {}: {}", path, detail);
    IlandError::Api(ApiError::Parse(format!(
        "Failed to parse response from {}: {}",
        path, detail
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> IlandClient {
        IlandClient::new(
            Credentials::new("id", "secret", "alice", "pw"),
            ClientConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_reports_path() {
        let err =
            decode_records::<Org>("/location/dal02/orgs", b"{\"not\":\"a list\"}").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Parse error"));
        assert!(message.contains("/location/dal02/orgs"));
    }

    #[test]
    fn test_record_decode_rejects_array() {
        let err = decode_record::<Edge>("/edge/edge-1", br#"["not","an","edge"]"#).unwrap_err();
        assert!(matches!(err, IlandError::Api(ApiError::Parse(_))));
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_collection_decode_rejects_positional_items() {
        let err = decode_records::<Org>("/location/dal02/orgs", br#"[["org-1","Org"]]"#)
            .unwrap_err();
        assert!(matches!(err, IlandError::Api(ApiError::Parse(_))));
    }

    #[test]
    fn test_null_members_decode_as_defaults() {
        let task: Task = decode_record(
            "/task/dal02/t-1",
            br#"{"uuid":"t-1","status":"running","message":null,"end_time":null,"active":null}"#,
        )
        .unwrap();
        assert_eq!(task.uuid, "t-1");
        assert_eq!(task.message, "");
        assert_eq!(task.end_time, 0);
        assert!(!task.active);

        let orgs: Vec<Org> = decode_records(
            "/location/dal02/orgs",
            br#"[{"uuid":"org-1","name":null},{"uuid":null,"name":"Second"}]"#,
        )
        .unwrap();
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0].name, "");
        assert_eq!(orgs[1].uuid, "");
        assert_eq!(orgs[1].name, "Second");
    }

    #[test]
    fn test_attach_links_record_to_session() {
        let client = client();
        let org: Org = serde_json::from_str(r#"{"uuid":"org-1","name":"Org"}"#).unwrap();
        assert!(!org.link.is_attached());

        let org = client.attach(org);
        assert!(org.link.is_attached());
    }

    #[test]
    fn test_clones_share_session() {
        let a = client();
        let b = a.clone();
        assert!(std::ptr::eq(a.session(), b.session()));
    }

    #[tokio::test]
    async fn test_poll_timeout_elapses() {
        let client = IlandClient::new(
            Credentials::new("id", "secret", "alice", "pw"),
            ClientConfig::default().with_poll_timeout(std::time::Duration::from_millis(20)),
        )
        .unwrap();

        let result: Result<(), IlandError> = client
            .with_poll_timeout(async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(IlandError::Timeout(_))));
    }
}
