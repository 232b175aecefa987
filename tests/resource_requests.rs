//! Resource request tests
//!
//! Verifies path and verb mapping, response normalization, error decoding,
//! aggregate fetches and the readiness check that precedes mutations.

use iland_sdk::{
    ApiError, ClientConfig, Credentials, IlandClient, IlandError, NatRule, PerfInterval,
    PerfMetric, DEFAULT_MEDIA_TYPE,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_api_base_url(format!("{}/ecs", server.uri()))
        .with_token_url(format!("{}/token", server.uri()))
        .with_readiness_poll_interval(Duration::from_millis(10))
        .with_task_poll_interval(Duration::from_millis(10))
        .with_poll_timeout(Duration::from_secs(5))
}

async fn setup_with(config: impl FnOnce(ClientConfig) -> ClientConfig) -> (MockServer, IlandClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "expires_in": 3600,
            "refresh_token": "r-1"
        })))
        .mount(&server)
        .await;

    let client = IlandClient::new(
        Credentials::new("client-id", "client-secret", "alice", "pw"),
        config(config_for(&server)),
    )
    .unwrap();

    (server, client)
}

async fn setup() -> (MockServer, IlandClient) {
    setup_with(|c| c).await
}

/// 200 response carrying the anti-hijacking prefix
fn prefixed(value: Value) -> ResponseTemplate {
    let mut body = String::from(")]}'");
    body.push_str(&value.to_string());
    ResponseTemplate::new(200).set_body_string(body)
}

fn task_json(uuid: &str) -> Value {
    json!({
        "uuid": uuid,
        "location_id": "dal02",
        "status": "queued",
        "active": true,
        "synchronized": false
    })
}

async fn mount_get(server: &MockServer, api_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/ecs{}", api_path)))
        .respond_with(prefixed(body))
        .mount(server)
        .await;
}

async fn mount_ready(server: &MockServer, entity_uuid: &str) {
    mount_get(
        server,
        &format!("/task/dal02/entity/{}/active", entity_uuid),
        json!([]),
    )
    .await;
}

async fn mount_two_locations(server: &MockServer) {
    mount_get(
        server,
        "/user/alice/inventory",
        json!([{"location_id": "dal02"}, {"location_id": "lon02"}]),
    )
    .await;
}

// ============================================================================
// Normalization and errors
// ============================================================================

#[tokio::test]
async fn test_prefixed_body_decodes_and_headers_are_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ecs/vm/vm-1"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(header("Accept", DEFAULT_MEDIA_TYPE))
        .and(header("Content-Type", DEFAULT_MEDIA_TYPE))
        .respond_with(prefixed(json!({
            "uuid": "vm-1",
            "name": "web-1",
            "cpus_number": 2,
            "location_id": "dal02"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vm = client.virtual_machine("vm-1").await.unwrap();
    assert_eq!(vm.name, "web-1");
    assert_eq!(vm.vcpu, 2);
}

#[tokio::test]
async fn test_error_prefers_detail_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ecs/vm/vm-1"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#")]}'{"error":"not_found","message":"Not found","detail_message":"VM vm-1 does not exist"}"#,
        ))
        .mount(&server)
        .await;

    let err = client.virtual_machine("vm-1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    match err {
        IlandError::Api(ApiError::Http { code, message, .. }) => {
            assert_eq!(code.as_deref(), Some("not_found"));
            assert_eq!(message, "VM vm-1 does not exist");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_without_detail_uses_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ecs/org/org-1"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"error": "forbidden", "message": "No access to org"})),
        )
        .mount(&server)
        .await;

    let err = client.org("org-1").await.unwrap_err();
    assert!(err.to_string().contains("No access to org"));
}

#[tokio::test]
async fn test_undecodable_error_body_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ecs/vdc/vdc-1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client.vdc("vdc-1").await.unwrap_err();
    assert!(matches!(err, IlandError::Api(ApiError::Parse(_))));
}

#[tokio::test]
async fn test_mismatched_success_body_is_parse_error() {
    let (server, client) = setup().await;
    mount_get(&server, "/edge/edge-1", json!(["not", "an", "edge"])).await;

    let err = client.edge("edge-1").await.unwrap_err();
    assert!(matches!(err, IlandError::Api(ApiError::Parse(_))));
}

// ============================================================================
// Aggregates and lookups
// ============================================================================

#[tokio::test]
async fn test_aggregate_concatenates_in_parent_order() {
    let (server, client) = setup().await;
    mount_two_locations(&server).await;

    mount_get(
        &server,
        "/location/dal02/vms",
        json!([{"uuid": "vm-a"}, {"uuid": "vm-shared"}]),
    )
    .await;
    mount_get(
        &server,
        "/location/lon02/vms",
        json!([{"uuid": "vm-b"}, {"uuid": "vm-shared"}, {"uuid": "vm-c"}]),
    )
    .await;

    let vms = client.virtual_machines().await.unwrap();
    let uuids: Vec<&str> = vms.iter().map(|v| v.uuid.as_str()).collect();
    assert_eq!(uuids, vec!["vm-a", "vm-shared", "vm-b", "vm-shared", "vm-c"]);
}

#[tokio::test]
async fn test_nested_aggregate_through_orgs() {
    let (server, client) = setup().await;
    mount_two_locations(&server).await;

    mount_get(&server, "/location/dal02/orgs", json!([{"uuid": "org-1"}])).await;
    mount_get(&server, "/location/lon02/orgs", json!([{"uuid": "org-2"}])).await;
    mount_get(&server, "/org/org-1/edges", json!([{"uuid": "edge-1"}])).await;
    mount_get(
        &server,
        "/org/org-2/edges",
        json!([{"uuid": "edge-2"}, {"uuid": "edge-3"}]),
    )
    .await;

    let edges = client.edges().await.unwrap();
    let uuids: Vec<&str> = edges.iter().map(|e| e.uuid.as_str()).collect();
    assert_eq!(uuids, vec!["edge-1", "edge-2", "edge-3"]);
}

#[tokio::test]
async fn test_aggregate_fails_on_child_error_by_default() {
    let (server, client) = setup().await;
    mount_two_locations(&server).await;

    mount_get(&server, "/location/dal02/vdcs", json!([{"uuid": "vdc-1"}])).await;
    Mock::given(method("GET"))
        .and(path("/ecs/location/lon02/vdcs"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "inventory unavailable"})),
        )
        .mount(&server)
        .await;

    let err = client.vdcs().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_lenient_collections_swallow_child_errors() {
    let (server, client) = setup_with(|c| c.with_lenient_collections(true)).await;
    mount_two_locations(&server).await;

    mount_get(&server, "/location/dal02/vdcs", json!([{"uuid": "vdc-1"}])).await;
    Mock::given(method("GET"))
        .and(path("/ecs/location/lon02/vdcs"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "inventory unavailable"})),
        )
        .mount(&server)
        .await;

    let vdcs = client.vdcs().await.unwrap();
    assert_eq!(vdcs.len(), 1);
    assert_eq!(vdcs[0].uuid, "vdc-1");
}

#[tokio::test]
async fn test_location_lookup() {
    let (server, client) = setup().await;
    mount_two_locations(&server).await;

    let location = client.location("lon02").await.unwrap();
    assert_eq!(location.id, "lon02");

    let missing = client.location("syd01").await;
    assert!(matches!(missing, Err(IlandError::NotFound(_))));
}

#[tokio::test]
async fn test_storage_profile_lookup_across_vdcs() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/user/alice/inventory",
        json!([{"location_id": "dal02"}]),
    )
    .await;
    mount_get(
        &server,
        "/location/dal02/vdcs",
        json!([{"uuid": "vdc-1"}, {"uuid": "vdc-2"}]),
    )
    .await;
    mount_get(
        &server,
        "/vdc/vdc-1/storage-profiles",
        json!([{"uuid": "sp-1", "name": "Standard"}]),
    )
    .await;
    mount_get(
        &server,
        "/vdc/vdc-2/storage-profiles",
        json!([{"uuid": "sp-2", "name": "SSD", "storage_used_in_mb": 2048}]),
    )
    .await;

    let profile = client.storage_profile("sp-2").await.unwrap();
    assert_eq!(profile.name, "SSD");
    assert_eq!(profile.storage_used_mb, 2048);
}

#[tokio::test]
async fn test_default_storage_profile() {
    let (server, client) = setup().await;
    mount_get(&server, "/org/org-1", json!({"uuid": "org-1"})).await;
    mount_get(
        &server,
        "/org/org-1/vdcs",
        json!([{"uuid": "vdc-1"}, {"uuid": "vdc-2"}]),
    )
    .await;
    mount_get(
        &server,
        "/vdc/vdc-1/storage-profiles",
        json!([{"uuid": "sp-1", "default": false}]),
    )
    .await;
    mount_get(
        &server,
        "/vdc/vdc-2/storage-profiles",
        json!([{"uuid": "sp-2", "default": true}]),
    )
    .await;

    let org = client.org("org-1").await.unwrap();
    let profile = org.default_storage_profile().await.unwrap();
    assert_eq!(profile.uuid, "sp-2");
}

// ============================================================================
// Pre-flight readiness
// ============================================================================

#[tokio::test]
async fn test_mutation_waits_for_active_tasks_to_clear() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/vm/vm-1",
        json!({"uuid": "vm-1", "location_id": "dal02"}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/ecs/task/dal02/entity/vm-1/active"))
        .respond_with(prefixed(json!([task_json("busy-1")])))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ecs/task/dal02/entity/vm-1/active"))
        .respond_with(prefixed(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ecs/vm/vm-1/poweron"))
        .respond_with(prefixed(task_json("t-1")))
        .expect(1)
        .mount(&server)
        .await;

    let vm = client.virtual_machine("vm-1").await.unwrap();
    let task = vm.power_on().await.unwrap();
    assert_eq!(task.uuid, "t-1");

    let requests = server.received_requests().await.unwrap();
    let api_paths: Vec<String> = requests
        .iter()
        .map(|r| r.url.path().to_string())
        .filter(|p| p.starts_with("/ecs/task") || p.ends_with("/poweron"))
        .collect();
    assert_eq!(
        api_paths,
        vec![
            "/ecs/task/dal02/entity/vm-1/active",
            "/ecs/task/dal02/entity/vm-1/active",
            "/ecs/task/dal02/entity/vm-1/active",
            "/ecs/vm/vm-1/poweron",
        ]
    );
}

#[tokio::test]
async fn test_readiness_wait_honors_poll_timeout() {
    let (server, client) =
        setup_with(|c| c.with_poll_timeout(Duration::from_millis(100))).await;
    mount_get(
        &server,
        "/task/dal02/entity/edge-1/active",
        json!([task_json("busy-1")]),
    )
    .await;

    let result = client.wait_until_entity_ready("dal02", "edge-1").await;
    assert!(matches!(result, Err(IlandError::Timeout(_))));
}

#[tokio::test]
async fn test_record_outliving_client_reports_closed_session() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/vapp/vapp-1",
        json!({"uuid": "vapp-1", "location_id": "dal02"}),
    )
    .await;

    let vapp = client.vapp("vapp-1").await.unwrap();
    drop(client);

    let result = vapp.power_off().await;
    assert!(matches!(result, Err(IlandError::SessionClosed)));
}

// ============================================================================
// Path and verb mapping
// ============================================================================

#[tokio::test]
async fn test_vm_rename_puts_name() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/vm/vm-1",
        json!({"uuid": "vm-1", "location_id": "dal02"}),
    )
    .await;
    mount_ready(&server, "vm-1").await;

    Mock::given(method("PUT"))
        .and(path("/ecs/vm/vm-1/name"))
        .and(body_json(json!({"name": "web-renamed"})))
        .respond_with(prefixed(task_json("t-rename")))
        .expect(1)
        .mount(&server)
        .await;

    let vm = client.virtual_machine("vm-1").await.unwrap();
    let task = vm.rename("web-renamed").await.unwrap();
    assert_eq!(task.uuid, "t-rename");
}

#[tokio::test]
async fn test_vm_modify_cpu_and_memory() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/vm/vm-1",
        json!({"uuid": "vm-1", "location_id": "dal02"}),
    )
    .await;
    mount_ready(&server, "vm-1").await;

    Mock::given(method("PUT"))
        .and(path("/ecs/vm/vm-1/cpu"))
        .and(body_json(json!({"cpus_number": 4, "cores_per_socket": 1})))
        .respond_with(prefixed(task_json("t-cpu")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/ecs/vm/vm-1/mem"))
        .and(body_json(json!({"memory_size": 8192})))
        .respond_with(prefixed(task_json("t-mem")))
        .expect(1)
        .mount(&server)
        .await;

    let vm = client.virtual_machine("vm-1").await.unwrap();
    assert_eq!(vm.modify_cpu(4).await.unwrap().uuid, "t-cpu");
    assert_eq!(vm.modify_memory(8192).await.unwrap().uuid, "t-mem");
}

#[tokio::test]
async fn test_vm_delete_nic_and_remove_disk() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/vm/vm-1",
        json!({"uuid": "vm-1", "location_id": "dal02"}),
    )
    .await;
    mount_ready(&server, "vm-1").await;
    mount_get(
        &server,
        "/vm/vm-1/virtual-disks",
        json!([
            {"name": "Hard disk 1", "size": 10240, "type": "LSI_LOGIC"},
            {"name": "Hard disk 2", "size": 20480, "type": "LSI_LOGIC"}
        ]),
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path("/ecs/vm/vm-1/vnics/1"))
        .respond_with(prefixed(task_json("t-nic")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/ecs/vm/vm-1/virtual-disks"))
        .and(body_json(json!([
            {"name": "Hard disk 1", "size": 10240, "type": "LSI_LOGIC"}
        ])))
        .respond_with(prefixed(task_json("t-disk")))
        .expect(1)
        .mount(&server)
        .await;

    let vm = client.virtual_machine("vm-1").await.unwrap();
    assert_eq!(vm.delete_nic(1).await.unwrap().uuid, "t-nic");
    assert_eq!(vm.remove_disk("Hard disk 2").await.unwrap().uuid, "t-disk");

    let missing = vm.remove_disk("Hard disk 9").await;
    assert!(matches!(missing, Err(IlandError::NotFound(_))));
}

#[tokio::test]
async fn test_vapp_clone_posts_to_target_vdc() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/vapp/vapp-1",
        json!({"uuid": "vapp-1", "location_id": "dal02"}),
    )
    .await;
    mount_ready(&server, "vapp-1").await;

    Mock::given(method("POST"))
        .and(path("/ecs/vapp/vapp-1/copy/vdc-9"))
        .and(body_json(json!({"name": "vapp-copy"})))
        .respond_with(prefixed(task_json("t-clone")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ecs/vapp/vapp-1"))
        .respond_with(prefixed(task_json("t-delete")))
        .expect(1)
        .mount(&server)
        .await;

    let vapp = client.vapp("vapp-1").await.unwrap();
    assert_eq!(vapp.clone_to("vdc-9", "vapp-copy").await.unwrap().uuid, "t-clone");
    assert_eq!(vapp.delete().await.unwrap().uuid, "t-delete");
}

#[tokio::test]
async fn test_edge_add_nat_rule_writes_back_full_config() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/edge/edge-1",
        json!({"uuid": "edge-1", "location_id": "dal02"}),
    )
    .await;
    mount_ready(&server, "edge-1").await;
    mount_get(
        &server,
        "/edge/edge-1/nat",
        json!({"enabled": true, "rules": [{"id": 1, "type": "SNAT"}]}),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/ecs/edge/edge-1/nat"))
        .respond_with(prefixed(task_json("t-nat")))
        .expect(1)
        .mount(&server)
        .await;

    let edge = client.edge("edge-1").await.unwrap();
    let rule = NatRule {
        id: 2,
        rule_type: "DNAT".to_string(),
        original_port: "443".to_string(),
        ..Default::default()
    };
    edge.add_nat_rule(rule).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    let body: Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(body["enabled"], true);
    assert_eq!(body["rules"].as_array().unwrap().len(), 2);
    assert_eq!(body["rules"][1]["type"], "DNAT");
}

#[tokio::test]
async fn test_catalog_rejects_duplicate_template_name() {
    let (server, client) = setup().await;
    mount_get(&server, "/catalog/cat-1", json!({"uuid": "cat-1"})).await;
    mount_get(
        &server,
        "/vapp/vapp-1",
        json!({"uuid": "vapp-1", "name": "golden"}),
    )
    .await;
    mount_get(
        &server,
        "/catalog/cat-1/vapp-templates",
        json!([{"uuid": "tpl-1", "name": "golden"}]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/ecs/catalog/cat-1/add-vapp-template/vapp-1"))
        .respond_with(prefixed(task_json("t-add")))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = client.catalog("cat-1").await.unwrap();

    let duplicate = catalog.add_vapp_template("vapp-1", None).await;
    assert!(matches!(duplicate, Err(IlandError::InvalidInput(_))));

    let task = catalog
        .add_vapp_template("vapp-1", Some("golden-v2"))
        .await
        .unwrap();
    assert_eq!(task.uuid, "t-add");
}

#[tokio::test]
async fn test_vdc_performance_query() {
    let (server, client) = setup().await;
    mount_get(&server, "/vdc/vdc-1", json!({"uuid": "vdc-1"})).await;

    Mock::given(method("GET"))
        .and(path("/ecs/vdc/vdc-1/p"))
        .and(query_param("group", "cpu"))
        .and(query_param("name", "usage"))
        .and(query_param("type", "average"))
        .and(query_param("interval", "hour"))
        .and(query_param("limit", "1000"))
        .respond_with(prefixed(json!({
            "group": "cpu",
            "name": "usage",
            "type": "average",
            "unit": "percent",
            "samples": [{"time": 1500000000000i64, "value": 12}, {"time": 1500003600000i64, "value": 17.5}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vdc = client.vdc("vdc-1").await.unwrap();
    let end = chrono::Utc::now();
    let start = end - chrono::Duration::hours(2);
    let results = vdc
        .performance(start, end, PerfInterval::Hour, PerfMetric::CPU_USAGE_AVG)
        .await
        .unwrap();

    assert_eq!(results.unit, "percent");
    assert_eq!(results.samples.len(), 2);
    assert_eq!(results.samples[1].value, 17.5);
}

#[tokio::test]
async fn test_vdc_previous_bill_query() {
    let (server, client) = setup().await;
    mount_get(&server, "/vdc/vdc-1", json!({"uuid": "vdc-1"})).await;

    Mock::given(method("GET"))
        .and(path("/ecs/vdc/vdc-1/bill"))
        .and(query_param("month", "3"))
        .and(query_param("year", "2024"))
        .respond_with(prefixed(json!({"total": 99.5, "currency_code": "EUR"})))
        .expect(1)
        .mount(&server)
        .await;

    let vdc = client.vdc("vdc-1").await.unwrap();
    let bill = vdc.previous_bill(3, 2024).await.unwrap();
    assert_eq!(bill.total_cost, 99.5);
    assert_eq!(bill.currency_code, "EUR");
}

#[tokio::test]
async fn test_support_ticket_attachment_download() {
    let (server, client) = setup().await;
    mount_get(&server, "/companies/000123", json!({"uuid": "000123"})).await;
    mount_get(
        &server,
        "/companies/000123/support-tickets/42",
        json!({"id": 42, "crm": "000123", "summary": "Disk latency"}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/ecs/companies/000123/support-tickets/42/attachments/7"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG\r\n".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let company = client.company("000123").await.unwrap();
    let ticket = company.support_ticket(42).await.unwrap();
    assert_eq!(ticket.summary, "Disk latency");

    let bytes = ticket.download_attachment(7).await.unwrap();
    assert_eq!(bytes, b"\x89PNG\r\n".to_vec());
}

#[tokio::test]
async fn test_user_roles() {
    let (server, client) = setup().await;
    mount_get(&server, "/user/alice", json!({"name": "alice", "fullname": "Alice A"})).await;
    mount_get(
        &server,
        "/user/alice/roles",
        json!([{"role": "ADMIN", "type": "ORG", "org_uuid": "org-1"}]),
    )
    .await;

    let user = client.user().await.unwrap();
    assert_eq!(user.full_name, "Alice A");

    let roles = user.roles().await.unwrap();
    assert_eq!(roles[0].role_type, "ORG");
}
