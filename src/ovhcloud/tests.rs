//! Unit tests for the OVHcloud pipeline helpers.

use rstest::rstest;
use serde_json::json;

use super::lifecycle::{check_capacity, settle};
use super::listing::{pool_models, to_model};
use super::resources::find_by_name;
use super::*;
use crate::provider::{InstanceAddress, InstanceStatus};
use crate::test_support::{ScriptedApi, instance_json, sample_config};

fn raw(id: &str, status: &str, name: &str, ips: &[&str]) -> RawInstance {
    serde_json::from_value(instance_json(id, status, name, ips)).expect("fixture parses")
}

fn named(id: &str, name: &str) -> NamedResource {
    NamedResource {
        id: id.to_owned(),
        name: name.to_owned(),
    }
}

fn api_error(status: u16) -> ApiError {
    ApiError::from_response(
        &Method::POST,
        "/cloud/project/svc/instance",
        status,
        String::from("{\"message\":\"boom\"}"),
    )
}

#[rstest]
#[case(VendorStatus::Active, InstanceStatus::Started)]
#[case(VendorStatus::Build, InstanceStatus::Starting)]
#[case(VendorStatus::Error, InstanceStatus::Error)]
#[case(VendorStatus::Deleting, InstanceStatus::Error)]
#[case(VendorStatus::Other(String::from("SUSPENDED")), InstanceStatus::Error)]
fn status_mapping_is_total(#[case] vendor: VendorStatus, #[case] expected: InstanceStatus) {
    assert_eq!(map_status(&vendor, "i-1"), expected);
}

#[test]
fn model_carries_address_and_raw_payload() {
    let instance = raw("i-1", "ACTIVE", "pool-a-1", &["51.0.0.9", "10.0.0.9"]);
    let model = to_model(InstanceSummary::from(&instance), instance.clone(), 8080);
    assert_eq!(model.id, "i-1");
    assert_eq!(model.provider_name, PROVIDER_NAME);
    assert_eq!(model.status, InstanceStatus::Started);
    assert_eq!(
        model.address,
        Some(InstanceAddress {
            hostname: String::from("51.0.0.9"),
            port: 8080,
        })
    );
    assert_eq!(model.provider_opts, instance);
}

#[test]
fn model_without_ip_has_no_address() {
    let instance = raw("i-2", "BUILD", "pool-a-2", &[]);
    let model = to_model(InstanceSummary::from(&instance), instance, 8080);
    assert_eq!(model.status, InstanceStatus::Starting);
    assert!(model.address.is_none());
}

#[test]
fn pool_models_drop_deleting_and_foreign_instances() {
    let instances = vec![
        raw("1", "ACTIVE", "pool-a-1", &["51.0.0.1"]),
        raw("2", "DELETING", "pool-a-2", &["51.0.0.2"]),
        raw("3", "ACTIVE", "other-x", &["51.0.0.3"]),
        raw("4", "ERROR", "Pool-a-4", &[]),
        raw("5", "BUILD", "xpool-a", &[]),
        raw("6", "SHUTOFF", "pool-a-6", &[]),
    ];
    let models = pool_models(instances, "pool-a", 443);
    let ids = models.iter().map(|model| model.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["1", "6"]);
    assert_eq!(
        models.iter().map(|model| model.status).collect::<Vec<_>>(),
        vec![InstanceStatus::Started, InstanceStatus::Error]
    );
}

#[rstest]
#[case(None, 40, 10)]
#[case(Some(5), 3, 2)]
#[case(Some(5), 5, 0)]
#[case(Some(0), 0, 0)]
fn capacity_allows_within_limit(
    #[case] max: Option<u32>,
    #[case] current: usize,
    #[case] requested: usize,
) {
    assert!(check_capacity(max, current, requested).is_ok());
}

#[rstest]
#[case(Some(5), 4, 2)]
#[case(Some(0), 0, 1)]
#[case(Some(3), 5, 0)]
fn capacity_rejects_over_limit(
    #[case] max: Option<u32>,
    #[case] current: usize,
    #[case] requested: usize,
) {
    let err = check_capacity(max, current, requested).expect_err("over the cap");
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert!(matches!(
        err,
        OvhCloudError::CapacityExceeded { current: c, requested: r, .. } if c == current && r == requested
    ));
}

#[test]
fn find_by_name_takes_first_exact_match() {
    let items = vec![
        named("f-0", "b2-7-flex"),
        named("f-1", "b2-7"),
        named("f-2", "b2-7"),
    ];
    assert_eq!(find_by_name(&items, "b2-7"), Some("f-1"));
    assert_eq!(find_by_name(&items, "B2-7"), None);
}

#[test]
fn settle_reports_completed_and_failed_slots() {
    let outcomes = vec![
        (Some(String::from("a")), Ok(Some(String::from("a")))),
        (Some(String::from("b")), Err(api_error(500))),
        (Some(String::from("c")), Ok(Some(String::from("c")))),
    ];
    let err = settle(BatchOperation::Delete, outcomes).expect_err("one slot failed");
    let report = err.batch().expect("batch report");
    assert_eq!(report.operation, BatchOperation::Delete);
    assert_eq!(report.attempted, 3);
    assert_eq!(
        report.completed,
        vec![Some(String::from("a")), Some(String::from("c"))]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.failures.first().map(|failure| (failure.slot, failure.instance_id.as_deref())),
        Some((1, Some("b")))
    );
}

#[test]
fn settle_succeeds_when_every_slot_succeeds() {
    let outcomes = vec![(None, Ok(Some(String::from("x")))), (None, Ok(None))];
    assert!(settle(BatchOperation::Create, outcomes).is_ok());
}

#[test]
fn create_params_carry_pool_name_and_resolved_ids() {
    let provider =
        OvhCloudProvider::with_api(sample_config("pool-a"), ScriptedApi::new()).expect("provider");
    let resources = ResolvedResources {
        flavor_id: String::from("f-1"),
        snapshot_id: String::from("s-1"),
        ssh_key_id: String::from("k-1"),
    };
    assert_eq!(
        Value::Object(provider.create_params(&resources)),
        json!({
            "serviceName": "svc",
            "region": "GRA7",
            "flavorId": "f-1",
            "imageId": "s-1",
            "name": "pool-a",
            "sshKeyId": "k-1"
        })
    );
}

#[test]
fn with_api_rejects_missing_port() {
    let config = OvhConfig {
        instance_port: None,
        ..sample_config("pool-a")
    };
    let Err(err) = OvhCloudProvider::with_api(config, ScriptedApi::new()) else {
        panic!("construction should fail without a port");
    };
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
