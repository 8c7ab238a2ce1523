//! End-to-end provider tests against a mock IPM server

use ipm::IpmProvider;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use tfplug::context::Context;
use tfplug::data_source::ReadDataSourceRequest;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::resource::{
    CreateResourceRequest, ImportResourceStateRequest, ReadResourceRequest, UpdateResourceRequest,
};
use tfplug::types::{AttributePath, Dynamic, DynamicValue, PrivateStateData};

const TOKEN_PATH: &str = "/realms/xr-cm/protocol/openid-connect/token";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn value(json: serde_json::Value) -> DynamicValue {
    DynamicValue::new(serde_json::from_value::<Dynamic>(json).unwrap())
}

async fn token_mock(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", TOKEN_PATH)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"test-token"}"#)
        .create_async()
        .await
}

async fn configured_provider(server: &ServerGuard) -> IpmProvider {
    let mut provider = IpmProvider::new();
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: value(json!({
                    "host": server.url(),
                    "username": "admin",
                    "password": "secret",
                    "insecure": true
                })),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    provider
}

fn edfa_plan() -> DynamicValue {
    value(json!({
        "identifier": {
            "device_id": "dev1",
            "grand_parent_col_id": null,
            "parent_col_id": "3",
            "col_id": "7",
            "aid": null,
            "id": null,
            "href": null
        },
        "id": null,
        "parent_id": null,
        "href": null,
        "col_id": null,
        "config": {"name": null, "gain_mode": "manual", "target_gain": 12.5, "enabled": null},
        "state": null
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn nested_create_puts_to_positional_path_and_reads_back() {
    init_tracing();
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;

    let put = server
        .mock("PUT", "/api/v1/ndus/dev1/ports/3/edfa/7")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(json!({"gainMode": "manual", "targetGain": 12.5})))
        .with_status(202)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/v1/ndus/dev1/ports/3/edfa/7")
        .match_query(Matcher::UrlEncoded("content".into(), "expanded".into()))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "edfa-7",
                "parentId": "port-3",
                "href": "/ndus/dev1/ports/3/edfa/7",
                "colid": 7,
                "config": {"gainMode": "manual", "targetGain": 12.0, "enabled": true},
                "state": {"edfaAid": "1-3-E7", "actualGain": 11.8}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_ndu_edfa").await.unwrap();
    let response = resource
        .create(
            Context::for_operation("create", "ipm_ndu_edfa"),
            CreateResourceRequest {
                planned_state: edfa_plan(),
                config: edfa_plan(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    put.assert_async().await;
    get.assert_async().await;

    let state = response.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "edfa-7");
    assert_eq!(state.get_number(&AttributePath::new("col_id")).unwrap(), 7.0);
    let config = AttributePath::new("config");
    // forced on create, so the device values are adopted
    assert_eq!(
        state.get_number(&config.clone().attribute("target_gain")).unwrap(),
        12.0
    );
    assert!(state.get_bool(&config.attribute("enabled")).unwrap());
    assert_eq!(
        state
            .get_string(&AttributePath::new("state").attribute("edfa_aid"))
            .unwrap(),
        "1-3-E7"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_create_is_reported_and_clears_the_address() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _put = server
        .mock("PUT", "/api/v1/ndus/dev1/ports/3/edfa/7")
        .with_status(409)
        .with_body("slot occupied")
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_ndu_edfa").await.unwrap();
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                planned_state: edfa_plan(),
                config: edfa_plan(),
            },
        )
        .await;

    assert!(response.diagnostics.has_errors());
    assert!(response.diagnostics[0].detail.contains("status: 409"));
    assert!(matches!(
        response.new_state.get(&AttributePath::new("href")).unwrap(),
        Dynamic::Null
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn import_then_read_populates_everything() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let get = server
        .mock("GET", "/api/v1/ndus/n1")
        .match_query(Matcher::UrlEncoded("content".into(), "expanded".into()))
        .with_body(
            json!([{
                "id": "n1",
                "href": "/ndus/n1",
                "config": {"name": "ndu-1", "location": "lab"},
                "state": {"serialNumber": "SN-1", "portCount": 4}
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_ndu").await.unwrap();
    let importable = resource.as_importable().unwrap();

    let imported = importable
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                id: "/ndus/n1".to_string(),
            },
        )
        .await;
    assert!(imported.diagnostics.is_empty());
    let imported = imported.imported_resources.into_iter().next().unwrap();

    let response = resource
        .read(
            Context::for_operation("read", "ipm_ndu"),
            ReadResourceRequest {
                current_state: imported.state,
                private: imported.private,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    get.assert_async().await;
    // the import marker is consumed
    assert!(response.private.is_empty());

    let state = response.new_state.unwrap();
    assert_eq!(
        state
            .get_string(&AttributePath::new("config").attribute("location"))
            .unwrap(),
        "lab"
    );
    assert_eq!(
        state
            .get_number(&AttributePath::new("state").attribute("port_count"))
            .unwrap(),
        4.0
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn aid_lookup_keeps_reserved_characters_in_the_filter() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let get = server
        .mock("GET", "/api/v1/ndus/dev1/ports")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("content".into(), "expanded".into()),
            Matcher::UrlEncoded("q".into(), r#"{"state.portAid":"1-3&x+y"}"#.into()),
        ]))
        .with_body(
            json!([{"href": "/ndus/dev1/ports/3", "colid": 3, "state": {"portAid": "1-3&x+y"}}])
                .to_string(),
        )
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_ndu_port").await.unwrap();
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                current_state: value(json!({
                    "identifier": {"device_id": "dev1", "aid": "1-3&x+y"}
                })),
                private: PrivateStateData::new(),
            },
        )
        .await;

    get.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state.unwrap();
    assert_eq!(
        state.get_string(&AttributePath::new("href")).unwrap(),
        "/ndus/dev1/ports/3"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn read_by_id_that_matches_nothing_drops_the_resource() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let get = server
        .mock("GET", "/api/v1/ndus")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("content".into(), "expanded".into()),
            Matcher::UrlEncoded("q".into(), r#"{"id":"42"}"#.into()),
        ]))
        .with_body("[]")
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_ndu").await.unwrap();
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                current_state: value(json!({"id": "42", "href": null, "identifier": null})),
                private: PrivateStateData::new(),
            },
        )
        .await;

    get.assert_async().await;
    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_shows_drift_but_leaves_unset_config() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let href = "/modules/m1/linePtps/1/carriers/1";
    let put = server
        .mock("PUT", "/api/v1/modules/m1/linePtps/1/carriers/1")
        .match_body(Matcher::Json(json!({"frequency": 193_100_000, "modulation": "16QAM"})))
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/v1/modules/m1/linePtps/1/carriers/1")
        .match_query(Matcher::Any)
        .with_body(
            json!({
                "href": href,
                "config": {"frequency": 193_150_000, "modulation": "8QAM", "name": "c1"},
                "state": {"frequency": 193_150_000, "carrierAid": "1-1-L1-1"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let planned = value(json!({
        "identifier": {"device_id": "m1", "parent_col_id": "1", "col_id": "1"},
        "id": "c-1",
        "href": href,
        "config": {"frequency": 193_100_000, "modulation": "16QAM", "name": null}
    }));

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_module_carrier").await.unwrap();
    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                prior_state: DynamicValue::null(),
                planned_state: planned.clone(),
                config: planned,
                private: PrivateStateData::new(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    put.assert_async().await;
    get.assert_async().await;

    let state = response.new_state;
    let config = AttributePath::new("config");
    assert_eq!(
        state.get_number(&config.clone().attribute("frequency")).unwrap(),
        193_150_000.0
    );
    assert_eq!(
        state.get_string(&config.clone().attribute("modulation")).unwrap(),
        "8QAM"
    );
    assert!(matches!(
        state.get(&config.attribute("name")).unwrap(),
        Dynamic::Null
    ));
    assert_eq!(
        state
            .get_number(&AttributePath::new("state").attribute("frequency"))
            .unwrap(),
        193_150_000.0
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn action_posts_to_table_path() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let post = server
        .mock("POST", "/api/v1/ndus/d1/ports/2/retry")
        .with_status(202)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = provider.create_resource("ipm_action").await.unwrap();
    let plan = value(json!({
        "resource_type": "NDU Port",
        "action": "retry",
        "body": null,
        "identifier": {"device_id": "d1", "parent_col_id": "2"},
        "id": null,
        "result": null
    }));
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                planned_state: plan.clone(),
                config: plan,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    post.assert_async().await;
    assert_eq!(
        response.new_state.get_string(&AttributePath::new("id")).unwrap(),
        "/ndus/d1/ports/2/retry"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn events_are_filtered_by_severity() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let get = server
        .mock("GET", "/api/v1/events")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("content".into(), "expanded".into()),
            Matcher::UrlEncoded("q".into(), r#"{"state.severity":"critical"}"#.into()),
        ]))
        .with_body(
            json!([
                {"id": "ev1", "state": {"severity": "critical", "description": "LOS"}}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let data_source = provider.create_data_source("ipm_events").await.unwrap();
    let response = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                config: value(json!({"severity": "critical", "events": null})),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    get.assert_async().await;
    let events = response
        .state
        .get_list(&AttributePath::new("events"))
        .unwrap();
    assert_eq!(events.len(), 1);
}
