//! HTTP contract tests for the Vault client against a mock server.

use mvault::member::STATUS_OFF;
use mvault::{MemberError, VaultClient, VaultConfig, VaultError, VaultOutcome};
use reqwest::StatusCode;
use serde_json::json;
use test_utils::fixtures::{sample_member, vault_member_json};
use test_utils::mocks::NO_MEMBERSHIPS;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "station-key";
const SECRET: &str = "station-secret";

fn client_for(server: &MockServer) -> VaultClient {
    let config = VaultConfig::new("KOPB", KEY, SECRET)
        .with_base_endpoint(format!("{}/api", server.uri()));
    VaultClient::new(config).unwrap()
}

#[tokio::test]
async fn test_membership_list_raw_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/KOPB/memberships/"))
        .and(basic_auth(KEY, SECRET))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "objects": [vault_member_json("000001")] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).membership_list().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["objects"][0]["membership_id"], "000001");
}

#[tokio::test]
async fn test_list_members_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/KOPB/memberships/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [vault_member_json("000001"), vault_member_json("000002")]
        })))
        .mount(&server)
        .await;

    let members = client_for(&server)
        .list_members()
        .await
        .unwrap()
        .success()
        .unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(members[1].to_string(), "Mary Member (000002)");
    assert!(members[0].create_date.is_some());
    assert!(members[0].activation_date.is_none());
}

#[tokio::test]
async fn test_empty_station_reports_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/KOPB/memberships/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": NO_MEMBERSHIPS })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let body: serde_json::Value = client.membership_list().await.unwrap().json().await.unwrap();
    assert!(body.get("errors").is_some());
    assert!(body.get("objects").is_none());

    assert_eq!(
        client.list_members().await.unwrap(),
        VaultOutcome::Failure {
            status: StatusCode::NOT_FOUND,
            message: NO_MEMBERSHIPS.to_string()
        }
    );
}

#[tokio::test]
async fn test_get_member() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/KOPB/memberships/000001"))
        .and(basic_auth(KEY, SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(vault_member_json("000001")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let response = client.membership_get("000001").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let member = client.get_member("000001").await.unwrap().success().unwrap();
    assert_eq!(member.membership_id, "000001");
    assert_eq!(member.first_name, "Mary");
    assert_eq!(member.start_date.unwrap().to_rfc3339(), "2024-01-01T08:00:00+00:00");
}

#[tokio::test]
async fn test_membership_update_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/KOPB/memberships/000001"))
        .and(basic_auth(KEY, SECRET))
        .and(header("content-type", "application/json"))
        .and(header("accept", "text/plain"))
        .and(body_json(json!({
            "offer": "123",
            "first_name": "Mary",
            "last_name": "Member",
            "email": "mmember@pbs.org",
            "notes": "",
            "additional_metadata": "",
            "status": STATUS_OFF,
            "provisional": false,
            "start_date": "2024-01-01T08:00:00Z",
            "expire_date": "2024-12-31T08:00:00Z",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .membership_update(&sample_member())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_repeated_upsert_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/KOPB/memberships/000001"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let member = sample_member();

    assert!(client.upsert_member(&member).await.unwrap().is_success());
    assert!(client.upsert_member(&member).await.unwrap().is_success());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_upsert_errors_envelope_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": "Invalid offer" })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).upsert_member(&sample_member()).await.unwrap();
    assert_eq!(
        outcome,
        VaultOutcome::Failure {
            status: StatusCode::OK,
            message: "Invalid offer".to_string()
        }
    );
}

#[tokio::test]
async fn test_update_without_dates_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut member = sample_member();
    member.start_date = None;

    let err = client_for(&server).membership_update(&member).await.unwrap_err();
    assert!(matches!(
        err,
        VaultError::Member(MemberError::MissingField("start_date"))
    ));
}

#[tokio::test]
async fn test_base_endpoint_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/KOPB/memberships/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vault_member_json("42")))
        .expect(1)
        .mount(&server)
        .await;

    let config = VaultConfig::new("KOPB", KEY, SECRET)
        .with_base_endpoint(format!("{}/api/", server.uri()));
    let client = VaultClient::new(config).unwrap();

    assert!(client.get_member("42").await.unwrap().is_success());
}

#[tokio::test]
async fn test_reserved_characters_in_membership_id_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/KOPB/memberships/A%231"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/KOPB/memberships/A%3Fx=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vault_member_json("A?x=1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/KOPB/memberships/A"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut member = sample_member();
    member.membership_id = "A#1".to_string();

    assert!(client.upsert_member(&member).await.unwrap().is_success());
    let fetched = client.get_member("A?x=1").await.unwrap().success().unwrap();
    assert_eq!(fetched.membership_id, "A?x=1");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.query().is_none()));
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let config =
        VaultConfig::new("KOPB", KEY, SECRET).with_base_endpoint("http://127.0.0.1:1/api");
    let client = VaultClient::new(config).unwrap();

    let err = client.membership_list().await.unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = VaultConfig::new("KOPB", KEY, SECRET).with_base_endpoint("mvault");
    assert!(matches!(
        VaultClient::new(config),
        Err(VaultError::InvalidConfig(_))
    ));
}
