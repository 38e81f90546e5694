#![allow(clippy::unwrap_used)]
// Integration tests for `YaleClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yalehub_api::{Endpoints, Error, HomeContext, YaleClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, YaleClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = YaleClient::with_client(reqwest::Client::new(), Endpoints::single(&base).unwrap());
    (server, client)
}

fn bind_home(client: &YaleClient) {
    client.set_access_token(SecretString::from("tok-123".to_string()));
    client.set_home(HomeContext {
        account_id: 77,
        home_id: 5,
        entry_code: SecretString::from("1234".to_string()),
    });
}

fn door_lock(endpoint_id: i64, slot: i64) -> serde_json::Value {
    json!({
        "accessControlSlotID": slot,
        "accessControlUserID": 3,
        "endpointID": endpoint_id,
        "slotID": 1,
        "enabled": true,
        "synchronized": true
    })
}

fn endpoint(endpoint_id: i64, status: &str, low_battery: bool) -> serde_json::Value {
    json!({
        "endpointID": endpoint_id,
        "deviceID": endpoint_id + 1000,
        "description": format!("Door {endpoint_id}"),
        "statusName": status,
        "statusID": 1,
        "doorlockTypeName": "Conexis L1",
        "lowBattery": low_battery,
        "isOnline": true,
        "enabled": true
    })
}

async fn mount_access_control(server: &MockServer, door_locks: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/apinet/Account/GetAdminAccessControlUserForStore"))
        .and(query_param("AccountID", "77"))
        .and(header("access-token", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AccessControlUserID": 3,
            "UserID": 9,
            "DisplayName": "Owner",
            "EntryCode": "1234",
            "HomeIDs": [5, 6],
            "DoorLocks": door_locks
        })))
        .mount(server)
        .await;
}

async fn mount_updated_objects(server: &MockServer, endpoints: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/apinet/App/GetUpdatedObjects"))
        .and(query_param("homeId", "5"))
        .and(query_param("endpointSR", "0"))
        .and(query_param("notificationSR", "0"))
        .and(header("access-token", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseStatus": null,
            "endpoints": endpoints,
            "entryCode": "1234"
        })))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_stores_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/HomeCloudServiceAdmin.svc/Login"))
        .and(body_partial_json(json!({ "eMail": "me@example.com", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LoginResult": {
                "AccessToken": { "Token": "tok-123" },
                "LoginType": 1,
                "ResponseStatus": { "Messages": [], "Status": 0 }
            }
        })))
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2".to_string());
    let token = client.login("me@example.com", &password).await.unwrap();

    assert_eq!(token.expose_secret(), "tok-123");
    assert_eq!(client.access_token().unwrap().expose_secret(), "tok-123");
}

#[tokio::test]
async fn test_login_nonzero_status_is_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/HomeCloudServiceAdmin.svc/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LoginResult": {
                "AccessToken": null,
                "LoginType": 0,
                "ResponseStatus": { "Messages": ["Invalid credentials"], "Status": 4 }
            }
        })))
        .mount(&server)
        .await;

    let password = SecretString::from("wrong".to_string());
    let result = client.login("me@example.com", &password).await;

    match result {
        Err(Error::Authentication { status, ref message }) => {
            assert_eq!(status, 4);
            assert!(message.contains("Invalid credentials"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(client.access_token().is_none());
}

#[tokio::test]
async fn test_get_account_id_sends_token() {
    let (server, client) = setup().await;
    client.set_access_token(SecretString::from("tok-123".to_string()));

    Mock::given(method("POST"))
        .and(path("/services/HomeCloudService.svc/GetAccountIDFromEmail"))
        .and(body_partial_json(json!({
            "token": { "Token": "tok-123" },
            "email": "me@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "GetAccountIDFromEmailResult": {
                "AccountID": 77,
                "ResponseStatus": { "Messages": [], "Status": 0 }
            }
        })))
        .mount(&server)
        .await;

    assert_eq!(client.get_account_id("me@example.com").await.unwrap(), 77);
}

// ── Access control & sync tests ─────────────────────────────────────

#[tokio::test]
async fn test_access_control_groups_by_endpoint() {
    let (server, client) = setup().await;
    bind_home(&client);
    mount_access_control(&server, vec![door_lock(1, 10), door_lock(1, 11), door_lock(2, 20)])
        .await;

    let access = client
        .get_admin_access_control_user_for_store(77)
        .await
        .unwrap();

    assert_eq!(access.home_ids, vec![5, 6]);
    assert_eq!(access.entry_code.unwrap().expose_secret(), "1234");
    assert_eq!(access.locks_by_endpoint_id.len(), 2);
    assert_eq!(access.locks_by_endpoint_id[&1].len(), 2);
    assert_eq!(access.locks_by_endpoint_id[&1][0].access_control_slot_id, 10);
}

#[tokio::test]
async fn test_apinet_requires_login() {
    let (_server, client) = setup().await;

    let result = client.get_updated_objects(5).await;

    assert!(matches!(result, Err(Error::NotAuthenticated)), "got: {result:?}");
}

// ── Lock merge tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_locks_inner_join() {
    let (server, client) = setup().await;
    bind_home(&client);
    mount_access_control(&server, vec![door_lock(1, 10), door_lock(2, 20)]).await;
    mount_updated_objects(
        &server,
        vec![endpoint(2, "Close", true), endpoint(3, "Open", false)],
    )
    .await;

    let locks = client.get_locks().await.unwrap();

    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].endpoint_id, 2);
    assert_eq!(locks[0].device_id, 1002);
    assert_eq!(locks[0].status_name, "Close");
    assert!(locks[0].low_battery);
    assert_eq!(locks[0].access_control_slot_id, 20);
}

#[tokio::test]
async fn test_details_not_found() {
    let (server, client) = setup().await;
    bind_home(&client);
    mount_access_control(&server, vec![door_lock(1, 10)]).await;
    mount_updated_objects(&server, vec![endpoint(1, "Open", false)]).await;

    assert!(client.details(1).await.unwrap().is_some());
    assert!(client.details(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_locks_without_home_fails() {
    let (_server, client) = setup().await;
    client.set_access_token(SecretString::from("tok-123".to_string()));

    let result = client.get_locks().await;

    assert!(matches!(result, Err(Error::HomeNotConfigured)), "got: {result:?}");
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_lock_sends_entry_code() {
    let (server, client) = setup().await;
    bind_home(&client);

    Mock::given(method("POST"))
        .and(path("/services/HomeCloudCommandService.svc/DoorlockLockUnlock"))
        .and(body_partial_json(json!({
            "token": { "Token": "tok-123" },
            "endpointID": 2,
            "isLocked": true,
            "entryCode": "1234"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DoorlockLockUnlockResult": {
                "ResponseStatus": { "Messages": [], "Status": 0 },
                "Result": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.lock(2).await.unwrap();
    assert!(result.result);
}

#[tokio::test]
async fn test_unlock_rejected() {
    let (server, client) = setup().await;
    bind_home(&client);

    Mock::given(method("POST"))
        .and(path("/services/HomeCloudCommandService.svc/DoorlockLockUnlock"))
        .and(body_partial_json(json!({ "isLocked": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DoorlockLockUnlockResult": {
                "ResponseStatus": { "Messages": ["Wrong PIN"], "Status": 2 },
                "Result": false
            }
        })))
        .mount(&server)
        .await;

    let result = client.unlock(2).await;

    match result {
        Err(Error::Rejected { endpoint_id, status, ref message }) => {
            assert_eq!(endpoint_id, 2);
            assert_eq!(status, 2);
            assert!(message.contains("Wrong PIN"));
        }
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;
    bind_home(&client);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.get_updated_objects(5).await.unwrap_err();

    assert!(err.is_transient());
    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;
    client.set_access_token(SecretString::from("tok-123".to_string()));

    Mock::given(method("POST"))
        .and(path("/services/HomeCloudService.svc/GetAccountIDFromEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_account_id("me@example.com").await;

    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "got: {result:?}"
    );
}
