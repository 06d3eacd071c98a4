/// HTTP admin client tests
///
/// Runs the reqwest-backed client against a local axum stand-in for the
/// admin REST API.
/// Run with: cargo test --test http_admin_client_tests

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use realmconsole::{
    AdminClient, AlertLog, Alerts, AssumeYes, ConsoleConfig, ConsoleError, DeleteGroups,
    DialogState, GroupRepresentation, HttpAdminClient, KeyStoreFormat, KeyTypes, KeyUpload,
    Selection,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<String>>>,
    authorization: Arc<Mutex<Vec<String>>>,
    upload_body: Arc<Mutex<Option<String>>>,
}

impl Recorded {
    fn note(&self, line: String, headers: &HeaderMap) {
        self.requests.lock().unwrap().push(line);
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.authorization.lock().unwrap().push(auth.to_string());
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn list_groups(
    State(recorded): State<Recorded>,
    Path(realm): Path<String>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    recorded.note(format!("GET {}/groups", realm), &headers);
    Json(json!([
        {"id": "g-1", "name": "ops", "path": "/ops"},
        {
            "id": "g-2",
            "name": "dev",
            "path": "/dev",
            "subGroups": [{"id": "g-3", "name": "web", "path": "/dev/web"}]
        },
        {"id": "g-locked", "name": "admins", "path": "/admins"}
    ]))
}

async fn delete_group(
    State(recorded): State<Recorded>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    recorded.note(format!("DELETE {}/groups/{}", realm, id), &headers);
    match id.as_str() {
        "g-locked" => {
            (StatusCode::FORBIDDEN, Json(json!({"error": "HTTP 403 Forbidden"}))).into_response()
        }
        "g-gone" => (
            StatusCode::NOT_FOUND,
            Json(json!({"errorMessage": "Could not find group by id"})),
        )
            .into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn upload_key(
    State(recorded): State<Recorded>,
    Path((realm, client_id, attr)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<serde_json::Value> {
    recorded.note(
        format!("POST {}/clients/{}/certificates/{}/upload", realm, client_id, attr),
        &headers,
    );
    *recorded.upload_body.lock().unwrap() = Some(String::from_utf8_lossy(&body).into_owned());
    Json(json!({"certificate": "MIIC", "kid": "k-1"}))
}

async fn serve() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/admin/realms/:realm/groups", get(list_groups))
        .route("/admin/realms/:realm/groups/:id", delete(delete_group))
        .route(
            "/admin/realms/:realm/clients/:client_id/certificates/:attr/upload",
            post(upload_key),
        )
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn client(url: &str) -> HttpAdminClient {
    let config = ConsoleConfig::new(url, "acme")
        .access_token("t0ken")
        .request_timeout(Duration::from_secs(5));
    HttpAdminClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_list_groups_decodes_representations() {
    let (url, recorded) = serve().await;

    let groups = client(&url).list_groups().await.unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[1].sub_groups[0].path.as_deref(), Some("/dev/web"));
    assert_eq!(recorded.requests(), vec!["GET acme/groups"]);
    assert_eq!(recorded.authorization.lock().unwrap().clone(), vec!["Bearer t0ken"]);
}

#[tokio::test]
async fn test_delete_errors_carry_server_message() {
    let (url, _recorded) = serve().await;
    let client = client(&url);

    assert!(client.delete_group("g-1").await.is_ok());

    let forbidden = client.delete_group("g-locked").await.unwrap_err();
    assert_eq!(forbidden, ConsoleError::api(403, "HTTP 403 Forbidden"));

    let missing = client.delete_group("g-gone").await.unwrap_err();
    assert_eq!(missing, ConsoleError::api(404, "Could not find group by id"));
}

#[tokio::test]
async fn test_upload_sends_multipart_form() {
    let (url, recorded) = serve().await;
    let upload = KeyUpload {
        keystore_format: KeyStoreFormat::Pkcs12,
        key_alias: Some("saml".to_string()),
        key_password: Some("kp".to_string()),
        store_password: Some("sp".to_string()),
        file_name: "keystore.p12".to_string(),
        file: b"not-really-pkcs12".to_vec(),
    };

    let cert = client(&url)
        .upload_key("c-1", KeyTypes::SamlEncryption, upload)
        .await
        .unwrap();

    assert_eq!(cert.kid.as_deref(), Some("k-1"));
    assert_eq!(
        recorded.requests(),
        vec!["POST acme/clients/c-1/certificates/saml.encryption/upload"]
    );
    let body = recorded.upload_body.lock().unwrap().clone().unwrap();
    assert!(body.contains("name=\"keystoreFormat\""));
    assert!(body.contains("PKCS12"));
    assert!(body.contains("name=\"storePassword\""));
    assert!(body.contains("filename=\"keystore.p12\""));
    assert!(body.contains("not-really-pkcs12"));
}

#[tokio::test]
async fn test_batch_over_http_stops_at_forbidden_group() {
    let (url, recorded) = serve().await;
    let client = client(&url);
    let log = Arc::new(AlertLog::new());
    let alerts = Alerts::with_sink(log.clone());

    let selection: Selection<GroupRepresentation> = ["g-1", "g-locked", "g-2"]
        .iter()
        .map(|id| GroupRepresentation::new(*id, *id))
        .collect();
    let mut state = DialogState::opened();
    let result = DeleteGroups::new(&client, &alerts, selection)
        .run(&AssumeYes, &mut state, || async {})
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.succeeded(), 1);
    assert_eq!(
        recorded.requests(),
        vec!["DELETE acme/groups/g-1", "DELETE acme/groups/g-locked"]
    );
    assert_eq!(log.last().unwrap().message, "Error deleting group HTTP 403 Forbidden");
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).list_groups().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Transport(_)));
}
