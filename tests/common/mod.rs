//! In-process stand-in for the lazyup backend, plus helpers to wire views
//! against it.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use lazyup::api::ApiClient;
use lazyup::config::{ApiConfig, PollingConfig};
use lazyup::notify::{Notification, Notifier};
use lazyup::state::UserState;
use lazyup::storage::{CredentialStore, MemoryStore};
use lazyup::views::ViewContext;

pub const API_KEY: &str = "test-key";
pub const DOMAIN: &str = "https://i.example.gg";

#[derive(Debug, Default)]
pub struct MockState {
    pub api_key: String,
    pub display_name: String,
    pub domain: String,
    pub domains: Vec<String>,
    pub uploads: Vec<Value>,
    pub urls: Vec<Value>,
    /// `METHOD /path?query` of every request received, in order
    pub requests: Vec<String>,
    /// Answer list endpoints with a 500
    pub fail_lists: bool,
    /// Hold list responses back this long
    pub list_delay: Option<Duration>,
    next_id: u64,
}

type Shared = Arc<Mutex<MockState>>;
type Reply = (StatusCode, Json<Value>);

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            api_key: API_KEY.to_string(),
            display_name: "ada".to_string(),
            domain: DOMAIN.to_string(),
            domains: vec![DOMAIN.to_string(), "https://lazy.example.gg".to_string()],
            ..MockState::default()
        }));

        let app = Router::new()
            .route(
                "/api/account",
                get(get_account).post(create_account),
            )
            .route("/api/account/name", put(update_name))
            .route("/api/account/token", put(regenerate_token))
            .route("/api/account/domain", put(set_domain))
            .route("/api/account/delete", put(delete_account))
            .route("/api/domains", get(list_domains).put(add_domain))
            .route("/api/uploads", get(list_uploads))
            .route("/api/upload", post(upload))
            .route("/api/delete-upload/{stem}", delete(delete_upload))
            .route("/api/urls", get(list_urls))
            .route("/api/url", post(create_url))
            .route("/api/url/{slug}", put(rename_url))
            .route("/api/delete-url/{slug}", delete(delete_url))
            .route("/api/config", post(config))
            .route("/api/image/{slug}", get(image))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add_upload(&self, file_name: &str, size: u64) {
        self.with(|s| s.uploads.push(upload_record(file_name, size, &s.api_key.clone())));
    }

    pub fn add_url(&self, slug: &str, target: &str) {
        self.with(|s| s.urls.push(url_record(slug, target, &s.api_key.clone())));
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn upload_record(file_name: &str, size: u64, key: &str) -> Value {
    json!({
        "_id": format!("id-{file_name}"),
        "IP": "127.0.0.1",
        "Key": key,
        "DisplayName": "ada",
        "FileName": file_name,
        "Metadata": {
            "FileType": mime_guess::from_path(file_name).first_or_octet_stream().essence_str(),
            "FileSize": size,
            "UploadDate": "2024-05-01T12:00:00Z",
            "Views": 3,
        },
    })
}

pub fn url_record(slug: &str, target: &str, key: &str) -> Value {
    json!({
        "Key": key,
        "URL": target,
        "CreatedAt": "2024-05-01T12:00:00Z",
        "IP": "127.0.0.1",
        "Slug": slug,
        "Clicks": 7,
    })
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri());
    state.lock().unwrap().requests.push(line);
    next.run(request).await
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn message(status: StatusCode, text: &str) -> Reply {
    reply(status, json!({ "status": status.as_u16(), "message": text }))
}

/// `Some(401 reply)` unless the request carries the current key
fn reject(state: &MockState, headers: &HeaderMap) -> Option<Reply> {
    match headers.get("key").and_then(|v| v.to_str().ok()) {
        Some(key) if !key.is_empty() && key == state.api_key => None,
        _ => Some(message(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

fn stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

async fn get_account(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    reply(
        StatusCode::OK,
        json!({ "Key": s.api_key, "DisplayName": s.display_name, "Domain": s.domain }),
    )
}

async fn create_account(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let name = body["display_name"].as_str().unwrap_or_default().to_string();
    if name.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Display name is required");
    }
    let mut s = state.lock().unwrap();
    s.api_key = "fresh-key".to_string();
    s.display_name = name;
    reply(
        StatusCode::OK,
        json!({ "Key": s.api_key, "DisplayName": s.display_name, "Domain": s.domain }),
    )
}

async fn update_name(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    s.display_name = body["display_name"].as_str().unwrap_or_default().to_string();
    message(StatusCode::OK, "Display name updated")
}

async fn regenerate_token(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    s.api_key = "regenerated-key".to_string();
    reply(StatusCode::OK, json!({ "key": s.api_key }))
}

async fn set_domain(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    match query.get("value") {
        Some(domain) if s.domains.contains(domain) => {
            s.domain = domain.clone();
            message(StatusCode::OK, "Domain updated")
        }
        _ => message(StatusCode::BAD_REQUEST, "Invalid domain"),
    }
}

async fn delete_account(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    s.api_key.clear();
    s.uploads.clear();
    s.urls.clear();
    message(StatusCode::OK, "Account deleted")
}

async fn list_domains(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    reply(StatusCode::OK, json!({ "domains": s.domains }))
}

async fn add_domain(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    match query.get("i") {
        Some(domain) if !domain.is_empty() => {
            s.domains.push(domain.clone());
            message(StatusCode::OK, "Domain added")
        }
        _ => message(StatusCode::BAD_REQUEST, "Missing domain"),
    }
}

async fn list_uploads(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    // Snapshot first so a delayed response can be stale
    let (response, delay) = {
        let s = state.lock().unwrap();
        let response = if let Some(rejected) = reject(&s, &headers) {
            rejected
        } else if s.fail_lists {
            message(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable")
        } else {
            reply(StatusCode::OK, json!({ "uploads": s.uploads }))
        };
        (response, s.list_delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    response
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let rejected = reject(&state.lock().unwrap(), &headers);
    if let Some(rejected) = rejected {
        return rejected.into_response();
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("sharex") {
            continue;
        }
        let original = field.file_name().unwrap_or("upload").to_string();
        let Ok(bytes) = field.bytes().await else {
            return message(StatusCode::BAD_REQUEST, "Unreadable file").into_response();
        };

        let mut s = state.lock().unwrap();
        s.next_id += 1;
        let extension = original.rsplit_once('.').map_or("", |(_, ext)| ext);
        let stored = format!("f{}.{}", s.next_id, extension);
        let key = s.api_key.clone();
        s.uploads
            .push(upload_record(&stored, bytes.len() as u64, &key));
        return reply(
            StatusCode::OK,
            json!({ "message": "File uploaded", "url": format!("{}/i/{}", DOMAIN, stored) }),
        )
        .into_response();
    }

    message(StatusCode::BAD_REQUEST, "No file uploaded").into_response()
}

async fn delete_upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(file_stem): Path<String>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    let before = s.uploads.len();
    s.uploads
        .retain(|u| stem(u["FileName"].as_str().unwrap_or_default()) != file_stem);
    if s.uploads.len() == before {
        return message(StatusCode::NOT_FOUND, "File not found");
    }
    message(StatusCode::OK, "File deleted")
}

async fn list_urls(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    // Snapshot first so a delayed response can be stale
    let (response, delay) = {
        let s = state.lock().unwrap();
        let response = if let Some(rejected) = reject(&s, &headers) {
            rejected
        } else if s.fail_lists {
            message(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable")
        } else {
            reply(StatusCode::OK, json!({ "urls": s.urls }))
        };
        (response, s.list_delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    response
}

async fn create_url(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    let Some(target) = body["url"].as_str().map(str::to_string) else {
        return message(StatusCode::BAD_REQUEST, "Missing URL");
    };
    s.next_id += 1;
    let slug = format!("s{}", s.next_id);
    let key = s.api_key.clone();
    s.urls.push(url_record(&slug, &target, &key));
    reply(
        StatusCode::OK,
        json!({ "url": target, "slug": slug, "fullUrl": format!("{}/u/{}", DOMAIN, slug) }),
    )
}

async fn rename_url(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    let new_slug = body["new_slug"].as_str().unwrap_or_default().to_string();
    if s.urls.iter().any(|u| u["Slug"] == new_slug.as_str()) {
        return message(StatusCode::CONFLICT, "Slug already exists");
    }
    match s.urls.iter_mut().find(|u| u["Slug"] == slug.as_str()) {
        Some(url) => {
            url["Slug"] = json!(new_slug);
            message(StatusCode::OK, "Slug updated")
        }
        None => message(StatusCode::NOT_FOUND, "URL not found"),
    }
}

async fn delete_url(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Reply {
    let mut s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected;
    }
    let before = s.urls.len();
    s.urls.retain(|u| u["Slug"] != slug.as_str());
    if s.urls.len() == before {
        return message(StatusCode::NOT_FOUND, "URL not found");
    }
    message(StatusCode::OK, "URL deleted")
}

async fn config(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let s = state.lock().unwrap();
    if let Some(rejected) = reject(&s, &headers) {
        return rejected.into_response();
    }
    let kind = query.get("type").map(String::as_str).unwrap_or_default();
    let (name, path) = match kind {
        "upload" => ("lazyup uploader", "/api/upload"),
        "url" => ("lazyup shortener", "/api/url"),
        "text" => ("lazyup text", "/api/upload"),
        _ => return message(StatusCode::BAD_REQUEST, "Unknown config type").into_response(),
    };
    let body = json!({
        "Version": "15.0.0",
        "Name": name,
        "DestinationType": "ImageUploader",
        "RequestMethod": "POST",
        "RequestURL": format!("{}{}", DOMAIN, path),
        "Headers": { "key": s.api_key },
        "Body": "MultipartFormData",
        "FileFormName": "sharex",
        "URL": "{json:url}",
    });
    // Compact on purpose: the client is expected to pretty-print it
    (StatusCode::OK, body.to_string()).into_response()
}

async fn image(State(state): State<Shared>, Path(slug): Path<String>) -> Reply {
    let s = state.lock().unwrap();
    match s
        .uploads
        .iter()
        .find(|u| stem(u["FileName"].as_str().unwrap_or_default()) == slug)
    {
        Some(upload) => reply(StatusCode::OK, upload.clone()),
        None => reply(StatusCode::OK, json!({})),
    }
}

/// Keeps every notification for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.message).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(Notification::is_error)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        clear_credentials_on_unauthorized: true,
    }
}

pub struct Harness {
    pub backend: MockBackend,
    pub ctx: ViewContext,
    pub notes: Arc<RecordingNotifier>,
}

impl Harness {
    /// Backend plus views, signed in with the backend's key when `signed_in`
    pub async fn new(signed_in: bool) -> Self {
        let backend = MockBackend::start().await;
        let credentials = Arc::new(CredentialStore::load(Arc::new(MemoryStore::new())).unwrap());
        if signed_in {
            credentials.set_token(API_KEY).unwrap();
            credentials.set_display_name("ada").unwrap();
            credentials.set_domain(DOMAIN).unwrap();
        }

        let state = UserState::new(Arc::clone(&credentials));
        let client = ApiClient::new(&api_config(&backend.url()), credentials).unwrap();
        let notes = Arc::new(RecordingNotifier::default());
        let polling = PollingConfig {
            interval_secs: 1,
            backoff: false,
            max_backoff_secs: 1,
        };
        let ctx = ViewContext::new(client, state, notes.clone(), polling);

        Self {
            backend,
            ctx,
            notes,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.ctx.client
    }

    pub fn state(&self) -> &UserState {
        &self.ctx.state
    }
}
