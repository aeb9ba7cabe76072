use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::sync::RwLock;
use tower_http::services::{ServeDir, ServeFile};

use ana_portfolio::interactions::{normalized_contact, ContactPayload};

const DEFAULT_CONTACT_OUTBOX_PATH: &str = "/tmp/contact-outbox.json";
const DEFAULT_CONTACT_MAX_MESSAGE_CHARS: usize = 4_000;
const DEFAULT_CONTACT_OUTBOX_MAX_ENTRIES: usize = 500;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const CONTACT_MAX_MESSAGE_CHARS_BOUNDS: (usize, usize) = (1, 65_536);
const CONTACT_OUTBOX_MAX_ENTRIES_BOUNDS: (usize, usize) = (1, 10_000);
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Clone)]
struct ContactRuntimeConfig {
    outbox_path: PathBuf,
    max_message_chars: usize,
    outbox_max_entries: usize,
    log_level: LogLevel,
}

impl ContactRuntimeConfig {
    fn from_env() -> Self {
        let outbox_path = parse_env_non_empty_string("CONTACT_OUTBOX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTACT_OUTBOX_PATH));
        let max_message_chars = parse_env_usize_with_bounds(
            "CONTACT_MAX_MESSAGE_CHARS",
            DEFAULT_CONTACT_MAX_MESSAGE_CHARS,
            CONTACT_MAX_MESSAGE_CHARS_BOUNDS,
        );
        let outbox_max_entries = parse_env_usize_with_bounds(
            "CONTACT_OUTBOX_MAX_ENTRIES",
            DEFAULT_CONTACT_OUTBOX_MAX_ENTRIES,
            CONTACT_OUTBOX_MAX_ENTRIES_BOUNDS,
        );
        let log_level = parse_log_level("LOG_LEVEL", DEFAULT_LOG_LEVEL);

        Self {
            outbox_path,
            max_message_chars,
            outbox_max_entries,
            log_level,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    outbox: Arc<RwLock<OutboxStore>>,
    config: ContactRuntimeConfig,
}

#[derive(Clone, Serialize, Deserialize)]
struct StoredMessage {
    name: String,
    email: String,
    message: String,
    received_at: u64,
}

#[derive(Default, Serialize, Deserialize)]
struct OutboxIndex {
    entries: Vec<StoredMessage>,
}

struct OutboxStore {
    file_path: PathBuf,
    entries: Vec<StoredMessage>,
}

impl OutboxStore {
    fn load_from_disk(file_path: PathBuf) -> Self {
        let entries = read_outbox_index(&file_path)
            .map(|index| index.entries)
            .unwrap_or_default();

        Self { file_path, entries }
    }
}

#[derive(Serialize)]
struct ContactResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ContactResponse {
    fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn error(message: &str) -> Self {
        Self {
            ok: false,
            error: Some(message.to_string()),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let bind_address = format!("0.0.0.0:{port}");
    let config = ContactRuntimeConfig::from_env();
    let outbox = OutboxStore::load_from_disk(config.outbox_path.clone());

    let state = AppState {
        outbox: Arc::new(RwLock::new(outbox)),
        config,
    };

    let static_service = ServeDir::new("dist").not_found_service(ServeFile::new("dist/index.html"));

    let app = Router::new()
        .route("/api/contact", post(submit_contact))
        .fallback_service(static_service)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    println!("server listening on http://127.0.0.1:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn submit_contact(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(submission): Json<ContactPayload>,
) -> impl IntoResponse {
    let request_id = resolve_request_id(&headers);

    log_event(
        &state.config,
        LogLevel::Info,
        "contact_request_start",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "method": method.as_str(),
            "path": uri.path(),
        }),
    );

    let Some(payload) =
        normalized_contact(&submission.name, &submission.email, &submission.message)
    else {
        log_event(
            &state.config,
            LogLevel::Info,
            "contact_request_failed",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "error_class": "missing_fields",
            }),
        );
        return json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ContactResponse::error("name, email, and message are required"),
            &request_id,
        );
    };

    if !message_length_ok(&payload.message, state.config.max_message_chars) {
        log_event(
            &state.config,
            LogLevel::Info,
            "contact_request_failed",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "error_class": "message_too_long",
                "max_message_chars": state.config.max_message_chars,
            }),
        );
        return json_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            ContactResponse::error("message is too long"),
            &request_id,
        );
    }

    let outbox_write_ok = store_contact_message(&state, &payload).await;

    log_event(
        &state.config,
        LogLevel::Info,
        "contact_request_complete",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "status": StatusCode::OK.as_u16(),
            "outbox_write_ok": outbox_write_ok,
        }),
    );

    json_response(StatusCode::OK, ContactResponse::accepted(), &request_id)
}

async fn store_contact_message(state: &AppState, payload: &ContactPayload) -> bool {
    let entry = StoredMessage {
        name: payload.name.clone(),
        email: payload.email.clone(),
        message: payload.message.clone(),
        received_at: now_unix_seconds(),
    };

    let (path, entries_snapshot) = {
        let mut outbox = state.outbox.write().await;
        append_message(&mut outbox.entries, entry, state.config.outbox_max_entries);
        (outbox.file_path.clone(), outbox.entries.clone())
    };

    write_outbox_index(&path, &entries_snapshot).is_ok()
}

fn append_message(entries: &mut Vec<StoredMessage>, entry: StoredMessage, max_entries: usize) {
    while entries.len() >= max_entries {
        entries.remove(0);
    }

    entries.push(entry);
}

fn message_length_ok(message: &str, max_message_chars: usize) -> bool {
    message.chars().count() <= max_message_chars
}

fn read_outbox_index(path: &Path) -> Result<OutboxIndex, ()> {
    let raw = fs::read_to_string(path).map_err(|_| ())?;
    serde_json::from_str(&raw).map_err(|_| ())
}

fn write_outbox_index(path: &Path, entries: &[StoredMessage]) -> Result<(), ()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|_| ())?;
    }

    let index = OutboxIndex {
        entries: entries.to_vec(),
    };
    let encoded = serde_json::to_vec_pretty(&index).map_err(|_| ())?;
    fs::write(path, encoded).map_err(|_| ())
}

fn json_response(
    status: StatusCode,
    payload: ContactResponse,
    request_id: &str,
) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Ok(request_id_header) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }

    (status, headers, Json(payload)).into_response()
}

fn parse_env_usize_with_bounds(name: &str, default: usize, bounds: (usize, usize)) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_level(name: &str, default: LogLevel) -> LogLevel {
    match parse_env_non_empty_string(name)
        .unwrap_or_else(|| default.as_str().to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => default,
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

fn log_event(config: &ContactRuntimeConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(now_unix_seconds())),
    );
    payload.insert(
        "level".to_string(),
        serde_json::Value::String(level.as_str().to_string()),
    );
    payload.insert(
        "event".to_string(),
        serde_json::Value::String(event.to_string()),
    );

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    println!("{}", serde_json::Value::Object(payload));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_runtime_config(outbox_path: &str) -> ContactRuntimeConfig {
        ContactRuntimeConfig {
            outbox_path: PathBuf::from(outbox_path),
            max_message_chars: DEFAULT_CONTACT_MAX_MESSAGE_CHARS,
            outbox_max_entries: DEFAULT_CONTACT_OUTBOX_MAX_ENTRIES,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    fn stored(message: &str, received_at: u64) -> StoredMessage {
        StoredMessage {
            name: "Ana".to_string(),
            email: "a@x.com".to_string(),
            message: message.to_string(),
            received_at,
        }
    }

    #[test]
    fn resolve_request_id_prefers_incoming_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_static("req-incoming-7"),
        );

        assert_eq!(resolve_request_id(&headers), "req-incoming-7");
    }

    #[test]
    fn resolve_request_id_generates_when_header_is_blank() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("   "));

        let request_id = resolve_request_id(&headers);
        assert!(request_id.starts_with("req-"));
    }

    #[test]
    fn outbox_append_evicts_oldest_at_capacity() {
        let mut entries = vec![stored("first", 1), stored("second", 2), stored("third", 3)];

        append_message(&mut entries, stored("fourth", 4), 3);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[2].message, "fourth");
    }

    #[test]
    fn message_length_policy_counts_characters_not_bytes() {
        assert!(message_length_ok("héllo", 5));
        assert!(!message_length_ok("héllo!", 5));
        assert!(message_length_ok("", 1));
    }

    #[tokio::test]
    async fn stored_message_is_persisted_to_the_outbox_file() {
        let outbox_path = "/tmp/test-contact-outbox-persist.json";
        let _ = fs::remove_file(outbox_path);

        let state = AppState {
            outbox: Arc::new(RwLock::new(OutboxStore {
                file_path: PathBuf::from(outbox_path),
                entries: Vec::new(),
            })),
            config: test_runtime_config(outbox_path),
        };
        let payload = ContactPayload {
            name: "Ana".to_string(),
            email: "a@x.com".to_string(),
            message: "hi".to_string(),
        };

        let write_ok = store_contact_message(&state, &payload).await;
        assert!(write_ok);

        let index = read_outbox_index(Path::new(outbox_path)).expect("outbox index should parse");
        assert_eq!(index.entries.len(), 1);
        assert_eq!(index.entries[0].name, "Ana");
        assert_eq!(index.entries[0].message, "hi");
    }

    #[test]
    fn outbox_store_survives_a_missing_index_file() {
        let store =
            OutboxStore::load_from_disk(PathBuf::from("/tmp/test-contact-outbox-missing.json"));
        assert!(store.entries.is_empty());
    }
}
