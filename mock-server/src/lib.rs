use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pager {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatientState {
    #[default]
    Pending,
    Call,
    Called,
    Finished,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "pagerId", default, skip_serializing_if = "Option::is_none")]
    pub pager_id: Option<i64>,
    #[serde(rename = "clientId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub status: PatientState,
    #[serde(default)]
    pub active: bool,
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct Token {
    pub token: String,
}

/// Failure envelope, `{status, message, error}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub status: u16,
    pub message: String,
    pub error: String,
}

/// A failed request, rendered as a `Message` envelope.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let envelope = Message {
            status: self.status.as_u16(),
            message: self.message,
            error: self
                .status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
        };
        (self.status, Json(envelope)).into_response()
    }
}

/// Username and password accepted by `/oauth/token` and by basic auth.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

#[derive(Default)]
struct Store {
    clients: Vec<Client>,
    pagers: Vec<Pager>,
    patients: BTreeMap<i64, Patient>,
    next_id: i64,
    tokens: HashSet<String>,
}

impl Store {
    fn seeded() -> Self {
        Self {
            clients: vec![
                Client {
                    id: 1,
                    name: "Reception".to_string(),
                },
                Client {
                    id: 2,
                    name: "Radiology".to_string(),
                },
            ],
            pagers: (1..=3)
                .map(|id| Pager {
                    id,
                    name: format!("Pager {id}"),
                })
                .collect(),
            next_id: 1,
            ..Self::default()
        }
    }

    /// Reject references to unknown pagers/clients and pagers already held
    /// by another active patient.
    fn validate(&self, patient: &Patient, own_id: Option<i64>) -> Result<(), Failure> {
        if patient.name.trim().is_empty() {
            return Err(Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "name is required"));
        }
        if let Some(client_id) = patient.client_id {
            if !self.clients.iter().any(|c| c.id == client_id) {
                return Err(Failure::new(
                    StatusCode::BAD_REQUEST,
                    format!("unknown client {client_id}"),
                ));
            }
        }
        if let Some(pager_id) = patient.pager_id {
            if !self.pagers.iter().any(|p| p.id == pager_id) {
                return Err(Failure::new(
                    StatusCode::BAD_REQUEST,
                    format!("unknown pager {pager_id}"),
                ));
            }
            let taken = self.patients.values().any(|other| {
                Some(other.id) != own_id && other.active && other.pager_id == Some(pager_id)
            });
            if taken {
                return Err(Failure::new(
                    StatusCode::CONFLICT,
                    format!("pager {pager_id} is already assigned"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    credentials: Arc<Credentials>,
}

pub fn app() -> Router {
    app_with_credentials(Credentials::default())
}

pub fn app_with_credentials(credentials: Credentials) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::seeded())),
        credentials: Arc::new(credentials),
    };
    Router::new()
        .route("/clients", get(list_clients))
        .route("/pagers", get(list_pagers))
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/oauth/token", post(login))
        .route("/oauth/sessions", get(sessions))
        .with_state(state)
        .layer(middleware::from_fn(echo_user_agent))
}

/// Response header carrying back the `User-Agent` the request arrived with,
/// so clients can check what actually went over the wire.
pub const ECHO_USER_AGENT: &str = "x-echo-user-agent";

async fn echo_user_agent(request: Request, next: Next) -> Response {
    let user_agent = request.headers().get(header::USER_AGENT).cloned();
    let mut response = next.run(request).await;
    if let Some(value) = user_agent {
        response
            .headers_mut()
            .insert(HeaderName::from_static(ECHO_USER_AGENT), value);
    }
    response
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_clients(State(state): State<AppState>) -> Json<Vec<Client>> {
    Json(state.store.read().await.clients.clone())
}

async fn list_pagers(State(state): State<AppState>) -> Json<Vec<Pager>> {
    Json(state.store.read().await.pagers.clone())
}

async fn list_patients(State(state): State<AppState>) -> Json<Vec<Patient>> {
    let store = state.store.read().await;
    Json(store.patients.values().cloned().collect())
}

async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, Failure> {
    let store = state.store.read().await;
    store
        .patients
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, format!("patient {id} not found")))
}

async fn create_patient(
    State(state): State<AppState>,
    Json(input): Json<Patient>,
) -> Result<(StatusCode, Json<Patient>), Failure> {
    let mut store = state.store.write().await;
    store.validate(&input, None)?;
    let patient = Patient {
        id: store.next_id,
        ..input
    };
    store.next_id += 1;
    store.patients.insert(patient.id, patient.clone());
    info!(id = patient.id, "patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<Patient>,
) -> Result<Json<Patient>, Failure> {
    let mut store = state.store.write().await;
    if !store.patients.contains_key(&id) {
        return Err(Failure::new(StatusCode::NOT_FOUND, format!("patient {id} not found")));
    }
    store.validate(&input, Some(id))?;
    let patient = Patient { id, ..input };
    store.patients.insert(id, patient.clone());
    info!(id, status = ?patient.status, "patient updated");
    Ok(Json(patient))
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    let mut store = state.store.write().await;
    store
        .patients
        .remove(&id)
        .map(|_| {
            info!(id, "patient removed");
            StatusCode::NO_CONTENT
        })
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, format!("patient {id} not found")))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<Login>,
) -> Result<Json<Token>, Failure> {
    if input.username != state.credentials.username || input.password != state.credentials.password
    {
        return Err(Failure::new(StatusCode::UNAUTHORIZED, "invalid credentials"));
    }
    let token = Uuid::new_v4().to_string();
    state.store.write().await.tokens.insert(token.clone());
    info!(username = %input.username, "issued token");
    Ok(Json(Token { token }))
}

async fn sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, Failure> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let valid = if let Some(token) = authorization.strip_prefix("Bearer ") {
        state.store.read().await.tokens.contains(token)
    } else if let Some(encoded) = authorization.strip_prefix("Basic ") {
        let expected = format!(
            "{}:{}",
            state.credentials.username, state.credentials.password
        );
        general_purpose::STANDARD
            .decode(encoded)
            .map(|decoded| decoded == expected.as_bytes())
            .unwrap_or(false)
    } else {
        false
    };

    if valid {
        Ok(StatusCode::OK)
    } else {
        Err(Failure::new(StatusCode::UNAUTHORIZED, "not authenticated"))
    }
}
