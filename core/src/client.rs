//! Blocking HTTP client for the paging service.
//!
//! # Design
//! Every operation runs through one pipeline:
//! 1. `build_request` joins the path to the base URL, serializes the payload
//!    and attaches the `User-Agent`, `Content-Type` and `Authorization`
//!    headers.
//!
//! Operations pass paths relative to the base URL, e.g. `/patients/42`.
//! 2. The configured `Transport` performs a single round trip.
//! 3. `check_status` turns any status above 300 into an `ApiError`.
//! 4. `decode` parses the success body into the expected type.
//!
//! The client never retries and holds no cache. Credentials sit behind an
//! `RwLock` so they can be swapped while other threads issue requests.

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::PagientApi;
use crate::auth::Auth;
use crate::config::ClientConfig;
use crate::endpoints::{render, Endpoints};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{Client, Login, Message, Pager, Patient, Token};

/// Synchronous client for the paging service.
///
/// Safe to share between threads; clone the `Arc` around it or borrow it
/// from scoped threads.
pub struct PagientClient {
    base_url: String,
    user_agent: String,
    endpoints: Endpoints,
    auth: RwLock<Auth>,
    transport: Arc<dyn Transport>,
}

impl PagientClient {
    /// Unauthenticated client for `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(ClientConfig::new(base_url))
    }

    /// Client that sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(base_url: &str, token: &str) -> Self {
        Self::from_config(ClientConfig::builder(base_url).token(token).build())
    }

    /// Client that sends HTTP basic credentials on every request.
    pub fn with_basic_auth(base_url: &str, username: &str, password: &str) -> Self {
        Self::from_config(
            ClientConfig::builder(base_url)
                .basic_auth(username, password)
                .build(),
        )
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    /// Client that sends its requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: config.base_url,
            user_agent: config.user_agent,
            endpoints: config.endpoints,
            auth: RwLock::new(config.auth),
            transport: Arc::new(transport),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Snapshot of the active credentials.
    pub fn auth(&self) -> Auth {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active credentials for all subsequent requests.
    pub fn set_auth(&self, auth: Auth) {
        *self.auth.write().unwrap_or_else(PoisonError::into_inner) = auth;
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.set_auth(Auth::bearer(token));
    }

    pub fn clear_auth(&self) {
        self.set_auth(Auth::None);
    }

    /// Log in and switch this client to the returned bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let token = self.auth_login(username, password)?;
        self.set_token(token.token.clone());
        debug!(username, "installed bearer token from login");
        Ok(token)
    }

    // ---------------------------------------------------------------------
    // Transport core
    // ---------------------------------------------------------------------

    fn path(&self, template: &str, id: Option<i64>) -> String {
        render(template, id)
    }

    /// Build the outbound request for `path`, which is relative to the base
    /// URL. `body` is serialized as JSON when given.
    pub fn build_request<I: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&I>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body
            .map(|input| serde_json::to_string(input).map_err(ApiError::decode))
            .transpose()?;

        let mut headers = vec![("User-Agent".to_string(), self.user_agent.clone())];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(value) = self.auth().header_value() {
            headers.push(("Authorization".to_string(), value));
        }

        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        })
    }

    /// Perform one round trip and return the raw success response.
    pub fn request<I: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&I>,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(method, path, body)?;
        debug!(%method, url = %request.url, has_body = request.body.is_some(), "sending request");
        let response = self.transport.execute(request)?;
        check_status(response)
    }

    /// Perform one round trip and decode the success body as `O`.
    pub fn call<I, O>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&I>,
    ) -> Result<O, ApiError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let response = self.request(method, path, body)?;
        decode(&response)
    }

    fn get<O: DeserializeOwned>(&self, path: &str) -> Result<O, ApiError> {
        self.call::<(), O>(HttpMethod::Get, path, None)
    }

    fn post<I: Serialize + ?Sized, O: DeserializeOwned>(
        &self,
        path: &str,
        body: &I,
    ) -> Result<O, ApiError> {
        self.call(HttpMethod::Post, path, Some(body))
    }

    fn put<I: Serialize + ?Sized, O: DeserializeOwned>(
        &self,
        path: &str,
        body: &I,
    ) -> Result<O, ApiError> {
        self.call(HttpMethod::Put, path, Some(body))
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request::<()>(HttpMethod::Delete, path, None)?;
        Ok(())
    }
}

impl PagientApi for PagientClient {
    fn is_authenticated(&self) -> Result<bool, ApiError> {
        if self.auth().is_none() {
            return Ok(false);
        }
        let path = self.path(&self.endpoints.auth_sessions, None);
        let request = self.build_request::<()>(HttpMethod::Get, &path, None)?;
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "session check answered");
        Ok(response.is_success())
    }

    fn auth_login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let login = Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post(&self.path(&self.endpoints.auth_login, None), &login)
    }

    fn client_list(&self) -> Result<Vec<Client>, ApiError> {
        self.get(&self.path(&self.endpoints.clients, None))
    }

    fn pager_list(&self) -> Result<Vec<Pager>, ApiError> {
        self.get(&self.path(&self.endpoints.pagers, None))
    }

    fn patient_list(&self) -> Result<Vec<Patient>, ApiError> {
        self.get(&self.path(&self.endpoints.patients, None))
    }

    fn patient_get(&self, id: i64) -> Result<Patient, ApiError> {
        self.get(&self.path(&self.endpoints.patient, Some(id)))
    }

    fn patient_add(&self, patient: &Patient) -> Result<Patient, ApiError> {
        self.post(&self.path(&self.endpoints.patients, None), patient)
    }

    fn patient_update(&self, patient: &Patient) -> Result<Patient, ApiError> {
        self.put(&self.path(&self.endpoints.patient, Some(patient.id)), patient)
    }

    fn patient_remove(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&self.path(&self.endpoints.patient, Some(id)))
    }
}

/// Pass success responses through; turn everything else into an error
/// built from the service's envelope.
fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    let status = response.status;
    warn!(status, "request failed");

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Response {
            status,
            message: reason_phrase(status),
        });
    }

    match serde_json::from_slice::<Message>(&response.body) {
        Ok(envelope) => {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .or(envelope.error_text.filter(|e| !e.is_empty()))
                .unwrap_or_else(|| reason_phrase(status));
            Err(ApiError::Response { status, message })
        }
        Err(_) => Err(ApiError::Decode {
            status: Some(status),
            message: String::from_utf8_lossy(&response.body).into_owned(),
        }),
    }
}

fn decode<O: DeserializeOwned>(response: &HttpResponse) -> Result<O, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| {
        warn!(status = response.status, error = %e, "undecodable response body");
        ApiError::decode(e)
    })
}

fn reason_phrase(status: u16) -> String {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("HTTP error")
        .to_string()
}
