//! Blocking client library for the Pagient patient-paging service.
//!
//! # Overview
//! Exposes typed operations over clients, pagers and patients, plus login
//! and a session check. Every call is one synchronous HTTP round trip; the
//! library does not cache, retry or batch.
//!
//! # Design
//! - `PagientClient` owns the base URL, endpoint templates, credentials and
//!   a `Transport`. All operations share one request/response pipeline.
//! - Authentication is either HTTP basic or a bearer token, chosen at
//!   construction and swappable through `set_auth`.
//! - Failures are a single `ApiError` type carrying the HTTP status when a
//!   response arrived; `is_not_found`, `is_conflict` and friends read it.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod types;

pub use api::PagientApi;
pub use auth::Auth;
pub use client::PagientClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use endpoints::Endpoints;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{Client, Login, Message, Pager, Patient, PatientState, Token};
