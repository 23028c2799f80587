//! Wire entities exchanged with the paging service.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! Patient identity is an `i64`. A patient that has not been stored yet
//! carries id `0`, which the service replaces with its own assignment.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A client site that patients can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A physical pager handed out to a waiting patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pager {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lifecycle stage of a patient in the paging workflow.
///
/// The service owns transitions; the client only carries the value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatientState {
    /// Waiting, no page sent yet.
    #[default]
    Pending,
    /// The patient's pager should be called.
    Call,
    /// The pager has been called.
    Called,
    /// The examination is over.
    Finished,
}

impl PatientState {
    pub fn as_str(self) -> &'static str {
        match self {
            PatientState::Pending => "pending",
            PatientState::Call => "call",
            PatientState::Called => "called",
            PatientState::Finished => "finished",
        }
    }
}

impl fmt::Display for PatientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A patient record. Used both as the add/update payload and as the
/// service's reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
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

impl Patient {
    /// A new, not yet stored patient with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Bearer credential returned by a successful login. Owned by the caller;
/// the library never persists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    #[serde(alias = "access_token")]
    pub token: String,
}

/// Request payload for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

/// Error envelope returned by the service on failure. Any subset of the
/// fields may be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(rename = "status", default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "error", default)]
    pub error_text: Option<String>,
}
