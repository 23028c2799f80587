//! Path templates for every remote operation.
//!
//! Templates are relative to the client's base URL. `{id}` is the only
//! placeholder and is replaced with the resource identifier.

/// One path template per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub clients: String,
    pub pagers: String,
    pub patients: String,
    pub patient: String,
    pub auth_login: String,
    pub auth_sessions: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            clients: "/clients".to_string(),
            pagers: "/pagers".to_string(),
            patients: "/patients".to_string(),
            patient: "/patients/{id}".to_string(),
            auth_login: "/oauth/token".to_string(),
            auth_sessions: "/oauth/sessions".to_string(),
        }
    }
}

impl Endpoints {
    /// Default templates with `prefix` in front of the resource routes.
    /// The OAuth routes stay at the root, matching deployments that mount
    /// the resource API under e.g. `/api`.
    pub fn with_api_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let defaults = Self::default();
        Self {
            clients: format!("{prefix}{}", defaults.clients),
            pagers: format!("{prefix}{}", defaults.pagers),
            patients: format!("{prefix}{}", defaults.patients),
            patient: format!("{prefix}{}", defaults.patient),
            ..defaults
        }
    }
}

/// Fill in a template, substituting `{id}` when given. The result is a path
/// relative to the base URL.
pub(crate) fn render(template: &str, id: Option<i64>) -> String {
    match id {
        Some(id) => template.replace("{id}", &id.to_string()),
        None => template.to_string(),
    }
}
