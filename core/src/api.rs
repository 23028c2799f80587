//! The capability set of the paging service.
//!
//! `PagientClient` is the network-backed implementation. Code that only
//! needs the operations can take `&dyn PagientApi` (or a generic) so tests
//! can hand it an in-memory fake.

use crate::error::ApiError;
use crate::types::{Client, Pager, Patient, Token};

pub trait PagientApi {
    /// Query the session endpoint with the current credentials.
    ///
    /// `Ok(false)` means the service rejected the credentials (or none are
    /// configured); `Err` means the session check never got an answer.
    fn is_authenticated(&self) -> Result<bool, ApiError>;

    /// Exchange a username and password for a fresh token.
    fn auth_login(&self, username: &str, password: &str) -> Result<Token, ApiError>;

    fn client_list(&self) -> Result<Vec<Client>, ApiError>;

    fn pager_list(&self) -> Result<Vec<Pager>, ApiError>;

    fn patient_list(&self) -> Result<Vec<Patient>, ApiError>;

    fn patient_get(&self, id: i64) -> Result<Patient, ApiError>;

    /// Store a new patient. Returns the stored record with server-assigned
    /// fields filled in.
    fn patient_add(&self, patient: &Patient) -> Result<Patient, ApiError>;

    /// Replace the patient identified by `patient.id`.
    fn patient_update(&self, patient: &Patient) -> Result<Patient, ApiError>;

    fn patient_remove(&self, id: i64) -> Result<(), ApiError>;
}
