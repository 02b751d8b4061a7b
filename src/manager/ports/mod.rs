//! Port contracts for credential backends.
//!
//! Ports define the interface registered backends implement; the liaison
//! wraps each implementation in a request pipeline.

pub mod backend;

pub use backend::{
    AccountAuthenticationRequests, AccountCreationRequests, BackendFault, BackendResult,
    CredentialBackend, FieldUpdate, LoginRequests, ManagerRequests,
};
