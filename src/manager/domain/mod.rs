//! Domain model for credential manager registration.
//!
//! Registration metadata is validated here before a backend is admitted to
//! the registry. Request dispatch lives in [`crate::request`].

mod error;
mod ids;
mod kind;
mod label;
mod summary;

pub use error::ManagerDomainError;
pub use ids::BackendId;
pub use kind::BackendKind;
pub use label::BackendLabel;
pub use summary::ManagerSummary;
