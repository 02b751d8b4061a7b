//! Credential liaison: mediation between an application core and pluggable
//! credential backends.
//!
//! Callers issue typed requests against a selected backend; the backend
//! completes each request asynchronously by resolving or rejecting it. The
//! crate keeps a registry of backends, allows at most one in-flight request
//! per backend, and reduces every failure to one boundary-safe error shape.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: identifiers, contexts, the response contract, and errors
//! - **Ports**: the backend and validator traits
//! - **Adapters**: the in-memory backend and the boundary adapter
//!
//! # Modules
//!
//! - [`manager`]: backend registration and lookup
//! - [`request`]: request contexts, validation, and the dispatch pipeline
//! - [`boundary`]: serialised dispatch from outside the trust boundary
//! - [`config`]: registry configuration

pub mod boundary;
pub mod config;
pub mod manager;
pub mod request;
