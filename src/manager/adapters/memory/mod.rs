//! In-memory credential backend.

mod credential_backend;

pub use credential_backend::InMemoryCredentialBackend;
