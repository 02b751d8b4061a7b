//! Request dispatch: the per-request context, the response contract, and
//! the layered pipeline between callers and credential backends.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - The default schema validator in [`validation`]
//! - The caller entry point in [`facade`]
//!
//! The pipeline itself is internal; callers only ever reach a backend
//! through a [`PublicFacade`].

pub mod domain;
pub mod facade;
pub(crate) mod pipeline;
pub mod ports;
pub mod validation;

pub use facade::PublicFacade;

#[cfg(test)]
mod tests;
