//! Credential manager registry.
//!
//! Maps backend identity to a registered implementation wrapped in its own
//! request pipeline. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The registry service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
