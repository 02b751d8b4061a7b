//! Request validation implementation.
//!
//! This module provides the default schema-driven implementation of the
//! validation layer's hooks.

pub mod service;

pub use service::SchemaValidator;
