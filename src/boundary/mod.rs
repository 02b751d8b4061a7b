//! Trust boundary between untrusted callers and the application core.
//!
//! Callers outside the core talk to backends only through serialised
//! [`DispatchMessage`]s. The [`BoundaryAdapter`] checks each message,
//! forwards it to the target backend's public façade, and reduces every
//! failure to a [`NormalizedError`](crate::request::domain::NormalizedError)
//! before replying.

mod adapter;
mod message;

pub use adapter::{BoundaryAdapter, BoundaryEnvelope};
pub use message::{DispatchMessage, DispatchReply, FALLBACK_REPLY};
