//! Application services for credential manager registration and lookup.

mod liaison;

pub use liaison::{Liaison, LiaisonError, LiaisonResult, RegisterManagerRequest};
