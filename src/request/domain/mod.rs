//! Domain model for dispatched requests.
//!
//! Covers request identity, the per-request context and its single-use
//! response contract, the boundary-safe error contract, and the static
//! dispatch schema.

mod context;
mod contract;
mod error;
mod ids;
mod schema;

pub use context::{RequestContext, SessionContext};
pub use contract::{ContractResult, RequestOutcome, ResponseContract};
pub use error::{
    ContractError, ErrorCode, NormalizedError, ParseRequestGroupError, ParseRequestMethodError,
    RequestFailure,
};
pub use ids::RequestId;
pub use schema::{
    AccountAuthenticationMethod, AccountCreationMethod, LoginMethod, ManagerMethod,
    MethodSignature, ParamSpec, RequestGroup, RequestMethod, ValueShape,
};
