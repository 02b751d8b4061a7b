//! Isolation layer: the innermost layer, which invokes the backend.
//!
//! Any error the backend raises, and any panic while its method runs, is
//! caught here. If the request is still open it is rejected with the generic
//! `unexpected-exception` error and the original cause is logged together
//! with the backend identifier; the cause itself never reaches the caller.
//! The layer never completes a request on a backend's behalf otherwise.

use super::{Invocation, RequestHandler, reject};
use crate::manager::{
    domain::BackendId,
    ports::{BackendFault, BackendResult, CredentialBackend},
};
use crate::request::domain::{
    AccountAuthenticationMethod, AccountCreationMethod, LoginMethod, ManagerMethod,
    NormalizedError, RequestContext, RequestMethod,
};
use async_trait::async_trait;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::vec;
use tracing::{error, warn};

pub(crate) struct IsolationLayer {
    backend_id: BackendId,
    backend: Arc<dyn CredentialBackend>,
}

impl IsolationLayer {
    pub(crate) const fn new(backend_id: BackendId, backend: Arc<dyn CredentialBackend>) -> Self {
        Self {
            backend_id,
            backend,
        }
    }

    async fn call(
        &self,
        method: RequestMethod,
        args: &mut Arguments,
        context: RequestContext,
    ) -> Result<BackendResult, NormalizedError> {
        let backend = self.backend.as_ref();
        let result = match method {
            RequestMethod::Manager(member) => {
                let group = backend.manager().ok_or_else(|| missing_group(method))?;
                match member {
                    ManagerMethod::GetSigningKey => {
                        group.get_signing_key(context, args.decode("origin")?).await
                    }
                    ManagerMethod::GetCredentialsMetadata => {
                        group
                            .get_credentials_metadata(context, args.decode("origin")?)
                            .await
                    }
                }
            }
            RequestMethod::Login(member) => {
                let group = backend.login().ok_or_else(|| missing_group(method))?;
                match member {
                    LoginMethod::ApproveOperation => {
                        let operation_id = args.decode("operationId")?;
                        let record_id = args.decode("recordId")?;
                        group
                            .approve_operation(context, operation_id, record_id)
                            .await
                    }
                    LoginMethod::CloseOperation => {
                        let operation_id = args.decode("operationId")?;
                        let reason = args.decode("reason")?;
                        group.close_operation(context, operation_id, reason).await
                    }
                    LoginMethod::GetRecordMetadata => {
                        group
                            .get_record_metadata(context, args.decode("recordId")?)
                            .await
                    }
                    LoginMethod::UpdateMetadata => {
                        let record_id = args.decode("recordId")?;
                        let metadata = args.decode("metadata")?;
                        group.update_metadata(context, record_id, metadata).await
                    }
                }
            }
            RequestMethod::AccountCreation(member) => {
                let group = backend
                    .account_creation()
                    .ok_or_else(|| missing_group(method))?;
                match member {
                    AccountCreationMethod::GetFields => {
                        group.get_fields(context, args.decode("operationId")?).await
                    }
                    AccountCreationMethod::UpdateField => {
                        let operation_id = args.decode("operationId")?;
                        let field = args.decode("field")?;
                        group.update_field(context, operation_id, field).await
                    }
                    AccountCreationMethod::CloseOperation => {
                        group
                            .close_operation(context, args.decode("operationId")?)
                            .await
                    }
                }
            }
            RequestMethod::AccountAuthentication(member) => {
                let group = backend
                    .account_authentication()
                    .ok_or_else(|| missing_group(method))?;
                match member {
                    AccountAuthenticationMethod::GetChallenge => {
                        group.get_challenge(context, args.decode("operationId")?).await
                    }
                    AccountAuthenticationMethod::ApproveChallenge => {
                        let operation_id = args.decode("operationId")?;
                        let answer = args.decode("answer")?;
                        group.approve_challenge(context, operation_id, answer).await
                    }
                    AccountAuthenticationMethod::CloseOperation => {
                        group
                            .close_operation(context, args.decode("operationId")?)
                            .await
                    }
                }
            }
        };
        Ok(result)
    }

    fn contain(&self, context: &RequestContext, method: RequestMethod, cause: &str) {
        if context.response().is_completed() {
            warn!(
                backend_id = %self.backend_id,
                request_id = %context.request_id(),
                %method,
                error = cause,
                "backend failed after completing the request"
            );
            return;
        }
        error!(
            backend_id = %self.backend_id,
            request_id = %context.request_id(),
            %method,
            error = cause,
            "backend raised an unexpected exception"
        );
        reject(context, NormalizedError::unexpected_exception());
    }
}

#[async_trait]
impl RequestHandler for IsolationLayer {
    async fn handle(&self, invocation: Invocation, context: RequestContext) {
        let (method, values) = invocation.into_parts();
        let mut args = Arguments::new(method, values);
        let guard = context.clone();
        let outcome = AssertUnwindSafe(self.call(method, &mut args, context))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(fault))) => self.contain(&guard, method, &describe_fault(&fault)),
            Ok(Err(error)) => {
                warn!(
                    backend_id = %self.backend_id,
                    request_id = %guard.request_id(),
                    %method,
                    error = %error,
                    "request rejected before reaching the backend"
                );
                reject(&guard, error);
            }
            Err(panic) => self.contain(&guard, method, &describe_panic(panic.as_ref())),
        }
    }
}

/// Positional arguments decoded one parameter at a time.
struct Arguments {
    method: RequestMethod,
    values: vec::IntoIter<Value>,
}

impl Arguments {
    fn new(method: RequestMethod, values: Vec<Value>) -> Self {
        Self {
            method,
            values: values.into_iter(),
        }
    }

    /// Decodes the next argument; a missing argument decodes from `null`.
    fn decode<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, NormalizedError> {
        let value = self.values.next().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| {
            NormalizedError::validation_failure(format!(
                "{}: argument '{name}' could not be decoded: {err}",
                self.method
            ))
        })
    }
}

fn missing_group(method: RequestMethod) -> NormalizedError {
    NormalizedError::validation_failure(format!(
        "the backend does not provide the '{}' group",
        method.group()
    ))
}

fn describe_fault(fault: &BackendFault) -> String {
    fault.to_string()
}

fn describe_panic(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "backend panicked".to_owned())
}
