//! Validation layer: schema checks on both sides of the backend call.

use super::{Invocation, RequestHandler, reject};
use crate::request::{
    domain::{RequestContext, RequestOutcome},
    ports::RequestValidator,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub(crate) struct ValidationLayer<H> {
    inner: H,
    validator: Arc<dyn RequestValidator>,
}

impl<H> ValidationLayer<H> {
    pub(crate) const fn new(inner: H, validator: Arc<dyn RequestValidator>) -> Self {
        Self { inner, validator }
    }
}

#[async_trait]
impl<H: RequestHandler> RequestHandler for ValidationLayer<H> {
    async fn handle(&self, invocation: Invocation, context: RequestContext) {
        let method = invocation.method();
        if let Err(error) = self.validator.validate_arguments(method, invocation.args()) {
            warn!(
                request_id = %context.request_id(),
                %method,
                error = %error,
                "arguments rejected before reaching the backend"
            );
            reject(&context, error);
            return;
        }

        let validator = Arc::clone(&self.validator);
        let request_id = context.request_id();
        let checked = context
            .response()
            .forwarding(move |outcome: RequestOutcome| {
                let verdict = match &outcome {
                    Ok(value) => validator.validate_result(method, value),
                    Err(failure) => validator.validate_rejection(method, failure),
                };
                match verdict {
                    Ok(()) => outcome,
                    Err(error) => {
                        warn!(
                            %request_id,
                            %method,
                            error = %error,
                            "backend outcome does not match the declared schema"
                        );
                        Err(error.into())
                    }
                }
            });
        self.inner
            .handle(invocation, context.with_response(checked))
            .await;
    }
}
