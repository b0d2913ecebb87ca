use std::error::Error as StdError;
use std::pin::Pin;
use std::sync::Arc;

use toolloop_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use tracing::Instrument;

type SendRequestResult = Result<ModelResponse, ModelCallError>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A failed model call. The backend error is kept as the source.
#[derive(Debug, thiserror::Error)]
#[error("model call failed ({kind}): {source}")]
pub struct ModelCallError {
    kind: ErrorKind,
    source: Box<dyn StdError + Send + Sync>,
}

impl ModelCallError {
    /// Returns the kind reported by the model provider.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp = fut.await.map_err(|err| {
                        error!("got an error: {err:?}");
                        ModelCallError {
                            kind: err.kind(),
                            source: Box::new(err),
                        }
                    })?;
                    trace!(
                        "finished a request with {} tool calls",
                        resp.tool_calls.len()
                    );
                    Ok(resp)
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the proposed message.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe as long as the provider is.
    #[inline]
    pub async fn send_request(
        &self,
        req: ModelRequest,
    ) -> Result<ModelResponse, ModelCallError> {
        (self.handler_fn)(req).await
    }
}
