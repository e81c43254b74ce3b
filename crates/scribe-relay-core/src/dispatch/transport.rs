use crate::{CoreResult, Destination, DispatchError, Envelope, Reply};

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// The host's point-to-point messaging primitive.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `envelope` to `destination` and await the reply.
    async fn send(&self, destination: Destination, envelope: Envelope)
    -> Result<Reply, TransportFailure>;
}

/// Why a round trip produced no reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Nothing is listening at the destination.
    #[error("no receiver at {0}")]
    Unreachable(Destination),
    /// The receiver went away before replying.
    #[error("receiver at {0} dropped the request")]
    Dropped(Destination),
    /// Any other host-reported failure.
    #[error("{0}")]
    Other(String),
}

/// Turns a [`Transport`] into typed dispatch results.
///
/// Transport failures become [`DispatchError::Transport`] and handler
/// failures become [`DispatchError::Remote`], so nothing the peer does can
/// escape as anything other than a value.
#[derive(Clone)]
pub struct TransportAdapter {
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl TransportAdapter {
    /// Adapter with no round-trip timeout.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Fail round trips that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send `envelope` and await the native handler's result.
    #[instrument(skip(self, envelope), fields(command = %envelope.command_name))]
    pub async fn round_trip(&self, destination: Destination, envelope: Envelope) -> CoreResult<Value> {
        let command = envelope.command_name.clone();
        let sent = self.transport.send(destination, envelope);

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, sent).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(%destination, timeout_ms = limit.as_millis(), "Round trip timed out");
                    return Err(DispatchError::transport(
                        &command,
                        format!("no reply from {} within {} ms", destination, limit.as_millis()),
                    ));
                }
            },
            None => sent.await,
        };

        match outcome {
            Ok(Ok(value)) => {
                debug!(%destination, "Reply received");
                Ok(value)
            }
            Ok(Err(source)) => Err(DispatchError::remote(&command, source)),
            Err(failure) => {
                warn!(%destination, error = %failure, "Round trip failed");
                Err(DispatchError::transport(&command, failure.to_string()))
            }
        }
    }
}
