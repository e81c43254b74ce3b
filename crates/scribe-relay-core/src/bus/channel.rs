use crate::{
    CommandTable, Destination, Envelope, RegistryError, Reply, Transport, TransportFailure,
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{Instrument, debug, debug_span, info};
use uuid::Uuid;

/// Inbox depth per context.
const INBOX_CAPACITY: usize = 32;

struct Request {
    id: Uuid,
    envelope: Envelope,
    reply_tx: oneshot::Sender<Reply>,
}

/// Message bus connecting command tables served on tokio tasks.
///
/// Each attached context gets its own inbox. A request is answered on its
/// own task so a handler suspended on an outbound call does not stop the
/// context from receiving the reply it is waiting for.
#[derive(Default)]
pub struct InProcessBus {
    inboxes: RwLock<HashMap<Destination, mpsc::Sender<Request>>>,
}

impl InProcessBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `table` at `destination` until detached.
    ///
    /// Replaces whatever was attached there before.
    ///
    /// # Errors
    ///
    /// [`RegistryError::MisplacedTable`] when `destination` addresses a
    /// context other than the table's.
    #[track_caller]
    pub fn attach(
        &self,
        destination: Destination,
        table: Arc<CommandTable>,
    ) -> Result<JoinHandle<()>, RegistryError> {
        if destination.context() != table.context() {
            return Err(RegistryError::MisplacedTable {
                destination,
                context: table.context(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (inbox_tx, mut inbox_rx) = mpsc::channel::<Request>(INBOX_CAPACITY);

        self.inboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(destination, inbox_tx);

        info!(%destination, context = %table.context(), "Context attached");

        Ok(tokio::spawn(async move {
            while let Some(request) = inbox_rx.recv().await {
                let table = Arc::clone(&table);
                let span = debug_span!("request", request_id = %request.id, %destination);

                tokio::spawn(
                    async move {
                        let reply = table.serve(request.envelope).await;
                        if request.reply_tx.send(reply).is_err() {
                            debug!("Caller went away before the reply");
                        }
                    }
                    .instrument(span),
                );
            }

            debug!(%destination, "Inbox closed");
        }))
    }

    /// Stop delivering to `destination`. Returns whether anything was attached.
    pub fn detach(&self, destination: Destination) -> bool {
        let removed = self
            .inboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&destination)
            .is_some();

        if removed {
            info!(%destination, "Context detached");
        }

        removed
    }

    /// Whether a context is attached at `destination`.
    pub fn is_attached(&self, destination: Destination) -> bool {
        self.inboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&destination)
    }
}

#[async_trait]
impl Transport for InProcessBus {
    async fn send(
        &self,
        destination: Destination,
        envelope: Envelope,
    ) -> Result<Reply, TransportFailure> {
        let inbox = self
            .inboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&destination)
            .cloned()
            .ok_or(TransportFailure::Unreachable(destination))?;

        let id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();

        debug!(request_id = %id, %destination, command = %envelope.command_name, "Sending");

        inbox
            .send(Request {
                id,
                envelope,
                reply_tx,
            })
            .await
            .map_err(|_| TransportFailure::Unreachable(destination))?;

        reply_rx
            .await
            .map_err(|_| TransportFailure::Dropped(destination))
    }
}
