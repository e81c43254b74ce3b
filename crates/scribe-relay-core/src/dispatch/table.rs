use crate::{
    Command, CommandError, CoreResult, Destination, DispatchError, Envelope, ExecutionContext,
    GetCurrentTabId, NativeHandler, PeerLocator, RegistryError, Reply, ShimRoute,
    TransportAdapter,
    dispatch::{DynHandler, catalog, handler::TypedHandler},
};

use std::{collections::HashMap, panic::Location, sync::Arc};

use async_recursion::async_recursion;
use error_location::ErrorLocation;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Per-context command table.
///
/// Holds the native handlers of one context and routes everything else
/// through the catalog's shims. Built once at start-up and never mutated.
pub struct CommandTable {
    context: ExecutionContext,
    handlers: HashMap<&'static str, Arc<dyn DynHandler>>,
    transport: TransportAdapter,
    locator: PeerLocator,
}

/// Registers native handlers before the table is frozen.
pub struct CommandTableBuilder {
    context: ExecutionContext,
    handlers: HashMap<&'static str, Arc<dyn DynHandler>>,
    transport: TransportAdapter,
    locator: PeerLocator,
}

impl CommandTableBuilder {
    /// Register the native handler for `C`.
    ///
    /// # Errors
    ///
    /// Fails when `C` is native to another context, is missing from the
    /// catalog, or already has a handler.
    #[track_caller]
    pub fn native<C: Command, H: NativeHandler<C> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        if catalog::lookup(C::NAME).is_none() {
            return Err(RegistryError::NotInCatalog {
                command: C::NAME.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if C::NATIVE != self.context {
            return Err(RegistryError::WrongContext {
                command: C::NAME.to_string(),
                native: C::NATIVE,
                context: self.context,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.handlers.contains_key(C::NAME) {
            return Err(RegistryError::AlreadyRegistered {
                command: C::NAME.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.handlers
            .insert(C::NAME, Arc::new(TypedHandler::<C, H>::new(handler)));

        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> CommandTable {
        info!(
            context = %self.context,
            natives = self.handlers.len(),
            "Command table built"
        );

        CommandTable {
            context: self.context,
            handlers: self.handlers,
            transport: self.transport,
            locator: self.locator,
        }
    }
}

impl CommandTable {
    /// Start building the table for `context`.
    pub fn builder(
        context: ExecutionContext,
        transport: TransportAdapter,
        locator: PeerLocator,
    ) -> CommandTableBuilder {
        CommandTableBuilder {
            context,
            handlers: HashMap::new(),
            transport,
            locator,
        }
    }

    /// The context this table runs in.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Invoke `C` from this context.
    ///
    /// Runs inline when this is the native context, otherwise dispatches
    /// through the shim for this context.
    #[instrument(skip(self, args), fields(command = C::NAME, caller = %self.context))]
    pub async fn invoke<C: Command>(&self, args: C::Args) -> CoreResult<C::Output> {
        let args = serde_json::to_value(args)
            .map_err(|e| DispatchError::transport(C::NAME, format!("cannot marshal arguments: {}", e)))?;

        let value = self.call(C::NAME, args).await?;

        serde_json::from_value(value)
            .map_err(|e| DispatchError::transport(C::NAME, format!("malformed reply: {}", e)))
    }

    /// Untyped invocation by wire name.
    #[async_recursion]
    pub async fn call(&self, command: &str, args: Value) -> CoreResult<Value> {
        let spec = catalog::lookup(command)
            .ok_or_else(|| DispatchError::routing(command, self.context))?;

        if spec.native == self.context {
            return self.run_native(spec.name, args).await;
        }

        let route = spec
            .shim_for(self.context)
            .ok_or_else(|| DispatchError::routing(spec.name, self.context))?;

        let destination = self.resolve(route, spec.native).await?;

        debug!(command = spec.name, %destination, ?route, "Dispatching through shim");

        self.transport
            .round_trip(destination, Envelope::new(spec.name, args))
            .await
    }

    /// Answer an envelope delivered to this context.
    #[instrument(skip(self, envelope), fields(command = %envelope.command_name, context = %self.context))]
    pub async fn serve(&self, envelope: Envelope) -> Reply {
        let handler = catalog::lookup(&envelope.command_name)
            .filter(|spec| spec.native == self.context)
            .and_then(|spec| self.handlers.get(spec.name));

        let Some(handler) = handler else {
            warn!("Envelope for a command this context does not run");
            return Err(CommandError::UnknownCommand {
                command: envelope.command_name,
                context: self.context,
            });
        };

        let reply = match envelope.argument() {
            Ok(args) => handler.handle_value(args, self).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &reply {
            warn!(error = %e, "Native handler failed");
        }

        reply
    }

    async fn run_native(&self, command: &'static str, args: Value) -> CoreResult<Value> {
        let handler = self
            .handlers
            .get(command)
            .ok_or_else(|| DispatchError::routing(command, self.context))?;

        handler
            .handle_value(args, self)
            .await
            .map_err(|source| DispatchError::remote(command, source))
    }

    /// Address of the `native` context along `route`.
    ///
    /// Tab addresses carry the native context, so a page that does not run
    /// it is unreachable rather than handed an envelope it cannot serve.
    async fn resolve(&self, route: ShimRoute, native: ExecutionContext) -> CoreResult<Destination> {
        match route {
            ShimRoute::Background => Ok(Destination::Background),
            ShimRoute::ApplicationPage => {
                let peer = self.locator.locate().await?;
                Ok(Destination::tab(peer.tab(), native))
            }
            ShimRoute::ActiveTab => {
                let tab = self.invoke::<GetCurrentTabId>(()).await?;
                Ok(Destination::tab(tab, native))
            }
        }
    }
}
