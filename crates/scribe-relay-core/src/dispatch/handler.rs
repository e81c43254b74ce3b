use crate::{Command, CommandError, CommandResult, CommandTable};

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

/// Native implementation of command `C`.
///
/// Handlers receive the table of the context they run in so they can invoke
/// other commands, which is how the recorder reaches settings held by the
/// application page.
#[async_trait]
pub trait NativeHandler<C: Command>: Send + Sync {
    /// Run the command.
    async fn handle(&self, args: C::Args, table: &CommandTable) -> CommandResult<C::Output>;
}

/// Object-safe form of [`NativeHandler`] working on serialized payloads.
#[async_trait]
pub(crate) trait DynHandler: Send + Sync {
    async fn handle_value(&self, args: Value, table: &CommandTable) -> CommandResult<Value>;
}

pub(crate) struct TypedHandler<C, H> {
    handler: H,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Command, H: NativeHandler<C>> TypedHandler<C, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<C: Command, H: NativeHandler<C>> DynHandler for TypedHandler<C, H> {
    async fn handle_value(&self, args: Value, table: &CommandTable) -> CommandResult<Value> {
        let args: C::Args = serde_json::from_value(args).map_err(|e| CommandError::Encoding {
            command: C::NAME.to_string(),
            reason: format!("arguments: {}", e),
        })?;

        let output = self.handler.handle(args, table).await?;

        serde_json::to_value(output).map_err(|e| CommandError::Encoding {
            command: C::NAME.to_string(),
            reason: format!("result: {}", e),
        })
    }
}
