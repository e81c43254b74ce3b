use crate::CommandError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire shape of a command invocation: `{ "commandName": ..., "args": [...] }`.
///
/// Addressing is implicit. The envelope is only ever sent to the command's
/// native context, and the transport pairs it with its reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Catalog name of the command.
    pub command_name: String,
    /// Positional arguments; empty for commands without any.
    pub args: Vec<Value>,
}

impl Envelope {
    /// Wrap a command name and its serialized argument. `null` packs to no arguments.
    pub fn new(command_name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Null => Vec::new(),
            single => vec![single],
        };

        Self {
            command_name: command_name.into(),
            args,
        }
    }

    /// The single payload a handler takes; `null` when no arguments were sent.
    pub fn argument(&self) -> Result<Value, CommandError> {
        match self.args.as_slice() {
            [] => Ok(Value::Null),
            [single] => Ok(single.clone()),
            more => Err(CommandError::Encoding {
                command: self.command_name.clone(),
                reason: format!("expected at most one argument, got {}", more.len()),
            }),
        }
    }
}

/// What the native context sends back for an envelope.
pub type Reply = Result<Value, CommandError>;
