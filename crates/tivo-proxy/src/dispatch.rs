//! Message dispatch
//!
//! Turns one decoded transport message into one response envelope:
//!
//! 1. read `cmd` (missing → `MissingCommand`, response without `cmd`)
//! 2. resolve it in the registry (miss → `UnknownCommand`)
//! 3. check `params` against the handler's declaration (`InvalidParameters`)
//! 4. run the handler and wrap its result or error
//!
//! Every failure becomes an error response; nothing here panics or aborts
//! the caller's loop.

use serde_json::Value;
use tivo_protocol::{CommandError, RequestEnvelope, ResponseEnvelope};
use tracing::{debug, info, warn};

use crate::registry::{CommandRegistry, CommandResult};

/// An object whose commands can be served over the transport
pub trait ServedObject: Sized {
    /// Build the object's command registry
    fn commands() -> CommandRegistry<Self>;
}

/// Routes request envelopes to a served object's handlers
#[derive(Debug)]
pub struct MessageDispatcher<S> {
    target: S,
    registry: CommandRegistry<S>,
}

impl<S: ServedObject> MessageDispatcher<S> {
    /// Dispatch to `target` using its own command set
    pub fn serve(target: S) -> Self {
        Self::new(target, S::commands())
    }
}

impl<S> MessageDispatcher<S> {
    /// Dispatch to `target` using an explicit registry
    pub fn new(target: S, registry: CommandRegistry<S>) -> Self {
        Self { target, registry }
    }

    /// Dispatch a decoded transport message
    pub fn dispatch(&self, message: &Value) -> ResponseEnvelope {
        self.dispatch_request(&RequestEnvelope::from_value(message))
    }

    /// Dispatch a parsed request envelope
    pub fn dispatch_request(&self, request: &RequestEnvelope) -> ResponseEnvelope {
        let Some(cmd) = request.cmd.as_deref() else {
            warn!("Rejected message without a command directive");
            return ResponseEnvelope::failure(None, &CommandError::MissingCommand);
        };

        debug!("Dispatching command {}", cmd);
        match self.execute(cmd, request) {
            Ok(result) => {
                info!("Command {} succeeded", cmd);
                ResponseEnvelope::success(cmd, result)
            }
            Err(e) => {
                info!("Command {} failed: {}", cmd, e);
                ResponseEnvelope::failure(Some(cmd.to_string()), &e)
            }
        }
    }

    fn execute(&self, cmd: &str, request: &RequestEnvelope) -> CommandResult {
        let handler = self
            .registry
            .get(cmd)
            .ok_or_else(|| CommandError::UnknownCommand(cmd.to_string()))?;
        let params = request.params()?;
        handler.invoke(&self.target, &params)
    }
}
