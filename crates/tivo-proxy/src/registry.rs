//! Command registry
//!
//! Maps command names to handlers. Each handler declares the named
//! parameters it accepts, and the registry rejects any request whose
//! parameter set does not fit that declaration before the handler runs.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use tivo_protocol::{CommandError, Params};

/// Output of a command handler
pub type CommandResult = Result<Map<String, Value>, CommandError>;

type HandlerFn<S> = Box<dyn Fn(&S, &Params) -> CommandResult + Send + Sync>;

/// Declared parameters of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameters that must be present
    pub required: &'static [&'static str],
    /// Parameters that may be present
    pub optional: &'static [&'static str],
}

impl ParamSpec {
    /// A handler that takes no parameters
    pub const NONE: ParamSpec = ParamSpec {
        required: &[],
        optional: &[],
    };

    /// Declare required and optional parameters
    pub const fn new(required: &'static [&'static str], optional: &'static [&'static str]) -> Self {
        Self { required, optional }
    }

    /// Returns true if `name` is a declared parameter
    pub fn accepts(&self, name: &str) -> bool {
        self.required.contains(&name) || self.optional.contains(&name)
    }

    /// Check that `params` supplies every required parameter and nothing
    /// undeclared
    pub fn check(&self, params: &Params) -> Result<(), CommandError> {
        let missing = self.required.iter().any(|name| !params.contains_key(*name));
        let unknown = params.keys().any(|name| !self.accepts(name));
        if missing || unknown {
            return Err(CommandError::InvalidParameters);
        }
        Ok(())
    }
}

/// A named command bound to a handler function
pub struct CommandHandler<S> {
    name: &'static str,
    params: ParamSpec,
    run: HandlerFn<S>,
}

impl<S> CommandHandler<S> {
    /// Command name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared parameters
    pub fn params(&self) -> ParamSpec {
        self.params
    }

    /// Validate `params` and run the handler against `target`
    pub fn invoke(&self, target: &S, params: &Params) -> CommandResult {
        self.params.check(params)?;
        (self.run)(target, params)
    }
}

impl<S> fmt::Debug for CommandHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("run", &"<handler>")
            .finish()
    }
}

/// Fixed set of commands, built once and looked up by exact name
pub struct CommandRegistry<S> {
    handlers: HashMap<&'static str, CommandHandler<S>>,
}

impl<S> CommandRegistry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler, replacing any earlier handler of the same name
    pub fn register<F>(&mut self, name: &'static str, params: ParamSpec, run: F) -> &mut Self
    where
        F: Fn(&S, &Params) -> CommandResult + Send + Sync + 'static,
    {
        self.handlers.insert(
            name,
            CommandHandler {
                name,
                params,
                run: Box::new(run),
            },
        );
        self
    }

    /// Look up a handler by exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&CommandHandler<S>> {
        self.handlers.get(name)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no commands are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S> Default for CommandRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for CommandRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

/// Typed access to request parameters
///
/// Optional parameters follow the requester's notion of "not supplied":
/// `null`, `false`, `0`, `""` and empty containers all count as absent.
pub mod params {
    use serde_json::Value;
    use tivo_protocol::{CommandError, Params};

    fn is_blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }

    /// A parameter that must be a string, blank or not
    pub fn required_str<'a>(params: &'a Params, name: &str) -> Result<&'a str, CommandError> {
        params
            .get(name)
            .and_then(Value::as_str)
            .ok_or(CommandError::InvalidParameters)
    }

    /// An optional string parameter
    pub fn optional_str<'a>(params: &'a Params, name: &str) -> Result<Option<&'a str>, CommandError> {
        match params.get(name) {
            None => Ok(None),
            Some(v) if is_blank(v) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(CommandError::InvalidParameters),
        }
    }

    /// An optional string-or-integer parameter, in string form
    pub fn optional_number(params: &Params, name: &str) -> Result<Option<String>, CommandError> {
        match params.get(name) {
            None => Ok(None),
            Some(v) if is_blank(v) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
            Some(_) => Err(CommandError::InvalidParameters),
        }
    }
}
