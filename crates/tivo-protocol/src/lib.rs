//! TiVo Bridge Protocol Library
//!
//! Shared types for the remote-control bridge:
//!
//! - **Channels**: lineup records in the device's own field layout
//! - **Keys**: the symbolic remote-key enumeration and single key events
//! - **Envelopes**: JSON request/response wrappers carried by the transport
//! - **Errors**: the user-facing command error taxonomy
//! - **Device**: the scoped-session traits a device client implements
//!
//! # Example
//!
//! ```rust
//! use tivo_protocol::{CommandError, RequestEnvelope, ResponseEnvelope};
//! use serde_json::json;
//!
//! let req = RequestEnvelope::from_value(&json!({"type": "request", "params": {}}));
//! assert!(req.cmd.is_none());
//!
//! let resp = ResponseEnvelope::failure(req.cmd, &CommandError::MissingCommand);
//! assert_eq!(resp.to_value()["type"], "response");
//! ```

pub mod channel;
pub mod device;
pub mod envelope;
pub mod error;
pub mod key;

pub use channel::{Channel, ChannelId};
pub use device::{Ack, DeviceSession, SessionProvider};
pub use envelope::{Params, RequestEnvelope, ResponseEnvelope};
pub use error::{CommandError, DeviceError};
pub use key::{KeyEvent, RemoteKey};
