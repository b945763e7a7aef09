//! TiVo Proxy Engine
//!
//! This crate turns messages arriving on a pub/sub channel into calls on a
//! TiVo device and publishes a response for each one.
//!
//! # Architecture
//!
//! - **Dispatch**: a [`CommandRegistry`] declares each command's parameters;
//!   the [`MessageDispatcher`] validates requests against it and wraps every
//!   outcome in a response envelope
//! - **Channel index**: three insertion-ordered views of the lineup (name,
//!   number, affiliate) with fuzzy resolution through a [`Scorer`]
//! - **Served object**: [`TivoProxy`] implements `remote_key`,
//!   `change_channel` and `pause`, opening one device session per command
//! - **Server loop**: [`ObjectServer`] consumes [`TransportEvent`]s from an
//!   async channel and tracks the connection flag
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tivo_proxy::{MessageDispatcher, ProxyConfig, TivoProxy};
//! use tivo_sim::{demo_lineup, SimulatedDevice};
//!
//! let device = Arc::new(SimulatedDevice::new(demo_lineup()));
//! let proxy = TivoProxy::start(device.clone(), &ProxyConfig::default(), false).unwrap();
//! let dispatcher = MessageDispatcher::serve(proxy);
//!
//! let resp = dispatcher.dispatch(&json!({
//!     "type": "request",
//!     "cmd": "change_channel",
//!     "params": {"channel_name": "cnn"}
//! }));
//! assert!(!resp.is_error());
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod proxy;
pub mod registry;
pub mod scorer;
pub mod server;
pub mod snapshot;
pub mod state;

pub use config::ProxyConfig;
pub use dispatch::{MessageDispatcher, ServedObject};
pub use error::{ProxyError, SnapshotError};
pub use index::{ChannelIndex, ChannelMatch, ChannelView, View, REFINERS};
pub use proxy::{TivoProxy, MATCH_THRESHOLD};
pub use registry::{CommandHandler, CommandRegistry, CommandResult, ParamSpec};
pub use scorer::Scorer;
pub use server::{ObjectServer, TransportEvent};
pub use snapshot::{load_snapshot, save_snapshot};
pub use state::{ConnectionState, Operation, StatusCategory, StatusEvent};
