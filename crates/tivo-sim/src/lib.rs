//! TiVo Device Simulation Library
//!
//! This crate provides an in-memory stand-in for the TiVo device client so the
//! bridge can be exercised without an appliance on the network:
//!
//! - **SimulatedDevice**: a session provider that records every key, tune and
//!   session open/close, with injectable failures
//! - **demo_lineup**: a small channel lineup for demos and tests
//!
//! # Example
//!
//! ```rust
//! use tivo_protocol::{DeviceSession, RemoteKey, SessionProvider};
//! use tivo_sim::{demo_lineup, SimulatedDevice};
//!
//! let device = SimulatedDevice::new(demo_lineup());
//! {
//!     let mut session = device.open_session().unwrap();
//!     session.send_key(RemoteKey::Pause.into()).unwrap();
//! }
//! assert_eq!(device.keys_sent().len(), 1);
//! assert_eq!(device.open_sessions(), 0);
//! ```

pub mod device;
pub mod lineup;

pub use device::{SimEvent, SimulatedDevice, SimulatedSession};
pub use lineup::demo_lineup;
