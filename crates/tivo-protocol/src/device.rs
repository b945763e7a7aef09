//! Device client contract
//!
//! The bridge never talks to the appliance directly. It opens a scoped
//! session through a [`SessionProvider`] for each command and drops it when
//! the command finishes; dropping the session releases it, so release also
//! happens on every early return.

use std::sync::Arc;

use crate::channel::{Channel, ChannelId};
use crate::error::DeviceError;
use crate::key::KeyEvent;

/// Acknowledgement returned by the device for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// The device reported success
    Success,
    /// The device reported failure, with its response type
    Failure(String),
}

impl Ack {
    /// Returns true if the device reported success
    pub fn is_success(&self) -> bool {
        matches!(self, Ack::Success)
    }
}

/// An open session with the device
pub trait DeviceSession {
    /// Fetch the complete channel lineup
    fn channel_search(&mut self) -> Result<Vec<Channel>, DeviceError>;

    /// Send a single key event
    fn send_key(&mut self, event: KeyEvent) -> Result<Ack, DeviceError>;

    /// Tune to the given channel
    fn change_channel(&mut self, channel_id: &ChannelId) -> Result<Ack, DeviceError>;
}

/// Source of device sessions
pub trait SessionProvider: Send + Sync {
    /// Open a new session; it is released when the returned box is dropped
    fn open_session(&self) -> Result<Box<dyn DeviceSession + '_>, DeviceError>;
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn open_session(&self) -> Result<Box<dyn DeviceSession + '_>, DeviceError> {
        (**self).open_session()
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for Box<T> {
    fn open_session(&self) -> Result<Box<dyn DeviceSession + '_>, DeviceError> {
        (**self).open_session()
    }
}
