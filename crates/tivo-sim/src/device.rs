//! Simulated device
//!
//! Answers every session request from memory and records what was asked of
//! it, so tests can assert on exactly which keys were sent, which channel was
//! tuned and whether every session was released.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tivo_protocol::{Ack, Channel, ChannelId, DeviceError, DeviceSession, KeyEvent, SessionProvider};
use tracing::debug;

/// Something the simulated device observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// A session was opened
    SessionOpened,
    /// The lineup was requested
    ChannelSearch,
    /// A key event was attempted, with the acknowledgement given
    KeySent { event: KeyEvent, success: bool },
    /// A tune request was attempted, with the acknowledgement given
    ChannelChanged { channel_id: ChannelId, success: bool },
    /// A session was released
    SessionClosed,
}

#[derive(Debug, Default)]
struct SimState {
    events: Vec<SimEvent>,
    key_attempts: usize,
    fail_key_attempt: Option<usize>,
    fail_channel_change: bool,
    unavailable: bool,
    open_sessions: usize,
    current_channel: Option<ChannelId>,
}

/// A device that lives entirely in memory
#[derive(Debug)]
pub struct SimulatedDevice {
    lineup: Vec<Channel>,
    state: Mutex<SimState>,
}

impl SimulatedDevice {
    /// Create a device reporting `lineup` from channel searches
    pub fn new(lineup: Vec<Channel>) -> Self {
        Self {
            lineup,
            state: Mutex::new(SimState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The channel lineup this device reports
    pub fn lineup(&self) -> &[Channel] {
        &self.lineup
    }

    /// Acknowledge the `n`-th key event attempted from now on (1-based) as a failure
    pub fn fail_key_attempt(&self, n: usize) {
        let mut state = self.state();
        state.fail_key_attempt = Some(state.key_attempts + n);
    }

    /// Acknowledge tune requests as failures
    pub fn set_fail_channel_change(&self, fail: bool) {
        self.state().fail_channel_change = fail;
    }

    /// Refuse to open sessions
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// All recorded events in order
    pub fn events(&self) -> Vec<SimEvent> {
        self.state().events.clone()
    }

    /// Every key event attempted, including ones acknowledged as failures
    pub fn keys_sent(&self) -> Vec<KeyEvent> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                SimEvent::KeySent { event, .. } => Some(*event),
                _ => None,
            })
            .collect()
    }

    /// Number of sessions opened over the device's lifetime
    pub fn sessions_opened(&self) -> usize {
        self.state()
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::SessionOpened))
            .count()
    }

    /// Number of sessions currently held open
    pub fn open_sessions(&self) -> usize {
        self.state().open_sessions
    }

    /// Channel most recently tuned successfully
    pub fn current_channel(&self) -> Option<ChannelId> {
        self.state().current_channel.clone()
    }

    /// Forget all recorded events
    pub fn clear_events(&self) {
        self.state().events.clear();
    }
}

impl SessionProvider for SimulatedDevice {
    fn open_session(&self) -> Result<Box<dyn DeviceSession + '_>, DeviceError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(DeviceError::SessionUnavailable("simulated device offline".into()));
        }
        state.open_sessions += 1;
        state.events.push(SimEvent::SessionOpened);
        debug!("Simulated session opened ({} open)", state.open_sessions);
        Ok(Box::new(SimulatedSession { device: self }))
    }
}

/// A session on a [`SimulatedDevice`]
pub struct SimulatedSession<'a> {
    device: &'a SimulatedDevice,
}

impl DeviceSession for SimulatedSession<'_> {
    fn channel_search(&mut self) -> Result<Vec<Channel>, DeviceError> {
        self.device.state().events.push(SimEvent::ChannelSearch);
        Ok(self.device.lineup.clone())
    }

    fn send_key(&mut self, event: KeyEvent) -> Result<Ack, DeviceError> {
        let mut state = self.device.state();
        state.key_attempts += 1;
        let success = state.fail_key_attempt != Some(state.key_attempts);
        state.events.push(SimEvent::KeySent { event, success });
        debug!("Simulated key {} -> {}", event, success);

        Ok(if success {
            Ack::Success
        } else {
            Ack::Failure("error".into())
        })
    }

    fn change_channel(&mut self, channel_id: &ChannelId) -> Result<Ack, DeviceError> {
        let mut state = self.device.state();
        let success = !state.fail_channel_change;
        state.events.push(SimEvent::ChannelChanged {
            channel_id: channel_id.clone(),
            success,
        });
        if !success {
            return Ok(Ack::Failure("error".into()));
        }
        state.current_channel = Some(channel_id.clone());
        Ok(Ack::Success)
    }
}

impl Drop for SimulatedSession<'_> {
    fn drop(&mut self) {
        let mut state = self.device.state();
        state.open_sessions = state.open_sessions.saturating_sub(1);
        state.events.push(SimEvent::SessionClosed);
    }
}

#[cfg(test)]
mod tests {
    use tivo_protocol::RemoteKey;

    use super::*;

    #[test]
    fn test_session_released_on_drop() {
        let device = SimulatedDevice::new(Vec::new());
        {
            let _session = device.open_session().unwrap();
            assert_eq!(device.open_sessions(), 1);
        }
        assert_eq!(device.open_sessions(), 0);
        assert_eq!(
            device.events(),
            vec![SimEvent::SessionOpened, SimEvent::SessionClosed]
        );
    }

    #[test]
    fn test_injected_key_failure() {
        let device = SimulatedDevice::new(Vec::new());
        device.fail_key_attempt(2);

        let mut session = device.open_session().unwrap();
        let first = session.send_key(RemoteKey::Play.into()).unwrap();
        let second = session.send_key(RemoteKey::Pause.into()).unwrap();
        let third = session.send_key(RemoteKey::Stop.into()).unwrap();

        assert!(first.is_success());
        assert!(!second.is_success());
        assert!(third.is_success());
    }

    #[test]
    fn test_unavailable_device() {
        let device = SimulatedDevice::new(Vec::new());
        device.set_unavailable(true);

        assert!(device.open_session().is_err());
        assert_eq!(device.sessions_opened(), 0);
    }

    #[test]
    fn test_channel_change_tracks_current() {
        let device = SimulatedDevice::new(Vec::new());
        let mut session = device.open_session().unwrap();

        assert!(session.change_channel(&ChannelId::Number(3)).unwrap().is_success());
        drop(session);
        assert_eq!(device.current_channel(), Some(ChannelId::Number(3)));

        device.set_fail_channel_change(true);
        let mut session = device.open_session().unwrap();
        assert!(!session.change_channel(&ChannelId::Number(4)).unwrap().is_success());
        drop(session);
        assert_eq!(device.current_channel(), Some(ChannelId::Number(3)));
    }
}
