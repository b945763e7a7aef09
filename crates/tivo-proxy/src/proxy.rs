//! The TiVo served object
//!
//! Owns the channel index and the device session provider, and implements
//! the three remote-control commands:
//!
//! | cmd | params |
//! |---|---|
//! | `remote_key` | `key`, optional `value` |
//! | `change_channel` | exactly one of `channel_number`, `channel_name` |
//! | `pause` | none |
//!
//! Each command opens its own device session and drops it before returning.

use serde_json::{json, Map};
use tivo_protocol::{Channel, CommandError, DeviceSession, KeyEvent, RemoteKey, SessionProvider};
use tracing::{debug, info, warn};

use crate::config::ProxyConfig;
use crate::dispatch::ServedObject;
use crate::error::ProxyError;
use crate::index::{ChannelIndex, View};
use crate::registry::{params, CommandRegistry, CommandResult, ParamSpec};
use crate::snapshot::{load_snapshot, save_snapshot};

/// Minimum fuzzy score accepted by `change_channel`
pub const MATCH_THRESHOLD: u8 = 50;

/// `remote_key` name that switches to typing the `value` string
pub const STRING_KEY: &str = "string";

/// Served object driving a TiVo through its session provider
pub struct TivoProxy {
    provider: Box<dyn SessionProvider>,
    channels: ChannelIndex,
    prefer_hd: bool,
}

impl std::fmt::Debug for TivoProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TivoProxy")
            .field("provider", &"<session provider>")
            .field("channels", &self.channels.len())
            .field("prefer_hd", &self.prefer_hd)
            .finish()
    }
}

impl TivoProxy {
    /// Create a proxy over an already filled channel index
    ///
    /// With `prefer_hd`, name resolution skips non-HD channels.
    pub fn new(
        provider: impl SessionProvider + 'static,
        channels: ChannelIndex,
        prefer_hd: bool,
    ) -> Self {
        Self {
            provider: Box::new(provider),
            channels,
            prefer_hd,
        }
    }

    /// Create a proxy, loading the channel lineup
    ///
    /// The configured snapshot is used when it exists and parses, unless
    /// `reload` is set. Otherwise the lineup is fetched from the device and,
    /// if a snapshot path is configured, written back to it.
    pub fn start(
        provider: impl SessionProvider + 'static,
        config: &ProxyConfig,
        reload: bool,
    ) -> Result<Self, ProxyError> {
        let mut channels = ChannelIndex::new(config.hd_only, config.scorer);

        let cached = match (&config.channel_cache_file, reload) {
            (Some(_), true) => {
                info!("Channel reload requested; ignoring cache");
                None
            }
            (Some(path), false) => match load_snapshot(path) {
                Ok(list) => Some(list),
                Err(e) => {
                    info!("No usable channel cache: {}", e);
                    None
                }
            },
            (None, _) => None,
        };

        match cached {
            Some(list) => {
                info!("Loaded {} channels from cache", list.len());
                channels.fill(&list);
            }
            None => {
                info!("Loading channel information from device");
                let list = {
                    let mut session = provider.open_session()?;
                    session.channel_search()?
                };
                channels.fill(&list);

                if let Some(path) = &config.channel_cache_file {
                    match save_snapshot(path, &list) {
                        Ok(()) => info!("Saved channel cache to {}", path.display()),
                        Err(e) => warn!("Failed to save channel cache: {}", e),
                    }
                }
            }
        }

        Ok(Self::new(provider, channels, config.prefer_hd))
    }

    /// The channel index
    pub fn channels(&self) -> &ChannelIndex {
        &self.channels
    }

    fn session(&self) -> Result<Box<dyn DeviceSession + '_>, CommandError> {
        Ok(self.provider.open_session()?)
    }

    /// Send a named remote key, or type `value` when `key` is `"string"`
    ///
    /// String mode sends one key event per character and stops at the first
    /// one the device does not acknowledge; keys already sent stay sent.
    pub fn remote_key(&self, key: &str, value: Option<&str>) -> CommandResult {
        debug!("remote_key {} {:?}", key, value);

        match value.filter(|_| key == STRING_KEY) {
            Some(text) => self.type_text(text)?,
            None => {
                let remote_key = RemoteKey::from_name(key)
                    .ok_or_else(|| CommandError::InvalidKey(key.to_string()))?;
                let mut session = self.session()?;
                if !session.send_key(remote_key.into())?.is_success() {
                    return Err(CommandError::Device);
                }
            }
        }

        let mut result = Map::new();
        result.insert("key".into(), json!(key));
        result.insert("status".into(), json!("success"));
        if let Some(value) = value {
            result.insert("value".into(), json!(value));
        }
        Ok(result)
    }

    fn type_text(&self, text: &str) -> Result<(), CommandError> {
        let mut session = self.session()?;
        for c in text.to_lowercase().chars() {
            let Some(event) = KeyEvent::for_char(c) else {
                continue;
            };
            if !session.send_key(event)?.is_success() {
                warn!("Device rejected {} while typing; stopping", event);
                return Err(CommandError::Device);
            }
        }
        Ok(())
    }

    /// Tune by exact channel number or by fuzzy channel/affiliate name
    pub fn change_channel(&self, number: Option<&str>, name: Option<&str>) -> CommandResult {
        let (channel, specifier, supplied) = match (number, name) {
            (Some(number), None) => (
                self.channels.get_by_number(number)?,
                "channel_number",
                number,
            ),
            (None, Some(name)) => (self.resolve_channel_name(name)?, "channel_name", name),
            _ => {
                return Err(CommandError::ConflictingParameters(
                    "Specify either channel_num or channel_name, not both.".into(),
                ))
            }
        };

        info!(
            "Changing to {} {} (channel id {})",
            channel.name, channel.channel_number, channel.channel_id
        );
        let mut session = self.session()?;
        if !session.change_channel(&channel.channel_id)?.is_success() {
            return Err(CommandError::Device);
        }

        let mut result = Map::new();
        result.insert("status".into(), json!("success"));
        result.insert(specifier.into(), json!(supplied));
        Ok(result)
    }

    /// Pick the channel a free-text name refers to
    ///
    /// The best affiliate match is used only when it scores strictly higher
    /// than the best name match; ties go to the name match.
    pub fn resolve_channel_name(&self, name: &str) -> Result<&Channel, CommandError> {
        let by_affiliate = self.channels.get_by_affiliate(name, self.prefer_hd).into_iter().next();
        let by_name = self.channels.get_by_name(name, self.prefer_hd).into_iter().next();

        let affiliate_score = by_affiliate.as_ref().map_or(0, |m| m.score);
        let name_score = by_name.as_ref().map_or(0, |m| m.score);
        debug!(
            "Best matches for {:?}: affiliate {:?}, name {:?}",
            name, by_affiliate, by_name
        );

        if affiliate_score.max(name_score) < MATCH_THRESHOLD {
            return Err(CommandError::NoGoodMatch(name.to_string()));
        }

        let (view, best) = if affiliate_score > name_score {
            (View::Affiliate, by_affiliate)
        } else {
            (View::Name, by_name)
        };
        best.and_then(|m| self.channels.view(view).get(&m.key))
            .ok_or_else(|| CommandError::NoGoodMatch(name.to_string()))
    }

    /// Send the pause key
    pub fn pause(&self) -> CommandResult {
        let mut session = self.session()?;
        if !session.send_key(RemoteKey::Pause.into())?.is_success() {
            return Err(CommandError::Device);
        }

        let mut result = Map::new();
        result.insert("status".into(), json!("success"));
        Ok(result)
    }
}

impl ServedObject for TivoProxy {
    fn commands() -> CommandRegistry<Self> {
        let mut registry: CommandRegistry<Self> = CommandRegistry::new();
        registry
            .register(
                "remote_key",
                ParamSpec::new(&["key"], &["value"]),
                |proxy, p| {
                    let key = params::required_str(p, "key")?;
                    let value = params::optional_str(p, "value")?;
                    proxy.remote_key(key, value)
                },
            )
            .register(
                "change_channel",
                ParamSpec::new(&[], &["channel_number", "channel_name"]),
                |proxy, p| {
                    let number = params::optional_number(p, "channel_number")?;
                    let name = params::optional_str(p, "channel_name")?;
                    proxy.change_channel(number.as_deref(), name)
                },
            )
            .register("pause", ParamSpec::NONE, |proxy, _| proxy.pause());
        registry
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tivo_protocol::ChannelId;
    use tivo_sim::{SimEvent, SimulatedDevice};

    use super::*;
    use crate::scorer::Scorer;

    fn lineup() -> Vec<Channel> {
        vec![
            Channel::new("ESPN", "206", "ESPN", true, 1),
            Channel::new("ESPN News", "207", "ESPN News", true, 2),
            Channel::new("WGNHD", "509", "CW", true, 3),
        ]
    }

    fn proxy_with(device: &Arc<SimulatedDevice>) -> TivoProxy {
        let index = ChannelIndex::with_channels(true, Scorer::Ratio, device.lineup());
        TivoProxy::new(device.clone(), index, false)
    }

    #[test]
    fn test_pause_sends_pause_key() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        let result = proxy_with(&device).pause().unwrap();

        assert_eq!(result["status"], "success");
        assert_eq!(device.keys_sent(), vec![KeyEvent::Key(RemoteKey::Pause)]);
        assert_eq!(device.open_sessions(), 0);
    }

    #[test]
    fn test_pause_device_failure() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        device.fail_key_attempt(1);

        assert_eq!(proxy_with(&device).pause(), Err(CommandError::Device));
        assert_eq!(device.open_sessions(), 0);
    }

    #[test]
    fn test_remote_key_named() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        let result = proxy_with(&device).remote_key("channelUp", None).unwrap();

        assert_eq!(result["key"], "channelUp");
        assert_eq!(result["status"], "success");
        assert!(result.get("value").is_none());
        assert_eq!(device.keys_sent(), vec![KeyEvent::Key(RemoteKey::ChannelUp)]);
    }

    #[test]
    fn test_remote_key_invalid() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        let proxy = proxy_with(&device);

        assert_eq!(
            proxy.remote_key("banana", None),
            Err(CommandError::InvalidKey("banana".into()))
        );
        assert_eq!(
            proxy.remote_key(STRING_KEY, None),
            Err(CommandError::InvalidKey("string".into()))
        );
        assert!(device.keys_sent().is_empty());
    }

    #[test]
    fn test_remote_key_string_mode() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        let result = proxy_with(&device).remote_key(STRING_KEY, Some("Hi 2!")).unwrap();

        assert_eq!(result["value"], "Hi 2!");
        assert_eq!(
            device.keys_sent(),
            vec![
                KeyEvent::Ascii('h' as u32),
                KeyEvent::Ascii('i' as u32),
                KeyEvent::Key(RemoteKey::Forward),
                KeyEvent::Key(RemoteKey::Num2),
            ]
        );
        assert_eq!(device.sessions_opened(), 1);
    }

    #[test]
    fn test_change_channel_by_number() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        let result = proxy_with(&device).change_channel(Some("509"), None).unwrap();

        assert_eq!(result["channel_number"], "509");
        assert!(result.get("channel_name").is_none());
        assert_eq!(device.current_channel(), Some(ChannelId::Number(3)));
    }

    #[test]
    fn test_change_channel_requires_exactly_one() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        let proxy = proxy_with(&device);

        let both = proxy.change_channel(Some("206"), Some("ESPN")).unwrap_err();
        let neither = proxy.change_channel(None, None).unwrap_err();

        assert!(both.is_invalid_parameters());
        assert!(neither.is_invalid_parameters());
        assert_eq!(
            both.to_string(),
            "Specify either channel_num or channel_name, not both."
        );
        assert_eq!(device.sessions_opened(), 0);
    }

    #[test]
    fn test_prefer_hd_skips_sd_channels() {
        let channels = vec![
            Channel::new("WGN", "9", "", false, 4),
            Channel::new("WGNHD", "509", "CW", true, 3),
        ];
        let device = Arc::new(SimulatedDevice::new(channels.clone()));
        let index = || ChannelIndex::with_channels(false, Scorer::Ratio, &channels);

        let any = TivoProxy::new(device.clone(), index(), false);
        assert_eq!(any.resolve_channel_name("WGN").unwrap().channel_number, "9");

        let hd = TivoProxy::new(device, index(), true);
        assert_eq!(hd.resolve_channel_name("WGN").unwrap().channel_number, "509");
    }

    #[test]
    fn test_change_channel_device_failure_releases_session() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        device.set_fail_channel_change(true);

        assert_eq!(
            proxy_with(&device).change_channel(Some("206"), None),
            Err(CommandError::Device)
        );
        assert_eq!(device.open_sessions(), 0);
        assert!(device
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::ChannelChanged { success: false, .. })));
    }

    #[test]
    fn test_unavailable_device_is_generic_error() {
        let device = Arc::new(SimulatedDevice::new(lineup()));
        device.set_unavailable(true);

        assert_eq!(proxy_with(&device).pause(), Err(CommandError::Device));
    }

    #[test]
    fn test_registry_contents() {
        let registry = TivoProxy::commands();
        assert_eq!(registry.names(), vec!["change_channel", "pause", "remote_key"]);
        assert_eq!(registry.get("pause").unwrap().params(), ParamSpec::NONE);
    }
}
