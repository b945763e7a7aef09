//! Channel records as reported by the device
//!
//! The field names follow the device's channel search output, which is also
//! the layout of the on-disk channel snapshot.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier the device uses to tune a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelId {
    /// Numeric identifier
    Number(u64),
    /// Textual identifier (e.g. `tivo:ch.123`)
    Text(String),
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Number(n) => write!(f, "{}", n),
            ChannelId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ChannelId {
    fn from(n: u64) -> Self {
        ChannelId::Number(n)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId::Text(s.to_string())
    }
}

/// A single entry of the device's channel lineup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Display name (call sign), e.g. `ESPNHD`
    pub name: String,
    /// Channel number, always kept in string form
    #[serde(deserialize_with = "string_or_number")]
    pub channel_number: String,
    /// Broadcast network identifier, e.g. `ESPN`
    #[serde(default)]
    pub affiliate: String,
    /// Whether the channel is broadcast in HD
    #[serde(default)]
    pub is_hdtv: bool,
    /// Identifier passed back to the device when tuning
    pub channel_id: ChannelId,
}

impl Channel {
    /// Create a channel record
    pub fn new(
        name: impl Into<String>,
        channel_number: impl Into<String>,
        affiliate: impl Into<String>,
        is_hdtv: bool,
        channel_id: impl Into<ChannelId>,
    ) -> Self {
        Self {
            name: name.into(),
            channel_number: channel_number.into(),
            affiliate: affiliate.into(),
            is_hdtv,
            channel_id: channel_id.into(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
