//! Remote-control key codes
//!
//! Key names are the device's own key-event identifiers and are matched
//! case-sensitively.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! remote_keys {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)+) => {
        /// Symbolic remote-control keys understood by the device
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum RemoteKey {
            $(
                $(#[$doc])*
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl RemoteKey {
            /// Every key in declaration order
            pub const ALL: &'static [RemoteKey] = &[$(RemoteKey::$variant,)+];

            /// The device's key-event identifier
            pub fn name(&self) -> &'static str {
                match self {
                    $(RemoteKey::$variant => $name,)+
                }
            }
        }
    };
}

remote_keys! {
    ActionA => "actionA",
    ActionB => "actionB",
    ActionC => "actionC",
    ActionD => "actionD",
    /// Skip forward
    Advance => "advance",
    Back => "back",
    ChannelDown => "channelDown",
    ChannelUp => "channelUp",
    Clear => "clear",
    Down => "down",
    Enter => "enter",
    Exit => "exit",
    /// Fast forward; also used as the "space" key in on-screen text entry
    Forward => "forward",
    Guide => "guide",
    Info => "info",
    Left => "left",
    LiveTv => "liveTv",
    Mute => "mute",
    Num0 => "num0",
    Num1 => "num1",
    Num2 => "num2",
    Num3 => "num3",
    Num4 => "num4",
    Num5 => "num5",
    Num6 => "num6",
    Num7 => "num7",
    Num8 => "num8",
    Num9 => "num9",
    Pause => "pause",
    Play => "play",
    Record => "record",
    /// Jump back a few seconds
    Replay => "replay",
    Reverse => "reverse",
    Right => "right",
    Select => "select",
    Slow => "slow",
    Stop => "stop",
    ThumbsDown => "thumbsDown",
    ThumbsUp => "thumbsUp",
    Tivo => "tivo",
    Up => "up",
    VolumeDown => "volumeDown",
    VolumeUp => "volumeUp",
    Zoom => "zoom",
}

impl RemoteKey {
    /// Look up a key by its exact key-event identifier
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Numeric key for an ASCII digit
    pub fn digit(c: char) -> Option<Self> {
        const DIGITS: [RemoteKey; 10] = [
            RemoteKey::Num0,
            RemoteKey::Num1,
            RemoteKey::Num2,
            RemoteKey::Num3,
            RemoteKey::Num4,
            RemoteKey::Num5,
            RemoteKey::Num6,
            RemoteKey::Num7,
            RemoteKey::Num8,
            RemoteKey::Num9,
        ];
        c.to_digit(10)
            .filter(|_| c.is_ascii_digit())
            .map(|d| DIGITS[d as usize])
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single key event sent to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// A symbolic remote key
    Key(RemoteKey),
    /// An `ascii` key event carrying a character code
    Ascii(u32),
}

impl KeyEvent {
    /// Key event used to type `c` into an on-screen text field
    ///
    /// Letters become `ascii` events, ASCII digits their numeric key and a
    /// space the `forward` key. Any other character has no key and yields
    /// `None`.
    pub fn for_char(c: char) -> Option<Self> {
        if c.is_alphabetic() {
            Some(KeyEvent::Ascii(c as u32))
        } else if let Some(key) = RemoteKey::digit(c) {
            Some(KeyEvent::Key(key))
        } else if c == ' ' {
            Some(KeyEvent::Key(RemoteKey::Forward))
        } else {
            None
        }
    }
}

impl From<RemoteKey> for KeyEvent {
    fn from(key: RemoteKey) -> Self {
        KeyEvent::Key(key)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Key(key) => write!(f, "{}", key),
            KeyEvent::Ascii(code) => write!(f, "ascii({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(RemoteKey::from_name("pause"), Some(RemoteKey::Pause));
        assert_eq!(RemoteKey::from_name("liveTv"), Some(RemoteKey::LiveTv));
        assert_eq!(RemoteKey::from_name("Pause"), None);
        assert_eq!(RemoteKey::from_name("string"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for key in RemoteKey::ALL {
            assert_eq!(RemoteKey::from_name(key.name()), Some(*key));
        }
    }

    #[test]
    fn test_serde_uses_device_names() {
        let json = serde_json::to_string(&RemoteKey::ChannelUp).unwrap();
        assert_eq!(json, "\"channelUp\"");
    }

    #[test]
    fn test_char_mapping() {
        assert_eq!(KeyEvent::for_char('a'), Some(KeyEvent::Ascii(97)));
        assert_eq!(KeyEvent::for_char('7'), Some(KeyEvent::Key(RemoteKey::Num7)));
        assert_eq!(KeyEvent::for_char(' '), Some(KeyEvent::Key(RemoteKey::Forward)));
        assert_eq!(KeyEvent::for_char('-'), None);
        assert_eq!(KeyEvent::for_char('\u{b2}'), None);
    }
}
