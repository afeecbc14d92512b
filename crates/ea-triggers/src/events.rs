//! Event kinds selectable through a trigger's options

use ea_core::OptionKind;
use serde::{Deserialize, Serialize};

/// Lifecycle events of the mixer application itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarTrumpetEventKind {
    #[default]
    Startup,
    Shutdown,
}

impl OptionKind for EarTrumpetEventKind {
    const ALL: &'static [Self] = &[Self::Startup, Self::Shutdown];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Startup => "Startup",
            Self::Shutdown => "Shutdown",
        }
    }
}

impl EarTrumpetEventKind {
    pub(crate) fn phrase(&self) -> &'static str {
        match self {
            Self::Startup => "starts",
            Self::Shutdown => "shuts down",
        }
    }
}

/// Changes to a playback device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDeviceEventKind {
    #[default]
    Added,
    Removed,
    BecomingDefault,
    LeavingDefault,
    Muted,
    Unmuted,
}

impl OptionKind for AudioDeviceEventKind {
    const ALL: &'static [Self] = &[
        Self::Added,
        Self::Removed,
        Self::BecomingDefault,
        Self::LeavingDefault,
        Self::Muted,
        Self::Unmuted,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::BecomingDefault => "becoming_default",
            Self::LeavingDefault => "leaving_default",
            Self::Muted => "muted",
            Self::Unmuted => "unmuted",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::BecomingDefault => "Becoming default",
            Self::LeavingDefault => "Leaving default",
            Self::Muted => "Muted",
            Self::Unmuted => "Unmuted",
        }
    }
}

impl AudioDeviceEventKind {
    pub(crate) fn phrase(&self) -> &'static str {
        match self {
            Self::Added => "is added",
            Self::Removed => "is removed",
            Self::BecomingDefault => "becomes the default",
            Self::LeavingDefault => "stops being the default",
            Self::Muted => "is muted",
            Self::Unmuted => "is unmuted",
        }
    }
}

/// Changes to an application's audio session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioAppEventKind {
    #[default]
    Added,
    Removed,
    PlayingSound,
    NotPlayingSound,
    Muted,
    Unmuted,
}

impl OptionKind for AudioAppEventKind {
    const ALL: &'static [Self] = &[
        Self::Added,
        Self::Removed,
        Self::PlayingSound,
        Self::NotPlayingSound,
        Self::Muted,
        Self::Unmuted,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::PlayingSound => "playing_sound",
            Self::NotPlayingSound => "not_playing_sound",
            Self::Muted => "muted",
            Self::Unmuted => "unmuted",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::PlayingSound => "Playing sound",
            Self::NotPlayingSound => "Not playing sound",
            Self::Muted => "Muted",
            Self::Unmuted => "Unmuted",
        }
    }
}

impl AudioAppEventKind {
    pub(crate) fn phrase(&self) -> &'static str {
        match self {
            Self::Added => "opens an audio session",
            Self::Removed => "closes its audio session",
            Self::PlayingSound => "starts playing sound",
            Self::NotPlayingSound => "stops playing sound",
            Self::Muted => "is muted",
            Self::Unmuted => "is unmuted",
        }
    }
}

/// Process lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessEventKind {
    #[default]
    Started,
    Stopped,
}

impl OptionKind for ProcessEventKind {
    const ALL: &'static [Self] = &[Self::Started, Self::Stopped];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Stopped => "stopped",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::Stopped => "Stopped",
        }
    }
}

impl ProcessEventKind {
    pub(crate) fn phrase(&self) -> &'static str {
        match self {
            Self::Started => "starts",
            Self::Stopped => "stops",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The wire names used by OptionKind must agree with serde's names
    fn assert_wire_names_match_serde<K>()
    where
        K: OptionKind + Serialize + std::fmt::Debug,
    {
        for kind in K::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::json!(kind.as_str()), "{:?}", kind);
        }
    }

    #[test]
    fn test_wire_names_match_serde() {
        assert_wire_names_match_serde::<EarTrumpetEventKind>();
        assert_wire_names_match_serde::<AudioDeviceEventKind>();
        assert_wire_names_match_serde::<AudioAppEventKind>();
        assert_wire_names_match_serde::<ProcessEventKind>();
    }

    #[test]
    fn test_defaults_are_first_choice() {
        assert_eq!(EarTrumpetEventKind::ALL[0], EarTrumpetEventKind::default());
        assert_eq!(AudioDeviceEventKind::ALL[0], AudioDeviceEventKind::default());
        assert_eq!(AudioAppEventKind::ALL[0], AudioAppEventKind::default());
        assert_eq!(ProcessEventKind::ALL[0], ProcessEventKind::default());
    }

    #[test]
    fn test_from_wire() {
        assert_eq!(
            AudioAppEventKind::from_wire("Playing_Sound"),
            Some(AudioAppEventKind::PlayingSound)
        );
        assert_eq!(AudioDeviceEventKind::from_wire("plugged"), None);
    }
}
