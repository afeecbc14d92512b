//! Trigger kind registry
//!
//! The trigger family is closed: [`TriggerKind::ALL`] lists every kind the
//! serialization layer accepts. Adding a kind means adding it here, to the
//! [`Trigger`](crate::Trigger) enum, and to [`Trigger::new_default`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::trigger::{
    AppEventTrigger, DeviceEventTrigger, EventTrigger, HotkeyTrigger, ProcessTrigger, Trigger,
    TriggerError,
};

/// Type name of the abstract trigger root
pub const BASE_TYPE_NAME: &str = "BaseTrigger";

/// Type name of the options-carrying base every trigger derives from
pub const OPTIONS_BASE_TYPE_NAME: &str = "PartWithOptions";

/// Discriminator of a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Event,
    Hotkey,
    DeviceEvent,
    AppEvent,
    Process,
}

impl TriggerKind {
    /// Every registered trigger kind
    pub const ALL: [TriggerKind; 5] = [
        TriggerKind::Event,
        TriggerKind::Hotkey,
        TriggerKind::DeviceEvent,
        TriggerKind::AppEvent,
        TriggerKind::Process,
    ];

    /// Wire tag used in the `trigger` field
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Event => "event",
            TriggerKind::Hotkey => "hotkey",
            TriggerKind::DeviceEvent => "device_event",
            TriggerKind::AppEvent => "app_event",
            TriggerKind::Process => "process",
        }
    }

    /// Type name, also accepted as a wire tag
    pub fn type_name(&self) -> &'static str {
        match self {
            TriggerKind::Event => "EventTrigger",
            TriggerKind::Hotkey => "HotkeyTrigger",
            TriggerKind::DeviceEvent => "DeviceEventTrigger",
            TriggerKind::AppEvent => "AppEventTrigger",
            TriggerKind::Process => "ProcessTrigger",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TriggerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.type_name() == s)
            .ok_or_else(|| TriggerError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Trigger {
    /// Create a trigger of the given kind with every field at its default
    ///
    /// Hotkey and process triggers created this way do not pass
    /// [`Trigger::validate`] until their chord or process name is filled in.
    pub fn new_default(kind: TriggerKind) -> Trigger {
        match kind {
            TriggerKind::Event => EventTrigger::default().into(),
            TriggerKind::Hotkey => HotkeyTrigger::default().into(),
            TriggerKind::DeviceEvent => DeviceEventTrigger::default().into(),
            TriggerKind::AppEvent => AppEventTrigger::default().into(),
            TriggerKind::Process => ProcessTrigger::default().into(),
        }
    }
}
