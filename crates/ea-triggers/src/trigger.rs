//! Trigger types
//!
//! A trigger names the condition that starts a rule. The family is closed:
//! exactly five kinds exist and the `trigger` tag selects one of them when a
//! rule file is read. Each kind also accepts its type name (`HotkeyTrigger`,
//! ...) as the tag.
//!
//! Triggers are plain data. Nothing here watches devices, captures keys or
//! decides when a trigger fires.

use ea_core::{
    select, AppRef, DeviceRef, OptionError, OptionResult, PartOption, PartWithOptions,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::events::{AudioAppEventKind, AudioDeviceEventKind, EarTrumpetEventKind, ProcessEventKind};
use crate::hotkey::{Hotkey, HotkeyError};
use crate::kind::TriggerKind;

/// Name of the option selecting which event a trigger reacts to
pub const EVENT_OPTION: &str = "event";

/// Trigger errors
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Invalid trigger configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown trigger kind: {0}")]
    UnknownKind(String),

    #[error("Invalid hotkey: {0}")]
    Hotkey(#[from] HotkeyError),

    #[error("Invalid option: {0}")]
    Option(#[from] OptionError),
}

/// Result type for trigger operations
pub type TriggerResult<T> = Result<T, TriggerError>;

/// Trigger definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires on application startup or shutdown
    #[serde(alias = "EventTrigger")]
    Event(EventTrigger),

    /// Fires when a keyboard chord is pressed
    #[serde(alias = "HotkeyTrigger")]
    Hotkey(HotkeyTrigger),

    /// Fires when a playback device changes
    #[serde(alias = "DeviceEventTrigger")]
    DeviceEvent(DeviceEventTrigger),

    /// Fires when an application's audio session changes
    #[serde(alias = "AppEventTrigger")]
    AppEvent(AppEventTrigger),

    /// Fires when a process starts or stops
    #[serde(alias = "ProcessTrigger")]
    Process(ProcessTrigger),
}

impl Trigger {
    /// Get the trigger's discriminator
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Event(_) => TriggerKind::Event,
            Trigger::Hotkey(_) => TriggerKind::Hotkey,
            Trigger::DeviceEvent(_) => TriggerKind::DeviceEvent,
            Trigger::AppEvent(_) => TriggerKind::AppEvent,
            Trigger::Process(_) => TriggerKind::Process,
        }
    }

    /// Get the trigger's ID if set
    pub fn id(&self) -> Option<&str> {
        match self {
            Trigger::Event(t) => t.id.as_deref(),
            Trigger::Hotkey(t) => t.id.as_deref(),
            Trigger::DeviceEvent(t) => t.id.as_deref(),
            Trigger::AppEvent(t) => t.id.as_deref(),
            Trigger::Process(t) => t.id.as_deref(),
        }
    }

    /// Get the type name of the concrete trigger
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// The chord of a hotkey trigger
    pub fn hotkey(&self) -> Option<&Hotkey> {
        match self {
            Trigger::Hotkey(t) => Some(&t.hotkey),
            _ => None,
        }
    }

    /// Check that the trigger is complete enough to be stored in a rule
    pub fn validate(&self) -> TriggerResult<()> {
        match self {
            Trigger::Hotkey(t) if !t.hotkey.is_set() => Err(TriggerError::InvalidConfig(
                "hotkey trigger has no key".to_string(),
            )),
            Trigger::Process(t) => validate_process_name(&t.process_name),
            _ => Ok(()),
        }
    }

    fn as_part(&self) -> &dyn PartWithOptions {
        match self {
            Trigger::Event(t) => t,
            Trigger::Hotkey(t) => t,
            Trigger::DeviceEvent(t) => t,
            Trigger::AppEvent(t) => t,
            Trigger::Process(t) => t,
        }
    }

    fn as_part_mut(&mut self) -> &mut dyn PartWithOptions {
        match self {
            Trigger::Event(t) => t,
            Trigger::Hotkey(t) => t,
            Trigger::DeviceEvent(t) => t,
            Trigger::AppEvent(t) => t,
            Trigger::Process(t) => t,
        }
    }
}

impl PartWithOptions for Trigger {
    fn options(&self) -> Vec<PartOption> {
        self.as_part().options()
    }

    fn set_option(&mut self, name: &str, value: &str) -> OptionResult<()> {
        let kind = self.kind();
        self.as_part_mut().set_option(name, value)?;
        debug!("Set option {}={} on {} trigger", name, value, kind);
        Ok(())
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Event(t) => write!(f, "when EarTrumpet {}", t.event.phrase()),
            Trigger::Hotkey(t) if t.hotkey.is_set() => write!(f, "when {} is pressed", t.hotkey),
            Trigger::Hotkey(_) => f.write_str("when an unassigned hotkey is pressed"),
            Trigger::DeviceEvent(t) => write!(f, "when device {} {}", t.device, t.event.phrase()),
            Trigger::AppEvent(t) => write!(
                f,
                "when {} on device {} {}",
                t.app.label(),
                t.device,
                t.event.phrase()
            ),
            Trigger::Process(t) => {
                write!(f, "when process {} {}", t.process_name, t.event.phrase())
            }
        }
    }
}

fn validate_process_name(name: &str) -> TriggerResult<()> {
    if name.trim().is_empty() {
        return Err(TriggerError::InvalidConfig(
            "process trigger has no process name".to_string(),
        ));
    }
    if name.contains(['\\', '/']) {
        return Err(TriggerError::InvalidConfig(format!(
            "process name '{}' must not contain a path",
            name
        )));
    }
    Ok(())
}

fn unknown_option(name: &str) -> OptionError {
    OptionError::UnknownOption(name.to_string())
}

/// Application lifecycle trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventTrigger {
    /// Optional trigger ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Startup or shutdown
    #[serde(default, alias = "option")]
    pub event: EarTrumpetEventKind,
}

impl PartWithOptions for EventTrigger {
    fn options(&self) -> Vec<PartOption> {
        vec![PartOption::of(EVENT_OPTION, "Event", self.event)]
    }

    fn set_option(&mut self, name: &str, value: &str) -> OptionResult<()> {
        match name {
            EVENT_OPTION => self.event = select(name, value)?,
            _ => return Err(unknown_option(name)),
        }
        Ok(())
    }
}

/// Hotkey trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotkeyTrigger {
    /// Optional trigger ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Chord, e.g. "Ctrl+Alt+M"
    pub hotkey: Hotkey,
}

impl HotkeyTrigger {
    /// Create a hotkey trigger from a chord string
    pub fn parse(chord: &str) -> TriggerResult<Self> {
        Ok(Self {
            id: None,
            hotkey: chord.parse()?,
        })
    }
}

/// Hotkey triggers carry no enumerated options; the chord is their payload.
impl PartWithOptions for HotkeyTrigger {
    fn options(&self) -> Vec<PartOption> {
        Vec::new()
    }

    fn set_option(&mut self, name: &str, _value: &str) -> OptionResult<()> {
        Err(unknown_option(name))
    }
}

/// Playback device trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceEventTrigger {
    /// Optional trigger ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Device to watch ("default" for the current default device)
    #[serde(default)]
    pub device: DeviceRef,

    /// Device change to react to
    #[serde(default, alias = "option")]
    pub event: AudioDeviceEventKind,
}

impl PartWithOptions for DeviceEventTrigger {
    fn options(&self) -> Vec<PartOption> {
        vec![PartOption::of(EVENT_OPTION, "Device event", self.event)]
    }

    fn set_option(&mut self, name: &str, value: &str) -> OptionResult<()> {
        match name {
            EVENT_OPTION => self.event = select(name, value)?,
            _ => return Err(unknown_option(name)),
        }
        Ok(())
    }
}

/// Application audio session trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppEventTrigger {
    /// Optional trigger ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Device the app plays on
    #[serde(default)]
    pub device: DeviceRef,

    /// Application to watch
    pub app: AppRef,

    /// Session change to react to
    #[serde(default, alias = "option")]
    pub event: AudioAppEventKind,
}

impl Default for AppEventTrigger {
    fn default() -> Self {
        Self {
            id: None,
            device: DeviceRef::Default,
            app: AppRef::any(),
            event: AudioAppEventKind::default(),
        }
    }
}

impl PartWithOptions for AppEventTrigger {
    fn options(&self) -> Vec<PartOption> {
        vec![PartOption::of(EVENT_OPTION, "App event", self.event)]
    }

    fn set_option(&mut self, name: &str, value: &str) -> OptionResult<()> {
        match name {
            EVENT_OPTION => self.event = select(name, value)?,
            _ => return Err(unknown_option(name)),
        }
        Ok(())
    }
}

/// Process lifecycle trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessTrigger {
    /// Optional trigger ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Executable name, e.g. "obs64.exe"
    #[serde(default)]
    pub process_name: String,

    /// Started or stopped
    #[serde(default, alias = "option")]
    pub event: ProcessEventKind,
}

impl PartWithOptions for ProcessTrigger {
    fn options(&self) -> Vec<PartOption> {
        vec![PartOption::of(EVENT_OPTION, "Process event", self.event)]
    }

    fn set_option(&mut self, name: &str, value: &str) -> OptionResult<()> {
        match name {
            EVENT_OPTION => self.event = select(name, value)?,
            _ => return Err(unknown_option(name)),
        }
        Ok(())
    }
}

impl From<EventTrigger> for Trigger {
    fn from(t: EventTrigger) -> Self {
        Trigger::Event(t)
    }
}

impl From<HotkeyTrigger> for Trigger {
    fn from(t: HotkeyTrigger) -> Self {
        Trigger::Hotkey(t)
    }
}

impl From<DeviceEventTrigger> for Trigger {
    fn from(t: DeviceEventTrigger) -> Self {
        Trigger::DeviceEvent(t)
    }
}

impl From<AppEventTrigger> for Trigger {
    fn from(t: AppEventTrigger) -> Self {
        Trigger::AppEvent(t)
    }
}

impl From<ProcessTrigger> for Trigger {
    fn from(t: ProcessTrigger) -> Self {
        Trigger::Process(t)
    }
}
