//! Rule triggers
//!
//! A trigger is the condition that starts a rule. This crate defines the
//! closed family of trigger kinds and how they are read from and written to
//! rule files.
//!
//! # Kinds
//!
//! ```text
//! BaseTrigger (PartWithOptions)
//! ├── EventTrigger        startup / shutdown
//! ├── HotkeyTrigger       keyboard chord
//! ├── DeviceEventTrigger  playback device changes
//! ├── AppEventTrigger     app audio session changes
//! └── ProcessTrigger      process start / stop
//! ```
//!
//! # Key Types
//!
//! - [`Trigger`] - One trigger of any registered kind
//! - [`TriggerKind`] - Discriminator and registration list
//! - [`Hotkey`] - Parsed keyboard chord

pub mod events;
pub mod hotkey;
pub mod kind;
pub mod trigger;

pub use events::{AudioAppEventKind, AudioDeviceEventKind, EarTrumpetEventKind, ProcessEventKind};
pub use hotkey::{Hotkey, HotkeyError, Modifiers};
pub use kind::{TriggerKind, BASE_TYPE_NAME, OPTIONS_BASE_TYPE_NAME};
pub use trigger::{
    AppEventTrigger, DeviceEventTrigger, EventTrigger, HotkeyTrigger, ProcessTrigger, Trigger,
    TriggerError, TriggerResult, EVENT_OPTION,
};
