//! Core types for EarTrumpet Actions
//!
//! This crate provides the building blocks shared by every rule part:
//! the options payload carried by triggers (`PartWithOptions`) and the
//! references to audio endpoints and applications that parts point at.

mod device;
mod options;

pub use device::{AppRef, DeviceRef, DeviceRefError};
pub use options::{
    select, OptionChoice, OptionError, OptionKind, OptionResult, PartOption, PartWithOptions,
};

/// Wire name of the default playback device
pub const DEFAULT_DEVICE: &str = "default";

/// App id matching every application
pub const ANY_APP: &str = "*";
