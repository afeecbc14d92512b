//! References to audio endpoints and applications

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{ANY_APP, DEFAULT_DEVICE};

/// Error type for invalid device or app references
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceRefError {
    #[error("device id cannot be empty")]
    Empty,

    #[error("app id cannot be empty")]
    EmptyApp,
}

/// An audio endpoint: the default playback device or a specific device id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceRef {
    /// Whatever device is currently the default
    #[default]
    Default,
    /// A device by its endpoint id
    Id(String),
}

impl DeviceRef {
    /// Reference a device by id
    pub fn id(id: impl Into<String>) -> Result<Self, DeviceRefError> {
        id.into().parse()
    }

    /// Whether this refers to the default device
    pub fn is_default(&self) -> bool {
        matches!(self, DeviceRef::Default)
    }
}

impl FromStr for DeviceRef {
    type Err = DeviceRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DeviceRefError::Empty);
        }
        if s.eq_ignore_ascii_case(DEFAULT_DEVICE) {
            return Ok(DeviceRef::Default);
        }
        Ok(DeviceRef::Id(s.to_string()))
    }
}

impl TryFrom<String> for DeviceRef {
    type Error = DeviceRefError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DeviceRef> for String {
    fn from(device: DeviceRef) -> Self {
        device.to_string()
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRef::Default => f.write_str(DEFAULT_DEVICE),
            DeviceRef::Id(id) => f.write_str(id),
        }
    }
}

/// An application whose audio session a part refers to
///
/// Accepts either a bare app id (`"spotify.exe"`) or a mapping with
/// `app_id` and an optional `display_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AppRefRepr")]
pub struct AppRef {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AppRefRepr {
    Id(String),
    Full {
        app_id: String,
        #[serde(default)]
        display_name: Option<String>,
    },
}

impl TryFrom<AppRefRepr> for AppRef {
    type Error = DeviceRefError;

    fn try_from(repr: AppRefRepr) -> Result<Self, Self::Error> {
        let (app_id, display_name) = match repr {
            AppRefRepr::Id(id) => (id, None),
            AppRefRepr::Full {
                app_id,
                display_name,
            } => (app_id, display_name),
        };
        let app = AppRef::new(app_id)?;
        Ok(match display_name {
            Some(name) => app.with_display_name(name),
            None => app,
        })
    }
}

impl AppRef {
    /// Create an app reference from its id
    pub fn new(app_id: impl Into<String>) -> Result<Self, DeviceRefError> {
        let app_id = app_id.into().trim().to_string();
        if app_id.is_empty() {
            return Err(DeviceRefError::EmptyApp);
        }
        Ok(Self {
            app_id,
            display_name: None,
        })
    }

    /// Wildcard matching every application
    pub fn any() -> Self {
        Self {
            app_id: ANY_APP.to_string(),
            display_name: None,
        }
    }

    /// Whether this is the wildcard app
    pub fn is_any(&self) -> bool {
        self.app_id == ANY_APP
    }

    /// Set display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, falling back to the app id
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.app_id)
    }

    /// Check whether a process or session name refers to this app
    ///
    /// Comparison is case-insensitive, ignores any directory prefix and a
    /// trailing `.exe`.
    pub fn matches_name(&self, name: &str) -> bool {
        if self.is_any() {
            return true;
        }
        normalize_app_name(&self.app_id) == normalize_app_name(name)
    }
}

fn normalize_app_name(name: &str) -> String {
    let name = name.trim();
    let file = name.rsplit(['\\', '/']).next().unwrap_or(name);
    let lower = file.to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}
