//! Options payload shared by rule parts
//!
//! A part "with options" exposes a list of named, enumerated choices. Each
//! option has a fixed set of choices and exactly one selected value. The
//! choice sets are small `Copy` enums implementing [`OptionKind`].

use serde::Serialize;
use thiserror::Error;

/// Errors raised when reading or changing options
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("unknown choice '{value}' for option '{option}' (expected one of: {expected})")]
    UnknownChoice {
        option: String,
        value: String,
        expected: String,
    },
}

/// Result type for option operations
pub type OptionResult<T> = Result<T, OptionError>;

/// A closed set of choices for a single option
pub trait OptionKind: Copy + PartialEq + Sized + 'static {
    /// Every choice, in display order
    const ALL: &'static [Self];

    /// Stable wire name (snake_case)
    fn as_str(&self) -> &'static str;

    /// Human readable label
    fn display_name(&self) -> &'static str;

    /// Look up a choice by wire name, ignoring ASCII case and surrounding whitespace
    fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(value))
    }
}

/// Parse a choice for the named option, reporting the valid choices on failure
pub fn select<K: OptionKind>(option: &str, value: &str) -> OptionResult<K> {
    K::from_wire(value).ok_or_else(|| OptionError::UnknownChoice {
        option: option.to_string(),
        value: value.to_string(),
        expected: K::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// One selectable value of an option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionChoice {
    pub value: &'static str,
    pub display_name: &'static str,
}

/// An option with its choices and current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartOption {
    /// Option name used by [`PartWithOptions::set_option`]
    pub name: &'static str,
    pub display_name: &'static str,
    pub choices: Vec<OptionChoice>,
    /// Wire name of the selected choice
    pub selected: &'static str,
}

impl PartOption {
    /// Build an option from a choice set and the current selection
    pub fn of<K: OptionKind>(name: &'static str, display_name: &'static str, selected: K) -> Self {
        Self {
            name,
            display_name,
            choices: K::ALL
                .iter()
                .map(|k| OptionChoice {
                    value: k.as_str(),
                    display_name: k.display_name(),
                })
                .collect(),
            selected: selected.as_str(),
        }
    }

    /// The selected choice, if it is one of the listed choices
    pub fn selected_choice(&self) -> Option<&OptionChoice> {
        self.choices.iter().find(|c| c.value == self.selected)
    }
}

/// A rule part that carries an options payload
pub trait PartWithOptions {
    /// Every option with its current selection
    fn options(&self) -> Vec<PartOption>;

    /// Select a choice by option name and choice wire name
    fn set_option(&mut self, name: &str, value: &str) -> OptionResult<()>;

    /// Look up a single option by name
    fn option(&self, name: &str) -> Option<PartOption> {
        self.options().into_iter().find(|o| o.name == name)
    }
}
