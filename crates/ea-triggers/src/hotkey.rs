//! Hotkey chords
//!
//! A chord is a set of modifiers plus exactly one key, written as
//! `Ctrl+Alt+M`. The canonical form lists modifiers in the order
//! Ctrl, Alt, Shift, Win.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a chord
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("hotkey cannot be empty")]
    Empty,

    #[error("hotkey '{0}' has no key, only modifiers")]
    MissingKey(String),

    #[error("hotkey '{chord}' has more than one key ('{first}' and '{second}')")]
    MultipleKeys {
        chord: String,
        first: String,
        second: String,
    },

    #[error("hotkey '{chord}' repeats modifier '{modifier}'")]
    DuplicateModifier { chord: String, modifier: String },

    #[error("hotkey '{0}' has an empty segment")]
    EmptySegment(String),
}

/// Modifier keys held while pressing the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub win: bool,
}

impl Modifiers {
    /// Whether no modifier is held
    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.win)
    }

    /// Number of held modifiers
    pub fn count(&self) -> usize {
        [self.ctrl, self.alt, self.shift, self.win]
            .iter()
            .filter(|m| **m)
            .count()
    }

    /// Set the flag matching a modifier alias; returns None for non-modifiers
    /// and Some(false) when the modifier was already set.
    fn insert(&mut self, alias: &str) -> Option<bool> {
        let flag = match alias.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => &mut self.ctrl,
            "alt" => &mut self.alt,
            "shift" => &mut self.shift,
            "win" | "windows" | "super" | "meta" => &mut self.win,
            _ => return None,
        };
        let fresh = !*flag;
        *flag = true;
        Some(fresh)
    }
}

/// A keyboard chord
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hotkey {
    pub modifiers: Modifiers,
    key: String,
}

impl Hotkey {
    /// Create a chord from modifiers and a key name
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Result<Self, HotkeyError> {
        let key = canonical_key(key.into().trim());
        if key.is_empty() {
            return Err(HotkeyError::MissingKey(
                Hotkey {
                    modifiers,
                    key: String::new(),
                }
                .to_string(),
            ));
        }
        Ok(Self { modifiers, key })
    }

    /// The non-modifier key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the chord has a key
    ///
    /// Always true for parsed chords; false only for the placeholder
    /// produced by [`Hotkey::unset`].
    pub fn is_set(&self) -> bool {
        !self.key.is_empty()
    }

    /// Placeholder chord used by freshly created hotkey triggers
    pub fn unset() -> Self {
        Self {
            modifiers: Modifiers::default(),
            key: String::new(),
        }
    }
}

impl Default for Hotkey {
    fn default() -> Self {
        Self::unset()
    }
}

/// Single letters and digits are upper-cased, named keys keep their spelling
fn canonical_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_uppercase().collect(),
        _ => key.to_string(),
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chord = s.trim();
        if chord.is_empty() {
            return Err(HotkeyError::Empty);
        }

        // "Ctrl++" binds the plus key
        let (body, plus_key) = match chord.strip_suffix("++") {
            Some(rest) => (rest, true),
            None => (chord, false),
        };

        let mut modifiers = Modifiers::default();
        let mut key: Option<String> = plus_key.then(|| "+".to_string());

        for part in body.split('+').map(str::trim) {
            if part.is_empty() {
                if body.is_empty() && plus_key {
                    continue;
                }
                return Err(HotkeyError::EmptySegment(chord.to_string()));
            }
            match modifiers.insert(part) {
                Some(true) => {}
                Some(false) => {
                    return Err(HotkeyError::DuplicateModifier {
                        chord: chord.to_string(),
                        modifier: part.to_string(),
                    })
                }
                None => {
                    if let Some(first) = key.take() {
                        return Err(HotkeyError::MultipleKeys {
                            chord: chord.to_string(),
                            first,
                            second: part.to_string(),
                        });
                    }
                    key = Some(part.to_string());
                }
            }
        }

        match key {
            Some(key) => Hotkey::new(modifiers, key),
            None => Err(HotkeyError::MissingKey(chord.to_string())),
        }
    }
}

/// An empty string deserializes to the unset placeholder so freshly created
/// triggers survive a save/load cycle; `Trigger::validate` rejects it.
impl TryFrom<String> for Hotkey {
    type Error = HotkeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().is_empty() {
            return Ok(Hotkey::unset());
        }
        s.parse()
    }
}

impl From<Hotkey> for String {
    fn from(hotkey: Hotkey) -> Self {
        hotkey.to_string()
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.modifiers.ctrl, "Ctrl"),
            (self.modifiers.alt, "Alt"),
            (self.modifiers.shift, "Shift"),
            (self.modifiers.win, "Win"),
        ];
        for (_, name) in names.iter().filter(|(held, _)| *held) {
            write!(f, "{}+", name)?;
        }
        f.write_str(&self.key)
    }
}
