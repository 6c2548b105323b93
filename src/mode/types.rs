use std::fmt;

/// How a channel mode letter consumes arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeClass {
    /// List mode (e.g. ban mask); argument when set and unset.
    A,
    /// Setting with a parameter (e.g. key); argument when set and unset.
    B,
    /// Setting with a parameter only when set (e.g. user limit).
    C,
    /// Flag; never an argument.
    D,
    /// Status mode from `PREFIX` (e.g. op); argument is a nick.
    Status,
}

impl ModeClass {
    /// Whether a letter of this class consumes an argument.
    pub fn takes_arg(self, enabled: bool) -> bool {
        match self {
            ModeClass::A | ModeClass::B | ModeClass::Status => true,
            ModeClass::C => enabled,
            ModeClass::D => false,
        }
    }
}

/// A single expanded mode change.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    /// `true` for `+`, `false` for `-`.
    pub enabled: bool,
    /// The mode letter.
    pub mode: char,
    /// Argument consumed by this letter, if its class takes one.
    pub arg: Option<String>,
}

impl ModeChange {
    pub fn new(enabled: bool, mode: char, arg: Option<&str>) -> Self {
        ModeChange {
            enabled,
            mode,
            arg: arg.map(str::to_owned),
        }
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.enabled { '+' } else { '-' };
        match &self.arg {
            Some(arg) => write!(f, "{}{} {}", sign, self.mode, arg),
            None => write!(f, "{}{}", sign, self.mode),
        }
    }
}
