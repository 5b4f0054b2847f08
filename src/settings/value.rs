//! Setting values and their legal domains

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::ValidationError;

lazy_static! {
    static ref HOSTNAME_PATTERN: Regex = Regex::new(
        r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$"
    )
    .expect("hostname pattern");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(true) => write!(f, "on"),
            SettingValue::Bool(false) => write!(f, "off"),
            SettingValue::Int(value) => write!(f, "{value}"),
            SettingValue::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Compile-time default for a setting, used when the device state cannot
/// be read.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Text(&'static str),
}

impl DefaultValue {
    pub fn to_value(self) -> SettingValue {
        match self {
            DefaultValue::Bool(value) => SettingValue::Bool(value),
            DefaultValue::Int(value) => SettingValue::Int(value),
            DefaultValue::Text(value) => SettingValue::Text(value.to_string()),
        }
    }
}

/// The legal range/set of values for a setting.
#[derive(Debug, Clone, Copy)]
pub enum ValueDomain {
    /// on/off
    Toggle,
    /// One of a fixed list of integers (e.g. rotation degrees)
    OneOf(&'static [i64]),
    /// A bounded integer range, inclusive on both ends
    IntRange { min: i64, max: i64 },
    /// A DNS-style host name label sequence
    Hostname,
}

impl ValueDomain {
    pub fn validate(&self, id: &str, value: &SettingValue) -> Result<(), ValidationError> {
        match (self, value) {
            (ValueDomain::Toggle, SettingValue::Bool(_)) => Ok(()),
            (ValueDomain::OneOf(allowed), SettingValue::Int(v)) => {
                if allowed.contains(v) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        id,
                        format!("{v} is not one of {allowed:?}"),
                    ))
                }
            }
            (ValueDomain::IntRange { min, max }, SettingValue::Int(v)) => {
                if (*min..=*max).contains(v) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        id,
                        format!("{v} is outside {min}..={max}"),
                    ))
                }
            }
            (ValueDomain::Hostname, SettingValue::Text(v)) => {
                if !v.is_empty() && HOSTNAME_PATTERN.is_match(v) {
                    Ok(())
                } else {
                    Err(ValidationError::new(id, format!("'{v}' is not a valid hostname")))
                }
            }
            _ => Err(ValidationError::new(
                id,
                "value type does not match the setting".to_string(),
            )),
        }
    }

    /// Human-readable description of the legal values, for prompts.
    pub fn describe(&self) -> String {
        match self {
            ValueDomain::Toggle => "on/off".to_string(),
            ValueDomain::OneOf(allowed) => allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            ValueDomain::IntRange { min, max } => format!("{min}-{max}"),
            ValueDomain::Hostname => "letters, digits and dashes".to_string(),
        }
    }
}
