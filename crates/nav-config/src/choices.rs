//! Closed enumerations for per-menu options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// When pages are resolved to their concrete type.
///
/// Ordered from cheapest to most expensive, so comparisons like
/// `use_specific >= UseSpecific::TopLevel` read naturally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum UseSpecific {
    /// Never resolve.
    Off = 0,
    /// Resolve single pages only where their concrete fields are needed.
    #[default]
    Auto = 1,
    /// Bulk-resolve top-level pages.
    TopLevel = 2,
    /// Bulk-resolve every page.
    Always = 3,
}

impl UseSpecific {
    /// All values in ascending order.
    pub const ALL: [Self; 4] = [Self::Off, Self::Auto, Self::TopLevel, Self::Always];

    /// Numeric value as stored and accepted on input.
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "Off (most efficient)",
            Self::Auto => "Auto",
            Self::TopLevel => "Top level",
            Self::Always => "Always (least efficient)",
        }
    }

    /// Top-level pages must be fetched as specific rows.
    #[must_use]
    pub fn requires_specific_top_level(self) -> bool {
        self >= Self::TopLevel
    }

    /// Every page must be fetched as a specific row.
    #[must_use]
    pub fn requires_specific_pages(self) -> bool {
        self == Self::Always
    }

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|v| v.value().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<i64> for UseSpecific {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|v| i64::from(v.value()) == value)
            .ok_or_else(|| ConfigError::InvalidChoice {
                field: "use_specific",
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }
}

impl FromStr for UseSpecific {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidChoice {
                field: "use_specific",
                value: s.to_owned(),
                allowed: Self::allowed(),
            })
            .and_then(Self::try_from)
    }
}

impl From<UseSpecific> for u8 {
    fn from(value: UseSpecific) -> Self {
        value.value()
    }
}

impl fmt::Display for UseSpecific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Number of menu levels to display, 1 to 5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MaxLevels(pub(crate) u8);

impl MaxLevels {
    /// Smallest value: top-level items only.
    pub const MIN: Self = Self(1);
    /// Largest accepted value.
    pub const MAX: Self = Self(5);

    /// Validate a level count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChoice`] if `levels` is outside `1..=5`.
    pub fn new(levels: i64) -> Result<Self, ConfigError> {
        match u8::try_from(levels) {
            Ok(n) if (Self::MIN.0..=Self::MAX.0).contains(&n) => Ok(Self(n)),
            _ => Err(ConfigError::InvalidChoice {
                field: "max_levels",
                value: levels.to_string(),
                allowed: Self::allowed(),
            }),
        }
    }

    /// Level count.
    #[must_use]
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    /// True for menus that only show top-level items.
    #[must_use]
    pub fn is_single_level(self) -> bool {
        self == Self::MIN
    }

    fn allowed() -> String {
        (Self::MIN.0..=Self::MAX.0)
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<i64> for MaxLevels {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for MaxLevels {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidChoice {
                field: "max_levels",
                value: s.to_owned(),
                allowed: Self::allowed(),
            })
            .and_then(Self::new)
    }
}

impl From<MaxLevels> for u8 {
    fn from(value: MaxLevels) -> Self {
        value.0
    }
}

impl fmt::Display for MaxLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_specific_ordering() {
        assert!(UseSpecific::Off < UseSpecific::Auto);
        assert!(UseSpecific::Auto < UseSpecific::TopLevel);
        assert!(UseSpecific::TopLevel < UseSpecific::Always);
    }

    #[test]
    fn test_use_specific_thresholds() {
        assert!(!UseSpecific::Auto.requires_specific_top_level());
        assert!(UseSpecific::TopLevel.requires_specific_top_level());
        assert!(UseSpecific::Always.requires_specific_top_level());

        assert!(!UseSpecific::TopLevel.requires_specific_pages());
        assert!(UseSpecific::Always.requires_specific_pages());
    }

    #[test]
    fn test_use_specific_try_from() {
        assert_eq!(UseSpecific::try_from(2).unwrap(), UseSpecific::TopLevel);
    }

    #[test]
    fn test_use_specific_invalid_lists_choices() {
        let err = UseSpecific::try_from(4).unwrap_err();

        assert_eq!(
            err.to_string(),
            "4 is not valid. The value must be one of: 0,1,2,3"
        );
    }

    #[test]
    fn test_use_specific_from_str_rejects_text() {
        let err = "always".parse::<UseSpecific>().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidChoice {
                field: "use_specific",
                ..
            }
        ));
        assert!(err.to_string().starts_with("always is not valid"));
    }

    #[test]
    fn test_max_levels_bounds() {
        assert!(MaxLevels::new(0).is_err());
        assert_eq!(MaxLevels::new(1).unwrap(), MaxLevels::MIN);
        assert_eq!(MaxLevels::new(5).unwrap(), MaxLevels::MAX);
        assert!(MaxLevels::new(6).is_err());
        assert!(MaxLevels::new(-1).is_err());
    }

    #[test]
    fn test_max_levels_invalid_lists_choices() {
        let err = "9".parse::<MaxLevels>().unwrap_err();

        assert_eq!(
            err.to_string(),
            "9 is not valid. The value must be one of: 1,2,3,4,5"
        );
    }

    #[test]
    fn test_max_levels_single_level() {
        assert!(MaxLevels::MIN.is_single_level());
        assert!(!MaxLevels::new(2).unwrap().is_single_level());
    }
}
