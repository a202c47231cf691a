//! Target framework identifiers.
//!
//! The set of frameworks is closed: command parsing turns user input into a
//! [`Framework`] once, and everything downstream works with the enum. Manifest
//! `files` keys outside this set are dropped while deserializing.

use serde::{Deserialize, Serialize};

use crate::core::BxError;

/// A frontend framework a component can be installed for
///
/// Serializes in lowercase, matching the keys of a manifest's `files` map and
/// the per-framework directory on the registry.
///
/// ```rust
/// use bx_components::core::Framework;
///
/// let vue: Framework = "Vue".parse().unwrap();
/// assert_eq!(vue, Framework::Vue);
/// assert_eq!(vue.as_str(), "vue");
/// assert!("svelte".parse::<Framework>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Vue single-file components
    Vue,
    /// Angular components
    Angular,
}

impl Framework {
    /// Every supported framework, in prompt order.
    pub const ALL: [Self; 2] = [Self::Vue, Self::Angular];

    /// Identifier used in manifests and registry URLs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vue => "vue",
            Self::Angular => "angular",
        }
    }

    /// Human-readable name for prompts and reports
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Vue => "Vue",
            Self::Angular => "Angular",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Framework {
    type Err = BxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vue" => Ok(Self::Vue),
            "angular" => Ok(Self::Angular),
            _ => Err(BxError::UnsupportedFramework {
                framework: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("vue".parse::<Framework>().unwrap(), Framework::Vue);
        assert_eq!("ANGULAR".parse::<Framework>().unwrap(), Framework::Angular);
        assert_eq!(" Angular ".parse::<Framework>().unwrap(), Framework::Angular);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "react".parse::<Framework>().unwrap_err();
        assert_eq!(
            err,
            BxError::UnsupportedFramework {
                framework: "react".to_string()
            }
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Framework::Angular).unwrap();
        assert_eq!(json, "\"angular\"");

        let parsed: Framework = serde_json::from_str("\"vue\"").unwrap();
        assert_eq!(parsed, Framework::Vue);
    }

    #[test]
    fn test_display_matches_identifier() {
        for framework in Framework::ALL {
            assert_eq!(framework.to_string(), framework.as_str());
        }
    }
}
