//! Filter options: which attributes mark controls and candidates, how values
//! are split, and how filters combine.
//!
//! Options deserialize from JSON or YAML. Keys use the camel-case names of
//! the original data-attribute plugin (`targetAttributePrefix`, ...), with
//! snake-case aliases for hosts that prefer Rust naming. Every key is
//! optional and falls back to [`FilterOptions::default`].
//!
//! ```yaml
//! targetAttributePrefix: data-tag-
//! valueSeparator: "|"
//! multiFilterMode: false
//! partialMatchFlags: ""
//! ```

use serde::{Deserialize, Serialize};

use crate::{FilterMode, SiftError, EXACT};

/// Recognized configuration surface of a filtering session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// Attribute marking a control element; its value is the filter name.
    ///
    /// `<input data-filter-prefix="color">` controls the `color` filter.
    #[serde(alias = "attribute_name_prefix")]
    pub attribute_name_prefix: String,

    /// Prefix of candidate attributes; the filter name is appended.
    ///
    /// `<div data-filter-color="red,blue">` is a candidate for `color`.
    #[serde(alias = "target_attribute_prefix")]
    pub target_attribute_prefix: String,

    /// Delimiter between multiple values of one candidate attribute.
    #[serde(alias = "value_separator")]
    pub value_separator: String,

    /// `true`: filters accumulate and must all match. `false`: only the most
    /// recently changed filter is active.
    #[serde(alias = "multi_filter_mode")]
    pub multi_filter_mode: bool,

    /// Replay every control's current value when the session starts.
    #[serde(alias = "check_on_start")]
    pub check_on_start: bool,

    /// Attribute on a control naming its predicate.
    #[serde(alias = "predicate_attribute_name")]
    pub predicate_attribute_name: String,

    /// Predicate used when a control does not name one.
    #[serde(alias = "default_predicate_name")]
    pub default_predicate_name: String,

    /// Regex flags for the built-in `partial` predicate (see [`PartialFlags`]).
    #[serde(alias = "partial_match_flags")]
    pub partial_match_flags: String,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            attribute_name_prefix: "data-filter-prefix".into(),
            target_attribute_prefix: "data-filter-".into(),
            value_separator: ",".into(),
            multi_filter_mode: true,
            check_on_start: true,
            predicate_attribute_name: "data-filter-type".into(),
            default_predicate_name: EXACT.into(),
            partial_match_flags: "i".into(),
        }
    }
}

impl FilterOptions {
    /// Parse options from JSON and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] on malformed JSON or failed
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, SiftError> {
        let options: Self = serde_json::from_str(json).map_err(|e| SiftError::InvalidConfig {
            reason: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from YAML and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] on malformed YAML or failed
    /// [`validate`](Self::validate).
    pub fn from_yaml(yaml: &str) -> Result<Self, SiftError> {
        let options: Self = serde_yaml::from_str(yaml).map_err(|e| SiftError::InvalidConfig {
            reason: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Check that the options can drive a session.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] when an attribute name, prefix,
    /// the separator or the default predicate is empty, or when
    /// `partial_match_flags` contains an unknown flag.
    pub fn validate(&self) -> Result<(), SiftError> {
        let required = [
            ("attributeNamePrefix", &self.attribute_name_prefix),
            ("targetAttributePrefix", &self.target_attribute_prefix),
            ("valueSeparator", &self.value_separator),
            ("predicateAttributeName", &self.predicate_attribute_name),
            ("defaultPredicateName", &self.default_predicate_name),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(SiftError::InvalidConfig {
                    reason: format!("{key} must not be empty"),
                });
            }
        }
        PartialFlags::parse(&self.partial_match_flags)?;
        Ok(())
    }

    /// How filter updates combine under these options.
    #[must_use]
    pub fn filter_mode(&self) -> FilterMode {
        if self.multi_filter_mode {
            FilterMode::Multi
        } else {
            FilterMode::Single
        }
    }

    /// The parsed `partial_match_flags`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] on an unknown flag.
    pub fn partial_flags(&self) -> Result<PartialFlags, SiftError> {
        PartialFlags::parse(&self.partial_match_flags)
    }
}

/// Regex flags for the `partial` predicate, parsed from a flag string such as
/// `"i"` or `"im"`.
///
/// | Flag | Effect |
/// |------|--------|
/// | `i` | case-insensitive |
/// | `m` | `^`/`$` match at line boundaries |
/// | `s` | `.` matches `\n` |
/// | `x` | ignore whitespace and allow `#` comments in the pattern |
/// | `u` | accepted; patterns are always Unicode-aware |
/// | `g` | accepted; a match anywhere already satisfies the predicate |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialFlags {
    /// `i`
    pub case_insensitive: bool,
    /// `m`
    pub multi_line: bool,
    /// `s`
    pub dot_matches_new_line: bool,
    /// `x`
    pub ignore_whitespace: bool,
}

impl PartialFlags {
    /// No flags: case-sensitive, single-line.
    pub const NONE: Self = Self {
        case_insensitive: false,
        multi_line: false,
        dot_matches_new_line: false,
        ignore_whitespace: false,
    };

    /// Parse a flag string.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] naming the first unknown flag.
    pub fn parse(flags: &str) -> Result<Self, SiftError> {
        let mut parsed = Self::NONE;
        for flag in flags.chars() {
            match flag {
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_matches_new_line = true,
                'x' => parsed.ignore_whitespace = true,
                'u' | 'g' => {}
                other => {
                    return Err(SiftError::InvalidConfig {
                        reason: format!(
                            "unknown partial match flag '{other}' in \"{flags}\" (expected any of i, m, s, x, u, g)"
                        ),
                    })
                }
            }
        }
        Ok(parsed)
    }
}

impl Default for PartialFlags {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            ..Self::NONE
        }
    }
}
