//! The key=value configuration layer.
//!
//! Configuration files are line-oriented: each non-empty line holds one
//! `key=value` pair. Anything after `#` is a comment, and whitespace
//! (spaces, tabs, carriage returns) is stripped before parsing, so layout
//! strings must encode structure in non-blank characters. Lines that fail to
//! parse are warned about and skipped; values that fail a *typed* read are
//! configuration errors and abort the run.
//!
//! Keys the agent itself consumes are documented on
//! [`crate::config::AgentConfig`] and [`crate::run`]; anything else passes
//! through untouched to the chosen environment.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// An ordered map of raw configuration options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    map: BTreeMap<String, String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// The driver's baseline: values present before the configuration file
    /// is read, which the file may override.
    pub fn with_defaults() -> Self {
        let mut options = Self::new();
        options.set("ct-depth", "30");
        options.set("agent-horizon", "5");
        options.set("mc-simulations", "300");
        options.set("exploration", "0.0");
        options.set("explore-decay", "1.0");
        options
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// The raw string value of an option, if present.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `key=value` lines into this option set. Malformed lines are
    /// skipped with a warning, matching the file format's contract.
    pub fn parse_lines(&mut self, text: &str) {
        for (index, raw_line) in text.lines().enumerate() {
            let lineno = index + 1;

            // Strip comments, then all whitespace.
            let line = raw_line.split('#').next().unwrap_or("");
            let line: String = line.chars().filter(|c| !matches!(c, ' ' | '\t' | '\r')).collect();
            if line.is_empty() {
                continue;
            }

            match line.split_once('=') {
                None => warn!(lineno, "skipping configuration line (no '=')"),
                Some(("", _)) => warn!(lineno, "skipping configuration line (no key)"),
                Some((_, "")) => warn!(lineno, "skipping configuration line (no value)"),
                Some((key, value)) => self.set(key, value),
            }
        }
    }

    /// A typed read of an optional option. `Ok(None)` when absent; an error
    /// when present but unparseable.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|e: T::Err| {
                ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            }),
        }
    }

    /// A typed read with a default for absent keys.
    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// A typed read of a required option.
    pub fn require<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)?
            .ok_or_else(|| ConfigError::MissingOption(key.to_string()))
    }

    /// A boolean read accepting `true`/`false` and `1`/`0`.
    pub fn get_flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.map.get(key).map(String::as_str) {
            None => Ok(default),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(other) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
                reason: "expected true/false".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_pairs() {
        let mut options = Options::new();
        options.parse_lines("environment=coin-flip\nct-depth=8\n");
        assert_eq!(options.raw("environment"), Some("coin-flip"));
        assert_eq!(options.require::<usize>("ct-depth").unwrap(), 8);
    }

    #[test]
    fn strips_comments_and_whitespace() {
        let mut options = Options::new();
        options.parse_lines("  agent-horizon = 6  # planning depth\r\n# full-line comment\n");
        assert_eq!(options.require::<u64>("agent-horizon").unwrap(), 6);
        assert!(!options.contains("#full-linecomment"));
    }

    #[test]
    fn skips_malformed_lines() {
        let mut options = Options::new();
        options.parse_lines("novalue=\n=nokey\njunk\ngood=1\n");
        assert!(!options.contains("novalue"));
        assert!(!options.contains("junk"));
        assert_eq!(options.raw("good"), Some("1"));
    }

    #[test]
    fn later_lines_override_earlier() {
        let mut options = Options::with_defaults();
        assert_eq!(options.raw("ct-depth"), Some("30"));
        options.parse_lines("ct-depth=4\n");
        assert_eq!(options.require::<usize>("ct-depth").unwrap(), 4);
    }

    #[test]
    fn value_may_contain_equals() {
        let mut options = Options::new();
        options.parse_lines("formula=a=b\n");
        assert_eq!(options.raw("formula"), Some("a=b"));
    }

    #[test]
    fn typed_read_of_garbage_is_an_error() {
        let mut options = Options::new();
        options.parse_lines("mc-simulations=many\n");
        let err = options.require::<u64>("mc-simulations").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let options = Options::new();
        let err = options.require::<u64>("ct-depth").unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption(_)));
    }

    #[test]
    fn flags_accept_numeric_and_named_forms() {
        let mut options = Options::new();
        options.parse_lines("verbose=1\nquiet=false\n");
        assert!(options.get_flag("verbose", false).unwrap());
        assert!(!options.get_flag("quiet", true).unwrap());
        assert!(options.get_flag("absent", true).unwrap());
    }
}
