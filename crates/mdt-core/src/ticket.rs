use crate::error::{MdtError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^([A-Za-z]+)-(\d+)$").unwrap())
}

// ---------------------------------------------------------------------------
// TicketKey
// ---------------------------------------------------------------------------

/// Normalized change-request key, always `PROJECT-NNN` with the project code
/// uppercased and the number zero-padded to at least three digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketKey(String);

impl TicketKey {
    /// Parse and normalize user input: `mdt-66`, `MDT-66` and `MDT-066`
    /// all yield `MDT-066`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let caps = key_re()
            .captures(trimmed)
            .ok_or_else(|| MdtError::InvalidTicketKey(input.to_string()))?;
        let project = caps[1].to_uppercase();
        let number = format!("{:0>3}", &caps[2]);
        Ok(Self(format!("{project}-{number}")))
    }

    pub fn project(&self) -> &str {
        self.0.split('-').next().unwrap_or("")
    }

    pub fn number(&self) -> &str {
        self.0.split('-').nth(1).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TicketKey {
    type Err = MdtError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_padding() {
        assert_eq!(TicketKey::parse("mdt-66").unwrap().as_str(), "MDT-066");
        assert_eq!(TicketKey::parse("MDT-66").unwrap().as_str(), "MDT-066");
        assert_eq!(TicketKey::parse("AAA-1").unwrap().as_str(), "AAA-001");
    }

    #[test]
    fn keeps_long_numbers() {
        assert_eq!(TicketKey::parse("MDT-1234").unwrap().as_str(), "MDT-1234");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(TicketKey::parse("  mdt-7 ").unwrap().as_str(), "MDT-007");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["MDT", "MDT-", "-66", "MDT 66", "MDT-66x", "66-MDT", ""] {
            assert!(TicketKey::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn project_and_number_accessors() {
        let key = TicketKey::parse("mdt-66").unwrap();
        assert_eq!(key.project(), "MDT");
        assert_eq!(key.number(), "066");
    }

    #[test]
    fn serde_transparent() {
        let key = TicketKey::parse("MDT-066").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"MDT-066\"");
        let parsed: TicketKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
