use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Structural role of an artifact. Each role carries its own size threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Orchestration,
    Feature,
    ComplexLogic,
    Utility,
    SharedBase,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[
            Role::Orchestration,
            Role::Feature,
            Role::ComplexLogic,
            Role::Utility,
            Role::SharedBase,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Orchestration => "orchestration",
            Role::Feature => "feature",
            Role::ComplexLogic => "complex-logic",
            Role::Utility => "utility",
            Role::SharedBase => "shared-base",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::MdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orchestration" => Ok(Role::Orchestration),
            "feature" => Ok(Role::Feature),
            "complex-logic" | "complex_logic" => Ok(Role::ComplexLogic),
            "utility" => Ok(Role::Utility),
            "shared-base" | "shared_base" => Ok(Role::SharedBase),
            _ => Err(crate::error::MdtError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// Derived size classification. Never stored; computed from declared lines
/// against the resolved threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Ok,
    Flag,
    Stop,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Ok => "OK",
            Zone::Flag => "FLAG",
            Zone::Stop => "STOP",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CrStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrStatus {
    Proposed,
    Approved,
    InProgress,
    Implemented,
    Superseded,
}

impl Default for CrStatus {
    fn default() -> Self {
        CrStatus::Proposed
    }
}

impl CrStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CrStatus::Proposed => "proposed",
            CrStatus::Approved => "approved",
            CrStatus::InProgress => "in_progress",
            CrStatus::Implemented => "implemented",
            CrStatus::Superseded => "superseded",
        }
    }
}

impl fmt::Display for CrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CrStatus {
    type Err = crate::error::MdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proposed" => Ok(CrStatus::Proposed),
            "approved" => Ok(CrStatus::Approved),
            "in_progress" | "in-progress" => Ok(CrStatus::InProgress),
            "implemented" => Ok(CrStatus::Implemented),
            "superseded" => Ok(CrStatus::Superseded),
            _ => Err(crate::error::MdtError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_roundtrip() {
        for role in Role::all() {
            let parsed = Role::from_str(role.as_str()).unwrap();
            assert_eq!(*role, parsed);
        }
    }

    #[test]
    fn role_accepts_underscore_aliases() {
        assert_eq!(Role::from_str("complex_logic").unwrap(), Role::ComplexLogic);
        assert_eq!(Role::from_str("shared_base").unwrap(), Role::SharedBase);
    }

    #[test]
    fn role_rejects_unknown() {
        assert!(Role::from_str("monolith").is_err());
    }

    #[test]
    fn role_serde_kebab_case() {
        let json = serde_json::to_string(&Role::ComplexLogic).unwrap();
        assert_eq!(json, "\"complex-logic\"");
    }

    #[test]
    fn zone_display() {
        assert_eq!(Zone::Ok.to_string(), "OK");
        assert_eq!(Zone::Flag.to_string(), "FLAG");
        assert_eq!(Zone::Stop.to_string(), "STOP");
    }

    #[test]
    fn status_roundtrip() {
        for s in ["proposed", "approved", "in_progress", "implemented", "superseded"] {
            let parsed = CrStatus::from_str(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn status_defaults_to_proposed() {
        assert_eq!(CrStatus::default(), CrStatus::Proposed);
    }
}
