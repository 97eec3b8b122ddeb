use crate::types::{Role, Zone};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// Resolved size limits for a role: the default limit, and the hard maximum
/// past which a module blocks the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub role: Role,
    pub default: u32,
    pub hard_max: u32,
}

impl Threshold {
    pub fn from_default(role: Role, default: u32) -> Self {
        Self {
            role,
            default,
            hard_max: hard_max_for(default),
        }
    }

    /// Boundaries are inclusive on the lower side: `lines == default` is OK,
    /// `lines == hard_max` is FLAG, anything past hard_max is STOP.
    pub fn classify(&self, declared_lines: u32) -> Zone {
        if declared_lines <= self.default {
            Zone::Ok
        } else if declared_lines <= self.hard_max {
            Zone::Flag
        } else {
            Zone::Stop
        }
    }
}

/// hard_max = round_half_up(default × 1.5), in integer arithmetic so the
/// rounding rule cannot drift: `default * 3 / 2` with the half rounded up.
pub fn hard_max_for(default: u32) -> u32 {
    (default * 3 + 1) / 2
}

// ---------------------------------------------------------------------------
// Static table
// ---------------------------------------------------------------------------

pub fn default_limit(role: Role) -> u32 {
    match role {
        Role::Orchestration => 100,
        Role::Feature => 200,
        Role::ComplexLogic => 400,
        Role::Utility => 150,
        Role::SharedBase => 250,
    }
}

pub fn default_table() -> Vec<Threshold> {
    Role::all()
        .iter()
        .map(|&role| Threshold::from_default(role, default_limit(role)))
        .collect()
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// An explicit override record. `hard_max` falls back to the derived
/// `round_half_up(default × 1.5)` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    pub default: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_max: Option<u32>,
}

impl ThresholdOverride {
    fn to_threshold(self, role: Role) -> Threshold {
        Threshold {
            role,
            default: self.default,
            hard_max: self.hard_max.unwrap_or_else(|| hard_max_for(self.default)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideSet {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub roles: HashMap<Role, ThresholdOverride>,
}

impl OverrideSet {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Resolve the threshold for a role. Precedence is an explicit ordered
/// lookup, first match wins: CR-level override, then project-level override,
/// then the static table.
pub fn resolve(role: Role, cr: &OverrideSet, project: &OverrideSet) -> Threshold {
    if let Some(o) = cr.roles.get(&role) {
        return o.to_threshold(role);
    }
    if let Some(o) = project.roles.get(&role) {
        return o.to_threshold(role);
    }
    Threshold::from_default(role, default_limit(role))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
