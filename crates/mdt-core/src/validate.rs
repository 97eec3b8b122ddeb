use crate::artifact::Artifact;
use crate::cr::ChangeRequest;
use crate::document::ExtensionRule;
use crate::pattern::Pattern;
use crate::sizing::SizeReport;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// A condition that blocks the design from being persisted. Violations are
/// collected, never thrown one at a time: a single pass surfaces the full
/// defect list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    UnresolvedPattern {
        responsibility: String,
        occurrences: usize,
    },
    MissingThreshold {
        path: String,
    },
    SizeViolation {
        path: String,
        declared_lines: u32,
        limit: u32,
        hard_max: u32,
    },
    BloatedStructure {
        total_limits: u32,
        monolith_lines: u32,
    },
    ExtensionRuleInvalid {
        reason: String,
    },
    AlignmentMismatch {
        path: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnresolvedPattern {
                responsibility,
                occurrences,
            } => write!(
                f,
                "pattern '{responsibility}' ({occurrences} occurrences) has no extraction target"
            ),
            Violation::MissingThreshold { path } => {
                write!(f, "artifact '{path}' has no resolved threshold")
            }
            Violation::SizeViolation {
                path,
                declared_lines,
                limit,
                hard_max,
            } => write!(
                f,
                "artifact '{path}' is {declared_lines} lines, past hard max {hard_max} (limit {limit})"
            ),
            Violation::BloatedStructure {
                total_limits,
                monolith_lines,
            } => write!(
                f,
                "structure limits total {total_limits} lines, not less than the {monolith_lines}-line monolith it replaces"
            ),
            Violation::ExtensionRuleInvalid { reason } => {
                write!(f, "extension rule invalid: {reason}")
            }
            Violation::AlignmentMismatch { path } => write!(
                f,
                "structure path '{path}' is not in the CR's declared artifact list"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// PassWarning
// ---------------------------------------------------------------------------

/// Machine-visible but non-blocking conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassWarning {
    TruncatedDecisions { candidates: usize, kept: usize },
    FlagZone {
        path: String,
        declared_lines: u32,
        limit: u32,
        hard_max: u32,
    },
}

impl fmt::Display for PassWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassWarning::TruncatedDecisions { candidates, kept } => write!(
                f,
                "{candidates} decision candidates existed; only {kept} surfaced"
            ),
            PassWarning::FlagZone {
                path,
                declared_lines,
                limit,
                hard_max,
            } => write!(
                f,
                "artifact '{path}' is {declared_lines} lines, over limit {limit} (hard max {hard_max})"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub warnings: Vec<PassWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

pub struct DesignInput<'a> {
    pub cr: &'a ChangeRequest,
    pub patterns: &'a [Pattern],
    pub structure: &'a [Artifact],
    pub size_report: &'a SizeReport,
    pub extension_rule: &'a ExtensionRule,
    /// (candidates, kept) when the surfacer truncated.
    pub truncation: Option<(usize, usize)>,
}

/// Run the full check battery, in order, collecting every violation before
/// reporting. No short-circuit: one pass, the complete defect list.
pub fn validate_design(input: &DesignInput) -> ValidationReport {
    let mut violations = Vec::new();
    let mut warnings = Vec::new();

    // 1. Every ≥2-occurrence pattern has an extraction target.
    for pattern in input.patterns {
        if pattern.occurrence_count() >= 2 && !pattern.is_resolved() {
            violations.push(Violation::UnresolvedPattern {
                responsibility: pattern.responsibility.clone(),
                occurrences: pattern.occurrence_count(),
            });
        }
    }

    // 2. Every structure artifact has a resolved threshold in the report.
    for artifact in input.structure {
        if input.size_report.entry(&artifact.path).is_none() {
            violations.push(Violation::MissingThreshold {
                path: artifact.path.clone(),
            });
        }
    }

    // 3. No artifact in the STOP zone.
    for entry in input.size_report.stops() {
        violations.push(Violation::SizeViolation {
            path: entry.path.clone(),
            declared_lines: entry.declared_lines.unwrap_or(0),
            limit: entry.limit,
            hard_max: entry.hard_max,
        });
    }

    // 4. Anti-bloat: only when a replaced-monolith size is on record.
    if let Some(monolith_lines) = input.cr.replaces_monolith_lines {
        let total_limits: u32 = input.size_report.entries.iter().map(|e| e.limit).sum();
        if total_limits >= monolith_lines {
            violations.push(Violation::BloatedStructure {
                total_limits,
                monolith_lines,
            });
        }
    }

    // 5. Exactly one extension rule, fully specified. The role is typed;
    //    path and limit still need checking.
    if input.extension_rule.path.trim().is_empty() {
        violations.push(Violation::ExtensionRuleInvalid {
            reason: "empty path".to_string(),
        });
    }
    if input.extension_rule.limit == 0 {
        violations.push(Violation::ExtensionRuleInvalid {
            reason: "limit must be a positive line count".to_string(),
        });
    }

    // 6. Alignment: every structure path appears in the CR's artifact list.
    //    Reported, never silently fixed.
    for artifact in input.structure {
        if input.cr.artifact(&artifact.path).is_none() {
            violations.push(Violation::AlignmentMismatch {
                path: artifact.path.clone(),
            });
        }
    }

    if let Some((candidates, kept)) = input.truncation {
        warnings.push(PassWarning::TruncatedDecisions { candidates, kept });
    }
    for entry in input.size_report.flags() {
        warnings.push(PassWarning::FlagZone {
            path: entry.path.clone(),
            declared_lines: entry.declared_lines.unwrap_or(0),
            limit: entry.limit,
            hard_max: entry.hard_max,
        });
    }

    ValidationReport {
        violations,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
