use crate::artifact::Artifact;
use crate::cr::ChangeRequest;
use crate::error::{MdtError, Result};
use crate::pattern::{derive_target, Pattern};
use crate::types::Role;
use serde::{Deserialize, Serialize};

/// Hard limit on decision points per design. More candidates are truncated,
/// never silently dropped.
pub const MAX_DECISION_POINTS: usize = 5;

const EXTENSION_KEYWORDS: &[&str] = &[
    "extensible",
    "extension point",
    "plugin",
    "pluggable",
    "provider",
    "strategy",
    "variant",
    "configurable",
];

const COUPLING_KEYWORDS: &[&str] = &[
    "cross-module",
    "coupled",
    "coupling",
    "shared state",
    "circular dependency",
];

// ---------------------------------------------------------------------------
// CrSignals
// ---------------------------------------------------------------------------

/// Structural signals extracted from a CR: these, not prose judgment, decide
/// whether an architecture pass is warranted at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrSignals {
    pub active_artifacts: usize,
    pub repeated_groups: usize,
    pub extension_keywords: Vec<String>,
    pub coupling_hints: Vec<String>,
}

impl CrSignals {
    pub fn gather(cr: &ChangeRequest, patterns: &[Pattern]) -> Self {
        let mut text = cr.problem_statement.to_lowercase();
        for artifact in cr.active_artifacts() {
            text.push('\n');
            text.push_str(&artifact.responsibility.to_lowercase());
        }

        let extension_keywords = EXTENSION_KEYWORDS
            .iter()
            .filter(|kw| text.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();
        let coupling_hints = COUPLING_KEYWORDS
            .iter()
            .filter(|kw| text.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();

        Self {
            active_artifacts: cr.active_artifacts().count(),
            repeated_groups: patterns.len(),
            extension_keywords,
            coupling_hints,
        }
    }

    /// A trivial change gets no architecture decision forced on it.
    pub fn is_trivial(&self) -> bool {
        self.repeated_groups == 0
            && self.extension_keywords.is_empty()
            && self.coupling_hints.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DecisionPoint / DecisionOption
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub title: String,
    /// Artifacts this option introduces when selected.
    pub structure: Vec<Artifact>,
    /// What adding one more instance of the variation looks like.
    pub extension_note: String,
    /// Files created plus modified to extend. Primary ranking key, lower wins.
    pub extension_cost: u32,
    /// Isolation of the changed concern, 0-100. Secondary key, higher wins.
    pub isolation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    pub id: String,
    pub question: String,
    /// Ranked best-first; at most three options.
    pub options: Vec<DecisionOption>,
    /// Index of the recommended option. Always the top-ranked one.
    pub recommended: usize,
}

impl DecisionPoint {
    fn ranked(id: String, question: String, mut options: Vec<DecisionOption>) -> Self {
        options.sort_by(|a, b| {
            a.extension_cost
                .cmp(&b.extension_cost)
                .then(b.isolation.cmp(&a.isolation))
        });
        options.truncate(3);
        Self {
            id,
            question,
            options,
            recommended: 0,
        }
    }

    pub fn recommended_option(&self) -> &DecisionOption {
        &self.options[self.recommended]
    }
}

// ---------------------------------------------------------------------------
// SurfaceOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceOutcome {
    pub signals: CrSignals,
    pub decisions: Vec<DecisionPoint>,
    /// Total candidates before the hard cap was applied.
    pub candidates: usize,
    pub truncated: bool,
}

impl SurfaceOutcome {
    pub fn is_needed(&self) -> bool {
        !self.decisions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Surfacing
// ---------------------------------------------------------------------------

/// Propose structural decision points for a CR. Fails with `MissingContext`
/// on a malformed CR rather than guessing; emits zero points for a trivial
/// change.
pub fn surface_decisions(
    cr: &ChangeRequest,
    patterns: &[Pattern],
    max_points: usize,
) -> Result<SurfaceOutcome> {
    if cr.problem_statement.trim().is_empty() {
        return Err(MdtError::MissingContext {
            key: cr.key.to_string(),
            reason: "empty problem statement".to_string(),
        });
    }
    if cr.artifacts.is_empty() {
        return Err(MdtError::MissingContext {
            key: cr.key.to_string(),
            reason: "no declared artifacts".to_string(),
        });
    }

    let signals = CrSignals::gather(cr, patterns);
    if signals.is_trivial() {
        tracing::debug!(key = %cr.key, "no structural signals; architecture design not needed");
        return Ok(SurfaceOutcome {
            signals,
            decisions: Vec::new(),
            candidates: 0,
            truncated: false,
        });
    }

    let max_points = max_points.min(MAX_DECISION_POINTS);
    let mut candidates: Vec<DecisionPoint> = Vec::new();
    for pattern in patterns {
        candidates.push(pattern_decision(pattern));
    }
    for keyword in &signals.extension_keywords {
        candidates.push(extension_decision(keyword));
    }
    for hint in &signals.coupling_hints {
        candidates.push(coupling_decision(hint));
    }

    let total = candidates.len();
    let truncated = total > max_points;
    if truncated {
        tracing::warn!(
            key = %cr.key,
            candidates = total,
            kept = max_points,
            "decision candidates truncated"
        );
    }
    candidates.truncate(max_points);

    Ok(SurfaceOutcome {
        signals,
        decisions: candidates,
        candidates: total,
        truncated,
    })
}

fn pattern_decision(pattern: &Pattern) -> DecisionPoint {
    let target = pattern
        .extract_to
        .clone()
        .or_else(|| derive_target(&pattern.responsibility))
        .unwrap_or_else(|| "shared/".to_string());
    let occurrences = pattern.occurrence_count() as u32;

    let options = vec![
        DecisionOption {
            title: format!("Extract '{}' into {target}", pattern.responsibility),
            structure: vec![Artifact::new(
                target.clone(),
                Role::Utility,
                pattern.responsibility.clone(),
            )],
            extension_note: "New callers import the shared module; one new file per caller."
                .to_string(),
            extension_cost: 1,
            isolation: 90,
        },
        DecisionOption {
            title: format!("Shared base for '{}' with per-artifact impls", pattern.responsibility),
            structure: vec![
                Artifact::new(
                    format!("{target}base.ext"),
                    Role::SharedBase,
                    pattern.responsibility.clone(),
                ),
                Artifact::new("{area}/{name}.ext", Role::Feature, "base implementation"),
            ],
            extension_note: "Each extension adds an implementation file and registers it."
                .to_string(),
            extension_cost: 2,
            isolation: 80,
        },
        DecisionOption {
            title: "Keep the logic inline in each artifact".to_string(),
            structure: Vec::new(),
            extension_note: format!(
                "Each extension copies the logic; every later change touches all {occurrences}+ copies."
            ),
            extension_cost: 1,
            isolation: 20,
        },
    ];

    DecisionPoint::ranked(
        format!("pattern:{target}"),
        format!(
            "'{}' appears in {} artifacts. Where should it live?",
            pattern.responsibility, occurrences
        ),
        options,
    )
}

fn extension_decision(keyword: &str) -> DecisionPoint {
    let options = vec![
        DecisionOption {
            title: "Directory-per-variant with a registry".to_string(),
            structure: vec![Artifact::new(
                "{area}/{name}.ext",
                Role::Feature,
                format!("one {keyword} variant"),
            )],
            extension_note: "A new variant is one new file; the registry discovers it."
                .to_string(),
            extension_cost: 1,
            isolation: 85,
        },
        DecisionOption {
            title: "Config-driven variant table".to_string(),
            structure: vec![Artifact::new(
                "config/variants.ext",
                Role::Utility,
                format!("{keyword} variant table"),
            )],
            extension_note: "A new variant is a config entry plus shared-path handling."
                .to_string(),
            extension_cost: 1,
            isolation: 70,
        },
        DecisionOption {
            title: "Central dispatch with explicit branches".to_string(),
            structure: vec![Artifact::new(
                "dispatch.ext",
                Role::Orchestration,
                format!("{keyword} dispatch"),
            )],
            extension_note: "A new variant edits the dispatcher and adds its handler."
                .to_string(),
            extension_cost: 2,
            isolation: 60,
        },
    ];

    DecisionPoint::ranked(
        format!("extension:{keyword}"),
        format!("The CR signals '{keyword}'. Where do new variants plug in?"),
        options,
    )
}

fn coupling_decision(hint: &str) -> DecisionPoint {
    let options = vec![
        DecisionOption {
            title: "Boundary module owning the shared concern".to_string(),
            structure: vec![Artifact::new(
                "shared/boundary.ext",
                Role::SharedBase,
                format!("owns the '{hint}' concern"),
            )],
            extension_note: "Changes to the concern touch the boundary module only."
                .to_string(),
            extension_cost: 1,
            isolation: 85,
        },
        DecisionOption {
            title: "Merge the coupled artifacts into one module".to_string(),
            structure: Vec::new(),
            extension_note: "Changes stay in one file but every concern shares it."
                .to_string(),
            extension_cost: 1,
            isolation: 40,
        },
        DecisionOption {
            title: "Callback indirection between the coupled sides".to_string(),
            structure: vec![Artifact::new(
                "shared/hooks.ext",
                Role::Utility,
                format!("callback seam for '{hint}'"),
            )],
            extension_note: "Each side registers callbacks; extending touches both sides."
                .to_string(),
            extension_cost: 2,
            isolation: 75,
        },
    ];

    DecisionPoint::ranked(
        format!("coupling:{hint}"),
        format!("The CR hints at '{hint}'. How should the boundary be drawn?"),
        options,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
