use crate::artifact::Artifact;
use crate::config::Config;
use crate::cr::{ChangeRequest, CrStore, DESIGN_SECTION_POSITION};
use crate::decision::{surface_decisions, DecisionOption, SurfaceOutcome};
use crate::document::{added_paths, DesignDocument, ExtensionRule};
use crate::error::{MdtError, Result};
use crate::pattern::{detect_patterns, Pattern};
use crate::sizing::classify_structure;
use crate::threshold::resolve;
use crate::types::Role;
use crate::validate::{validate_design, DesignInput, PassWarning, ValidationReport};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PassOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Trivial change: the workflow must not force a design on it.
    NotNeeded { reason: String },
    /// Validation failed; every violation is listed, nothing was persisted.
    Blocked { report: ValidationReport },
    /// Design validated and persisted.
    Completed {
        document: DesignDocument,
        added_paths: Vec<String>,
        warnings: Vec<PassWarning>,
    },
}

// ---------------------------------------------------------------------------
// Stage 1: detect + surface
// ---------------------------------------------------------------------------

/// Detect patterns and surface decision points for a CR. Read-only; the
/// operator picks options before the pass can complete.
pub fn surface(cr: &ChangeRequest, config: &Config) -> Result<SurfaceOutcome> {
    let patterns = detect(cr, config);
    surface_decisions(cr, &patterns, config.max_decision_points)
}

pub fn detect(cr: &ChangeRequest, config: &Config) -> Vec<Pattern> {
    let matcher = config.matcher();
    detect_patterns(
        &cr.artifacts,
        matcher.as_ref(),
        &cr.extraction_targets,
        config.derive_targets,
    )
}

// ---------------------------------------------------------------------------
// Stage 2: complete the pass
// ---------------------------------------------------------------------------

/// Run a full design pass with the operator's option selections, one index
/// per surfaced decision point. The pass runs to completion synchronously:
/// classify, validate, and only if valid, persist through the store. An
/// invalid design returns `Blocked` with nothing written.
pub fn run_pass(
    cr: &ChangeRequest,
    config: &Config,
    selections: &[usize],
    store: &dyn CrStore,
) -> Result<PassOutcome> {
    let patterns = detect(cr, config);
    let surfaced = surface_decisions(cr, &patterns, config.max_decision_points)?;

    if !surfaced.is_needed() {
        return Ok(PassOutcome::NotNeeded {
            reason: "no repeated responsibilities, extension signals, or coupling hints"
                .to_string(),
        });
    }

    if selections.len() != surfaced.decisions.len() {
        return Err(MdtError::SelectionCount {
            expected: surfaced.decisions.len(),
            got: selections.len(),
        });
    }
    let mut selected: Vec<&DecisionOption> = Vec::new();
    for (point, &index) in surfaced.decisions.iter().zip(selections) {
        let option = point
            .options
            .get(index)
            .ok_or_else(|| MdtError::InvalidSelection {
                decision: point.id.clone(),
                index,
            })?;
        selected.push(option);
    }

    // The chosen options create their proposed artifacts on the CR; the
    // structure is the active artifact set plus those fragments.
    let mut structure: Vec<Artifact> = cr.active_artifacts().cloned().collect();
    for option in &selected {
        for fragment in &option.structure {
            if !structure.iter().any(|a| a.path == fragment.path) {
                structure.push(fragment.clone());
            }
        }
    }
    let mut effective_cr = cr.clone();
    for artifact in &structure {
        if effective_cr.artifact(&artifact.path).is_none() {
            effective_cr.artifacts.push(artifact.clone());
        }
    }

    let size_report = classify_structure(
        &structure,
        &cr.threshold_overrides,
        &config.threshold_overrides,
    );
    let extension_rule = derive_extension_rule(&selected, &structure, cr, config);

    let truncation = surfaced
        .truncated
        .then_some((surfaced.candidates, surfaced.decisions.len()));
    let report = validate_design(&DesignInput {
        cr: &effective_cr,
        patterns: &patterns,
        structure: &structure,
        size_report: &size_report,
        extension_rule: &extension_rule,
        truncation,
    });
    if !report.is_valid() {
        tracing::info!(
            key = %cr.key,
            violations = report.violations.len(),
            "design blocked; nothing persisted"
        );
        return Ok(PassOutcome::Blocked { report });
    }

    let revision = cr.design_revision + 1;
    let first_point = &surfaced.decisions[0];
    let first_choice = selected[0];
    let document = DesignDocument {
        revision,
        pattern_name: first_choice.title.clone(),
        rationale: format!("{} {}", first_point.question, first_choice.extension_note),
        patterns,
        structure: structure.clone(),
        size_guidance: size_report.entries,
        extension_rule,
    };
    let added = added_paths(&structure, &cr.artifacts);
    let new_artifacts: Vec<Artifact> = structure
        .iter()
        .filter(|a| added.contains(&a.path))
        .cloned()
        .collect();

    // Persist only after full validation. The store owns atomicity; the
    // engine never retries.
    store.insert_section(&cr.key, DESIGN_SECTION_POSITION, &document.render())?;
    store.append_acceptance_criteria(&cr.key, &checklist_items(&document))?;
    store.update_artifact_table(&cr.key, &new_artifacts, revision)?;

    tracing::info!(key = %cr.key, revision, added = added.len(), "design persisted");
    Ok(PassOutcome::Completed {
        document,
        added_paths: added,
        warnings: report.warnings,
    })
}

fn derive_extension_rule(
    selected: &[&DecisionOption],
    structure: &[Artifact],
    cr: &ChangeRequest,
    config: &Config,
) -> ExtensionRule {
    let candidate = selected
        .iter()
        .flat_map(|o| o.structure.iter())
        .find(|a| a.is_templated())
        .or_else(|| selected.iter().flat_map(|o| o.structure.iter()).next())
        .or_else(|| structure.first());
    let (path, role) = match candidate {
        Some(a) => (a.path.clone(), a.role),
        None => ("{area}/{name}.ext".to_string(), Role::Feature),
    };
    let limit = resolve(role, &cr.threshold_overrides, &config.threshold_overrides).default;
    ExtensionRule { path, role, limit }
}

fn checklist_items(document: &DesignDocument) -> Vec<String> {
    let mut items = vec![
        format!(
            "Every module in the r{} design stays within its size guidance",
            document.revision
        ),
        format!(
            "New variants follow the extension rule: {}",
            document.extension_rule.sentence()
        ),
    ];
    let targets: Vec<&str> = document
        .patterns
        .iter()
        .filter_map(|p| p.extract_to.as_deref())
        .collect();
    if !targets.is_empty() {
        items.push(format!(
            "Shared logic lives in its extraction targets: {}",
            targets.join(", ")
        ));
    }
    items
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
