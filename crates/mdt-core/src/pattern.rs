use crate::artifact::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// ResponsibilityMatcher
// ---------------------------------------------------------------------------

/// Equivalence relation over responsibility descriptions. The engine never
/// hard-codes "similar": callers inject whichever matcher fits their corpus,
/// as long as it is deterministic for identical input.
pub trait ResponsibilityMatcher {
    /// Grouping key for a responsibility description. Artifacts whose
    /// responsibilities map to the same key belong to the same group.
    /// An empty key excludes the artifact from grouping.
    fn key(&self, responsibility: &str) -> String;
}

/// Byte-for-byte matching.
pub struct ExactMatcher;

impl ResponsibilityMatcher for ExactMatcher {
    fn key(&self, responsibility: &str) -> String {
        responsibility.to_string()
    }
}

/// Lowercased, punctuation stripped, whitespace collapsed. "Input Validation"
/// and "input  validation." group together.
pub struct NormalizedMatcher;

impl ResponsibilityMatcher for NormalizedMatcher {
    fn key(&self, responsibility: &str) -> String {
        responsibility
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A responsibility observed in two or more artifacts. A pattern must carry
/// an extraction target before a design that includes it can validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Representative responsibility text (first-seen artifact's wording).
    pub responsibility: String,
    /// Artifact paths, in first-seen order.
    pub occurrences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_to: Option<String>,
}

impl Pattern {
    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_resolved(&self) -> bool {
        self.extract_to.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Target derivation
// ---------------------------------------------------------------------------

/// Convention: a shared directory named after the common responsibility,
/// e.g. "input validation" → `shared/input-validation/`. Returns `None`
/// when nothing alphanumeric survives slugging.
pub fn derive_target(responsibility: &str) -> Option<String> {
    let slug = responsibility
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        None
    } else {
        Some(format!("shared/{slug}/"))
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Group artifacts by matcher key and report every group with ≥2 members as
/// a pattern, in first-seen artifact order. Caller-supplied targets (keyed
/// by responsibility text) win over the derived convention; derivation can
/// be disabled so every target must be explicit.
///
/// Pure: no side effects, deterministic for identical input.
pub fn detect_patterns(
    artifacts: &[Artifact],
    matcher: &dyn ResponsibilityMatcher,
    supplied_targets: &HashMap<String, String>,
    derive_targets: bool,
) -> Vec<Pattern> {
    let supplied: HashMap<String, &String> = supplied_targets
        .iter()
        .map(|(resp, target)| (matcher.key(resp), target))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Pattern> = HashMap::new();

    for artifact in artifacts.iter().filter(|a| !a.superseded) {
        let key = matcher.key(&artifact.responsibility);
        if key.is_empty() {
            continue;
        }
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Pattern {
                responsibility: artifact.responsibility.clone(),
                occurrences: Vec::new(),
                extract_to: None,
            }
        });
        group.occurrences.push(artifact.path.clone());
    }

    order
        .into_iter()
        .filter_map(|key| {
            let mut pattern = groups.remove(&key)?;
            if pattern.occurrence_count() < 2 {
                return None;
            }
            pattern.extract_to = supplied
                .get(&key)
                .map(|t| t.to_string())
                .or_else(|| {
                    if derive_targets {
                        derive_target(&pattern.responsibility)
                    } else {
                        None
                    }
                });
            Some(pattern)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn artifact(path: &str, responsibility: &str) -> Artifact {
        Artifact::new(path, Role::Feature, responsibility)
    }

    #[test]
    fn two_matching_artifacts_form_a_pattern() {
        let artifacts = vec![
            artifact("commands/a.ext", "input validation"),
            artifact("commands/b.ext", "input validation"),
            artifact("commands/c.ext", "report rendering"),
        ];
        let patterns = detect_patterns(&artifacts, &ExactMatcher, &HashMap::new(), true);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].occurrence_count(), 2);
        assert_eq!(
            patterns[0].occurrences,
            vec!["commands/a.ext", "commands/b.ext"]
        );
        assert_eq!(
            patterns[0].extract_to.as_deref(),
            Some("shared/input-validation/")
        );
        assert!(patterns[0].is_resolved());
    }

    #[test]
    fn normalized_matcher_groups_variant_spellings() {
        let artifacts = vec![
            artifact("a.ext", "Input Validation"),
            artifact("b.ext", "input  validation."),
        ];
        assert!(detect_patterns(&artifacts, &ExactMatcher, &HashMap::new(), true).is_empty());
        let patterns = detect_patterns(&artifacts, &NormalizedMatcher, &HashMap::new(), true);
        assert_eq!(patterns.len(), 1);
        // Representative text is the first-seen wording.
        assert_eq!(patterns[0].responsibility, "Input Validation");
    }

    #[test]
    fn supplied_target_wins_over_convention() {
        let artifacts = vec![
            artifact("a.ext", "input validation"),
            artifact("b.ext", "input validation"),
        ];
        let mut supplied = HashMap::new();
        supplied.insert("input validation".to_string(), "validators/".to_string());
        let patterns = detect_patterns(&artifacts, &NormalizedMatcher, &supplied, true);
        assert_eq!(patterns[0].extract_to.as_deref(), Some("validators/"));
    }

    #[test]
    fn unresolved_when_derivation_disabled_and_nothing_supplied() {
        let artifacts = vec![
            artifact("a.ext", "input validation"),
            artifact("b.ext", "input validation"),
        ];
        let patterns = detect_patterns(&artifacts, &NormalizedMatcher, &HashMap::new(), false);
        assert_eq!(patterns.len(), 1);
        assert!(!patterns[0].is_resolved());
    }

    #[test]
    fn single_occurrence_is_not_a_pattern() {
        let artifacts = vec![artifact("a.ext", "input validation")];
        assert!(detect_patterns(&artifacts, &ExactMatcher, &HashMap::new(), true).is_empty());
    }

    #[test]
    fn superseded_artifacts_are_ignored() {
        let mut old = artifact("old.ext", "input validation");
        old.supersede();
        let artifacts = vec![old, artifact("new.ext", "input validation")];
        assert!(detect_patterns(&artifacts, &ExactMatcher, &HashMap::new(), true).is_empty());
    }

    #[test]
    fn patterns_keep_first_seen_order() {
        let artifacts = vec![
            artifact("a.ext", "rendering"),
            artifact("b.ext", "validation"),
            artifact("c.ext", "rendering"),
            artifact("d.ext", "validation"),
        ];
        let patterns = detect_patterns(&artifacts, &ExactMatcher, &HashMap::new(), true);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].responsibility, "rendering");
        assert_eq!(patterns[1].responsibility, "validation");
    }

    #[test]
    fn derive_target_slugs_responsibility() {
        assert_eq!(
            derive_target("Input Validation!").as_deref(),
            Some("shared/input-validation/")
        );
        assert_eq!(derive_target("???"), None);
    }
}
