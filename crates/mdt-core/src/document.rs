use crate::artifact::Artifact;
use crate::pattern::Pattern;
use crate::sizing::SizeEntry;
use crate::types::Role;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ExtensionRule
// ---------------------------------------------------------------------------

/// The single sentence binding the design's variation point to a path, a
/// role, and a size limit. Exactly one per design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRule {
    pub path: String,
    pub role: Role,
    pub limit: u32,
}

impl ExtensionRule {
    pub fn sentence(&self) -> String {
        format!(
            "To add a new variant, create `{}` as a {} module and keep it under {} lines.",
            self.path, self.role, self.limit
        )
    }
}

// ---------------------------------------------------------------------------
// DesignDocument
// ---------------------------------------------------------------------------

/// The validated, versioned design artifact. Rendering is byte-deterministic:
/// no timestamps, no ambient state. Timestamps belong to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub revision: u32,
    pub pattern_name: String,
    pub rationale: String,
    pub patterns: Vec<Pattern>,
    pub structure: Vec<Artifact>,
    pub size_guidance: Vec<SizeEntry>,
    pub extension_rule: ExtensionRule,
}

impl DesignDocument {
    pub fn heading(&self) -> String {
        format!("## Architecture Design (r{})", self.revision)
    }

    /// Fixed section layout other workflow stages depend on positionally:
    /// pattern + rationale, Shared Patterns, Structure, Size Guidance,
    /// Extension Rule.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.heading());
        out.push_str("\n\n");
        out.push_str(&format!("**Pattern**: {}\n", self.pattern_name));
        out.push_str(&format!("**Rationale**: {}\n", self.rationale));

        out.push_str("\n### Shared Patterns\n\n");
        if self.patterns.is_empty() {
            out.push_str("(none detected)\n");
        } else {
            out.push_str("| Pattern | Occurrences | Extract To |\n");
            out.push_str("| --- | --- | --- |\n");
            for p in &self.patterns {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    p.responsibility,
                    p.occurrence_count(),
                    p.extract_to.as_deref().unwrap_or("(unresolved)")
                ));
            }
        }

        out.push_str("\n### Structure\n\n");
        out.push_str("```\n");
        out.push_str(&self.render_tree());
        out.push_str("```\n");

        out.push_str("\n### Size Guidance\n\n");
        out.push_str("| Module | Role | Limit | Hard Max |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for entry in &self.size_guidance {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                entry.path, entry.role, entry.limit, entry.hard_max
            ));
        }

        out.push_str("\n### Extension Rule\n\n");
        out.push_str(&self.extension_rule.sentence());
        out.push('\n');
        out
    }

    fn render_tree(&self) -> String {
        let mut out = String::new();
        let mut printed_dirs: Vec<String> = Vec::new();
        for artifact in &self.structure {
            let is_dir = artifact.path.ends_with('/');
            let trimmed = artifact.path.trim_end_matches('/');
            let parts: Vec<&str> = trimmed.split('/').collect();
            for depth in 0..parts.len().saturating_sub(1) {
                let prefix = parts[..=depth].join("/");
                if !printed_dirs.contains(&prefix) {
                    out.push_str(&format!("{}{}/\n", "  ".repeat(depth), parts[depth]));
                    printed_dirs.push(prefix);
                }
            }
            let depth = parts.len() - 1;
            let leaf = parts[depth];
            let suffix = if is_dir { "/" } else { "" };
            let limit = self
                .size_guidance
                .iter()
                .find(|e| e.path == artifact.path)
                .map(|e| e.limit);
            match limit {
                Some(limit) => out.push_str(&format!(
                    "{}{leaf}{suffix}  ({}, <={limit} lines)\n",
                    "  ".repeat(depth),
                    artifact.role
                )),
                None => out.push_str(&format!(
                    "{}{leaf}{suffix}  ({})\n",
                    "  ".repeat(depth),
                    artifact.role
                )),
            }
            if is_dir {
                printed_dirs.push(trimmed.to_string());
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Paths in the structure that are not yet in the CR's artifact table,
/// in structure order.
pub fn added_paths(structure: &[Artifact], prior: &[Artifact]) -> Vec<String> {
    structure
        .iter()
        .filter(|a| !prior.iter().any(|p| p.path == a.path))
        .map(|a| a.path.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Zone;

    fn sample_document() -> DesignDocument {
        let patterns = vec![Pattern {
            responsibility: "input validation".to_string(),
            occurrences: vec!["commands/a.ext".to_string(), "commands/b.ext".to_string()],
            extract_to: Some("shared/input-validation/".to_string()),
        }];
        let structure = vec![
            Artifact::new("commands/a.ext", Role::Feature, "login command").with_lines(180),
            Artifact::new("commands/b.ext", Role::Feature, "signup command"),
            Artifact::new("shared/input-validation/", Role::Utility, "input validation"),
        ];
        let size_guidance = vec![
            SizeEntry {
                path: "commands/a.ext".to_string(),
                role: Role::Feature,
                declared_lines: Some(180),
                limit: 200,
                hard_max: 300,
                zone: Some(Zone::Ok),
            },
            SizeEntry {
                path: "commands/b.ext".to_string(),
                role: Role::Feature,
                declared_lines: None,
                limit: 200,
                hard_max: 300,
                zone: None,
            },
            SizeEntry {
                path: "shared/input-validation/".to_string(),
                role: Role::Utility,
                declared_lines: None,
                limit: 150,
                hard_max: 225,
                zone: None,
            },
        ];
        DesignDocument {
            revision: 1,
            pattern_name: "Shared validation module".to_string(),
            rationale: "Validation is duplicated across two commands.".to_string(),
            patterns,
            structure,
            size_guidance,
            extension_rule: ExtensionRule {
                path: "commands/{name}.ext".to_string(),
                role: Role::Feature,
                limit: 200,
            },
        }
    }

    #[test]
    fn render_has_fixed_section_order() {
        let doc = sample_document().render();
        let shared = doc.find("### Shared Patterns").unwrap();
        let structure = doc.find("### Structure").unwrap();
        let size = doc.find("### Size Guidance").unwrap();
        let rule = doc.find("### Extension Rule").unwrap();
        assert!(shared < structure && structure < size && size < rule);
        assert!(doc.starts_with("## Architecture Design (r1)"));
    }

    #[test]
    fn render_is_deterministic() {
        let document = sample_document();
        assert_eq!(document.render(), document.render());
        // A structurally identical document renders byte-identically.
        assert_eq!(document.render(), sample_document().render());
    }

    #[test]
    fn render_includes_tables_and_rule() {
        let doc = sample_document().render();
        assert!(doc.contains("| input validation | 2 | shared/input-validation/ |"));
        assert!(doc.contains("| commands/a.ext | feature | 200 | 300 |"));
        assert!(doc.contains("create `commands/{name}.ext` as a feature module"));
        assert!(doc.contains("under 200 lines"));
    }

    #[test]
    fn tree_nests_directories_once() {
        let doc = sample_document().render();
        assert_eq!(doc.matches("commands/\n").count(), 1);
        assert!(doc.contains("  a.ext  (feature, <=200 lines)"));
        assert!(doc.contains("  input-validation/  (utility, <=150 lines)"));
    }

    #[test]
    fn added_paths_diff_against_prior_table() {
        let prior = vec![Artifact::new("commands/a.ext", Role::Feature, "login")];
        let structure = vec![
            Artifact::new("commands/a.ext", Role::Feature, "login"),
            Artifact::new("shared/validators/mod.ext", Role::Utility, "validation"),
        ];
        assert_eq!(
            added_paths(&structure, &prior),
            vec!["shared/validators/mod.ext"]
        );
        assert!(added_paths(&prior, &prior).is_empty());
    }
}
