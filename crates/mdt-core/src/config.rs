use crate::decision::MAX_DECISION_POINTS;
use crate::error::{MdtError, Result};
use crate::paths;
use crate::pattern::{ExactMatcher, NormalizedMatcher, ResponsibilityMatcher};
use crate::threshold::OverrideSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigIssue / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// MatcherKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    Exact,
    Normalized,
}

impl Default for MatcherKind {
    fn default() -> Self {
        MatcherKind::Normalized
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: String,
    #[serde(default)]
    pub matcher: MatcherKind,
    #[serde(default = "default_max_decision_points")]
    pub max_decision_points: usize,
    /// When false, every extraction target must be supplied explicitly and
    /// patterns without one stay unresolved.
    #[serde(default = "default_derive_targets")]
    pub derive_targets: bool,
    /// Project-level threshold overrides; CR-level overrides still win.
    #[serde(default, skip_serializing_if = "OverrideSet::is_empty")]
    pub threshold_overrides: OverrideSet,
}

fn default_max_decision_points() -> usize {
    MAX_DECISION_POINTS
}

fn default_derive_targets() -> bool {
    true
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            matcher: MatcherKind::default(),
            max_decision_points: MAX_DECISION_POINTS,
            derive_targets: true,
            threshold_overrides: OverrideSet::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(MdtError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn matcher(&self) -> Box<dyn ResponsibilityMatcher> {
        match self.matcher {
            MatcherKind::Exact => Box::new(ExactMatcher),
            MatcherKind::Normalized => Box::new(NormalizedMatcher),
        }
    }

    /// Validate the configuration, returning every issue individually.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.project.trim().is_empty() {
            issues.push(ConfigIssue {
                level: WarnLevel::Error,
                message: "project name is empty".to_string(),
            });
        }
        if self.max_decision_points == 0 {
            issues.push(ConfigIssue {
                level: WarnLevel::Error,
                message: "max_decision_points must be at least 1".to_string(),
            });
        } else if self.max_decision_points > MAX_DECISION_POINTS {
            issues.push(ConfigIssue {
                level: WarnLevel::Warning,
                message: format!(
                    "max_decision_points {} exceeds the hard cap {MAX_DECISION_POINTS}; the cap applies",
                    self.max_decision_points
                ),
            });
        }
        for (role, over) in &self.threshold_overrides.roles {
            if over.default == 0 {
                issues.push(ConfigIssue {
                    level: WarnLevel::Error,
                    message: format!("override for {role} has a zero default limit"),
                });
            }
            if let Some(hard_max) = over.hard_max {
                if hard_max < over.default {
                    issues.push(ConfigIssue {
                        level: WarnLevel::Error,
                        message: format!(
                            "override for {role}: hard_max {hard_max} is below default {}",
                            over.default
                        ),
                    });
                }
            }
        }
        issues
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ThresholdOverride;
    use crate::types::Role;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new("markdown-ticket");
        config.matcher = MatcherKind::Exact;
        config.threshold_overrides.roles.insert(
            Role::Feature,
            ThresholdOverride {
                default: 180,
                hard_max: None,
            },
        );
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project, "markdown-ticket");
        assert_eq!(loaded.matcher, MatcherKind::Exact);
        assert_eq!(
            loaded.threshold_overrides.roles[&Role::Feature].default,
            180
        );
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(MdtError::NotInitialized)
        ));
    }

    #[test]
    fn defaults_are_filled_in() {
        let config: Config = serde_yaml::from_str("project: p\n").unwrap();
        assert_eq!(config.matcher, MatcherKind::Normalized);
        assert_eq!(config.max_decision_points, MAX_DECISION_POINTS);
        assert!(config.derive_targets);
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut config = Config::new("");
        config.max_decision_points = 0;
        config.threshold_overrides.roles.insert(
            Role::Utility,
            ThresholdOverride {
                default: 100,
                hard_max: Some(50),
            },
        );
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.level == WarnLevel::Error));
    }

    #[test]
    fn validate_warns_on_cap_excess() {
        let mut config = Config::new("p");
        config.max_decision_points = 9;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, WarnLevel::Warning);
    }

    #[test]
    fn valid_config_has_no_issues() {
        assert!(Config::new("p").validate().is_empty());
    }
}
