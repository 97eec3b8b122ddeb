use crate::types::Role;
use serde::{Deserialize, Serialize};

/// A file-like unit of planned or existing code. Paths may be templated
/// (`{area}/{name}`) while an option is still a proposal. Artifacts are
/// never deleted, only superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: String,
    pub role: Role,
    pub responsibility: String,
    /// Absent before implementation; set by size verification afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_lines: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub superseded: bool,
}

impl Artifact {
    pub fn new(path: impl Into<String>, role: Role, responsibility: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role,
            responsibility: responsibility.into(),
            declared_lines: None,
            superseded: false,
        }
    }

    pub fn with_lines(mut self, lines: u32) -> Self {
        self.declared_lines = Some(lines);
        self
    }

    /// Record the measured size after implementation.
    pub fn verify_size(&mut self, measured_lines: u32) {
        self.declared_lines = Some(measured_lines);
    }

    pub fn supersede(&mut self) {
        self.superseded = true;
    }

    pub fn is_templated(&self) -> bool {
        self.path.contains('{')
    }
}
