use crate::artifact::Artifact;
use crate::threshold::{resolve, OverrideSet};
use crate::types::{Role, Zone};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SizeEntry / SizeReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeEntry {
    pub path: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_lines: Option<u32>,
    pub limit: u32,
    pub hard_max: u32,
    /// `None` when the artifact has no declared line count yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeReport {
    pub entries: Vec<SizeEntry>,
    /// True when any artifact landed in the STOP zone.
    pub blocked: bool,
}

impl SizeReport {
    pub fn entry(&self, path: &str) -> Option<&SizeEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn stops(&self) -> impl Iterator<Item = &SizeEntry> {
        self.entries.iter().filter(|e| e.zone == Some(Zone::Stop))
    }

    pub fn flags(&self) -> impl Iterator<Item = &SizeEntry> {
        self.entries.iter().filter(|e| e.zone == Some(Zone::Flag))
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Assign each structure artifact a zone against its resolved threshold.
/// Unsized artifacts get a threshold but no zone. Pure function of its input;
/// the override sets are read-only for the whole pass.
pub fn classify_structure(
    structure: &[Artifact],
    cr_overrides: &OverrideSet,
    project_overrides: &OverrideSet,
) -> SizeReport {
    let entries: Vec<SizeEntry> = structure
        .iter()
        .map(|artifact| {
            let threshold = resolve(artifact.role, cr_overrides, project_overrides);
            SizeEntry {
                path: artifact.path.clone(),
                role: artifact.role,
                declared_lines: artifact.declared_lines,
                limit: threshold.default,
                hard_max: threshold.hard_max,
                zone: artifact.declared_lines.map(|lines| threshold.classify(lines)),
            }
        })
        .collect();

    let blocked = entries.iter().any(|e| e.zone == Some(Zone::Stop));
    SizeReport { entries, blocked }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
