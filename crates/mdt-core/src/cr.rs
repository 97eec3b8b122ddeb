use crate::artifact::Artifact;
use crate::error::{MdtError, Result};
use crate::paths;
use crate::threshold::OverrideSet;
use crate::ticket::TicketKey;
use crate::types::CrStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fixed position of the architecture design section in the CR document:
/// after Problem and Scope, before Acceptance Criteria. Downstream stages
/// depend on this positionally.
pub const DESIGN_SECTION_POSITION: usize = 2;

// ---------------------------------------------------------------------------
// ChangeRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub key: TicketKey,
    pub title: String,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub status: CrStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope_in: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope_out: Vec<String>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "OverrideSet::is_empty")]
    pub threshold_overrides: OverrideSet,
    /// Line count of a monolith this CR replaces, when known. Enables the
    /// anti-bloat validation check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces_monolith_lines: Option<u32>,
    /// Caller-supplied extraction targets, keyed by responsibility text.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extraction_targets: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
    /// Number of completed design passes. 0 until the first design persists.
    #[serde(default)]
    pub design_revision: u32,
}

impl ChangeRequest {
    pub fn new(key: TicketKey, title: impl Into<String>, problem: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key,
            title: title.into(),
            problem_statement: problem.into(),
            status: CrStatus::Proposed,
            created_at: now,
            updated_at: now,
            scope_in: Vec::new(),
            scope_out: Vec::new(),
            artifacts: Vec::new(),
            threshold_overrides: OverrideSet::default(),
            replaces_monolith_lines: None,
            extraction_targets: HashMap::new(),
            acceptance_criteria: Vec::new(),
            design_revision: 0,
        }
    }

    pub fn artifact(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == path)
    }

    /// Declare a planned or existing artifact. Re-declaring an existing path
    /// replaces its role/responsibility but keeps its verified size.
    pub fn declare_artifact(&mut self, artifact: Artifact) {
        if let Some(existing) = self.artifacts.iter_mut().find(|a| a.path == artifact.path) {
            existing.role = artifact.role;
            existing.responsibility = artifact.responsibility;
            existing.superseded = false;
            if artifact.declared_lines.is_some() {
                existing.declared_lines = artifact.declared_lines;
            }
        } else {
            self.artifacts.push(artifact);
        }
        self.updated_at = Utc::now();
    }

    pub fn verify_artifact_size(&mut self, path: &str, measured_lines: u32) -> Result<()> {
        let key = self.key.to_string();
        let artifact = self
            .artifacts
            .iter_mut()
            .find(|a| a.path == path)
            .ok_or_else(|| MdtError::ArtifactNotFound {
                key,
                path: path.to_string(),
            })?;
        artifact.verify_size(measured_lines);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn supersede_artifact(&mut self, path: &str) -> Result<()> {
        let key = self.key.to_string();
        let artifact = self
            .artifacts
            .iter_mut()
            .find(|a| a.path == path)
            .ok_or_else(|| MdtError::ArtifactNotFound {
                key,
                path: path.to_string(),
            })?;
        artifact.supersede();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn active_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| !a.superseded)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path, key: &TicketKey) -> Result<Self> {
        let path = paths::cr_manifest(root, key);
        if !path.exists() {
            return Err(MdtError::CrNotFound(key.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let cr: ChangeRequest = serde_yaml::from_str(&data)?;
        Ok(cr)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::cr_manifest(root, &self.key);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn create(
        root: &Path,
        key: TicketKey,
        title: impl Into<String>,
        problem: impl Into<String>,
    ) -> Result<Self> {
        if !paths::mdt_dir(root).is_dir() {
            return Err(MdtError::NotInitialized);
        }
        if paths::cr_manifest(root, &key).exists() {
            return Err(MdtError::CrExists(key.to_string()));
        }
        let cr = Self::new(key, title, problem);
        cr.save(root)?;
        crate::io::atomic_write(
            &paths::cr_doc(root, &cr.key),
            cr.initial_document().as_bytes(),
        )?;
        Ok(cr)
    }

    pub fn list(root: &Path) -> Result<Vec<ChangeRequest>> {
        let dir = root.join(paths::CRS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut keys: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        keys.sort();
        let mut out = Vec::new();
        for name in keys {
            if let Ok(key) = TicketKey::parse(&name) {
                out.push(Self::load(root, &key)?);
            }
        }
        Ok(out)
    }

    fn initial_document(&self) -> String {
        let mut doc = format!("# {}: {}\n\n## Problem\n\n{}\n\n## Scope\n\n", self.key, self.title, self.problem_statement);
        if self.scope_in.is_empty() && self.scope_out.is_empty() {
            doc.push_str("(not yet bounded)\n");
        } else {
            for item in &self.scope_in {
                doc.push_str(&format!("- in: {item}\n"));
            }
            for item in &self.scope_out {
                doc.push_str(&format!("- out: {item}\n"));
            }
        }
        doc.push_str("\n## Acceptance Criteria\n");
        doc
    }
}

// ---------------------------------------------------------------------------
// CrStore
// ---------------------------------------------------------------------------

/// Boundary contract the engine persists through. The engine only ever calls
/// these after a design has fully validated; partial writes are the store's
/// problem, not the engine's.
pub trait CrStore {
    fn get_cr(&self, key: &TicketKey) -> Result<ChangeRequest>;
    /// Insert `content` as a `##` section at `position` (clamped to the
    /// section count). Fails with a conflict if a section with the same
    /// heading already exists.
    fn insert_section(&self, key: &TicketKey, position: usize, content: &str) -> Result<()>;
    fn append_acceptance_criteria(&self, key: &TicketKey, items: &[String]) -> Result<()>;
    /// Add newly proposed artifacts to the CR's artifact table and record
    /// the completed design revision.
    fn update_artifact_table(
        &self,
        key: &TicketKey,
        added: &[Artifact],
        revision: u32,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FsCrStore
// ---------------------------------------------------------------------------

/// Filesystem-backed store: one directory per CR under `.mdt/crs/` holding
/// a YAML manifest and the markdown CR document.
pub struct FsCrStore {
    root: PathBuf,
}

impl FsCrStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_doc(&self, key: &TicketKey) -> Result<String> {
        let path = paths::cr_doc(&self.root, key);
        if !path.exists() {
            return Err(MdtError::CrNotFound(key.to_string()));
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    fn write_doc(&self, key: &TicketKey, doc: &str) -> Result<()> {
        crate::io::atomic_write(&paths::cr_doc(&self.root, key), doc.as_bytes())
    }
}

impl CrStore for FsCrStore {
    fn get_cr(&self, key: &TicketKey) -> Result<ChangeRequest> {
        ChangeRequest::load(&self.root, key)
    }

    fn insert_section(&self, key: &TicketKey, position: usize, content: &str) -> Result<()> {
        let doc = self.read_doc(key)?;
        let (preamble, mut sections) = split_sections(&doc);

        let heading = content.lines().next().unwrap_or("").to_string();
        if sections
            .iter()
            .any(|s| s.lines().next() == Some(heading.as_str()))
        {
            return Err(MdtError::SectionConflict {
                key: key.to_string(),
                reason: format!("section '{heading}' already exists"),
            });
        }

        let at = position.min(sections.len());
        sections.insert(at, content.trim_end().to_string());
        self.write_doc(key, &join_sections(&preamble, &sections))
    }

    fn append_acceptance_criteria(&self, key: &TicketKey, items: &[String]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let doc = self.read_doc(key)?;
        let (preamble, mut sections) = split_sections(&doc);

        let idx = sections
            .iter()
            .position(|s| s.starts_with("## Acceptance Criteria"));
        let section = match idx {
            Some(i) => &mut sections[i],
            None => {
                sections.push("## Acceptance Criteria".to_string());
                let last = sections.len() - 1;
                &mut sections[last]
            }
        };
        let mut updated = section.trim_end().to_string();
        for item in items {
            updated.push_str(&format!("\n- [ ] {item}"));
        }
        *section = updated;
        self.write_doc(key, &join_sections(&preamble, &sections))?;

        let mut cr = ChangeRequest::load(&self.root, key)?;
        cr.acceptance_criteria.extend(items.iter().cloned());
        cr.updated_at = Utc::now();
        cr.save(&self.root)
    }

    fn update_artifact_table(
        &self,
        key: &TicketKey,
        added: &[Artifact],
        revision: u32,
    ) -> Result<()> {
        let mut cr = ChangeRequest::load(&self.root, key)?;
        for artifact in added {
            if cr.artifact(&artifact.path).is_none() {
                cr.artifacts.push(artifact.clone());
            }
        }
        cr.design_revision = revision;
        cr.updated_at = Utc::now();
        cr.save(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Section surgery
// ---------------------------------------------------------------------------

/// Split a markdown document into its preamble (title block) and `##`
/// sections. Each section runs from its heading line to the next heading.
fn split_sections(doc: &str) -> (String, Vec<String>) {
    let mut preamble = String::new();
    let mut sections: Vec<String> = Vec::new();
    for line in doc.lines() {
        if line.starts_with("## ") {
            sections.push(line.to_string());
        } else if let Some(current) = sections.last_mut() {
            current.push('\n');
            current.push_str(line);
        } else {
            preamble.push_str(line);
            preamble.push('\n');
        }
    }
    (
        preamble.trim_end().to_string(),
        sections.into_iter().map(|s| s.trim_end().to_string()).collect(),
    )
}

fn join_sections(preamble: &str, sections: &[String]) -> String {
    let mut out = String::new();
    if !preamble.is_empty() {
        out.push_str(preamble);
        out.push_str("\n\n");
    }
    for (i, section) in sections.iter().enumerate() {
        out.push_str(section);
        if i + 1 < sections.len() {
            out.push_str("\n\n");
        }
    }
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
