use crate::ticket::TicketKey;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MDT_DIR: &str = ".mdt";
pub const CRS_DIR: &str = ".mdt/crs";

pub const CONFIG_FILE: &str = ".mdt/config.yaml";
pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const CR_DOC_FILE: &str = "cr.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn mdt_dir(root: &Path) -> PathBuf {
    root.join(MDT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn cr_dir(root: &Path, key: &TicketKey) -> PathBuf {
    root.join(CRS_DIR).join(key.as_str())
}

pub fn cr_manifest(root: &Path, key: &TicketKey) -> PathBuf {
    cr_dir(root, key).join(MANIFEST_FILE)
}

pub fn cr_doc(root: &Path, key: &TicketKey) -> PathBuf {
    cr_dir(root, key).join(CR_DOC_FILE)
}
