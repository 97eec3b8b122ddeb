use crate::output::{print_json, print_table};
use mdt_core::config::Config;
use mdt_core::threshold::{resolve, OverrideSet, Threshold};
use mdt_core::types::Role;
use mdt_core::MdtError;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    // Usable before init: falls back to the static defaults.
    let overrides = match Config::load(root) {
        Ok(config) => config.threshold_overrides,
        Err(MdtError::NotInitialized) => OverrideSet::default(),
        Err(e) => return Err(e.into()),
    };

    let empty = OverrideSet::default();
    let table: Vec<Threshold> = Role::all()
        .iter()
        .map(|&role| resolve(role, &empty, &overrides))
        .collect();

    if json {
        return print_json(&table);
    }
    let rows = table
        .iter()
        .map(|t| {
            vec![
                t.role.to_string(),
                t.default.to_string(),
                t.hard_max.to_string(),
            ]
        })
        .collect();
    print_table(&["ROLE", "DEFAULT", "HARD MAX"], rows);
    Ok(())
}
