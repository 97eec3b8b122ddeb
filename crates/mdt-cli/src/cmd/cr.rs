use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use mdt_core::artifact::Artifact;
use mdt_core::cr::ChangeRequest;
use mdt_core::ticket::TicketKey;
use mdt_core::types::{CrStatus, Role};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CrSubcommand {
    /// Create a change request
    Create {
        /// Ticket key (e.g. MDT-066; lowercase and short numbers are normalized)
        key: String,
        #[arg(long)]
        title: String,
        /// What the change is trying to fix or add
        #[arg(long)]
        problem: String,
    },

    /// Show one change request
    Show { key: String },

    /// List all change requests
    List,

    /// Declare an artifact this CR will create or modify
    Declare {
        key: String,
        /// Artifact path, may be templated (e.g. commands/{name}.ext)
        path: String,
        /// Role: orchestration, feature, complex-logic, utility, or shared-base
        #[arg(long)]
        role: String,
        /// One-line responsibility statement
        #[arg(long)]
        responsibility: String,
        /// Measured line count, if the artifact already exists
        #[arg(long)]
        lines: Option<u32>,
    },

    /// Record a measured line count for a declared artifact
    VerifySize {
        key: String,
        path: String,
        #[arg(long)]
        lines: u32,
    },

    /// Mark a declared artifact as superseded by a later revision
    Supersede { key: String, path: String },

    /// Record the line count of the monolith this CR replaces
    SetMonolith {
        key: String,
        #[arg(long)]
        lines: u32,
    },

    /// Map a repeated responsibility to an explicit extraction target
    SetTarget {
        key: String,
        responsibility: String,
        target: String,
    },

    /// Set the CR status (proposed, approved, in-progress, implemented, superseded)
    SetStatus { key: String, status: String },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: CrSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CrSubcommand::Create {
            key,
            title,
            problem,
        } => create(root, &key, &title, &problem, json),
        CrSubcommand::Show { key } => show(root, &key, json),
        CrSubcommand::List => list(root, json),
        CrSubcommand::Declare {
            key,
            path,
            role,
            responsibility,
            lines,
        } => declare(root, &key, &path, &role, &responsibility, lines, json),
        CrSubcommand::VerifySize { key, path, lines } => verify_size(root, &key, &path, lines),
        CrSubcommand::Supersede { key, path } => supersede(root, &key, &path),
        CrSubcommand::SetMonolith { key, lines } => set_monolith(root, &key, lines),
        CrSubcommand::SetTarget {
            key,
            responsibility,
            target,
        } => set_target(root, &key, &responsibility, &target),
        CrSubcommand::SetStatus { key, status } => set_status(root, &key, &status),
    }
}

// ---------------------------------------------------------------------------
// create / show / list
// ---------------------------------------------------------------------------

fn create(root: &Path, key: &str, title: &str, problem: &str, json: bool) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let cr = ChangeRequest::create(root, key, title, problem).context("failed to create CR")?;
    if json {
        print_json(&cr)?;
    } else {
        println!("Created {}: {}", cr.key, cr.title);
    }
    Ok(())
}

fn show(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let cr = ChangeRequest::load(root, &key)?;
    if json {
        return print_json(&cr);
    }

    println!("{}: {}", cr.key, cr.title);
    println!("  status:   {}", cr.status.as_str());
    println!("  problem:  {}", cr.problem_statement);
    if let Some(lines) = cr.replaces_monolith_lines {
        println!("  replaces: {lines}-line monolith");
    }
    if cr.design_revision > 0 {
        println!("  design:   r{}", cr.design_revision);
    }
    if !cr.artifacts.is_empty() {
        println!();
        let rows = cr
            .artifacts
            .iter()
            .map(|a| {
                vec![
                    a.path.clone(),
                    a.role.to_string(),
                    a.responsibility.clone(),
                    a.declared_lines
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    if a.superseded { "superseded" } else { "" }.to_string(),
                ]
            })
            .collect();
        print_table(&["PATH", "ROLE", "RESPONSIBILITY", "LINES", ""], rows);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let crs = ChangeRequest::list(root)?;
    if json {
        return print_json(&crs);
    }
    if crs.is_empty() {
        println!("No change requests. Create one with 'mdt cr create'.");
        return Ok(());
    }
    let rows = crs
        .iter()
        .map(|cr| {
            vec![
                cr.key.to_string(),
                cr.status.as_str().to_string(),
                cr.artifacts.len().to_string(),
                if cr.design_revision > 0 {
                    format!("r{}", cr.design_revision)
                } else {
                    "-".to_string()
                },
                cr.title.clone(),
            ]
        })
        .collect();
    print_table(&["KEY", "STATUS", "ARTIFACTS", "DESIGN", "TITLE"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// artifact mutations
// ---------------------------------------------------------------------------

fn declare(
    root: &Path,
    key: &str,
    path: &str,
    role: &str,
    responsibility: &str,
    lines: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let role: Role = role.parse()?;
    let mut cr = ChangeRequest::load(root, &key)?;

    let mut artifact = Artifact::new(path, role, responsibility);
    if let Some(l) = lines {
        artifact = artifact.with_lines(l);
    }
    cr.declare_artifact(artifact);
    cr.save(root)?;

    if json {
        print_json(&cr)?;
    } else {
        println!("Declared {path} ({role}) on {key}");
    }
    Ok(())
}

fn verify_size(root: &Path, key: &str, path: &str, lines: u32) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let mut cr = ChangeRequest::load(root, &key)?;
    cr.verify_artifact_size(path, lines)?;
    cr.save(root)?;
    println!("Verified {path} at {lines} lines");
    Ok(())
}

fn supersede(root: &Path, key: &str, path: &str) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let mut cr = ChangeRequest::load(root, &key)?;
    cr.supersede_artifact(path)?;
    cr.save(root)?;
    println!("Superseded {path}");
    Ok(())
}

// ---------------------------------------------------------------------------
// metadata mutations
// ---------------------------------------------------------------------------

fn set_monolith(root: &Path, key: &str, lines: u32) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let mut cr = ChangeRequest::load(root, &key)?;
    cr.replaces_monolith_lines = Some(lines);
    cr.save(root)?;
    println!("{key} replaces a {lines}-line monolith");
    Ok(())
}

fn set_target(root: &Path, key: &str, responsibility: &str, target: &str) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let mut cr = ChangeRequest::load(root, &key)?;
    cr.extraction_targets
        .insert(responsibility.to_string(), target.to_string());
    cr.save(root)?;
    println!("'{responsibility}' extracts to {target}");
    Ok(())
}

fn set_status(root: &Path, key: &str, status: &str) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let status: CrStatus = status.parse()?;
    let mut cr = ChangeRequest::load(root, &key)?;
    cr.status = status;
    cr.save(root)?;
    println!("{key} is now {}", status.as_str());
    Ok(())
}
