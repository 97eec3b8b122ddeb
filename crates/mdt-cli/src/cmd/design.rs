use crate::output::print_json;
use mdt_core::config::Config;
use mdt_core::cr::{ChangeRequest, FsCrStore};
use mdt_core::engine::{self, PassOutcome};
use mdt_core::ticket::TicketKey;
use mdt_core::MdtError;
use std::path::Path;

pub fn run(root: &Path, key: &str, select: Option<&[usize]>, json: bool) -> anyhow::Result<()> {
    let key = TicketKey::parse(key)?;
    let config = Config::load(root)?;
    let cr = ChangeRequest::load(root, &key)?;

    match select {
        None => surface(&cr, &config, json),
        Some(selections) => complete(root, &cr, &config, selections, json),
    }
}

// ---------------------------------------------------------------------------
// surface (read-only)
// ---------------------------------------------------------------------------

fn surface(cr: &ChangeRequest, config: &Config, json: bool) -> anyhow::Result<()> {
    let outcome = engine::surface(cr, config)?;
    if json {
        return print_json(&outcome);
    }

    if !outcome.is_needed() {
        println!("{}: architecture design not needed", cr.key);
        return Ok(());
    }

    println!(
        "{}: {} decision point(s)",
        cr.key,
        outcome.decisions.len()
    );
    if outcome.truncated {
        println!(
            "  (showing {} of {} candidates)",
            outcome.decisions.len(),
            outcome.candidates
        );
    }
    for (i, point) in outcome.decisions.iter().enumerate() {
        println!();
        println!("[{i}] {}", point.question);
        for (j, option) in point.options.iter().enumerate() {
            let marker = if j == point.recommended {
                " (recommended)"
            } else {
                ""
            };
            println!("    {j}. {}{marker}", option.title);
            println!("       {}", option.extension_note);
        }
    }
    println!();
    println!("Complete with: mdt design {} --select <index,...>", cr.key);
    Ok(())
}

// ---------------------------------------------------------------------------
// complete (persists on success)
// ---------------------------------------------------------------------------

fn complete(
    root: &Path,
    cr: &ChangeRequest,
    config: &Config,
    selections: &[usize],
    json: bool,
) -> anyhow::Result<()> {
    let store = FsCrStore::new(root);
    let outcome = engine::run_pass(cr, config, selections, &store)?;

    match &outcome {
        PassOutcome::NotNeeded { reason } => {
            if json {
                print_json(&outcome)?;
            } else {
                println!("{}: architecture design not needed ({reason})", cr.key);
            }
            Ok(())
        }
        PassOutcome::Blocked { report } => {
            if json {
                print_json(&outcome)?;
            } else {
                println!("{}: design blocked", cr.key);
                for v in &report.violations {
                    println!("  violation: {v}");
                }
                for w in &report.warnings {
                    println!("  warning:   {w}");
                }
            }
            Err(MdtError::DesignBlocked {
                count: report.violations.len(),
            }
            .into())
        }
        PassOutcome::Completed {
            document,
            added_paths,
            warnings,
        } => {
            if json {
                return print_json(&outcome);
            }
            println!("{}: design r{} persisted", cr.key, document.revision);
            for path in added_paths {
                println!("  added: {path}");
            }
            for w in warnings {
                println!("  warning: {w}");
            }
            Ok(())
        }
    }
}
