use crate::output::print_json;
use clap::Subcommand;
use mdt_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    match subcmd {
        ConfigSubcommand::Show => {
            if json {
                print_json(&config)?;
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
            Ok(())
        }
        ConfigSubcommand::Validate => {
            let issues = config.validate();
            if json {
                return print_json(&issues);
            }
            if issues.is_empty() {
                println!("Config OK");
                return Ok(());
            }
            let mut errors = 0;
            for issue in &issues {
                match issue.level {
                    WarnLevel::Warning => println!("warning: {}", issue.message),
                    WarnLevel::Error => {
                        errors += 1;
                        println!("error: {}", issue.message);
                    }
                }
            }
            if errors > 0 {
                anyhow::bail!("{errors} config error(s)");
            }
            Ok(())
        }
    }
}
