use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use brickd_core::{EngineConfig, PlatformInfo};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Page document to create
    #[arg(short, long, default_value = "page.json")]
    pub page: String,

    /// Prefix for generated node keys
    #[arg(long, default_value = "brick")]
    pub seed: String,

    /// Initial preview platform (pc, mobile)
    #[arg(long, default_value = "pc")]
    pub platform: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let platform = match args.platform.as_str() {
        "pc" => PlatformInfo::pc(),
        "mobile" => PlatformInfo::mobile(),
        other => {
            return Err(anyhow!(
                "Invalid platform: {}. Use: pc or mobile",
                other
            ))
        }
    };

    println!("{}", "📝 Initializing brickd project...".bright_blue().bold());

    let page_path = PathBuf::from(cwd).join(&args.page);
    if !page_path.exists() {
        if let Some(parent) = page_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let page = json!({
            "root": { "componentName": "div", "childNodes": [] }
        });
        fs::write(&page_path, serde_json::to_string_pretty(&page)?)?;
        println!("  {} Created {}", "✓".green(), args.page);
    }

    let config = Config {
        page: args.page.clone(),
        engine: EngineConfig {
            platform,
            ..EngineConfig::default().with_key_seed(args.seed)
        },
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write an action script (JSON array of actions)");
    println!("  2. Run: brickd replay script.json --output {}", args.page);
    println!("  3. Run: brickd validate");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(force: bool) -> InitArgs {
        InitArgs {
            page: "pages/home.json".to_string(),
            seed: "node".to_string(),
            platform: "mobile".to_string(),
            force,
        }
    }

    #[test]
    fn test_init_writes_config_and_page() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        init(args(false), cwd).unwrap();

        let config = Config::load(cwd).unwrap();
        assert_eq!(config.page, "pages/home.json");
        assert_eq!(config.engine.key_seed, "node");
        assert_eq!(config.engine.platform, PlatformInfo::mobile());

        let page = crate::commands::read_page(&config.get_page_path(cwd)).unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();

        init(args(false), cwd).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join(DEFAULT_CONFIG_NAME)).unwrap(),
            "{}"
        );

        init(args(true), cwd).unwrap();
        assert_eq!(Config::load(cwd).unwrap().engine.key_seed, "node");
    }

    #[test]
    fn test_init_rejects_unknown_platform() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = args(false);
        bad.platform = "watch".to_string();
        assert!(init(bad, dir.path().to_str().unwrap()).is_err());
    }
}
