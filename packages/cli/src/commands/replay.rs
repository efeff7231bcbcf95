use crate::commands::{outline, read_page};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use brickd_core::{Action, PageConfig, Store};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON file holding an array of actions
    pub script: PathBuf,

    /// Page document to start from (overrides config)
    #[arg(short, long)]
    pub page: Option<PathBuf>,

    /// Start from an empty page instead of the configured document
    #[arg(long, conflicts_with = "page")]
    pub empty: bool,

    /// Write the resulting page here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail if any action is rejected
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of replaying one script
#[derive(Debug)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
    pub page: PageConfig,
    pub undo_levels: usize,
}

pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    let initial = if args.empty {
        PageConfig::new()
    } else {
        let path = match &args.page {
            Some(page) => PathBuf::from(cwd).join(page),
            None => config.get_page_path(cwd),
        };
        if path.exists() {
            read_page(&path)?
        } else {
            info!(page = %path.display(), "page not found, starting empty");
            PageConfig::new()
        }
    };

    let actions = read_script(&PathBuf::from(cwd).join(&args.script))?;

    println!("{}", "▶️  Replaying actions...".bright_blue().bold());
    let summary = run_script(initial, &config, actions);

    println!();
    if summary.rejected == 0 {
        println!(
            "{} Applied {} actions, {} nodes, {} undo levels",
            "✅".green(),
            summary.applied,
            summary.page.len(),
            summary.undo_levels
        );
    } else {
        println!(
            "{} Applied {} actions, {} rejected",
            "⚠️".yellow(),
            summary.applied,
            summary.rejected
        );
    }

    match &args.output {
        Some(output) => {
            let output = PathBuf::from(cwd).join(output);
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, serde_json::to_string_pretty(&summary.page)?)?;
            println!("  {} Wrote {}", "✓".green(), output.display());
        }
        None => {
            println!();
            for line in outline(&summary.page) {
                println!("  {}", line);
            }
        }
    }

    if args.strict && summary.rejected > 0 {
        return Err(anyhow!("{} actions were rejected", summary.rejected));
    }

    Ok(())
}

fn read_script(path: &Path) -> Result<Vec<Action>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow!("Invalid action script {}: {}", path.display(), e))
}

/// Dispatch every action in order, reporting each rejection
pub fn run_script(initial: PageConfig, config: &Config, actions: Vec<Action>) -> ReplaySummary {
    let mut store = Store::with_page(initial, &config.engine);
    let total = actions.len();
    let mut rejected = 0;

    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        if let Err(err) = store.dispatch(action) {
            rejected += 1;
            println!(
                "  {} #{} {} - {}",
                "✗".red(),
                index,
                name,
                err.to_string().yellow()
            );
        }
    }

    ReplaySummary {
        applied: total - rejected,
        rejected,
        undo_levels: store.state().history().undo_levels(),
        page: store.page_config().clone(),
    }
}
