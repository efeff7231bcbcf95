use crate::commands::{outline, read_page};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Page document to check (defaults to the configured page)
    pub page: Option<PathBuf>,

    /// Only report the result, without the tree outline
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn validate(args: ValidateArgs, cwd: &str) -> Result<()> {
    let path = match &args.page {
        Some(page) => PathBuf::from(cwd).join(page),
        None => Config::load(cwd)?.get_page_path(cwd),
    };

    println!("🔍 {} {}", "Validating".green().bold(), path.display());

    let page = read_page(&path)?;

    if !args.quiet {
        println!();
        for line in outline(&page) {
            println!("  {}", line);
        }
    }

    let max_depth = page
        .keys()
        .filter_map(|key| page.depth(key))
        .max()
        .unwrap_or(0);

    println!();
    println!(
        "{} {} nodes, depth {}",
        "✅".green(),
        page.len(),
        max_depth
    );

    Ok(())
}
