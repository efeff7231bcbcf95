pub mod init;
pub mod replay;
pub mod validate;

pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{anyhow, Context, Result};
use brickd_core::{ChildNodes, PageConfig};
use std::fs;
use std::path::Path;

/// Read and validate a page document
pub(crate) fn read_page(path: &Path) -> Result<PageConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| anyhow!("Invalid page {}: {}", path.display(), e))
}

/// Indented outline of the page tree, one node per line
pub(crate) fn outline(page: &PageConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(root) = page.root() {
        outline_node(page, &root.key, 0, &mut lines);
    }
    lines
}

fn outline_node(page: &PageConfig, key: &str, depth: usize, lines: &mut Vec<String>) {
    let Some(node) = page.get(key) else {
        return;
    };
    let indent = "  ".repeat(depth);
    lines.push(format!("{}{} ({})", indent, node.component_name, key));

    match &node.child_nodes {
        Some(ChildNodes::List(children)) => {
            for child in children {
                outline_node(page, child, depth + 1, lines);
            }
        }
        Some(ChildNodes::Slots(slots)) => {
            for (slot, children) in slots {
                lines.push(format!("{}  [{}]", indent, slot));
                for child in children {
                    outline_node(page, child, depth + 2, lines);
                }
            }
        }
        None => {}
    }
}
