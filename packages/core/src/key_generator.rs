use crate::node::Key;
use crate::page_config::PageConfig;

/// Seed used when the configuration does not name one
pub const DEFAULT_SEED: &str = "brick";

/// Sequential key generator for page nodes
///
/// Keys have the form `{seed}-{n}`. The counter only moves forward, so a key
/// is never handed out twice by the same generator, even across undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenerator {
    seed: String,
    count: u64,
}

impl KeyGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential key
    pub fn next_key(&mut self) -> Key {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Generate the next key that is not already used by `page`.
    ///
    /// Loaded pages may already contain keys produced by an earlier session
    /// with the same seed.
    pub fn next_unused(&mut self, page: &PageConfig) -> Key {
        loop {
            let key = self.next_key();
            if !page.contains(&key) {
                return key;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ChildNodes, Node, ROOT};

    #[test]
    fn test_sequential_keys() {
        let mut gen = KeyGenerator::new("page");

        let key1 = gen.next_key();
        let key2 = gen.next_key();
        let key3 = gen.next_key();

        assert_eq!(key1, "page-1");
        assert_eq!(key2, "page-2");
        assert_eq!(key3, "page-3");
        assert_eq!(gen.count(), 3);
        assert_eq!(gen.seed(), "page");
    }

    #[test]
    fn test_next_unused_skips_existing_keys() {
        let root = Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(vec![
            "brick-1".to_string(),
            "brick-2".to_string(),
        ]));
        let page = PageConfig::from_nodes(vec![
            root,
            Node::new("brick-1", "span"),
            Node::new("brick-2", "span"),
        ])
        .unwrap();

        let mut gen = KeyGenerator::default();
        assert_eq!(gen.next_unused(&page), "brick-3");
        assert_eq!(gen.next_unused(&page), "brick-4");
    }
}
