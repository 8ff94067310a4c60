use std::collections::HashMap;

/// Deduplicated source file names in first-seen order.
///
/// Many library windows share a source file; each window stores only the
/// dense index returned by [`FileTable::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `name`, inserting it if unseen.
    ///
    /// Re-inserting a known name returns its existing index.
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_idempotent() {
        let mut table = FileTable::new();
        let a = table.insert("a.wav");
        let again = table.insert("a.wav");
        assert_eq!(a, again);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_first_seen_order() {
        let mut table = FileTable::new();
        let names = ["c.wav", "a.wav", "b.wav"];
        for (i, name) in names.iter().enumerate() {
            assert_eq!(table.insert(name), i);
        }
        table.insert("a.wav");
        assert_eq!(table.names(), &["c.wav", "a.wav", "b.wav"]);
        assert_eq!(table.index_of("b.wav"), Some(2));
        assert_eq!(table.get(1), Some("a.wav"));
        assert_eq!(table.get(3), None);
    }
}
