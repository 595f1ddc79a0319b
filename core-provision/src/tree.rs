//! Target folder tree

/// Root folder provisioned when nothing else is configured.
pub const DEFAULT_ROOT: &str = "Research_Project";

/// Subfolders provisioned under the root by default.
pub const DEFAULT_CHILDREN: [&str; 3] = ["data", "models", "results"];

/// A folder that must exist, with the folders that must exist inside it.
///
/// The parent of a node is implied by its position; the parent of the
/// outermost node is the storage root. Names are compared exactly.
///
/// # Example
///
/// ```
/// use core_provision::FolderSpec;
///
/// let tree = FolderSpec::new("Research_Project")
///     .with_children(["data", "models", "results"]);
///
/// assert_eq!(tree.node_count(), 4);
/// assert_eq!(tree.children[1].name, "models");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSpec {
    pub name: String,
    pub children: Vec<FolderSpec>,
}

impl FolderSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append one child subtree.
    pub fn with_child(mut self, child: FolderSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Append leaf children by name.
    pub fn with_children<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children.extend(names.into_iter().map(FolderSpec::new));
        self
    }

    /// `Research_Project` with `data`, `models` and `results`.
    pub fn research_project() -> Self {
        FolderSpec::new(DEFAULT_ROOT).with_children(DEFAULT_CHILDREN)
    }

    /// Total number of nodes, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(FolderSpec::node_count).sum::<usize>()
    }

    /// Node names in pre-order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for child in &self.children {
            names.extend(child.names());
        }
        names
    }
}

impl Default for FolderSpec {
    fn default() -> Self {
        Self::research_project()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree_shape() {
        let tree = FolderSpec::default();
        assert_eq!(tree.name, "Research_Project");
        assert_eq!(tree.names(), vec!["Research_Project", "data", "models", "results"]);
        assert!(tree.children.iter().all(|child| child.children.is_empty()));
    }

    #[test]
    fn test_nested_tree_preorder() {
        let tree = FolderSpec::new("a")
            .with_child(FolderSpec::new("b").with_children(["c"]))
            .with_children(["d"]);

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.names(), vec!["a", "b", "c", "d"]);
    }
}
