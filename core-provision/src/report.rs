//! Result of one provisioning run

use std::fmt;

/// What happened to one node of the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    /// Reused an existing folder.
    Existing(String),
    /// Created a new folder.
    Created(String),
    /// Creation failed with the given reason.
    Failed(String),
    /// Not attempted because an ancestor failed.
    Skipped,
}

impl NodeOutcome {
    /// Identifier of the folder, if one is available.
    pub fn id(&self) -> Option<&str> {
        match self {
            NodeOutcome::Existing(id) | NodeOutcome::Created(id) => Some(id),
            NodeOutcome::Failed(_) | NodeOutcome::Skipped => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.id().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedNode {
    pub name: String,
    pub parent_id: Option<String>,
    pub outcome: NodeOutcome,
    pub children: Vec<ProvisionedNode>,
}

impl ProvisionedNode {
    fn walk<'a>(&'a self, out: &mut Vec<&'a ProvisionedNode>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// Overall result, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProvisionStatus {
    /// Every folder exists.
    Complete,
    /// The root exists but at least one descendant does not.
    Partial,
    /// The root could not be resolved or created; nothing below was tried.
    RootFailed,
}

impl fmt::Display for ProvisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionStatus::Complete => write!(f, "complete"),
            ProvisionStatus::Partial => write!(f, "partial"),
            ProvisionStatus::RootFailed => write!(f, "root failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub root: ProvisionedNode,
}

impl ProvisionReport {
    pub fn new(root: ProvisionedNode) -> Self {
        Self { root }
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> Vec<&ProvisionedNode> {
        let mut nodes = Vec::new();
        self.root.walk(&mut nodes);
        nodes
    }

    pub fn status(&self) -> ProvisionStatus {
        if !self.root.outcome.is_available() {
            ProvisionStatus::RootFailed
        } else if self.nodes().iter().all(|node| node.outcome.is_available()) {
            ProvisionStatus::Complete
        } else {
            ProvisionStatus::Partial
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == ProvisionStatus::Complete
    }

    /// `(name, id)` of every available folder, in pre-order.
    pub fn ids(&self) -> Vec<(&str, &str)> {
        self.nodes()
            .into_iter()
            .filter_map(|node| node.outcome.id().map(|id| (node.name.as_str(), id)))
            .collect()
    }

    pub fn created_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, NodeOutcome::Created(_)))
    }

    pub fn existing_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, NodeOutcome::Existing(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, NodeOutcome::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, NodeOutcome::Skipped))
    }

    fn count(&self, predicate: impl Fn(&NodeOutcome) -> bool) -> usize {
        self.nodes()
            .into_iter()
            .filter(|node| predicate(&node.outcome))
            .count()
    }

    /// One-line summary for the end of the trace.
    pub fn summary(&self) -> String {
        match self.status() {
            ProvisionStatus::Complete => format!(
                "Success: all {} folders are in place ({} created, {} already existed)",
                self.nodes().len(),
                self.created_count(),
                self.existing_count()
            ),
            ProvisionStatus::Partial => format!(
                "Partial failure: {} failed, {} skipped, {} in place",
                self.failed_count(),
                self.skipped_count(),
                self.created_count() + self.existing_count()
            ),
            ProvisionStatus::RootFailed => format!(
                "Failure: root folder '{}' is unavailable; no subfolders were attempted",
                self.root.name
            ),
        }
    }

    /// Render the tree with box-drawing guides.
    ///
    /// ```text
    /// Research_Project  [created] 1AbC
    /// ├── data  [exists] 2DeF
    /// ├── models  [FAILED] quota exceeded
    /// └── results  [created] 3GhI
    /// ```
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        out.push_str(&node_line(&self.root));
        out.push('\n');
        render_children(&self.root, "", &mut out);
        out
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_tree())
    }
}

fn node_line(node: &ProvisionedNode) -> String {
    match &node.outcome {
        NodeOutcome::Existing(id) => format!("{}  [exists] {}", node.name, id),
        NodeOutcome::Created(id) => format!("{}  [created] {}", node.name, id),
        NodeOutcome::Failed(reason) => format!("{}  [FAILED] {}", node.name, reason),
        NodeOutcome::Skipped => format!("{}  [skipped]", node.name),
    }
}

fn render_children(node: &ProvisionedNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (index, child) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&node_line(child));
        out.push('\n');

        let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
        render_children(child, &nested, out);
    }
}
