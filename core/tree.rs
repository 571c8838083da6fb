//! Structure preview: the surviving directory tree and its text rendering.

pub const STRUCTURE_HEADER: &str = "// Project structure";

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const BLANK_INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File {
        name: String,
    },
    Dir {
        name: String,
        children: Vec<TreeNode>,
    },
    /// Stands in for the contents of a directory that could not be listed.
    Error {
        message: String,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name } | TreeNode::Dir { name, .. } => name,
            TreeNode::Error { message } => message,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Dir { .. })
    }

    fn label(&self) -> String {
        match self {
            TreeNode::File { name } => name.clone(),
            TreeNode::Dir { name, .. } => format!("{}/", name),
            TreeNode::Error { message } => format!("[{}]", message),
        }
    }

    /// Slash-separated paths of every file leaf, relative to this node.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let TreeNode::Dir { children, .. } = self {
            collect_file_paths(children, "", &mut paths);
        }
        paths
    }
}

fn collect_file_paths(nodes: &[TreeNode], prefix: &str, out: &mut Vec<String>) {
    for node in nodes {
        match node {
            TreeNode::File { name } => out.push(format!("{}{}", prefix, name)),
            TreeNode::Dir { name, children } => {
                collect_file_paths(children, &format!("{}{}/", prefix, name), out)
            }
            TreeNode::Error { .. } => {}
        }
    }
}

/// Render the preview block. The root line is the root's name with a
/// trailing slash; every level below uses box-drawing connectors.
pub fn render_structure(root: &TreeNode) -> String {
    let mut lines = vec![STRUCTURE_HEADER.to_string(), root.label()];
    if let TreeNode::Dir { children, .. } = root {
        render_children(children, "", &mut lines);
    }
    lines.join("\n")
}

fn render_children(children: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    let count = children.len();
    for (index, child) in children.iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{}{}{}", prefix, connector, child.label()));

        if let TreeNode::Dir {
            children: grandchildren,
            ..
        } = child
        {
            let indent = if is_last { BLANK_INDENT } else { PIPE_INDENT };
            render_children(grandchildren, &format!("{}{}", prefix, indent), lines);
        }
    }
}
