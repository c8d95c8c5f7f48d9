use crate::manifest::WriteManifest;
use colored::Colorize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Represents a node in the tree (either file or directory).
#[derive(Debug)]
struct TreeNode {
    name: String,
    children: Vec<Rc<RefCell<TreeNode>>>,
    is_file: bool,
}
impl TreeNode {
    fn new(name: String, is_file: bool) -> Self {
        Self {
            name,
            children: Vec::new(),
            is_file,
        }
    }
}

/// Build the directory tree from the manifest, returning the root node.
///
/// Parents a manifest only implies (e.g. `src` for `src/app.js`) get their own directory node.
fn build_tree(manifest: &WriteManifest, root_name: String) -> Rc<RefCell<TreeNode>> {
    let root = Rc::new(RefCell::new(TreeNode::new(root_name, false)));

    // map relative path to node, the root being the empty path
    let mut lookup: HashMap<PathBuf, Rc<RefCell<TreeNode>>> = HashMap::new();
    lookup.insert(PathBuf::new(), Rc::clone(&root));

    // sorted by components, so a parent is always linked before its children
    for rel_path in manifest.path_set() {
        let parent_path = rel_path.parent().unwrap_or_else(|| Path::new(""));

        let Some(parent_node) = lookup.get(parent_path).map(Rc::clone) else {
            log::debug!("no parent node for {}", rel_path.display());
            continue;
        };

        let child_name = rel_path
            .file_name()
            .map(|os| os.to_string_lossy().to_string())
            .unwrap_or_else(|| rel_path.display().to_string());

        let is_file = manifest
            .get(&rel_path)
            .map(|entry| entry.is_file())
            .unwrap_or(false);

        let new_child = Rc::new(RefCell::new(TreeNode::new(child_name, is_file)));

        parent_node
            .borrow_mut()
            .children
            .push(Rc::clone(&new_child));

        lookup.insert(rel_path, new_child);
    }

    root
}

fn render_node(node: &Rc<RefCell<TreeNode>>, prefix: &str, is_last: bool, out: &mut Vec<String>) {
    let node_borrow = node.borrow();

    let connector = if is_last {
        "└── ".yellow()
    } else {
        "├── ".yellow()
    };
    let name = if node_borrow.is_file {
        node_borrow.name.green()
    } else {
        node_borrow.name.blue()
    };
    out.push(format!("{}{}{}", prefix.yellow(), connector, name));

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let len = node_borrow.children.len();
    for (i, child) in node_borrow.children.iter().enumerate() {
        let last = i == len - 1;
        render_node(child, &child_prefix, last, out);
    }
}

/// Renders `manifest` as an ASCII tree rooted at `destination`'s final component.
pub fn render_tree(manifest: &WriteManifest, destination: &Path) -> String {
    let root_name = destination
        .file_name()
        .map(|os| os.to_string_lossy().to_string())
        .unwrap_or_else(|| destination.display().to_string());

    let tree_root = build_tree(manifest, root_name);

    let mut lines = Vec::new();
    render_node(&tree_root, "", true, &mut lines);

    lines.join("\n")
}

pub fn preview_as_tree(manifest: &WriteManifest, destination: &Path) {
    println!(
        "Legend: {} = (directory), {} = (file)",
        "blue".blue(),
        "green".green()
    );

    println!(
        "{} {} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
        destination.display()
    );

    println!("{}", render_tree(manifest, destination));

    println!(
        "\n{} {}",
        "└─".bold().bright_blue(),
        "Dry run, nothing was written".bright_green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tree_nests_implied_parents() {
        colored::control::set_override(false);

        let mut manifest = WriteManifest::new();
        manifest.add_directory("tests").unwrap();
        manifest.add_file("server.js", "").unwrap();
        manifest.add_file("src/routes/index.js", "").unwrap();

        let tree = render_tree(&manifest, Path::new("/tmp/shop-api"));

        let expected = [
            "└── shop-api",
            "    ├── server.js",
            "    ├── src",
            "    │   └── routes",
            "    │       └── index.js",
            "    └── tests",
        ]
        .join("\n");

        assert_eq!(tree, expected);
    }

    #[test]
    fn test_build_tree_marks_files() {
        let mut manifest = WriteManifest::new();
        manifest.add_directory("public").unwrap();
        manifest.add_file("public/.gitkeep", "").unwrap();

        let root = build_tree(&manifest, "app".to_string());
        let root = root.borrow();
        let public = root.children[0].borrow();

        assert_eq!(public.name, "public");
        assert!(!public.is_file);
        assert_eq!(public.children.len(), 1);
        assert!(public.children[0].borrow().is_file);
    }
}
