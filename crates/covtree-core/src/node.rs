use crate::totals::Totals;

/// A file leaf with totals taken straight from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub full_path: String,
    pub totals: Totals,
}

/// A directory with its totals summed from its children once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNode {
    full_path: String,
    children: Vec<PathNode>,
    totals: Totals,
}

impl DirNode {
    pub fn new(full_path: impl Into<String>, children: Vec<PathNode>) -> Self {
        let totals = children.iter().map(PathNode::totals).sum();
        Self {
            full_path: full_path.into(),
            children,
            totals,
        }
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn children(&self) -> &[PathNode] {
        &self.children
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    File(FileNode),
    Dir(DirNode),
}

impl PathNode {
    pub fn full_path(&self) -> &str {
        match self {
            PathNode::File(file) => &file.full_path,
            PathNode::Dir(dir) => dir.full_path(),
        }
    }

    /// Last segment of the full path.
    pub fn name(&self) -> &str {
        let full_path = self.full_path();
        full_path.rsplit('/').next().unwrap_or(full_path)
    }

    pub fn totals(&self) -> Totals {
        match self {
            PathNode::File(file) => file.totals,
            PathNode::Dir(dir) => dir.totals(),
        }
    }

    pub fn lines(&self) -> u64 {
        self.totals().lines
    }

    pub fn hits(&self) -> u64 {
        self.totals().hits
    }

    pub fn misses(&self) -> u64 {
        self.totals().misses
    }

    pub fn partials(&self) -> u64 {
        self.totals().partials
    }

    pub fn coverage(&self) -> f64 {
        self.totals().coverage()
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, PathNode::Dir(_))
    }

    /// Direct children; empty for files.
    pub fn children(&self) -> &[PathNode] {
        match self {
            PathNode::File(_) => &[],
            PathNode::Dir(dir) => dir.children(),
        }
    }
}

impl From<FileNode> for PathNode {
    fn from(file: FileNode) -> Self {
        PathNode::File(file)
    }
}

impl From<DirNode> for PathNode {
    fn from(dir: DirNode) -> Self {
        PathNode::Dir(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, totals: Totals) -> PathNode {
        PathNode::File(FileNode {
            full_path: path.to_string(),
            totals,
        })
    }

    #[test]
    fn test_name_is_last_segment() {
        let node = file("src/core/lib.rs", Totals::default());
        assert_eq!(node.name(), "lib.rs");
        assert_eq!(file("top.rs", Totals::default()).name(), "top.rs");
    }

    #[test]
    fn test_dir_totals_sum_nested_children() {
        let inner = DirNode::new(
            "src/core",
            vec![
                file("src/core/a.rs", Totals::new(10, 5, 5, 0)),
                file("src/core/b.rs", Totals::new(4, 2, 1, 1)),
            ],
        );
        let outer = DirNode::new(
            "src",
            vec![inner.into(), file("src/main.rs", Totals::new(6, 6, 0, 0))],
        );

        assert_eq!(outer.totals(), Totals::new(20, 13, 6, 1));
        assert_eq!(PathNode::from(outer).coverage(), 65.0);
    }

    #[test]
    fn test_file_has_no_children() {
        let node = file("a.rs", Totals::default());
        assert!(node.children().is_empty());
        assert!(!node.is_dir());
    }
}
