use crate::error::Error;
use crate::index::PathIndex;
use crate::node::{DirNode, FileNode, PathNode};
use crate::path::PrefixedPath;
use ahash::AHashMap;
use tracing::debug;

/// Turns a resolved candidate set into file and directory nodes.
pub struct TreeBuilder<'a, 'r> {
    index: &'a PathIndex<'r>,
}

impl<'a, 'r> TreeBuilder<'a, 'r> {
    pub fn new(index: &'a PathIndex<'r>) -> Self {
        Self { index }
    }

    /// Every candidate as a file node, in candidate order.
    pub fn flat_list(&self) -> Result<Vec<FileNode>, Error> {
        self.index
            .paths()
            .iter()
            .map(|path| self.file_node(path))
            .collect()
    }

    /// The files and directories directly under the index prefix.
    ///
    /// Directories carry totals for their whole subtree: the grouping recurses
    /// one segment at a time until every group is a single file, even though
    /// only the top level is returned to the caller.
    pub fn single_level(&self) -> Result<Vec<PathNode>, Error> {
        let nodes = self.group_level(self.index.paths())?;
        debug!(
            "Built {} top-level nodes under {:?}",
            nodes.len(),
            self.index.prefix()
        );
        Ok(nodes)
    }

    fn group_level(&self, paths: &[PrefixedPath]) -> Result<Vec<PathNode>, Error> {
        let mut results = Vec::new();

        for (basename, members) in group_by_basename(paths) {
            if let [only] = members.as_slice() {
                if only.is_file() {
                    results.push(PathNode::File(self.file_node(only)?));
                    continue;
                }
            }

            let deeper: Vec<PrefixedPath> =
                members.iter().map(|p| p.with_prefix(&basename)).collect();
            let children = self.group_level(&deeper)?;
            results.push(PathNode::Dir(DirNode::new(basename, children)));
        }

        Ok(results)
    }

    fn file_node(&self, path: &PrefixedPath) -> Result<FileNode, Error> {
        Ok(FileNode {
            full_path: path.full_path.clone(),
            totals: self.index.totals(path)?,
        })
    }
}

/// Stable grouping: basenames in first-seen order, members in input order.
fn group_by_basename(paths: &[PrefixedPath]) -> Vec<(String, Vec<&PrefixedPath>)> {
    let mut groups: Vec<(String, Vec<&PrefixedPath>)> = Vec::new();
    let mut positions: AHashMap<String, usize> = AHashMap::new();

    for path in paths {
        let basename = path.basename();
        match positions.get(&basename) {
            Some(&position) => groups[position].1.push(path),
            None => {
                positions.insert(basename.clone(), groups.len());
                groups.push((basename, vec![path]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryReport, ReportBuilder};
    use crate::totals::Totals;

    fn report(paths: &[&str]) -> MemoryReport {
        paths
            .iter()
            .fold(ReportBuilder::new().session(0, &[]), |builder, path| {
                builder.counts(path, 0, 1, 1, 0)
            })
            .build()
            .unwrap()
    }

    fn summary(nodes: &[PathNode]) -> Vec<(bool, String)> {
        nodes
            .iter()
            .map(|n| (n.is_dir(), n.full_path().to_string()))
            .collect()
    }

    #[test]
    fn test_group_by_basename_is_stable() {
        let paths = vec![
            PrefixedPath::new("b/1.rs", ""),
            PrefixedPath::new("a.rs", ""),
            PrefixedPath::new("b/2.rs", ""),
        ];
        let groups = group_by_basename(&paths);
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a.rs"]);
        assert_eq!(groups[0].1[1].full_path, "b/2.rs");
    }

    #[test]
    fn test_single_level_collapses_deep_chains() {
        let report = report(&["a/b/c/d.rs", "e.rs"]);
        let index = PathIndex::resolve(&report, "", &[], None).unwrap();
        let nodes = TreeBuilder::new(&index).single_level().unwrap();

        assert_eq!(
            summary(&nodes),
            vec![(true, "a".to_string()), (false, "e.rs".to_string())]
        );
        let b = &nodes[0].children()[0];
        assert_eq!(b.full_path(), "a/b");
        assert_eq!(b.children()[0].full_path(), "a/b/c");
        assert_eq!(nodes[0].totals(), Totals::new(2, 1, 1, 0));
    }

    #[test]
    fn test_single_level_under_nested_prefix() {
        let report = report(&["src/a/x.rs", "src/a/y.rs", "src/b.rs", "docs/z.md"]);
        let index = PathIndex::resolve(&report, "src", &[], None).unwrap();
        let nodes = TreeBuilder::new(&index).single_level().unwrap();

        assert_eq!(
            summary(&nodes),
            vec![(true, "src/a".to_string()), (false, "src/b.rs".to_string())]
        );
        assert_eq!(nodes[0].name(), "a");
        assert_eq!(nodes[0].lines(), 4);
    }

    #[test]
    fn test_prefix_equal_to_file_is_a_file() {
        let report = report(&["a/b.py", "a/c.py"]);
        let index = PathIndex::resolve(&report, "a/b.py", &[], None).unwrap();
        let nodes = TreeBuilder::new(&index).single_level().unwrap();
        assert_eq!(summary(&nodes), vec![(false, "a/b.py".to_string())]);
    }

    #[test]
    fn test_directory_wins_over_same_named_file() {
        // "a" is both a file and the parent of "a/b.py"
        let report = report(&["a", "a/b.py", "c.py"]);
        let index = PathIndex::resolve(&report, "", &[], None).unwrap();
        let nodes = TreeBuilder::new(&index).single_level().unwrap();

        assert_eq!(
            summary(&nodes),
            vec![(true, "a".to_string()), (false, "c.py".to_string())]
        );
        assert_eq!(
            summary(nodes[0].children()),
            vec![(false, "a".to_string()), (false, "a/b.py".to_string())]
        );
        assert_eq!(nodes[0].lines(), 4);
    }

    #[test]
    fn test_flat_list_keeps_candidate_order() {
        let report = report(&["z/1.rs", "a/2.rs", "m.rs"]);
        let index = PathIndex::resolve(&report, "", &[], None).unwrap();
        let files = TreeBuilder::new(&index).flat_list().unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.full_path.as_str()).collect();
        assert_eq!(paths, vec!["z/1.rs", "a/2.rs", "m.rs"]);
    }
}
