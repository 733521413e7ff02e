use crate::error::Error;
use crate::index::PathIndex;
use crate::node::{FileNode, PathNode};
use crate::oracle::{Credentials, Existence, ExistenceOracle, SourceRef};
use crate::ordering::PathOrdering;
use crate::report::Report;
use crate::tree::TreeBuilder;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// Output shape of a resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    FlatList,
    #[default]
    SingleLevel,
}

/// Display type requested by a listing caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    #[default]
    Tree,
    List,
}

impl FromStr for DisplayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tree" => Ok(DisplayType::Tree),
            "list" => Ok(DisplayType::List),
            _ => Err(format!("unknown display type '{}' (expected tree or list)", s)),
        }
    }
}

/// A query that matched no paths, with what a caller needs to explain why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyResult {
    /// The prefix as the caller gave it, before separator trimming.
    pub prefix: String,
    pub flags: Vec<String>,
    /// None of the requested flags is known to the unfiltered report.
    pub flags_unknown: bool,
}

impl EmptyResult {
    pub fn flags_requested(&self) -> bool {
        !self.flags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Nodes(Vec<PathNode>),
    Empty(EmptyResult),
}

/// What a path listing request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentsOutcome {
    Listing(Vec<PathNode>),
    UnknownFlags { requested: Vec<String> },
    UnknownPath { path: String, message: String },
    MissingCoverage { path: String, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct PathContentsRequest {
    pub path: String,
    pub flags: Vec<String>,
    pub search: Option<String>,
    pub display: DisplayType,
    pub ordering: PathOrdering,
}

/// True when flags were requested and none of them exists in `report`.
pub fn flags_unknown(report: &dyn Report, flags: &[String]) -> bool {
    if flags.is_empty() {
        return false;
    }
    let known = report.flags();
    !flags.iter().any(|flag| known.contains(flag))
}

/// Resolve `prefix` into nodes of the requested shape, or an `EmptyResult`.
pub fn resolve_paths(
    report: &dyn Report,
    prefix: &str,
    flags: &[String],
    search: Option<&str>,
    shape: Shape,
) -> Result<Resolution, Error> {
    let index = PathIndex::resolve(report, prefix, flags, search)?;

    if index.is_empty() {
        return Ok(Resolution::Empty(EmptyResult {
            prefix: prefix.to_string(),
            flags: flags.to_vec(),
            flags_unknown: flags_unknown(report, flags),
        }));
    }

    let builder = TreeBuilder::new(&index);
    let nodes = match shape {
        Shape::FlatList => builder
            .flat_list()?
            .into_iter()
            .map(PathNode::File)
            .collect(),
        Shape::SingleLevel => builder.single_level()?,
    };
    Ok(Resolution::Nodes(nodes))
}

/// Explain an empty result with one existence check against the source host.
///
/// Unknown flags take precedence. Otherwise a path the host knows about is
/// missing coverage, and a path it denies or cannot vouch for is unknown.
pub fn classify_empty(
    empty: &EmptyResult,
    oracle: &dyn ExistenceOracle,
    source: &SourceRef,
    credentials: &Credentials,
) -> ContentsOutcome {
    if empty.flags_unknown {
        return ContentsOutcome::UnknownFlags {
            requested: empty.flags.clone(),
        };
    }

    let path = empty.prefix.clone();
    match oracle.exists(&path, source, credentials) {
        Existence::Present => ContentsOutcome::MissingCoverage {
            message: format!("missing coverage for path: {}", path),
            path,
        },
        Existence::Absent => ContentsOutcome::UnknownPath {
            message: format!("path does not exist: {}", path),
            path,
        },
        Existence::Indeterminate => ContentsOutcome::UnknownPath {
            message: format!("could not verify path: {}", path),
            path,
        },
    }
}

/// Full listing flow for one request: flag check, resolution, empty-result
/// classification, then ordering.
///
/// A search term always produces the flat list, whatever the display type.
pub fn path_contents(
    report: &dyn Report,
    request: &PathContentsRequest,
    oracle: &dyn ExistenceOracle,
    source: &SourceRef,
    credentials: &Credentials,
) -> Result<ContentsOutcome, Error> {
    if flags_unknown(report, &request.flags) {
        info!("No requested flag exists in report: {:?}", request.flags);
        return Ok(ContentsOutcome::UnknownFlags {
            requested: request.flags.clone(),
        });
    }

    let search = request.search.as_deref().filter(|s| !s.is_empty());
    let shape = if search.is_some() || request.display == DisplayType::List {
        Shape::FlatList
    } else {
        Shape::SingleLevel
    };

    match resolve_paths(report, &request.path, &request.flags, search, shape)? {
        Resolution::Empty(empty) => {
            let outcome = classify_empty(&empty, oracle, source, credentials);
            debug!("Empty listing for {:?}: {:?}", empty.prefix, outcome);
            Ok(outcome)
        }
        Resolution::Nodes(mut nodes) => {
            request.ordering.apply(&mut nodes);
            Ok(ContentsOutcome::Listing(nodes))
        }
    }
}

/// Totals for a single file, narrowed to `flags` when any are given.
pub fn file_coverage(report: &dyn Report, path: &str, flags: &[String]) -> Result<FileNode, Error> {
    let totals = if flags.is_empty() {
        report.get(path)?
    } else {
        report.filter(flags)?.get(path)?
    };
    Ok(FileNode {
        full_path: path.to_string(),
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::FixedOracle;
    use crate::ordering::{Direction, OrderingField};
    use crate::report::{MemoryReport, ReportBuilder};
    use crate::totals::Totals;

    fn report() -> MemoryReport {
        ReportBuilder::new()
            .session(0, &["unit"])
            .session(1, &["e2e"])
            .counts("src/a.rs", 0, 4, 0, 0)
            .counts("src/b.rs", 0, 1, 3, 0)
            .counts("src/deep/c.rs", 1, 2, 2, 0)
            .counts("main.rs", 1, 1, 0, 0)
            .build()
            .unwrap()
    }

    fn source() -> SourceRef {
        SourceRef {
            repository: "acme/widgets".to_string(),
            commit: "abc123".to_string(),
        }
    }

    fn run(request: &PathContentsRequest, existence: Existence) -> ContentsOutcome {
        path_contents(
            &report(),
            request,
            &FixedOracle(existence),
            &source(),
            &Credentials::default(),
        )
        .unwrap()
    }

    fn listed_paths(outcome: &ContentsOutcome) -> Vec<String> {
        match outcome {
            ContentsOutcome::Listing(nodes) => {
                nodes.iter().map(|n| n.full_path().to_string()).collect()
            }
            other => panic!("expected a listing, got {:?}", other),
        }
    }

    #[test]
    fn test_tree_listing_sorted_by_name() {
        let outcome = run(&PathContentsRequest::default(), Existence::Present);
        assert_eq!(listed_paths(&outcome), vec!["main.rs", "src"]);
    }

    #[test]
    fn test_search_forces_flat_list() {
        let request = PathContentsRequest {
            search: Some("C.RS".to_string()),
            ..PathContentsRequest::default()
        };
        let outcome = run(&request, Existence::Present);
        assert_eq!(listed_paths(&outcome), vec!["src/deep/c.rs"]);
    }

    #[test]
    fn test_list_display_with_ordering() {
        let request = PathContentsRequest {
            path: "src".to_string(),
            display: DisplayType::List,
            ordering: PathOrdering::new(OrderingField::Coverage, Direction::Desc),
            ..PathContentsRequest::default()
        };
        let outcome = run(&request, Existence::Present);
        assert_eq!(
            listed_paths(&outcome),
            vec!["src/a.rs", "src/deep/c.rs", "src/b.rs"]
        );
    }

    #[test]
    fn test_unknown_flags_short_circuit() {
        let request = PathContentsRequest {
            flags: vec!["nightly".to_string()],
            ..PathContentsRequest::default()
        };
        assert_eq!(
            run(&request, Existence::Present),
            ContentsOutcome::UnknownFlags {
                requested: vec!["nightly".to_string()]
            }
        );
    }

    #[test]
    fn test_indeterminate_oracle_is_unknown_path() {
        let request = PathContentsRequest {
            path: "vendor".to_string(),
            ..PathContentsRequest::default()
        };
        match run(&request, Existence::Indeterminate) {
            ContentsOutcome::UnknownPath { path, message } => {
                assert_eq!(path, "vendor");
                assert_eq!(message, "could not verify path: vendor");
            }
            other => panic!("expected UnknownPath, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_paths_reports_empty_with_flag_info() {
        let report = report();
        let flags = vec!["e2e".to_string()];
        let resolution = resolve_paths(&report, "src/b.rs", &flags, None, Shape::FlatList).unwrap();
        assert_eq!(
            resolution,
            Resolution::Empty(EmptyResult {
                prefix: "src/b.rs".to_string(),
                flags: flags.clone(),
                flags_unknown: false,
            })
        );
    }

    #[test]
    fn test_empty_result_keeps_caller_prefix() {
        let report = report();
        let resolution = resolve_paths(&report, "vendor/", &[], None, Shape::SingleLevel).unwrap();
        match resolution {
            Resolution::Empty(empty) => assert_eq!(empty.prefix, "vendor/"),
            other => panic!("expected an empty result, got {:?}", other),
        }
    }

    #[test]
    fn test_file_coverage_with_and_without_flags() {
        let report = report();
        let all = file_coverage(&report, "src/deep/c.rs", &[]).unwrap();
        assert_eq!(all.totals, Totals::new(4, 2, 2, 0));

        let unit = file_coverage(&report, "src/deep/c.rs", &["unit".to_string()]);
        assert!(matches!(unit, Err(Error::NotFound(_))));
    }
}
