pub mod config;
pub mod contents;
pub mod error;
pub mod index;
pub mod node;
pub mod oracle;
pub mod ordering;
pub mod path;
pub mod report;
pub mod totals;
pub mod tree;

pub use crate::config::AppConfig;
pub use contents::{
    path_contents, resolve_paths, ContentsOutcome, DisplayType, EmptyResult, PathContentsRequest,
    Resolution, Shape,
};
pub use error::Error;
pub use index::PathIndex;
pub use node::{DirNode, FileNode, PathNode};
pub use oracle::{Credentials, Existence, ExistenceOracle, SourceRef};
pub use ordering::{Direction, OrderingField, PathOrdering};
pub use report::{Coverage, MemoryReport, Report, ReportBuilder};
pub use totals::Totals;
pub use tree::TreeBuilder;
