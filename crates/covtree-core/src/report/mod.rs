mod memory;

pub use memory::{Coverage, LineSession, MemoryReport, ReportBuilder, ReportFile, ReportLine, Session};

use crate::error::Error;
use crate::totals::Totals;
use std::collections::BTreeSet;

/// Coverage data for one commit, as seen by the path engine.
///
/// The engine only lists files and looks totals up by exact path. Narrowing to
/// a set of flags produces a new, independent report with the same contract.
pub trait Report {
    /// Full paths of every file, in report order.
    fn files(&self) -> Vec<&str>;

    /// Totals for `path`, or `Error::NotFound` if the report has no such file.
    fn get(&self, path: &str) -> Result<Totals, Error>;

    /// A report scoped to the sessions carrying at least one of `flags`.
    ///
    /// Files without coverage under those flags are absent from the result and
    /// totals are recomputed from the remaining sessions only.
    fn filter(&self, flags: &[String]) -> Result<Box<dyn Report>, Error>;

    /// Every flag name known to this report.
    fn flags(&self) -> BTreeSet<String>;
}
