use crate::error::Error;
use crate::path::{self, PrefixedPath};
use crate::report::Report;
use crate::totals::Totals;
use tracing::{debug, warn};

enum ReportView<'r> {
    Full(&'r dyn Report),
    Flagged(Box<dyn Report>),
}

impl ReportView<'_> {
    fn report(&self) -> &dyn Report {
        match self {
            ReportView::Full(report) => *report,
            ReportView::Flagged(report) => report.as_ref(),
        }
    }
}

/// The candidate paths of one query: flag-scoped, prefix-scoped and searched.
///
/// Holds on to the report view it was built from, so totals are always read
/// through the same flag filter that decided which files are visible.
pub struct PathIndex<'r> {
    view: ReportView<'r>,
    prefix: String,
    paths: Vec<PrefixedPath>,
}

impl<'r> PathIndex<'r> {
    /// Resolve the candidate set:
    /// 1. Narrow the report to `flags` (when any are given)
    /// 2. Keep paths equal to or below `prefix`
    /// 3. Keep paths whose prefix-relative part contains `search`, ignoring case
    ///
    /// Candidates keep the report's file order.
    pub fn resolve(
        report: &'r dyn Report,
        prefix: &str,
        flags: &[String],
        search: Option<&str>,
    ) -> Result<Self, Error> {
        let view = if flags.is_empty() {
            ReportView::Full(report)
        } else {
            ReportView::Flagged(report.filter(flags)?)
        };
        let prefix = path::normalize_prefix(prefix).to_string();

        let mut paths: Vec<PrefixedPath> = Vec::new();
        for full_path in view.report().files() {
            if !path::is_well_formed(full_path) {
                warn!("Skipping malformed report path {:?}", full_path);
                continue;
            }
            if path::is_subpath(full_path, &prefix) {
                paths.push(PrefixedPath::new(full_path, prefix.as_str()));
            }
        }

        if let Some(term) = search.filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            paths.retain(|p| p.relative_path().to_lowercase().contains(&term));
        }

        debug!(
            "Resolved {} candidate paths (prefix {:?}, {} flags, search {:?})",
            paths.len(),
            prefix,
            flags.len(),
            search
        );

        Ok(Self {
            view,
            prefix,
            paths,
        })
    }

    pub fn paths(&self) -> &[PrefixedPath] {
        &self.paths
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// The (possibly flag-scoped) report the candidates came from.
    pub fn report(&self) -> &dyn Report {
        self.view.report()
    }

    pub fn totals(&self, path: &PrefixedPath) -> Result<Totals, Error> {
        self.report().get(&path.full_path)
    }
}
