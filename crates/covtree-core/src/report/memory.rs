use super::Report;
use crate::error::Error;
use crate::totals::Totals;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Line outcome recorded by one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Hit,
    Miss,
    Partial,
}

impl Coverage {
    /// Combine two sessions' view of the same line: any hit wins, then partial.
    fn merge(self, other: Coverage) -> Coverage {
        match (self, other) {
            (Coverage::Hit, _) | (_, Coverage::Hit) => Coverage::Hit,
            (Coverage::Partial, _) | (_, Coverage::Partial) => Coverage::Partial,
            _ => Coverage::Miss,
        }
    }
}

/// One uploaded coverage run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: u32,
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSession {
    pub id: u32,
    pub coverage: Coverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub number: u32,
    pub sessions: Vec<LineSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
    pub path: String,
    #[serde(default)]
    pub lines: Vec<ReportLine>,
}

impl ReportFile {
    fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for line in &self.lines {
            let merged = line
                .sessions
                .iter()
                .map(|s| s.coverage)
                .reduce(Coverage::merge);
            match merged {
                Some(Coverage::Hit) => totals.hits += 1,
                Some(Coverage::Miss) => totals.misses += 1,
                Some(Coverage::Partial) => totals.partials += 1,
                None => continue,
            }
            totals.lines += 1;
        }
        totals
    }

    /// Copy of this file restricted to `sessions`, or `None` if nothing remains.
    fn restricted_to(&self, sessions: &AHashSet<u32>) -> Option<ReportFile> {
        let lines: Vec<ReportLine> = self
            .lines
            .iter()
            .filter_map(|line| {
                let kept: Vec<LineSession> = line
                    .sessions
                    .iter()
                    .filter(|s| sessions.contains(&s.id))
                    .copied()
                    .collect();
                (!kept.is_empty()).then(|| ReportLine {
                    number: line.number,
                    sessions: kept,
                })
            })
            .collect();

        (!lines.is_empty()).then(|| ReportFile {
            path: self.path.clone(),
            lines,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportData {
    #[serde(default)]
    sessions: Vec<Session>,
    #[serde(default)]
    files: Vec<ReportFile>,
}

/// Line-level coverage report held in memory.
#[derive(Debug, Clone)]
pub struct MemoryReport {
    sessions: Vec<Session>,
    files: Vec<ReportFile>,
    positions: AHashMap<String, usize>,
}

impl MemoryReport {
    pub fn from_parts(sessions: Vec<Session>, files: Vec<ReportFile>) -> Result<Self, Error> {
        let mut session_ids = AHashSet::new();
        for session in &sessions {
            if !session_ids.insert(session.id) {
                return Err(Error::InvalidReport(format!(
                    "duplicate session id {}",
                    session.id
                )));
            }
        }

        let mut positions = AHashMap::with_capacity(files.len());
        for (position, file) in files.iter().enumerate() {
            validate_path(&file.path)?;

            let mut numbers = AHashSet::with_capacity(file.lines.len());
            for line in &file.lines {
                if !numbers.insert(line.number) {
                    return Err(Error::InvalidReport(format!(
                        "line {} listed twice in {}",
                        line.number, file.path
                    )));
                }
                if let Some(s) = line.sessions.iter().find(|s| !session_ids.contains(&s.id)) {
                    return Err(Error::InvalidReport(format!(
                        "{}:{} refers to unknown session {}",
                        file.path, line.number, s.id
                    )));
                }
            }

            if positions.insert(file.path.clone(), position).is_some() {
                return Err(Error::InvalidReport(format!(
                    "file listed twice: {}",
                    file.path
                )));
            }
        }

        Ok(Self {
            sessions,
            files,
            positions,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let data: ReportData = serde_json::from_str(json)?;
        Self::from_parts(data.sessions, data.files)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        let report = Self::from_json(&json)?;
        info!(
            "Loaded report {} ({} files, {} sessions)",
            path.display(),
            report.files.len(),
            report.sessions.len()
        );
        Ok(report)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }
}

impl Report for MemoryReport {
    fn files(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    fn get(&self, path: &str) -> Result<Totals, Error> {
        self.positions
            .get(path)
            .map(|&position| self.files[position].totals())
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    fn filter(&self, flags: &[String]) -> Result<Box<dyn Report>, Error> {
        let sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| s.flags.iter().any(|f| flags.contains(f)))
            .cloned()
            .collect();
        let kept: AHashSet<u32> = sessions.iter().map(|s| s.id).collect();

        let files: Vec<ReportFile> = self
            .files
            .iter()
            .filter_map(|file| file.restricted_to(&kept))
            .collect();

        debug!(
            "Filtered report to flags {:?}: {} of {} sessions, {} of {} files",
            flags,
            sessions.len(),
            self.sessions.len(),
            files.len(),
            self.files.len()
        );

        Ok(Box::new(MemoryReport::from_parts(sessions, files)?))
    }

    fn flags(&self) -> BTreeSet<String> {
        self.sessions
            .iter()
            .flat_map(|s| s.flags.iter().cloned())
            .collect()
    }
}

fn validate_path(path: &str) -> Result<(), Error> {
    if path.is_empty() || path.split('/').any(str::is_empty) {
        return Err(Error::InvalidReport(format!(
            "malformed file path: {:?}",
            path
        )));
    }
    Ok(())
}

/// Incremental construction of a `MemoryReport`, mostly for tests and fixtures.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    sessions: Vec<Session>,
    files: Vec<ReportFile>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(mut self, id: u32, flags: &[&str]) -> Self {
        self.sessions.push(Session {
            id,
            flags: flags.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    /// Declare a file with no line data yet. Files keep first-declared order.
    pub fn file(mut self, path: &str) -> Self {
        self.file_mut(path);
        self
    }

    pub fn line(mut self, path: &str, number: u32, session: u32, coverage: Coverage) -> Self {
        let file = self.file_mut(path);
        let entry = LineSession {
            id: session,
            coverage,
        };
        match file.lines.iter_mut().find(|l| l.number == number) {
            Some(line) => line.sessions.push(entry),
            None => file.lines.push(ReportLine {
                number,
                sessions: vec![entry],
            }),
        }
        self
    }

    /// Append `hits`, then `misses`, then `partials` new lines for `session`.
    pub fn counts(
        mut self,
        path: &str,
        session: u32,
        hits: u32,
        misses: u32,
        partials: u32,
    ) -> Self {
        let next = self
            .file_mut(path)
            .lines
            .iter()
            .map(|l| l.number)
            .max()
            .unwrap_or(0)
            + 1;
        let outcomes = std::iter::repeat(Coverage::Hit)
            .take(hits as usize)
            .chain(std::iter::repeat(Coverage::Miss).take(misses as usize))
            .chain(std::iter::repeat(Coverage::Partial).take(partials as usize));
        for (offset, coverage) in outcomes.enumerate() {
            self = self.line(path, next + offset as u32, session, coverage);
        }
        self
    }

    pub fn build(self) -> Result<MemoryReport, Error> {
        MemoryReport::from_parts(self.sessions, self.files)
    }

    fn file_mut(&mut self, path: &str) -> &mut ReportFile {
        let position = match self.files.iter().position(|f| f.path == path) {
            Some(position) => position,
            None => {
                self.files.push(ReportFile {
                    path: path.to_string(),
                    lines: Vec::new(),
                });
                self.files.len() - 1
            }
        };
        &mut self.files[position]
    }
}
