use crate::config::{AppConfig, OracleKind};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Three-way answer from a source host about whether a path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Present,
    Absent,
    /// The host could not be asked or gave an unusable answer.
    Indeterminate,
}

/// The commit a path is looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub repository: String,
    pub commit: String,
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Checks a path against the source host, independent of coverage data.
///
/// Only consulted when a query produced no candidates, to tell a path with no
/// coverage apart from a path that does not exist.
pub trait ExistenceOracle {
    fn exists(&self, path: &str, source: &SourceRef, credentials: &Credentials) -> Existence;
}

impl<T: ExistenceOracle + ?Sized> ExistenceOracle for Box<T> {
    fn exists(&self, path: &str, source: &SourceRef, credentials: &Credentials) -> Existence {
        (**self).exists(path, source, credentials)
    }
}

/// Always gives the same answer. `Indeterminate` when no host is configured.
#[derive(Debug, Clone, Copy)]
pub struct FixedOracle(pub Existence);

impl ExistenceOracle for FixedOracle {
    fn exists(&self, _path: &str, _source: &SourceRef, _credentials: &Credentials) -> Existence {
        self.0
    }
}

/// Looks paths up in a local checkout of the repository.
#[derive(Debug, Clone)]
pub struct CheckoutOracle {
    root: PathBuf,
}

impl CheckoutOracle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ExistenceOracle for CheckoutOracle {
    fn exists(&self, path: &str, _source: &SourceRef, _credentials: &Credentials) -> Existence {
        if path.split('/').any(|segment| segment == "..") {
            return Existence::Absent;
        }

        let target = self.root.join(path.trim_matches('/'));
        match fs::metadata(&target) {
            Ok(_) => Existence::Present,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Existence::Absent,
            Err(e) => {
                warn!("Error checking {}: {}", target.display(), e);
                Existence::Indeterminate
            }
        }
    }
}

/// Looks paths up in a commit of a local git repository.
#[derive(Debug, Clone)]
pub struct GitOracle {
    repo_dir: PathBuf,
}

impl GitOracle {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

impl ExistenceOracle for GitOracle {
    fn exists(&self, path: &str, source: &SourceRef, _credentials: &Credentials) -> Existence {
        let object = format!("{}:{}", source.commit, path.trim_matches('/'));
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(["cat-file", "-e"])
            .arg(&object)
            .env("LC_ALL", "C")
            .output();

        match output {
            Ok(out) if out.status.success() => Existence::Present,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                if stderr.contains("does not exist") || stderr.contains("exists on disk, but not in")
                {
                    Existence::Absent
                } else {
                    debug!("git cat-file {} failed: {}", object, stderr.trim());
                    Existence::Indeterminate
                }
            }
            Err(e) => {
                warn!("Failed to run git in {}: {}", self.repo_dir.display(), e);
                Existence::Indeterminate
            }
        }
    }
}

/// Gives up on a slow oracle after `timeout`, answering `Indeterminate`.
///
/// Each check runs on its own thread. A check that overruns is not cancelled:
/// its thread stays alive until the inner oracle returns, so a long-lived
/// caller facing a hung host accumulates one thread per timed-out call.
pub struct TimeoutOracle<O> {
    inner: Arc<O>,
    timeout: Duration,
}

impl<O> TimeoutOracle<O> {
    pub fn new(inner: O, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }
}

impl<O: ExistenceOracle + Send + Sync + 'static> ExistenceOracle for TimeoutOracle<O> {
    fn exists(&self, path: &str, source: &SourceRef, credentials: &Credentials) -> Existence {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let path_owned = path.to_string();
        let source = source.clone();
        let credentials = credentials.clone();

        // A timed-out check keeps running detached; its answer is dropped.
        thread::spawn(move || {
            let _ = tx.send(inner.exists(&path_owned, &source, &credentials));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(existence) => existence,
            Err(_) => {
                warn!(
                    "Existence check for {:?} gave no answer within {:?}",
                    path, self.timeout
                );
                Existence::Indeterminate
            }
        }
    }
}

/// Build the oracle selected in the configuration.
pub fn from_config(config: &AppConfig) -> Box<dyn ExistenceOracle> {
    let timeout = Duration::from_millis(config.oracle_timeout_ms);
    let root = config
        .source_root
        .as_deref()
        .map(Path::new)
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    match config.oracle {
        OracleKind::Checkout => Box::new(TimeoutOracle::new(CheckoutOracle::new(root), timeout)),
        OracleKind::Git => Box::new(TimeoutOracle::new(GitOracle::new(root), timeout)),
        OracleKind::None => Box::new(FixedOracle(Existence::Indeterminate)),
    }
}
