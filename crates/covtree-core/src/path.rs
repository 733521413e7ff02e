/// A report file path viewed relative to a directory prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedPath {
    pub full_path: String,
    pub prefix: String,
}

impl PrefixedPath {
    pub fn new(full_path: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            prefix: prefix.into(),
        }
    }

    /// The path below `prefix`: `a/b/c/d.txt` under `a/b` is `c/d.txt`.
    /// A path equal to its prefix has an empty relative path.
    pub fn relative_path(&self) -> &str {
        if self.prefix.is_empty() {
            return &self.full_path;
        }
        if self.full_path == self.prefix {
            return "";
        }
        self.full_path
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&self.full_path)
    }

    /// True when nothing below the prefix is a directory. An empty relative
    /// path counts as a single segment, i.e. a file at the prefix itself.
    pub fn is_file(&self) -> bool {
        !self.relative_path().contains('/')
    }

    /// The first segment below the prefix, qualified with the prefix:
    /// `a/b/c/d.txt` under `a/b` is `a/b/c`.
    pub fn basename(&self) -> String {
        let relative = self.relative_path();
        if relative.is_empty() {
            return self.full_path.clone();
        }

        let name = relative.split('/').next().unwrap_or(relative);
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    /// Same file, one directory deeper.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self::new(self.full_path.clone(), prefix)
    }
}

/// Whether `full_path` lies at or below `prefix`. Every path is under `""`.
pub fn is_subpath(full_path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    full_path == prefix
        || full_path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Drop leading and trailing separators so `a/` and `/a` scope like `a`.
pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

/// Paths the tree builder can split into segments: non-empty, no empty segments.
pub fn is_well_formed(path: &str) -> bool {
    !path.is_empty() && !path.split('/').any(str::is_empty)
}
