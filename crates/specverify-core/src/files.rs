//! File system access for spec discovery and source extraction
//!
//! Everything that walks directories or reads files goes through the
//! [`FileSystem`] trait so the engine can run against the real disk
//! ([`DiskFiles`]) or a fixed in-memory table ([`MemoryFiles`]).

use eyre::{Result, WrapErr};
use globset::{GlobBuilder, GlobMatcher};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Why a best-effort read produced no content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("file not found")]
    NotFound,
    #[error("unreadable: {0}")]
    Unreadable(String),
}

/// Read access to spec documents and source files.
pub trait FileSystem: Send + Sync {
    /// List files under `root` whose root-relative path matches the glob `pattern`.
    ///
    /// A missing `root` yields an empty list rather than an error.
    /// Results are sorted.
    fn list_files(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Read a file as UTF-8 text.
    fn read(&self, path: &Path) -> std::result::Result<String, SkipReason>;

    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Compile a glob where `*` stays within one path segment and `**` crosses them.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let pattern = pattern.replace('\\', "/");
    let glob = GlobBuilder::new(&pattern)
        .literal_separator(true)
        .build()
        .wrap_err_with(|| format!("Invalid glob pattern '{}'", pattern))?;
    Ok(glob.compile_matcher())
}

/// Lexically clean a path: drop `.` segments, fold `..` into its parent,
/// collapse repeated separators. An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Expand a glob pattern (relative to the working directory) into files.
///
/// The literal directory prefix of the pattern becomes the walk root and the
/// remainder is matched against root-relative paths, so `src/routes/**/*.ts`
/// walks `src/routes` recursively and `docs/*.yaml` only looks one level deep.
/// A pattern with no wildcard names a single file.
pub fn expand_pattern(fs: &dyn FileSystem, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.replace('\\', "/");
    match split_glob_base(&pattern) {
        (base, Some(rest)) => fs.list_files(&base, rest),
        (path, None) => {
            if fs.is_file(&path) {
                Ok(vec![clean_path(&path)])
            } else {
                Ok(Vec::new())
            }
        }
    }
}

/// Split `src/routes/**/*.ts` into (`src/routes`, `Some("**/*.ts")`).
fn split_glob_base(pattern: &str) -> (PathBuf, Option<&str>) {
    let mut offset = 0;
    for segment in pattern.split('/') {
        if segment.contains(['*', '?', '[', '{']) {
            let base = pattern[..offset].trim_end_matches('/');
            let base = match base {
                "" if pattern.starts_with('/') => "/",
                "" => ".",
                base => base,
            };
            return (PathBuf::from(base), Some(&pattern[offset..]));
        }
        offset += segment.len() + 1;
    }
    (PathBuf::from(pattern), None)
}

fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    let relative = if root == Path::new(".") {
        path.strip_prefix(".").unwrap_or(path)
    } else {
        path.strip_prefix(root).ok()?
    };
    Some(relative.to_string_lossy().replace('\\', "/"))
}

/// Access to the real file system.
///
/// Walks see every file, including hidden and gitignored ones. Entries that
/// cannot be read (dangling symlinks, permission errors) are skipped.
#[cfg(feature = "walk")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFiles;

#[cfg(feature = "walk")]
impl FileSystem for DiskFiles {
    fn list_files(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        use ignore::WalkBuilder;

        if !root.exists() {
            return Ok(Vec::new());
        }

        let matcher = compile_pattern(pattern)?;
        if root.is_dir() {
            std::fs::read_dir(root)
                .wrap_err_with(|| format!("Failed to read directory {}", root.display()))?;
        }

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(true)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(
                        root = %root.display(),
                        error = %e,
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_slash_path(path, root) else {
                continue;
            };
            if matcher.is_match(&relative) {
                files.push(path.strip_prefix(".").unwrap_or(path).to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> std::result::Result<String, SkipReason> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SkipReason::NotFound,
            _ => SkipReason::Unreadable(e.to_string()),
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file table (useful for testing)
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFiles {
    /// Create an empty file table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content
    pub fn add(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Insert a file with content
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(clean_path(path.as_ref()), content.into());
    }
}

impl FileSystem for MemoryFiles {
    fn list_files(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = compile_pattern(pattern)?;
        let root = clean_path(root);

        Ok(self
            .files
            .keys()
            .filter(|path| {
                relative_slash_path(path, &root)
                    .is_some_and(|relative| !relative.is_empty() && matcher.is_match(&relative))
            })
            .cloned()
            .collect())
    }

    fn read(&self, path: &Path) -> std::result::Result<String, SkipReason> {
        self.files
            .get(&clean_path(path))
            .cloned()
            .ok_or(SkipReason::NotFound)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&clean_path(path))
    }
}
