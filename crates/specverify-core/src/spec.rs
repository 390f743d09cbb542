//! Spec document parsing
//!
//! A spec is a markdown file describing one page or endpoint. The parser
//! pulls out the pieces the engine needs:
//!
//! ```markdown
//! # User detail
//!
//! | Key  | Value        |
//! |------|--------------|
//! | Path | `/users/:id` |
//!
//! Implemented in `src/client/pages/UserDetail.tsx`.
//!
//! ## Behaviour
//! Shows the user's profile.
//! ```
//!
//! Parsing is total: a malformed table row is simply not captured.

use crate::files::FileSystem;
use eyre::{Result, WrapErr};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|\s*([^|]+)\s*\|\s*([^|]+)\s*\|$").expect("valid table row regex")
});

/// Inline code spans holding either a `~/`-relative or a `src/`-relative path.
static RELATED_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`(?:~/([^`]+)|(src/[^`]+))`").expect("valid related file regex")
});

/// Category of a spec, inferred from its parent directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecType {
    Ui,
    Api,
    Unknown,
}

impl SpecType {
    /// Infer the type from the name of the directory holding the spec
    pub fn from_dir_name(name: &str) -> Self {
        match name {
            "ui" | "pages" | "components" => SpecType::Ui,
            "api" | "routes" | "endpoints" => SpecType::Api,
            _ => SpecType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.parent()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
            .map(Self::from_dir_name)
            .unwrap_or(SpecType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecType::Ui => "ui",
            SpecType::Api => "api",
            SpecType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SpecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed spec document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    /// Where the document was read from
    pub file_path: PathBuf,

    pub spec_type: SpecType,

    /// First `# ` heading, or the file name when there is none
    pub title: String,

    /// Route or endpoint declared in the metadata table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,

    /// Code paths mentioned in inline code spans, in document order (may repeat)
    pub related_files: Vec<String>,

    /// Full document text
    #[serde(skip)]
    pub content: String,

    /// Two-column table rows, key to value (last occurrence wins)
    pub metadata: BTreeMap<String, String>,

    /// `## ` heading to trimmed body (last occurrence wins)
    pub sections: BTreeMap<String, String>,
}

impl Spec {
    /// Parse a spec document's text
    pub fn parse(content: &str, file_path: impl Into<PathBuf>) -> Spec {
        let file_path = file_path.into();
        let lines: Vec<&str> = content.lines().collect();

        let title = parse_title(&lines).unwrap_or_else(|| file_name_of(&file_path));
        let (metadata, route_path) = parse_metadata(&lines);

        Spec {
            spec_type: SpecType::from_path(&file_path),
            title,
            route_path,
            related_files: parse_related_files(content),
            content: content.to_string(),
            metadata,
            sections: parse_sections(&lines),
            file_path,
        }
    }

    /// Read and parse a spec document
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Spec> {
        let content = fs
            .read(path)
            .map_err(eyre::Report::new)
            .wrap_err_with(|| format!("Failed to read spec file {}", path.display()))?;
        Ok(Spec::parse(&content, path))
    }

    /// Base name of the spec file, used as its identity in reports
    pub fn file_name(&self) -> String {
        file_name_of(&self.file_path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_title(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim_end().to_string())
}

fn is_route_key(key: &str) -> bool {
    matches!(key, "パス" | "エンドポイント")
        || key.eq_ignore_ascii_case("path")
        || key.eq_ignore_ascii_case("endpoint")
}

fn parse_metadata(lines: &[&str]) -> (BTreeMap<String, String>, Option<String>) {
    let mut metadata = BTreeMap::new();
    let mut route_path = None;

    for line in lines {
        let line = line.trim();
        if !(line.starts_with('|') && line.ends_with('|')) || line.contains("---") {
            continue;
        }
        let Some(caps) = TABLE_ROW.captures(line) else {
            continue;
        };

        let key = caps[1].trim().to_string();
        let value = caps[2].trim().trim_matches('`').to_string();
        if is_route_key(&key) {
            route_path = Some(value.clone());
        }
        metadata.insert(key, value);
    }

    (metadata, route_path.filter(|path| !path.is_empty()))
}

fn parse_related_files(content: &str) -> Vec<String> {
    RELATED_FILE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn parse_sections(lines: &[&str]) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current: Option<(&str, String)> = None;

    for line in lines {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((name, body)) = current.take() {
                sections.insert(name.to_string(), body.trim().to_string());
            }
            current = Some((heading.trim_end(), String::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }

    if let Some((name, body)) = current {
        sections.insert(name.to_string(), body.trim().to_string());
    }

    sections
}

/// Find spec documents (`*.md`) under `specs_dir`, optionally only within the
/// `spec_type` subdirectory. A missing directory yields no files.
pub fn find_spec_files(
    fs: &dyn FileSystem,
    specs_dir: &Path,
    spec_type: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let root = match spec_type {
        Some(spec_type) => specs_dir.join(spec_type),
        None => specs_dir.to_path_buf(),
    };
    fs.list_files(&root, "**/*.md")
        .wrap_err_with(|| format!("Failed to list spec files in {}", root.display()))
}

/// Load many spec documents, keeping per-file failures.
///
/// With the `parallel` feature, files are parsed on the rayon pool.
pub fn load_specs(fs: &dyn FileSystem, paths: &[PathBuf]) -> Vec<(PathBuf, Result<Spec>)> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        paths
            .par_iter()
            .map(|path| (path.clone(), Spec::load(fs, path)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        paths
            .iter()
            .map(|path| (path.clone(), Spec::load(fs, path)))
            .collect()
    }
}
