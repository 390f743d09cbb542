//! Locating the code files that implement a spec

use crate::files::{FileSystem, clean_path};
use crate::spec::Spec;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const ROUTE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js"];
const CONVENTIONAL_DIRS: &[&str] = &["pages", "routes"];
const RELATED_SUFFIXES: &[&str] = &["", ".tsx", ".ts"];

/// Last segment of a route path: `/generators/synthesize` becomes `synthesize`.
/// The root route is `index`.
pub fn route_name(route_path: &str) -> &str {
    let trimmed = route_path.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "index",
    }
}

/// Resolve a related-file reference against the code root.
///
/// A reference that already starts with the code root is not prefixed again,
/// so `src/client/Page.tsx` under code root `src` stays as it is.
pub fn resolve_related_path(code_dir: &Path, related: &str) -> PathBuf {
    let related_path = Path::new(related);
    if related_path.is_absolute() {
        return related_path.to_path_buf();
    }

    let clean_dir = clean_path(code_dir);
    let clean_related = clean_path(related_path);
    if clean_dir != Path::new(".") && clean_related.starts_with(&clean_dir) {
        return clean_related;
    }
    if clean_related == clean_dir {
        return clean_related;
    }

    clean_path(&code_dir.join(related_path))
}

/// Ordered, de-duplicated set of files that exist
struct Found<'a> {
    fs: &'a dyn FileSystem,
    files: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl Found<'_> {
    fn add(&mut self, path: PathBuf) {
        let path = clean_path(&path);
        if !self.seen.contains(&path) && self.fs.is_file(&path) {
            self.seen.insert(path.clone());
            self.files.push(path);
        }
    }
}

fn is_test_file(name: &str) -> bool {
    name.contains(".test.") || name.contains(".spec.")
}

/// Find the code files associated with a spec.
///
/// Candidates come from, in order:
/// - file names guessed from the route name in each code path
///   (`name.tsx`, `name.ts`, ..., `pages/name.tsx`, `routes/name.tsx`)
/// - any file under a code path whose name contains the route name
///   (case-insensitive, test files excluded)
/// - the spec's related-file references, with `.tsx` / `.ts` variants
///
/// Only existing files are returned, each once. When `code_paths` is empty,
/// `code_dir` is searched.
pub fn find_code_files(
    fs: &dyn FileSystem,
    spec: &Spec,
    code_dir: &Path,
    code_paths: &[PathBuf],
) -> Vec<PathBuf> {
    let mut found = Found {
        fs,
        files: Vec::new(),
        seen: HashSet::new(),
    };

    let default_paths = [code_dir.to_path_buf()];
    let code_paths = if code_paths.is_empty() {
        &default_paths[..]
    } else {
        code_paths
    };

    if let Some(route_path) = spec.route_path.as_deref() {
        let name = route_name(route_path);
        let needle = name.to_lowercase();

        for base in code_paths {
            for ext in ROUTE_EXTENSIONS {
                found.add(base.join(format!("{name}.{ext}")));
            }
            for dir in CONVENTIONAL_DIRS {
                found.add(base.join(dir).join(format!("{name}.tsx")));
            }

            let candidates = match fs.list_files(base, "**/*") {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::debug!(base = %base.display(), error = %e, "skipping code path");
                    continue;
                }
            };
            for candidate in candidates {
                let Some(file_name) = candidate.file_name() else {
                    continue;
                };
                let file_name = file_name.to_string_lossy().to_lowercase();
                if file_name.contains(&needle) && !is_test_file(&file_name) {
                    found.add(candidate);
                }
            }
        }
    }

    for related in &spec.related_files {
        let resolved = resolve_related_path(code_dir, related);
        for suffix in RELATED_SUFFIXES {
            let mut candidate = resolved.clone().into_os_string();
            candidate.push(suffix);
            found.add(PathBuf::from(candidate));
        }
    }

    found.files
}

/// Read code files for the judge, skipping any that cannot be read.
pub fn read_code_files(fs: &dyn FileSystem, paths: &[PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| match fs.read(path) {
            Ok(content) => Some((path.display().to_string(), content)),
            Err(reason) => {
                tracing::debug!(file = %path.display(), %reason, "skipping code file");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFiles;

    #[test]
    fn test_route_name() {
        assert_eq!(route_name("/generators/synthesize"), "synthesize");
        assert_eq!(route_name("/users/"), "users");
        assert_eq!(route_name("/"), "index");
        assert_eq!(route_name(""), "index");
        assert_eq!(route_name("dashboard"), "dashboard");
    }

    #[test]
    fn test_resolve_related_path() {
        let cases = [
            ("src", "src/client/components/Page.tsx", "src/client/components/Page.tsx"),
            ("src", "client/components/Page.tsx", "src/client/components/Page.tsx"),
            ("src/", "src/client/components/Page.tsx", "src/client/components/Page.tsx"),
            ("", "", "."),
            ("src", "", "src"),
            ("src", "./client/x", "src/client/x"),
            ("src", "src//client/x", "src/client/x"),
            ("src", "src", "src"),
            ("", "client/components/Page.tsx", "client/components/Page.tsx"),
            ("src", "srcfoo/x.ts", "src/srcfoo/x.ts"),
            ("src", "/abs/x.ts", "/abs/x.ts"),
        ];
        for (code_dir, related, expected) in cases {
            assert_eq!(
                resolve_related_path(Path::new(code_dir), related),
                PathBuf::from(expected),
                "resolve({code_dir:?}, {related:?})"
            );
        }
    }

    fn spec(text: &str) -> Spec {
        Spec::parse(text, "specs/ui/page.md")
    }

    #[test]
    fn test_find_by_route_name() {
        let fs = MemoryFiles::new()
            .add("src/client/components/settings.tsx", "")
            .add("src/client/components/pages/settings.tsx", "")
            .add("src/client/components/forms/SettingsForm.tsx", "")
            .add("src/client/components/forms/settings.test.tsx", "")
            .add("src/client/components/other.tsx", "");

        let spec = spec("| Path | /account/settings |\n");
        let files = find_code_files(
            &fs,
            &spec,
            Path::new("src"),
            &[PathBuf::from("src/client/components")],
        );
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/client/components/settings.tsx"),
                PathBuf::from("src/client/components/pages/settings.tsx"),
                PathBuf::from("src/client/components/forms/SettingsForm.tsx"),
            ]
        );
    }

    #[cfg(all(feature = "walk", unix))]
    #[test]
    fn test_dangling_symlink_keeps_code_path() {
        use crate::files::DiskFiles;

        let dir = tempfile::tempdir().unwrap();
        let components = dir.path().join("components");
        std::fs::create_dir_all(components.join("forms")).unwrap();
        std::fs::write(components.join("forms/SettingsForm.tsx"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), components.join("broken")).unwrap();

        let spec = spec("| Path | /account/settings |\n");
        let files = find_code_files(&DiskFiles, &spec, dir.path(), &[components.clone()]);
        assert_eq!(files, vec![components.join("forms/SettingsForm.tsx")]);
    }

    #[test]
    fn test_find_related_files() {
        let fs = MemoryFiles::new()
            .add("src/client/Page.tsx", "")
            .add("src/client/loader.ts", "");

        let spec = spec("See `~/client/Page` and `src/client/loader` and `~/client/Page`.\n");
        let files = find_code_files(&fs, &spec, Path::new("src"), &[]);
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/client/Page.tsx"),
                PathBuf::from("src/client/loader.ts"),
            ]
        );
    }

    #[test]
    fn test_no_route_and_no_related_files() {
        let fs = MemoryFiles::new().add("src/index.ts", "");
        assert!(find_code_files(&fs, &spec("# Nothing\n"), Path::new("src"), &[]).is_empty());
    }

    #[test]
    fn test_read_code_files_skips_missing() {
        let fs = MemoryFiles::new().add("src/a.ts", "a");
        let read = read_code_files(&fs, &[PathBuf::from("src/a.ts"), PathBuf::from("src/b.ts")]);
        assert_eq!(read, vec![("src/a.ts".to_string(), "a".to_string())]);
    }
}
