//! Byte-bounded batching of source files for judge calls

use std::path::PathBuf;

/// A source file wrapped for the judge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Text as sent to the judge, including the file header
    pub text: String,
}

impl SourceFile {
    /// Wrap file content with a `=== File: path ===` header
    pub fn new(path: impl Into<PathBuf>, content: &str) -> Self {
        let path = path.into();
        let text = format!("=== File: {} ===\n{}", path.display(), content);
        SourceFile { path, text }
    }

    /// Size in bytes, as counted against the batch ceiling
    pub fn size(&self) -> usize {
        self.text.len()
    }
}

/// Split files into batches of at most `max_bytes` each, preserving order.
///
/// A file larger than the ceiling is never split; it gets a batch of its own.
/// Every input file appears in exactly one batch.
pub fn split_into_batches(files: Vec<SourceFile>, max_bytes: usize) -> Vec<Vec<SourceFile>> {
    let mut batches = Vec::new();
    let mut current: Vec<SourceFile> = Vec::new();
    let mut current_size = 0;

    for file in files {
        let size = file.size();

        if size > max_bytes {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_size = 0;
            }
            batches.push(vec![file]);
            continue;
        }

        if current_size + size > max_bytes && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_size = 0;
        }

        current_size += size;
        current.push(file);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

/// Join a batch into one judge payload
pub fn join_batch(batch: &[SourceFile]) -> String {
    batch
        .iter()
        .map(|file| file.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A file whose wrapped text is exactly `size` bytes
    fn file(name: &str, size: usize) -> SourceFile {
        SourceFile {
            path: PathBuf::from(name),
            text: "x".repeat(size),
        }
    }

    fn names(batches: &[Vec<SourceFile>]) -> Vec<Vec<String>> {
        batches
            .iter()
            .map(|b| b.iter().map(|f| f.path.display().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(split_into_batches(Vec::new(), 100).is_empty());
    }

    #[test]
    fn test_fills_batches_greedily() {
        let files = vec![file("a", 100), file("b", 100), file("c", 100), file("d", 100)];
        let batches = split_into_batches(files, 250);
        assert_eq!(names(&batches), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_oversized_file_gets_own_batch() {
        let files = vec![file("small", 100), file("huge", 2000), file("tail", 100)];
        let batches = split_into_batches(files, 500);
        assert_eq!(
            names(&batches),
            vec![vec!["small"], vec!["huge"], vec!["tail"]]
        );
    }

    #[test]
    fn test_exact_fit_stays_in_one_batch() {
        let files = vec![file("a", 150), file("b", 100)];
        let batches = split_into_batches(files, 250);
        assert_eq!(batches.len(), 1);
    }

    #[test]
    fn test_batching_postconditions() {
        let sizes = [10, 300, 45, 45, 45, 999, 1, 200, 120, 80, 500, 501, 3];
        let files: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| file(&format!("f{i}"), *size))
            .collect();

        for max in [1, 50, 100, 250, 500, 5000] {
            let batches = split_into_batches(files.clone(), max);

            let flattened: Vec<_> = batches.iter().flatten().cloned().collect();
            assert_eq!(flattened, files, "order or membership changed at max {max}");

            for batch in &batches {
                assert!(!batch.is_empty());
                if batch.len() > 1 {
                    let total: usize = batch.iter().map(SourceFile::size).sum();
                    assert!(total <= max, "batch over ceiling at max {max}");
                }
                for f in batch {
                    if f.size() > max {
                        assert_eq!(batch.len(), 1, "oversized file shared a batch at max {max}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_source_file_header() {
        let f = SourceFile::new("src/users.ts", "export {}");
        assert_eq!(f.text, "=== File: src/users.ts ===\nexport {}");
        assert_eq!(join_batch(&[f.clone(), f]).matches("=== File:").count(), 2);
    }
}
