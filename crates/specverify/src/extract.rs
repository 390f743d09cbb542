//! Route extraction across configured sources
//!
//! OpenAPI documents are scanned structurally. Framework code is read,
//! packed into size-bounded batches and handed to the judge.

use eyre::{Result, WrapErr};
use specverify_core::{
    FileSystem, Judge, Route, RouteCategory, RouteSource, RouteSourceKind, SourceFile,
    expand_pattern, join_batch, scan_openapi, split_into_batches,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DEFAULT_MAX_BATCH_BYTES;

/// Extracts routes from route sources
pub struct RouteExtractor {
    fs: Arc<dyn FileSystem>,
    judge: Option<Arc<dyn Judge>>,
    max_batch_bytes: usize,
}

/// A source that could not be extracted, in best-effort mode
#[derive(Debug)]
pub struct SourceFailure {
    pub source_type: String,
    pub error: eyre::Report,
}

impl RouteExtractor {
    /// An extractor that can only scan structural sources
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            judge: None,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
        }
    }

    pub fn with_judge(mut self, judge: Arc<dyn Judge>) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn with_max_batch_bytes(mut self, max_batch_bytes: usize) -> Self {
        self.max_batch_bytes = max_batch_bytes.max(1);
        self
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Extract every source in order, stopping at the first failure
    pub async fn extract_all(&self, sources: &[RouteSource]) -> Result<Vec<Route>> {
        let mut routes = Vec::new();
        for source in sources {
            let extracted = self.extract(source).await.wrap_err_with(|| {
                format!("Failed to extract routes from {}", source.kind.name())
            })?;
            routes.extend(extracted);
        }
        Ok(routes)
    }

    /// Extract every source, keeping the routes of sources that succeed
    pub async fn extract_best_effort(
        &self,
        sources: &[RouteSource],
    ) -> (Vec<Route>, Vec<SourceFailure>) {
        let mut routes = Vec::new();
        let mut failures = Vec::new();
        for source in sources {
            match self.extract(source).await {
                Ok(extracted) => routes.extend(extracted),
                Err(error) => {
                    tracing::warn!(source = source.kind.name(), error = %error, "route extraction failed");
                    failures.push(SourceFailure {
                        source_type: source.kind.name().to_string(),
                        error,
                    });
                }
            }
        }
        (routes, failures)
    }

    /// Extract the routes of one source
    pub async fn extract(&self, source: &RouteSource) -> Result<Vec<Route>> {
        let files = self.source_files(&source.patterns);
        tracing::debug!(source = source.kind.name(), files = files.len(), "extracting routes");

        match &source.kind {
            RouteSourceKind::OpenApi => Ok(self.scan_documents(&files, source.category)),
            RouteSourceKind::Framework(source_type) => {
                self.extract_with_judge(source_type, source.category, &files)
                    .await
            }
        }
    }

    /// Files matched by any pattern. A pattern that fails to expand matches nothing.
    fn source_files(&self, patterns: &[String]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for pattern in patterns {
            let matched = match expand_pattern(self.fs.as_ref(), pattern) {
                Ok(matched) => matched,
                Err(e) => {
                    tracing::warn!(
                        pattern = %pattern,
                        error = %format!("{:#}", e),
                        "skipping pattern"
                    );
                    continue;
                }
            };
            for file in matched {
                if !files.contains(&file) {
                    files.push(file);
                }
            }
        }
        files
    }

    fn scan_documents(&self, files: &[PathBuf], category: RouteCategory) -> Vec<Route> {
        let mut routes = Vec::new();
        for file in files {
            match self.fs.read(file) {
                Ok(content) => {
                    routes.extend(scan_openapi(&content, &file.display().to_string(), category))
                }
                Err(reason) => {
                    tracing::debug!(file = %file.display(), %reason, "skipping OpenAPI document")
                }
            }
        }
        routes
    }

    async fn extract_with_judge(
        &self,
        source_type: &str,
        category: RouteCategory,
        files: &[PathBuf],
    ) -> Result<Vec<Route>> {
        let sources: Vec<SourceFile> = files
            .iter()
            .filter_map(|file| match self.fs.read(file) {
                Ok(content) => Some(SourceFile::new(file, &content)),
                Err(reason) => {
                    tracing::debug!(file = %file.display(), %reason, "skipping source file");
                    None
                }
            })
            .collect();

        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let Some(judge) = &self.judge else {
            eyre::bail!(
                "'{}' sources need an AI provider, but no API key is configured",
                source_type
            );
        };

        let batches = split_into_batches(sources, self.max_batch_bytes);
        let batch_count = batches.len();
        let mut routes = Vec::new();

        for (i, batch) in batches.iter().enumerate() {
            tracing::info!(
                source = source_type,
                batch = i + 1,
                of = batch_count,
                files = batch.len(),
                "extracting routes with {}",
                judge.name()
            );

            let extracted = judge
                .extract_routes(source_type, category, &join_batch(batch))
                .await
                .wrap_err_with(|| format!("batch {} of {}", i + 1, batch_count))?;

            routes.extend(extracted.into_iter().map(|route| {
                let category = route.category.unwrap_or(category);
                let method = match route.method.trim() {
                    "" if category == RouteCategory::Ui => "PAGE".to_string(),
                    "" => "GET".to_string(),
                    method => method.to_uppercase(),
                };
                Route {
                    method,
                    path: route.path,
                    category,
                    source: source_type.to_string(),
                    file: route.file,
                    description: route.description,
                }
            }));
        }

        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specverify_core::MemoryFiles;

    #[tokio::test]
    async fn test_openapi_needs_no_judge() {
        let fs = MemoryFiles::new().add(
            "docs/openapi.yaml",
            "paths:\n  /users:\n    get:\n      summary: list\n  /users/{id}:\n    delete:\n      summary: remove\n",
        );
        let extractor = RouteExtractor::new(Arc::new(fs));
        let source = RouteSource::new("openapi", vec!["docs/*.yaml".into()], None).unwrap();

        let routes = extractor.extract_all(&[source]).await.unwrap();
        let found: Vec<(&str, &str)> = routes
            .iter()
            .map(|r| (r.method.as_str(), r.path.as_str()))
            .collect();
        assert_eq!(found, vec![("GET", "/users"), ("DELETE", "/users/{id}")]);
        assert!(routes.iter().all(|r| r.source == "openapi"));
    }

    #[tokio::test]
    async fn test_framework_source_without_judge_fails() {
        let fs = MemoryFiles::new().add("server/app.js", "app.get('/x', h)");
        let extractor = RouteExtractor::new(Arc::new(fs));
        let source = RouteSource::new("express", vec!["server/*.js".into()], None).unwrap();
        assert!(extractor.extract_all(&[source]).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_pattern_matches_nothing() {
        let fs = MemoryFiles::new().add(
            "docs/openapi.yaml",
            "paths:\n  /health:\n    get:\n      summary: ok\n",
        );
        let extractor = RouteExtractor::new(Arc::new(fs));
        let source = RouteSource::new(
            "openapi",
            vec!["docs/[bad.yaml".into(), "docs/*.yaml".into()],
            None,
        )
        .unwrap();

        let routes = extractor.extract_all(&[source]).await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/health");

        let only_bad =
            RouteSource::new("express", vec!["server/[bad.js".into()], None).unwrap();
        assert!(extractor.extract(&only_bad).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_files_is_empty() {
        let extractor = RouteExtractor::new(Arc::new(MemoryFiles::new()));
        let source = RouteSource::new("express", vec!["server/**/*.js".into()], None).unwrap();
        assert!(extractor.extract(&source).await.unwrap().is_empty());
    }
}
