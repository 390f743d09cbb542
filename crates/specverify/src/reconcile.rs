//! Coverage reconciliation: extracted routes against spec documents

use eyre::{Result, WrapErr};
use specverify_core::{CoverageReport, FileSystem, RouteSource, Spec, find_spec_files, load_specs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::extract::RouteExtractor;

/// Extract routes from `sources` and match them against every spec under `specs_dir`
pub async fn reconcile(
    extractor: &RouteExtractor,
    sources: &[RouteSource],
    specs_dir: &Path,
) -> Result<CoverageReport> {
    let routes = extractor.extract_all(sources).await?;
    let specs = load_all_specs(extractor.fs().clone(), specs_dir.to_path_buf()).await?;

    tracing::info!(
        routes = routes.len(),
        specs = specs.len(),
        "computing coverage"
    );
    Ok(CoverageReport::compute(&routes, &specs))
}

/// Parse every spec under `specs_dir`. Specs that fail to load are skipped.
pub async fn load_all_specs(fs: Arc<dyn FileSystem>, specs_dir: PathBuf) -> Result<Vec<Spec>> {
    tokio::task::spawn_blocking(move || -> Result<Vec<Spec>> {
        let files = find_spec_files(fs.as_ref(), &specs_dir, None)?;
        Ok(load_specs(fs.as_ref(), &files)
            .into_iter()
            .filter_map(|(path, spec)| match spec {
                Ok(spec) => Some(spec),
                Err(e) => {
                    tracing::warn!(spec = %path.display(), error = %e, "skipping spec");
                    None
                }
            })
            .collect())
    })
    .await
    .wrap_err("Spec loading task failed")?
}
