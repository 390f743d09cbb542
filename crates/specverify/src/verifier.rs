//! Verification orchestrator
//!
//! Each spec is verified as its own task. A semaphore caps how many run at
//! once; results are gathered in completion order and sorted by
//! [`Summary::from_results`].

use eyre::{Result, WrapErr};
use specverify_core::{
    FileSystem, Judge, JudgeError, Spec, Summary, Verification, VerifyResult, find_code_files,
    find_spec_files, read_code_files,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;

use crate::config::{Config, DEFAULT_CONCURRENCY};

/// Flips a [`CancelSignal`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by a verification run; once cancelled, the run fails
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn new() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx })
    }

    /// A signal that never fires
    pub fn never() -> CancelSignal {
        let (_, signal) = Self::new();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Pends forever if the handle is dropped first.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Where specs and code live, and how verification runs
#[derive(Debug, Clone)]
pub struct VerifierOptions {
    pub specs_dir: PathBuf,
    pub code_dir: PathBuf,
    /// Code directories per spec type; types not listed search `code_dir`
    pub code_paths: BTreeMap<String, Vec<PathBuf>>,
    /// Judge focus hints per spec type
    pub focus: BTreeMap<String, Vec<String>>,
    pub concurrency: usize,
    /// Per-spec threshold for `Summary::failing_specs`; 0 disables
    pub fail_under: u8,
}

impl VerifierOptions {
    pub fn new(specs_dir: impl Into<PathBuf>, code_dir: impl Into<PathBuf>) -> Self {
        Self {
            specs_dir: specs_dir.into(),
            code_dir: code_dir.into(),
            code_paths: BTreeMap::new(),
            focus: BTreeMap::new(),
            concurrency: DEFAULT_CONCURRENCY,
            fail_under: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut options = Self::new(config.specs_dir(), config.code_dir());
        for spec_type in config.all_spec_types() {
            options
                .code_paths
                .insert(spec_type.clone(), config.code_paths(&spec_type));
            let focus = config.verification_focus(&spec_type);
            if !focus.is_empty() {
                options.focus.insert(spec_type, focus);
            }
        }
        options.concurrency = config.concurrency();
        options.fail_under = config.fail_under();
        options
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// The spec type a file belongs to: its first directory under `specs_dir`,
    /// falling back to the type inferred from its parent directory.
    fn spec_type_key(&self, spec: &Spec) -> String {
        spec.file_path
            .strip_prefix(&self.specs_dir)
            .ok()
            .filter(|relative| relative.components().count() > 1)
            .and_then(|relative| relative.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.spec_type.as_str().to_string())
    }
}

/// Verifies specs against code with a judge
#[derive(Clone)]
pub struct Verifier {
    fs: Arc<dyn FileSystem>,
    judge: Arc<dyn Judge>,
    options: Arc<VerifierOptions>,
}

impl Verifier {
    pub fn new(fs: Arc<dyn FileSystem>, judge: Arc<dyn Judge>, options: VerifierOptions) -> Self {
        Self {
            fs,
            judge,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    /// Verify every spec, or only those in the `spec_type` subdirectory
    pub async fn verify_all(&self, spec_type: Option<&str>, cancel: CancelSignal) -> Result<Summary> {
        let files = find_spec_files(self.fs.as_ref(), &self.options.specs_dir, spec_type)?;
        self.verify_files(files, cancel).await
    }

    /// Verify the specs of every type in a group
    pub async fn verify_group(&self, spec_types: &[String], cancel: CancelSignal) -> Result<Summary> {
        let mut files = Vec::new();
        for spec_type in spec_types {
            for file in find_spec_files(self.fs.as_ref(), &self.options.specs_dir, Some(spec_type))? {
                if !files.contains(&file) {
                    files.push(file);
                }
            }
        }
        self.verify_files(files, cancel).await
    }

    /// Verify a single spec file. A per-spec error becomes the returned error.
    pub async fn verify_one(&self, path: &Path) -> Result<VerifyResult> {
        let result = verify_spec(
            self.fs.clone(),
            self.judge.clone(),
            self.options.clone(),
            path.to_path_buf(),
        )
        .await;
        match &result.error {
            Some(error) => Err(eyre::eyre!("{}", error))
                .wrap_err_with(|| format!("Failed to verify {}", path.display())),
            None => Ok(result),
        }
    }

    async fn verify_files(&self, files: Vec<PathBuf>, mut cancel: CancelSignal) -> Result<Summary> {
        if files.is_empty() {
            tracing::info!(specs_dir = %self.options.specs_dir.display(), "no spec files found");
            return Ok(Summary::default());
        }

        tracing::info!(
            specs = files.len(),
            concurrency = self.options.concurrency,
            judge = self.judge.name(),
            "verifying specs"
        );

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for file in files {
            let semaphore = semaphore.clone();
            let fs = self.fs.clone();
            let judge = self.judge.clone();
            let options = self.options.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| JudgeError::Cancelled)?;
                Ok::<_, JudgeError>(verify_spec(fs, judge, options, file).await)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(eyre::Report::new(JudgeError::Cancelled))
                        .wrap_err("Verification was cancelled");
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(joined) => {
                        let result = joined.wrap_err("Verification task failed")??;
                        results.push(result);
                    }
                },
            }
        }

        let mut summary = Summary::from_results(results);
        summary.apply_fail_under(self.options.fail_under);
        Ok(summary)
    }
}

async fn verify_spec(
    fs: Arc<dyn FileSystem>,
    judge: Arc<dyn Judge>,
    options: Arc<VerifierOptions>,
    path: PathBuf,
) -> VerifyResult {
    let mut result = VerifyResult::new(
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    );

    let gathered = tokio::task::spawn_blocking({
        let options = options.clone();
        move || -> Result<_> {
            let spec = Spec::load(fs.as_ref(), &path)?;
            let spec_type = options.spec_type_key(&spec);
            let code_paths = options.code_paths.get(&spec_type).cloned().unwrap_or_default();
            let files = find_code_files(fs.as_ref(), &spec, &options.code_dir, &code_paths);
            let code = read_code_files(fs.as_ref(), &files);
            Ok((spec, spec_type, files, code))
        }
    })
    .await;

    let (spec, spec_type, files, code) = match gathered {
        Ok(Ok(gathered)) => gathered,
        Ok(Err(e)) => {
            result.error = Some(format!("{:#}", e));
            return result;
        }
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    result.title = spec.title.clone();
    result.route_path = spec.route_path.clone();
    result.spec_type = spec.spec_type;
    result.code_files = files.iter().map(|f| f.display().to_string()).collect();

    if files.is_empty() {
        tracing::debug!(spec = %result.spec_file, "no code files found");
        result.verification = Some(Verification::no_code_found());
        return result;
    }

    let focus = options.focus.get(&spec_type).cloned().unwrap_or_default();
    match judge.verify(&spec.content, &code, &focus).await {
        Ok(verification) => {
            tracing::debug!(
                spec = %result.spec_file,
                files = files.len(),
                match_percentage = verification.match_percentage,
                "verified"
            );
            result.verification = Some(verification);
        }
        Err(e) => {
            tracing::warn!(spec = %result.spec_file, error = %e, "verification failed");
            result.error = Some(e.to_string());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use specverify_core::MemoryFiles;

    #[test]
    fn test_spec_type_key() {
        let options = VerifierOptions::new("specs", "src");
        let spec = |path: &str| Spec::parse("# T", path);
        assert_eq!(options.spec_type_key(&spec("specs/screens/a.md")), "screens");
        assert_eq!(options.spec_type_key(&spec("specs/ui/forms/a.md")), "ui");
        assert_eq!(options.spec_type_key(&spec("specs/a.md")), "unknown");
        assert_eq!(options.spec_type_key(&spec("elsewhere/api/a.md")), "api");
    }

    #[test]
    fn test_options_from_config() {
        let config = crate::config::parse_config(
            "code_dir: app\nspec_types:\n  ui:\n    verification_focus: [Layout]\noptions:\n  concurrency: 7\n  fail_under: 30\n",
        )
        .unwrap();
        let options = VerifierOptions::from_config(&config);
        assert_eq!(options.concurrency, 7);
        assert_eq!(options.fail_under, 30);
        assert_eq!(options.focus["ui"], vec!["Layout"]);
        assert_eq!(options.code_paths["ui"], vec![Path::new("app/client/components")]);
        assert_eq!(options.code_paths["api"], vec![Path::new("app/server/routes")]);
    }

    #[tokio::test]
    async fn test_cancel_signal() {
        let (handle, mut signal) = CancelSignal::new();
        assert!(!signal.is_cancelled());
        handle.cancel();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
        assert!(!CancelSignal::never().is_cancelled());
    }

    #[tokio::test]
    async fn test_no_specs_is_an_empty_summary() {
        struct Unreachable;

        #[async_trait::async_trait]
        impl Judge for Unreachable {
            fn name(&self) -> &str {
                "unreachable"
            }
            async fn verify(
                &self,
                _: &str,
                _: &[(String, String)],
                _: &[String],
            ) -> std::result::Result<Verification, JudgeError> {
                unreachable!()
            }
            async fn extract_routes(
                &self,
                _: &str,
                _: specverify_core::RouteCategory,
                _: &str,
            ) -> std::result::Result<Vec<specverify_core::ExtractedRoute>, JudgeError> {
                unreachable!()
            }
        }

        let verifier = Verifier::new(
            Arc::new(MemoryFiles::new()),
            Arc::new(Unreachable),
            VerifierOptions::new("specs", "src"),
        );
        let summary = verifier.verify_all(None, CancelSignal::never()).await.unwrap();
        assert_eq!(summary.total_specs, 0);
        assert_eq!(summary.average_match, 0.0);
    }
}
