//! Configuration schema for specverify
//!
//! Config lives in `.specverify.yml` (or `.specverify.yaml`, `specverify.yml`,
//! `specverify.yaml`) in the project root. Every key is optional; missing keys
//! take the defaults written by `specverify init`.

use eyre::{Result, WrapErr};
use facet::Facet;
use specverify_core::{RouteCategory, RouteSource};
use specverify_judge::Provider;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names, in lookup order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".specverify.yml",
    ".specverify.yaml",
    "specverify.yml",
    "specverify.yaml",
];

/// Environment variable that overrides any provider-specific key
pub const API_KEY_ENV: &str = "SPEC_VERIFY_API_KEY";

pub const DEFAULT_SPECS_DIR: &str = "specs/";
pub const DEFAULT_CODE_DIR: &str = "src/";
pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_CONCURRENCY: usize = 3;
pub const DEFAULT_PASS_THRESHOLD: u8 = 50;
pub const DEFAULT_MAX_BATCH_BYTES: usize = 100_000;

/// Root configuration for specverify
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Directory holding spec documents
    #[facet(default)]
    pub specs_dir: Option<String>,

    /// Source code root
    #[facet(default)]
    pub code_dir: Option<String>,

    /// `claude`, `openai` or `gemini`
    #[facet(default)]
    pub ai_provider: Option<String>,

    /// API key (prefer the environment)
    #[facet(default)]
    pub ai_api_key: Option<String>,

    /// Spec type to code subdirectory (under `code_dir`).
    /// Entries here are merged over the defaults.
    #[facet(default)]
    pub mapping: BTreeMap<String, String>,

    /// Detailed per-type settings; take precedence over `mapping`
    #[facet(default)]
    pub spec_types: BTreeMap<String, SpecTypeConfig>,

    /// Named sets of spec types
    #[facet(default)]
    pub groups: BTreeMap<String, GroupConfig>,

    /// Older name for `route_sources`
    #[facet(default)]
    pub api_sources: Vec<RouteSourceConfig>,

    /// Where to discover routes for coverage
    #[facet(default)]
    pub route_sources: Vec<RouteSourceConfig>,

    #[facet(default)]
    pub options: OptionsConfig,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct SpecTypeConfig {
    /// Code directories, relative to `code_dir`
    #[facet(default)]
    pub code_paths: Vec<String>,

    /// What the judge should pay attention to for this type
    #[facet(default)]
    pub verification_focus: Vec<String>,

    #[facet(default)]
    pub file_patterns: Vec<String>,

    #[facet(default)]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct GroupConfig {
    #[facet(default)]
    pub types: Vec<String>,

    #[facet(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct RouteSourceConfig {
    /// `openapi`, `express`, `fastify`, `go-echo`, `go-gin`, `rails`,
    /// `django`, `graphql` or `auto`
    #[facet(rename = "type")]
    pub source_type: String,

    #[facet(default)]
    pub patterns: Vec<String>,

    /// `ui` or `api`; inferred from the patterns when absent
    #[facet(default)]
    pub category: Option<String>,

    #[facet(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct OptionsConfig {
    /// Specs verified at once
    #[facet(default)]
    pub concurrency: Option<usize>,

    /// Minimum average match (percent)
    #[facet(default)]
    pub pass_threshold: Option<u8>,

    /// Minimum per-spec match (percent); 0 disables
    #[facet(default)]
    pub fail_under: Option<u8>,

    #[facet(default)]
    pub verbose: Option<bool>,

    /// Payload ceiling for one route-extraction call
    #[facet(default)]
    pub max_batch_bytes: Option<usize>,
}

fn default_mapping() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("ui".to_string(), "client/components".to_string()),
        ("api".to_string(), "server/routes".to_string()),
    ])
}

impl Config {
    pub fn specs_dir(&self) -> PathBuf {
        PathBuf::from(self.specs_dir.as_deref().unwrap_or(DEFAULT_SPECS_DIR))
    }

    pub fn code_dir(&self) -> PathBuf {
        PathBuf::from(self.code_dir.as_deref().unwrap_or(DEFAULT_CODE_DIR))
    }

    pub fn provider(&self) -> &str {
        self.ai_provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// `mapping` merged over the default mapping
    pub fn mapping(&self) -> BTreeMap<String, String> {
        let mut mapping = default_mapping();
        mapping.extend(self.mapping.clone());
        mapping
    }

    /// Code directories searched for specs of `spec_type`.
    ///
    /// `spec_types[t].code_paths` wins over `mapping[t]`; both are joined
    /// onto `code_dir`. Otherwise `code_dir` itself.
    pub fn code_paths(&self, spec_type: &str) -> Vec<PathBuf> {
        let code_dir = self.code_dir();
        if let Some(st) = self.spec_types.get(spec_type)
            && !st.code_paths.is_empty()
        {
            return st.code_paths.iter().map(|p| code_dir.join(p)).collect();
        }
        if let Some(mapped) = self.mapping().get(spec_type) {
            return vec![code_dir.join(mapped)];
        }
        vec![code_dir]
    }

    pub fn verification_focus(&self, spec_type: &str) -> Vec<String> {
        self.spec_types
            .get(spec_type)
            .map(|st| st.verification_focus.clone())
            .unwrap_or_default()
    }

    /// Spec types in a group, if the group exists
    pub fn group_types(&self, group: &str) -> Option<&[String]> {
        self.groups.get(group).map(|g| g.types.as_slice())
    }

    /// Every spec type named in `spec_types` or `mapping`, sorted
    pub fn all_spec_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .spec_types
            .keys()
            .chain(self.mapping().keys())
            .cloned()
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Resolve `route_sources` then `api_sources`.
    ///
    /// An unknown source type or category is an error.
    pub fn route_sources(&self) -> Result<Vec<RouteSource>> {
        self.route_sources
            .iter()
            .chain(&self.api_sources)
            .map(|source| {
                let category = match source.category.as_deref() {
                    None | Some("") => None,
                    Some(name) => Some(RouteCategory::parse(name).ok_or_else(|| {
                        eyre::eyre!(
                            "Unknown category '{}' for {} source (expected 'ui' or 'api')",
                            name,
                            source.source_type
                        )
                    })?),
                };
                RouteSource::new(&source.source_type, source.patterns.clone(), category)
            })
            .collect()
    }

    pub fn concurrency(&self) -> usize {
        self.options
            .concurrency
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn pass_threshold(&self) -> u8 {
        self.options.pass_threshold.unwrap_or(DEFAULT_PASS_THRESHOLD)
    }

    pub fn fail_under(&self) -> u8 {
        self.options.fail_under.unwrap_or(0)
    }

    pub fn verbose(&self) -> bool {
        self.options.verbose.unwrap_or(false)
    }

    pub fn max_batch_bytes(&self) -> usize {
        self.options
            .max_batch_bytes
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_BATCH_BYTES)
    }
}

/// First existing config file in `root`, or the default name if none exists
pub fn find_config_file(root: &Path) -> PathBuf {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAMES[0]))
}

/// Parse config text
pub fn parse_config(content: &str) -> Result<Config> {
    facet_yaml::from_str(content).wrap_err("Failed to parse config")
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
}

/// Default config written by `specverify init`. Never contains an API key.
pub const DEFAULT_CONFIG: &str = indoc::indoc! {r#"
    # specverify configuration
    specs_dir: specs/
    code_dir: src/

    # claude, openai or gemini. The API key is read from SPEC_VERIFY_API_KEY
    # or the provider's own variable (ANTHROPIC_API_KEY, OPENAI_API_KEY,
    # GOOGLE_API_KEY).
    ai_provider: gemini

    # Spec type (directory under specs_dir) to code directory (under code_dir)
    mapping:
      ui: client/components
      api: server/routes

    options:
      concurrency: 3
      pass_threshold: 50
      fail_under: 0
      verbose: false
      max_batch_bytes: 100000
"#};

/// Write the default config, refusing to overwrite unless `force` is set
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        eyre::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
}

/// Values from `.env` and `.env.local`, consulted after the process environment.
///
/// Later files override earlier ones; the process environment always wins.
#[derive(Debug, Clone, Default)]
pub struct DotEnv {
    values: BTreeMap<String, String>,
}

impl DotEnv {
    pub fn load(root: &Path) -> Self {
        let mut dotenv = DotEnv::default();
        for name in [".env", ".env.local"] {
            if let Ok(content) = std::fs::read_to_string(root.join(name)) {
                dotenv.values.extend(parse_dotenv(&content));
            }
        }
        dotenv
    }

    /// Look a variable up in the process environment, then the dotenv files
    pub fn var(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.values.get(key).cloned())
            .filter(|value| !value.is_empty())
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments and stripping quotes
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Pick the API key: CLI flag, then `SPEC_VERIFY_API_KEY`, then the
/// provider's own variable, then the config file.
pub fn resolve_api_key(
    cli_key: Option<&str>,
    provider: &str,
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_empty = |key: &str| (!key.trim().is_empty()).then(|| key.to_string());

    cli_key
        .and_then(non_empty)
        .or_else(|| env(API_KEY_ENV))
        .or_else(|| env(Provider::from_name(provider).api_key_env()))
        .or_else(|| config.ai_api_key.as_deref().and_then(non_empty))
}
