//! Discovered routes and the sources they come from

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a route is a UI page or an API endpoint
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RouteCategory {
    Ui,
    #[default]
    Api,
}

const UI_KEYWORDS: &[&str] = &[
    "routes",
    "pages",
    "views",
    "screens",
    ".tsx",
    ".jsx",
    ".vue",
    ".svelte",
    "client",
    "frontend",
];
const SERVER_KEYWORDS: &[&str] = &["api", "server"];
const API_KEYWORDS: &[&str] = &["api", "server", "backend", "openapi", "swagger"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

impl RouteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteCategory::Ui => "ui",
            RouteCategory::Api => "api",
        }
    }

    /// Parse `ui` / `api` (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ui" => Some(RouteCategory::Ui),
            "api" => Some(RouteCategory::Api),
            _ => None,
        }
    }

    /// Guess the category of a source from its file patterns.
    ///
    /// The first pattern that looks like front-end code (and mentions neither
    /// `api` nor `server`) makes it UI; the first that looks like server code
    /// makes it API. Anything else is API.
    pub fn infer<S: AsRef<str>>(patterns: &[S]) -> Self {
        for pattern in patterns {
            let pattern = pattern.as_ref().to_lowercase();
            if contains_any(&pattern, UI_KEYWORDS) && !contains_any(&pattern, SERVER_KEYWORDS) {
                return RouteCategory::Ui;
            }
            if contains_any(&pattern, API_KEYWORDS) {
                return RouteCategory::Api;
            }
        }
        RouteCategory::Api
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered API endpoint or UI page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// HTTP method, or `PAGE` / `GRAPHQL` for non-HTTP routes
    pub method: String,

    pub path: String,

    pub category: RouteCategory,

    /// Source type the route was extracted by (`openapi`, `express`, ...)
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Framework source types handed to the judge for extraction
pub const FRAMEWORK_SOURCE_TYPES: &[&str] = &[
    "express", "fastify", "go-echo", "go-gin", "rails", "django", "graphql", "auto",
];

/// How routes are pulled out of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSourceKind {
    /// OpenAPI / Swagger documents, scanned structurally
    OpenApi,
    /// Framework code, extracted by the judge with this type hint
    Framework(String),
}

impl RouteSourceKind {
    /// Resolve a configured source type.
    ///
    /// Unknown types are a configuration error.
    pub fn parse(name: &str) -> Result<Self> {
        if name == "openapi" {
            return Ok(RouteSourceKind::OpenApi);
        }
        if FRAMEWORK_SOURCE_TYPES.contains(&name) {
            return Ok(RouteSourceKind::Framework(name.to_string()));
        }

        let suggestion = std::iter::once("openapi")
            .chain(FRAMEWORK_SOURCE_TYPES.iter().copied())
            .map(|known| (known, strsim::jaro_winkler(name, known)))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(known, _)| format!(" (did you mean '{}'?)", known))
            .unwrap_or_default();

        eyre::bail!("Unknown route source type '{}'{}", name, suggestion)
    }

    /// The configured type name
    pub fn name(&self) -> &str {
        match self {
            RouteSourceKind::OpenApi => "openapi",
            RouteSourceKind::Framework(name) => name,
        }
    }
}

/// A resolved route source: how to extract, which files, which category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSource {
    pub kind: RouteSourceKind,
    pub patterns: Vec<String>,
    pub category: RouteCategory,
}

impl RouteSource {
    /// Build a source from configuration values, inferring a missing category
    pub fn new(
        source_type: &str,
        patterns: Vec<String>,
        category: Option<RouteCategory>,
    ) -> Result<Self> {
        let kind = RouteSourceKind::parse(source_type)?;
        let category = category.unwrap_or_else(|| RouteCategory::infer(&patterns));
        Ok(RouteSource {
            kind,
            patterns,
            category,
        })
    }
}
