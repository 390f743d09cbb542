//! specverify-core - Core library for reconciling spec documents with code
//!
//! This crate provides the deterministic building blocks for:
//! - Parsing markdown spec documents into [`Spec`]s
//! - Scanning OpenAPI documents for [`Route`]s and batching framework code for a [`Judge`]
//! - Normalizing and matching route paths across parameter notations
//! - Computing a [`CoverageReport`] of routes against specs
//! - Locating the code behind a spec and summarizing verification results
//!
//! # Features
//!
//! - `walk` - Enable [`DiskFiles`] for gitignore-aware directory walking (brings in `ignore`)
//! - `parallel` - Parse spec documents in parallel (brings in `rayon`)
//!
//! # Spec Documents
//!
//! A spec declares the route it describes in a two-column table and points
//! at its code with inline code spans:
//!
//! ```
//! use specverify_core::{Spec, SpecType};
//!
//! let spec = Spec::parse(
//!     "# Users\n\n| Endpoint | `/users/{id}` |\n\nSee `src/server/users.ts`.\n",
//!     "specs/api/users.md",
//! );
//!
//! assert_eq!(spec.title, "Users");
//! assert_eq!(spec.spec_type, SpecType::Api);
//! assert_eq!(spec.route_path.as_deref(), Some("/users/{id}"));
//! assert_eq!(spec.related_files, vec!["src/server/users.ts"]);
//! ```
//!
//! # Path Matching
//!
//! Parameter segments match anything, whatever their notation:
//!
//! ```
//! use specverify_core::{normalize_path, paths_match};
//!
//! assert_eq!(normalize_path("/users/<int:id>"), "/users/:id");
//! assert!(paths_match("/users/{id}", "/users/42"));
//! assert!(!paths_match("/users/42/posts", "/users/42"));
//! ```
//!
//! # In-Memory Files (for testing)
//!
//! Use [`MemoryFiles`] when you don't want to hit the filesystem:
//!
//! ```
//! use specverify_core::{CoverageReport, MemoryFiles, Route, RouteCategory, Spec, find_spec_files, load_specs};
//! use std::path::Path;
//!
//! let files = MemoryFiles::new()
//!     .add("specs/api/users.md", "# Users\n| Path | /users |\n")
//!     .add("specs/api/legacy.md", "# Legacy\n| Path | /legacy |\n");
//!
//! let paths = find_spec_files(&files, Path::new("specs"), None).unwrap();
//! let specs: Vec<Spec> = load_specs(&files, &paths)
//!     .into_iter()
//!     .filter_map(|(_, spec)| spec.ok())
//!     .collect();
//!
//! let routes = vec![Route {
//!     method: "GET".into(),
//!     path: "/users".into(),
//!     category: RouteCategory::Api,
//!     source: "openapi".into(),
//!     file: None,
//!     description: None,
//! }];
//!
//! let report = CoverageReport::compute(&routes, &specs);
//! assert_eq!(report.coverage_percentage, 100.0);
//! assert_eq!(report.orphaned[0].file, "legacy.md");
//! ```

mod batch;
mod code_files;
mod coverage;
mod files;
mod judge;
mod path;
mod route;
mod scan;
mod spec;
mod summary;

pub use batch::{SourceFile, join_batch, split_into_batches};
pub use code_files::{find_code_files, read_code_files, resolve_related_path, route_name};
pub use coverage::{CategoryCoverage, CoverageItem, CoverageReport, OrphanedSpec};
pub use files::{FileSystem, MemoryFiles, SkipReason, clean_path, compile_pattern, expand_pattern};
pub use judge::{ExtractedRoute, Judge, JudgeError};
pub use path::{is_path_parameter, normalize_path, paths_match};
pub use route::{FRAMEWORK_SOURCE_TYPES, Route, RouteCategory, RouteSource, RouteSourceKind};
pub use scan::scan_openapi;
pub use spec::{Spec, SpecType, find_spec_files, load_specs};
pub use summary::{
    FailingSpec, HIGH_MATCH, LOW_MATCH, Summary, Verification, VerifyResult,
};

#[cfg(feature = "walk")]
pub use files::DiskFiles;
