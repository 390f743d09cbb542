//! Coverage analysis: pairing discovered routes with spec documents

use crate::path::{normalize_path, paths_match};
use crate::route::{Route, RouteCategory};
use crate::spec::Spec;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// A route, and the spec covering it if there is one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageItem {
    pub method: String,
    pub path: String,
    pub category: RouteCategory,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// File name of the covering spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_file: Option<String>,
}

/// A spec that no discovered route matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedSpec {
    pub file: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
}

/// Coverage counts for one route category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCoverage {
    pub total: usize,
    pub covered: usize,
    pub uncovered: usize,
    pub percentage: f64,
}

/// Coverage of discovered routes by spec documents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub total_endpoints: usize,
    pub covered_endpoints: usize,
    pub uncovered_endpoints: usize,
    /// Covered routes as a percentage of all routes (0 when there are none)
    pub coverage_percentage: f64,

    pub total_specs: usize,
    pub orphaned_specs: usize,

    /// Breakdown keyed by category name (`ui` / `api`)
    pub categories: BTreeMap<String, CategoryCoverage>,

    pub covered: Vec<CoverageItem>,
    pub uncovered: Vec<CoverageItem>,
    pub orphaned: Vec<OrphanedSpec>,
}

/// Specs with a declared route path, keyed by normalized path.
///
/// A later spec with the same normalized path replaces the earlier one but
/// keeps its position, so the fallback scan order is stable.
struct SpecIndex<'a> {
    entries: Vec<(String, &'a Spec)>,
    positions: HashMap<String, usize>,
}

impl<'a> SpecIndex<'a> {
    fn build(specs: &'a [Spec]) -> Self {
        let mut index = SpecIndex {
            entries: Vec::new(),
            positions: HashMap::new(),
        };
        for spec in specs {
            let Some(route_path) = spec.route_path.as_deref() else {
                continue;
            };
            let key = normalize_path(route_path);
            match index.positions.get(&key) {
                Some(&pos) => index.entries[pos].1 = spec,
                None => {
                    index.positions.insert(key.clone(), index.entries.len());
                    index.entries.push((key, spec));
                }
            }
        }
        index
    }

    fn find(&self, normalized: &str) -> Option<&'a Spec> {
        if let Some(&pos) = self.positions.get(normalized) {
            return Some(self.entries[pos].1);
        }
        self.entries
            .iter()
            .find(|(key, _)| paths_match(normalized, key))
            .map(|(_, spec)| *spec)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

impl CoverageReport {
    /// Pair every route with a spec whose route path matches it.
    pub fn compute(routes: &[Route], specs: &[Spec]) -> Self {
        let index = SpecIndex::build(specs);
        let mut matched: HashSet<&Path> = HashSet::new();
        let mut report = CoverageReport {
            total_endpoints: routes.len(),
            total_specs: specs.len(),
            ..Default::default()
        };

        for route in routes {
            let spec = index.find(&normalize_path(&route.path));
            let category = report
                .categories
                .entry(route.category.as_str().to_string())
                .or_default();
            category.total += 1;

            let item = CoverageItem {
                method: route.method.clone(),
                path: route.path.clone(),
                category: route.category,
                source: route.source.clone(),
                file: route.file.clone(),
                spec_file: spec.map(Spec::file_name),
            };

            match spec {
                Some(spec) => {
                    matched.insert(spec.file_path.as_path());
                    category.covered += 1;
                    report.covered.push(item);
                }
                None => {
                    category.uncovered += 1;
                    report.uncovered.push(item);
                }
            }
        }

        report.orphaned = specs
            .iter()
            .filter(|spec| !matched.contains(spec.file_path.as_path()))
            .map(|spec| OrphanedSpec {
                file: spec.file_name(),
                title: spec.title.clone(),
                route_path: spec.route_path.clone(),
            })
            .collect();

        for category in report.categories.values_mut() {
            category.percentage = percentage(category.covered, category.total);
        }

        report.covered_endpoints = report.covered.len();
        report.uncovered_endpoints = report.uncovered.len();
        report.orphaned_specs = report.orphaned.len();
        report.coverage_percentage = percentage(report.covered_endpoints, report.total_endpoints);

        tracing::debug!(
            routes = report.total_endpoints,
            covered = report.covered_endpoints,
            orphaned = report.orphaned_specs,
            "computed coverage"
        );

        report
    }

    /// Whether coverage meets a percentage threshold
    pub fn is_passing(&self, threshold: f64) -> bool {
        self.coverage_percentage >= threshold
    }
}
