//! Output formatting for verification summaries, coverage reports and route listings

use owo_colors::OwoColorize;
use serde::Serialize;
use specverify_core::{CoverageReport, HIGH_MATCH, LOW_MATCH, Route, Summary, VerifyResult};
use std::collections::BTreeMap;

const BAR_WIDTH: usize = 20;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn colored_percent(percent: f64) -> String {
    let percent_str = format!("{:.1}%", percent);
    if percent >= f64::from(HIGH_MATCH) {
        percent_str.green().to_string()
    } else if percent >= f64::from(LOW_MATCH) {
        percent_str.yellow().to_string()
    } else {
        percent_str.red().to_string()
    }
}

fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(BAR_WIDTH - filled);
    let filled_str = if percent >= f64::from(HIGH_MATCH) {
        filled_str.green().to_string()
    } else if percent >= f64::from(LOW_MATCH) {
        filled_str.yellow().to_string()
    } else {
        filled_str.red().to_string()
    };
    format!("{}{}", filled_str, empty_str.dimmed())
}

fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Render a verification summary
pub fn render_summary(
    summary: &Summary,
    format: OutputFormat,
    pass_threshold: u8,
    verbose: bool,
) -> String {
    match format {
        OutputFormat::Text => render_summary_text(summary, pass_threshold, verbose),
        OutputFormat::Json => render_json(summary),
    }
}

fn render_summary_text(summary: &Summary, pass_threshold: u8, verbose: bool) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("{} Spec Verification\n", "##".bold()));
    output.push('\n');

    if summary.total_specs == 0 {
        output.push_str(&format!("{}\n", "No spec files found.".dimmed()));
        return output;
    }

    for result in &summary.results {
        render_result(&mut output, result, verbose);
    }
    output.push('\n');

    output.push_str(&format!(
        "Average match: {} ({}/{} specs verified)\n",
        colored_percent(summary.average_match),
        summary.verified_specs,
        summary.total_specs
    ));
    output.push_str(&format!(
        "  {} high (>= {}%), {} low (< {}%)\n",
        summary.high_match_count.to_string().green(),
        HIGH_MATCH,
        summary.low_match_count.to_string().red(),
        LOW_MATCH
    ));

    let errored: Vec<_> = summary.errored().collect();
    if !errored.is_empty() {
        output.push('\n');
        output.push_str(&format!(
            "{} Errors ({}):\n",
            "!".red().bold(),
            errored.len()
        ));
        for result in errored {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "-".red(),
                result.spec_file,
                result.error.as_deref().unwrap_or_default()
            ));
        }
    }

    if !summary.failing_specs.is_empty() {
        output.push('\n');
        output.push_str(&format!(
            "{} Below threshold ({}):\n",
            "?".yellow().bold(),
            summary.failing_specs.len()
        ));
        for failing in &summary.failing_specs {
            output.push_str(&format!(
                "  {} {} ({}%)\n",
                "-".yellow(),
                failing.spec_file,
                failing.match_percentage
            ));
        }
    }

    output.push('\n');
    if summary.is_passing(pass_threshold) && summary.failing_specs.is_empty() {
        output.push_str(&format!(
            "{} Passed (threshold {}%)\n",
            "✓".green().bold(),
            pass_threshold
        ));
    } else {
        output.push_str(&format!(
            "{} Failed (threshold {}%)\n",
            "✗".red().bold(),
            pass_threshold
        ));
    }

    output
}

fn render_result(output: &mut String, result: &VerifyResult, verbose: bool) {
    let verification = match (&result.error, &result.verification) {
        (None, Some(verification)) => verification,
        _ => {
            output.push_str(&format!(
                "  {} {} {}\n",
                "✗".red(),
                result.spec_file.bold(),
                "error".red()
            ));
            return;
        }
    };

    let percent = f64::from(verification.match_percentage);
    output.push_str(&format!(
        "  {} {:>6}  {}",
        bar(percent),
        colored_percent(percent),
        result.spec_file.bold()
    ));
    if !result.title.is_empty() && result.title != result.spec_file {
        output.push_str(&format!(" {}", result.title.dimmed()));
    }
    output.push('\n');

    if !verbose {
        return;
    }

    for file in &result.code_files {
        output.push_str(&format!("      {} {}\n", "file".dimmed(), file));
    }
    for item in &verification.matched_items {
        output.push_str(&format!("      {} {}\n", "+".green(), item));
    }
    for item in &verification.unmatched_items {
        output.push_str(&format!("      {} {}\n", "-".red(), item));
    }
    if !verification.notes.is_empty() {
        output.push_str(&format!("      {}\n", verification.notes.dimmed()));
    }
}

/// Render a coverage report
pub fn render_coverage(report: &CoverageReport, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Text => render_coverage_text(report, verbose),
        OutputFormat::Json => render_json(report),
    }
}

fn render_coverage_text(report: &CoverageReport, verbose: bool) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("{} Route Coverage\n", "##".bold()));
    output.push('\n');

    output.push_str(&format!(
        "Coverage: {} {} ({}/{} routes)\n",
        bar(report.coverage_percentage),
        colored_percent(report.coverage_percentage),
        report.covered_endpoints,
        report.total_endpoints
    ));
    for (category, coverage) in &report.categories {
        output.push_str(&format!(
            "  {:<4} {} ({}/{})\n",
            category,
            colored_percent(coverage.percentage),
            coverage.covered,
            coverage.total
        ));
    }
    output.push_str(&format!(
        "Specs: {} ({} orphaned)\n",
        report.total_specs, report.orphaned_specs
    ));
    output.push('\n');

    if !report.uncovered.is_empty() {
        output.push_str(&format!(
            "{} Uncovered Routes ({}):\n",
            "?".yellow().bold(),
            report.uncovered.len()
        ));
        for item in &report.uncovered {
            output.push_str(&format!(
                "  {} {:<7} {}",
                "-".yellow(),
                item.method,
                item.path
            ));
            if let Some(file) = &item.file {
                output.push_str(&format!(" {}", file.dimmed()));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    if !report.orphaned.is_empty() {
        output.push_str(&format!(
            "{} Orphaned Specs ({}):\n",
            "!".red().bold(),
            report.orphaned.len()
        ));
        for spec in &report.orphaned {
            output.push_str(&format!("  {} {}", "-".red(), spec.file));
            if let Some(route_path) = &spec.route_path {
                output.push_str(&format!(" {}", route_path.dimmed()));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    if verbose && !report.covered.is_empty() {
        output.push_str(&format!(
            "{} Covered Routes ({}):\n",
            "✓".green().bold(),
            report.covered.len()
        ));
        for item in &report.covered {
            output.push_str(&format!(
                "  {} {:<7} {} {}\n",
                "-".green(),
                item.method,
                item.path,
                item.spec_file.as_deref().unwrap_or_default().dimmed()
            ));
        }
        output.push('\n');
    }

    output
}

/// Render extracted routes, grouped by source in text mode
pub fn render_routes(routes: &[Route], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_routes_text(routes),
        OutputFormat::Json => render_json(&routes),
    }
}

fn render_routes_text(routes: &[Route]) -> String {
    let mut output = String::new();
    output.push('\n');

    if routes.is_empty() {
        output.push_str(&format!("{}\n", "No routes found.".dimmed()));
        return output;
    }

    let mut by_source: BTreeMap<&str, Vec<&Route>> = BTreeMap::new();
    for route in routes {
        by_source.entry(route.source.as_str()).or_default().push(route);
    }

    for (source, routes) in by_source {
        output.push_str(&format!(
            "{} {} ({})\n",
            "##".bold(),
            source.cyan().bold(),
            routes.len()
        ));
        for route in routes {
            output.push_str(&format!(
                "  {:<7} {} {}",
                route.method,
                route.path,
                route.category.as_str().dimmed()
            ));
            if let Some(description) = &route.description {
                output.push_str(&format!(" {}", description.dimmed()));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    output.push_str(&format!("Total: {} routes\n", routes.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use specverify_core::{RouteCategory, Verification};

    fn summary() -> Summary {
        let result = |file: &str, match_percentage: u8| VerifyResult {
            title: format!("Title of {}", file),
            verification: Some(Verification {
                match_percentage,
                matched_items: vec!["Login form".into()],
                ..Default::default()
            }),
            ..VerifyResult::new(file)
        };
        let mut errored = VerifyResult::new("broken.md");
        errored.error = Some("API error (status 500): boom".into());
        Summary::from_results(vec![result("b.md", 40), result("a.md", 90), errored])
    }

    #[test]
    fn test_summary_json_uses_camel_case() {
        let json: serde_json::Value =
            serde_json::from_str(&render_summary(&summary(), OutputFormat::Json, 50, false))
                .unwrap();
        assert_eq!(json["totalSpecs"], 3);
        assert_eq!(json["verifiedSpecs"], 2);
        assert_eq!(json["averageMatch"], 65.0);
        assert_eq!(json["results"][0]["specFile"], "a.md");
        assert_eq!(json["results"][0]["verification"]["matchPercentage"], 90);
        assert_eq!(json["results"][1]["specFile"], "b.md");
        assert!(json.get("failingSpecs").is_none());
    }

    #[test]
    fn test_summary_text() {
        let text = render_summary(&summary(), OutputFormat::Text, 50, true);
        assert!(text.contains("a.md"));
        assert!(text.contains("Login form"));
        assert!(text.contains("API error (status 500): boom"));
        assert!(text.contains("Passed"));

        let text = render_summary(&summary(), OutputFormat::Text, 70, false);
        assert!(text.contains("Failed"));
        assert!(!text.contains("Login form"));
    }

    #[test]
    fn test_empty_summary_text() {
        let text = render_summary(&Summary::default(), OutputFormat::Text, 50, false);
        assert!(text.contains("No spec files found."));
    }

    #[test]
    fn test_coverage_json() {
        let report = CoverageReport {
            total_endpoints: 2,
            covered_endpoints: 1,
            uncovered_endpoints: 1,
            coverage_percentage: 50.0,
            ..Default::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&render_coverage(&report, OutputFormat::Json, false)).unwrap();
        assert_eq!(json["totalEndpoints"], 2);
        assert_eq!(json["coveredEndpoints"], 1);
        assert_eq!(json["coveragePercentage"], 50.0);
    }

    #[test]
    fn test_routes_grouped_by_source() {
        let route = |method: &str, path: &str, source: &str| Route {
            method: method.into(),
            path: path.into(),
            category: RouteCategory::Api,
            source: source.into(),
            file: None,
            description: None,
        };
        let routes = vec![
            route("GET", "/users", "openapi"),
            route("POST", "/login", "express"),
            route("DELETE", "/users/{id}", "openapi"),
        ];
        let text = render_routes(&routes, OutputFormat::Text);
        let express = text.find("express").unwrap();
        let openapi = text.find("openapi").unwrap();
        assert!(express < openapi);
        assert!(text.contains("Total: 3 routes"));

        let json: serde_json::Value =
            serde_json::from_str(&render_routes(&routes, OutputFormat::Json)).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[2]["path"], "/users/{id}");
    }

    #[test]
    fn test_bar_width() {
        let cells = |bar: String| bar.chars().filter(|c| matches!(c, '█' | '░')).count();
        assert_eq!(cells(bar(50.0)), BAR_WIDTH);
        assert_eq!(cells(bar(150.0)), BAR_WIDTH);
        assert_eq!(bar(0.0).matches('█').count(), 0);
    }
}
