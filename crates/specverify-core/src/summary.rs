//! Per-spec verification results and their aggregate summary

use crate::spec::SpecType;
use serde::{Deserialize, Serialize};

/// Match percentage at or above which a result counts as a high match
pub const HIGH_MATCH: u8 = 80;

/// Match percentage below which a result counts as a low match
pub const LOW_MATCH: u8 = 50;

/// The judge's verdict on how well code implements a spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// 0 to 100
    pub match_percentage: u8,
    #[serde(default)]
    pub matched_items: Vec<String>,
    #[serde(default)]
    pub unmatched_items: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl Verification {
    /// Verdict for a spec with no code to compare against
    pub fn no_code_found() -> Self {
        Verification {
            match_percentage: 0,
            matched_items: Vec::new(),
            unmatched_items: vec!["No corresponding code found".to_string()],
            notes: "The spec may not be implemented yet".to_string(),
        }
    }
}

/// Outcome of verifying one spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    /// File name of the spec
    pub spec_file: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
    pub spec_type: SpecType,
    pub code_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResult {
    /// An empty result for a spec file, to be filled in as verification proceeds
    pub fn new(spec_file: impl Into<String>) -> Self {
        VerifyResult {
            spec_file: spec_file.into(),
            title: String::new(),
            route_path: None,
            spec_type: SpecType::Unknown,
            code_files: Vec::new(),
            verification: None,
            error: None,
        }
    }

    /// Match percentage, when the spec was verified without error
    pub fn match_percentage(&self) -> Option<u8> {
        match (&self.error, &self.verification) {
            (None, Some(verification)) => Some(verification.match_percentage),
            _ => None,
        }
    }
}

/// A spec whose match fell below the individual threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailingSpec {
    pub spec_file: String,
    pub title: String,
    pub match_percentage: u8,
}

/// Aggregate of a verification run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_specs: usize,
    /// Specs verified without error
    pub verified_specs: usize,
    /// Mean match over verified specs (0 when none verified)
    pub average_match: f64,
    pub high_match_count: usize,
    pub low_match_count: usize,
    /// Results sorted by spec file name
    pub results: Vec<VerifyResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failing_specs: Vec<FailingSpec>,
}

impl Summary {
    /// Aggregate results collected in any order.
    pub fn from_results(mut results: Vec<VerifyResult>) -> Self {
        results.sort_by(|a, b| a.spec_file.cmp(&b.spec_file));

        let matches: Vec<u8> = results
            .iter()
            .filter_map(VerifyResult::match_percentage)
            .collect();

        let average_match = if matches.is_empty() {
            0.0
        } else {
            matches.iter().map(|&m| f64::from(m)).sum::<f64>() / matches.len() as f64
        };

        Summary {
            total_specs: results.len(),
            verified_specs: matches.len(),
            average_match,
            high_match_count: matches.iter().filter(|&&m| m >= HIGH_MATCH).count(),
            low_match_count: matches.iter().filter(|&&m| m < LOW_MATCH).count(),
            results,
            failing_specs: Vec::new(),
        }
    }

    /// Whether the average match meets the threshold
    pub fn is_passing(&self, threshold: u8) -> bool {
        self.average_match >= f64::from(threshold)
    }

    /// Verified specs whose match is below `threshold`. Errored specs are not listed.
    pub fn failing_specs(&self, threshold: u8) -> Vec<FailingSpec> {
        self.results
            .iter()
            .filter_map(|result| {
                let match_percentage = result.match_percentage()?;
                (match_percentage < threshold).then(|| FailingSpec {
                    spec_file: result.spec_file.clone(),
                    title: result.title.clone(),
                    match_percentage,
                })
            })
            .collect()
    }

    /// Record failing specs for a non-zero individual threshold
    pub fn apply_fail_under(&mut self, threshold: u8) {
        self.failing_specs = if threshold == 0 {
            Vec::new()
        } else {
            self.failing_specs(threshold)
        };
    }

    pub fn errored(&self) -> impl Iterator<Item = &VerifyResult> {
        self.results.iter().filter(|result| result.error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified(file: &str, match_percentage: u8) -> VerifyResult {
        VerifyResult {
            verification: Some(Verification {
                match_percentage,
                ..Default::default()
            }),
            ..VerifyResult::new(file)
        }
    }

    fn errored(file: &str) -> VerifyResult {
        VerifyResult {
            error: Some("judge unavailable".into()),
            ..VerifyResult::new(file)
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_results(Vec::new());
        assert_eq!(summary.total_specs, 0);
        assert_eq!(summary.average_match, 0.0);
        assert!(summary.is_passing(0));
        assert!(!summary.is_passing(1));
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_results(vec![
            verified("a.md", 90),
            verified("b.md", 40),
            verified("c.md", 85),
            verified("d.md", 10),
            verified("e.md", 60),
        ]);
        assert_eq!(summary.verified_specs, 5);
        assert_eq!(summary.average_match, 57.0);
        assert_eq!(summary.high_match_count, 2);
        assert_eq!(summary.low_match_count, 2);
        assert!(summary.is_passing(50));
        assert!(!summary.is_passing(60));
    }

    #[test]
    fn test_errors_are_excluded_from_average() {
        let summary = Summary::from_results(vec![
            verified("a.md", 80),
            errored("b.md"),
            VerifyResult::new("c.md"),
        ]);
        assert_eq!(summary.total_specs, 3);
        assert_eq!(summary.verified_specs, 1);
        assert_eq!(summary.average_match, 80.0);
        assert_eq!(summary.errored().count(), 1);
    }

    #[test]
    fn test_results_sorted_by_spec_file() {
        let summary =
            Summary::from_results(vec![verified("c.md", 1), verified("a.md", 2), errored("b.md")]);
        let files: Vec<_> = summary.results.iter().map(|r| r.spec_file.as_str()).collect();
        assert_eq!(files, vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_fail_under() {
        let mut summary = Summary::from_results(vec![
            verified("a.md", 90),
            verified("b.md", 30),
            errored("c.md"),
        ]);

        summary.apply_fail_under(0);
        assert!(summary.failing_specs.is_empty());

        summary.apply_fail_under(50);
        assert_eq!(summary.failing_specs.len(), 1);
        assert_eq!(summary.failing_specs[0].spec_file, "b.md");
        assert_eq!(summary.failing_specs[0].match_percentage, 30);
    }

    #[test]
    fn test_verification_deserializes_judge_json() {
        let verification: Verification = serde_json::from_str(
            r#"{"matchPercentage": 72, "matchedItems": ["form"], "notes": "ok"}"#,
        )
        .unwrap();
        assert_eq!(verification.match_percentage, 72);
        assert_eq!(verification.matched_items, vec!["form"]);
        assert!(verification.unmatched_items.is_empty());
    }
}
