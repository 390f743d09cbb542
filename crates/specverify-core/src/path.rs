//! Route path normalization and parameter-tolerant matching

use regex::Regex;
use std::sync::LazyLock;

static BRACE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("valid brace param regex"));

/// `<id>` and `<int:id>` both capture `id`.
static ANGLE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[^:>]*:)?([^>]+)>").expect("valid angle param regex"));

/// Rewrite `{name}`, `<name>` and `<type:name>` parameters into `:name`.
///
/// Colon parameters and literal segments are left as they are.
pub fn normalize_path(path: &str) -> String {
    let path = BRACE_PARAM.replace_all(path, ":$1");
    ANGLE_PARAM.replace_all(&path, ":$1").into_owned()
}

/// Whether a single segment stands for "any value".
pub fn is_path_parameter(segment: &str) -> bool {
    if segment.len() < 2 {
        return false;
    }
    segment.starts_with(':')
        || (segment.starts_with('{') && segment.ends_with('}'))
        || (segment.starts_with('<') && segment.ends_with('>'))
}

/// Compare two route paths segment by segment.
///
/// A parameter segment on either side matches any segment on the other,
/// so `/users/:id`, `/users/{id}` and `/users/42` all match each other.
/// Paths with a different number of segments never match.
pub fn paths_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    if a == b {
        return true;
    }

    let left: Vec<&str> = a.trim_matches('/').split('/').collect();
    let right: Vec<&str> = b.trim_matches('/').split('/').collect();
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(&right)
        .all(|(l, r)| is_path_parameter(l) || is_path_parameter(r) || l == r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_brace_params() {
        assert_eq!(normalize_path("/users/{id}"), "/users/:id");
        assert_eq!(
            normalize_path("/orgs/{org}/repos/{repo}"),
            "/orgs/:org/repos/:repo"
        );
    }

    #[test]
    fn test_normalize_angle_params() {
        assert_eq!(normalize_path("/users/<id>"), "/users/:id");
        assert_eq!(normalize_path("/users/<int:id>"), "/users/:id");
        assert_eq!(normalize_path("/files/<path:rest>/raw"), "/files/:rest/raw");
    }

    #[test]
    fn test_normalize_leaves_literals_alone() {
        assert_eq!(normalize_path("/users/:id"), "/users/:id");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for path in [
            "/users/{id}",
            "/users/:id/posts/{post}",
            "/a/b/c",
            "/users/<int:id>",
            "/",
        ] {
            let once = normalize_path(path);
            assert_eq!(normalize_path(&once), once, "not idempotent for {path}");
        }
    }

    #[test]
    fn test_paths_match_examples() {
        assert!(paths_match("/users/:id", "/users/123"));
        assert!(!paths_match("/users", "/posts"));
        assert!(!paths_match("/users/123/posts", "/users/123"));
        assert!(paths_match("", ""));
        assert!(!paths_match("/users", ""));
        assert!(!paths_match("", "/users"));
    }

    #[test]
    fn test_paths_match_mixed_notations() {
        assert!(paths_match("/users/{id}", "/users/:userId"));
        assert!(paths_match("/users/<id>", "/users/42"));
        assert!(paths_match("/users/42/", "users/:id"));
        assert!(!paths_match("/users/:id", "/posts/:id"));
    }

    #[test]
    fn test_paths_match_reflexive_and_symmetric() {
        let paths = [
            "",
            "/",
            "/users",
            "/users/:id",
            "/users/{id}",
            "/users/123",
            "/users/123/posts",
            "/posts",
            "/<id>",
        ];
        for a in paths {
            assert!(paths_match(a, a), "{a} should match itself");
            for b in paths {
                assert_eq!(paths_match(a, b), paths_match(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_single_character_markers_are_literal() {
        assert!(!is_path_parameter(":"));
        assert!(!is_path_parameter("{"));
        assert!(is_path_parameter(":x"));
        assert!(is_path_parameter("{}"));
        assert!(!paths_match("/a/:", "/a/b"));
    }
}
