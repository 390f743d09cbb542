//! Structural route scanning for OpenAPI / Swagger documents
//!
//! This is a lightweight textual scan rather than a full OpenAPI parser:
//! path keys are found by their indentation (YAML) or quoting (JSON), and a
//! method counts for a path when its key appears inside that path's block.

use crate::route::{Route, RouteCategory};
use regex::Regex;
use std::sync::LazyLock;

static YAML_PATH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {2}(/[^:\s]+):").expect("valid yaml path regex"));

static JSON_PATH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(/[^"]+)":\s*\{"#).expect("valid json path regex"));

const METHODS: &[&str] = &["get", "post", "put", "delete", "patch"];

/// A path key and the text of its block
struct PathBlock<'a> {
    path: &'a str,
    body: &'a str,
}

/// Scan one OpenAPI document for routes.
///
/// When no method can be confirmed for any path, every path is reported as a
/// single `GET` route rather than dropped.
pub fn scan_openapi(content: &str, file: &str, category: RouteCategory) -> Vec<Route> {
    let blocks = yaml_blocks(content);
    let (blocks, json) = if blocks.is_empty() {
        (json_blocks(content), true)
    } else {
        (blocks, false)
    };

    let route = |method: &str, path: &str| Route {
        method: method.to_uppercase(),
        path: path.to_string(),
        category,
        source: "openapi".to_string(),
        file: Some(file.to_string()),
        description: None,
    };

    let mut routes = Vec::new();
    for block in &blocks {
        for method in METHODS {
            let found = if json {
                json_has_method(block.body, method)
            } else {
                yaml_has_method(block.body, method)
            };
            if found {
                routes.push(route(method, block.path));
            }
        }
    }

    if routes.is_empty() {
        routes = blocks.iter().map(|block| route("get", block.path)).collect();
    }

    routes
}

fn yaml_blocks(content: &str) -> Vec<PathBlock<'_>> {
    let keys: Vec<_> = YAML_PATH_KEY.captures_iter(content).collect();
    keys.iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?.as_str();
            let end = keys
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(content.len());
            Some(PathBlock {
                path,
                body: yaml_block_body(&content[whole.end()..end]),
            })
        })
        .collect()
}

/// Cut a YAML block at the first non-empty line indented two spaces or less.
fn yaml_block_body(rest: &str) -> &str {
    let mut offset = 0;
    for (i, line) in rest.split_inclusive('\n').enumerate() {
        let indent = line.len() - line.trim_start_matches(' ').len();
        let blank = line.trim().is_empty();
        // The first piece is the remainder of the key line itself.
        if i > 0 && !blank && indent <= 2 {
            return &rest[..offset];
        }
        offset += line.len();
    }
    rest
}

fn yaml_has_method(body: &str, method: &str) -> bool {
    body.lines().skip(1).any(|line| {
        line.trim_start()
            .strip_prefix(method)
            .is_some_and(|after| after.starts_with(':'))
    })
}

fn json_blocks(content: &str) -> Vec<PathBlock<'_>> {
    let keys: Vec<_> = JSON_PATH_KEY.captures_iter(content).collect();
    keys.iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?.as_str();
            let end = keys
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(content.len());
            Some(PathBlock {
                path,
                body: &content[whole.end()..end],
            })
        })
        .collect()
}

fn json_has_method(body: &str, method: &str) -> bool {
    let quoted = format!("\"{}\"", method);
    body.match_indices(&quoted)
        .any(|(at, m)| body[at + m.len()..].trim_start().starts_with(':'))
}
