//! Prompt construction

use indoc::formatdoc;
use specverify_core::RouteCategory;
use std::fmt::Write;

/// Verification focus used when a spec type configures none
pub const DEFAULT_FOCUS: &[&str] = &[
    "Screen structure: the elements described in the spec exist in the code",
    "State management: the state and hooks described in the spec are used",
    "Processing flow: the flows described in the spec are implemented",
    "Validation: the validation rules described in the spec are enforced",
    "Error handling: the error cases described in the spec are handled",
];

/// What to tell the model about a framework source type
pub fn framework_hint(source_type: &str) -> &'static str {
    match source_type {
        "express" => "Express.js (app.get, app.post, router.get, router.post, ...)",
        "fastify" => "Fastify (fastify.get, fastify.post, fastify.route, ...)",
        "go-echo" => "Go Echo (e.GET, e.POST, g.GET, ...)",
        "go-gin" => "Go Gin (r.GET, r.POST, group.GET, ...)",
        "rails" => "Ruby on Rails (routes.rb: get, post, resources, ...)",
        "django" => "Django / Django REST Framework (path, re_path, urlpatterns, ...)",
        "graphql" => "GraphQL (Query and Mutation type definitions)",
        _ => "Detect automatically",
    }
}

fn code_section(code: &[(String, String)]) -> String {
    let mut section = String::new();
    for (path, content) in code {
        let _ = write!(section, "\n### {}\n```\n{}\n```\n", path, content);
    }
    section
}

/// Prompt asking the model to score how well `code` implements `spec_text`
pub fn verification_prompt(
    spec_text: &str,
    code: &[(String, String)],
    focus_hints: &[String],
) -> String {
    let focus: Vec<&str> = if focus_hints.is_empty() {
        DEFAULT_FOCUS.to_vec()
    } else {
        focus_hints.iter().map(String::as_str).collect()
    };
    let focus = focus
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n");

    formatdoc! {r#"
        You are an expert code reviewer. Compare the following SPEC (specification) with the actual code and evaluate how closely they match.

        ## SPEC
        {spec_text}

        ## Code
        {code}

        ## Evaluation criteria
        Focus on the following points:
        {focus}

        ## Output format
        Respond with JSON in this shape:
        ```json
        {{
          "matchPercentage": <number from 0 to 100>,
          "matchedItems": ["matched item", ...],
          "unmatchedItems": ["unmatched item", ...],
          "notes": "additional comments (missing features, suggested improvements)"
        }}
        ```

        Output only the JSON."#,
        code = code_section(code),
    }
}

/// Prompt asking the model to list routes defined in `code_text`
pub fn route_extraction_prompt(
    source_type: &str,
    category: RouteCategory,
    code_text: &str,
) -> String {
    let hint = framework_hint(source_type);
    match category {
        RouteCategory::Api => formatdoc! {r#"
            You are an expert at extracting API endpoints from code.
            Extract the API endpoints defined in the code below.

            ## Framework / type
            {hint}

            ## Code
            {code_text}

            ## Rules
            1. Only extract endpoints that are explicitly defined
            2. Do not guess
            3. For GraphQL, extract queries and mutations with method "QUERY" or "MUTATION"

            ## Output format
            Respond with a JSON array:
            ```json
            [
              {{
                "method": "GET",
                "path": "/api/users",
                "file": "file name (if known)",
                "description": "short description (if any)"
              }}
            ]
            ```

            Output only the JSON. If no endpoints are found, return an empty array []."#
        },
        RouteCategory::Ui => formatdoc! {r#"
            You are an expert at extracting page routes from front-end code.
            Extract the UI page routes defined in the code below.

            ## Framework / type
            {hint}

            ## Code
            {code_text}

            ## Rules
            1. Only extract routes that render a page or screen
            2. File-based routers map file paths to routes (for example `app/routes/users.$id.tsx` is `/users/:id`)
            3. Write dynamic segments as `:name`
            4. Do not guess; use method "PAGE" for every route

            ## Output format
            Respond with a JSON array:
            ```json
            [
              {{
                "method": "PAGE",
                "path": "/users/:id",
                "file": "file name (if known)",
                "description": "short description (if any)"
              }}
            ]
            ```

            Output only the JSON. If no routes are found, return an empty array []."#
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_prompt_uses_default_focus() {
        let prompt = verification_prompt("# Spec", &[], &[]);
        assert!(prompt.contains("1. Screen structure"));
        assert!(prompt.contains("5. Error handling"));
        assert!(prompt.contains("\"matchPercentage\""));
    }

    #[test]
    fn test_verification_prompt_custom_focus_and_code() {
        let code = vec![("src/a.ts".to_string(), "export const a = 1;".to_string())];
        let prompt = verification_prompt("# Spec", &code, &["Auth checks".to_string()]);
        assert!(prompt.contains("1. Auth checks"));
        assert!(!prompt.contains("Screen structure"));
        assert!(prompt.contains("### src/a.ts\n```\nexport const a = 1;\n```"));
    }

    #[test]
    fn test_route_prompt_by_category() {
        let api = route_extraction_prompt("go-gin", RouteCategory::Api, "r.GET(\"/x\")");
        assert!(api.contains("Go Gin"));
        assert!(api.contains("API endpoints"));

        let ui = route_extraction_prompt("auto", RouteCategory::Ui, "<Route path=\"/\" />");
        assert!(ui.contains("Detect automatically"));
        assert!(ui.contains("\"PAGE\""));
    }
}
