use specverify_core::{
    CoverageReport, DiskFiles, MemoryFiles, Route, RouteCategory, Spec, find_spec_files,
    load_specs,
};
use std::path::Path;

fn route(method: &str, path: &str) -> Route {
    Route {
        method: method.to_string(),
        path: path.to_string(),
        category: RouteCategory::Api,
        source: "express".to_string(),
        file: Some("server/app.ts".to_string()),
        description: None,
    }
}

fn spec_doc(title: &str, route_path: &str) -> String {
    format!(
        "# {title}\n\n| Key | Value |\n|-----|-------|\n| Endpoint | `{route_path}` |\n\n## Behaviour\n...\n"
    )
}

fn load_all(files: &MemoryFiles) -> Vec<Spec> {
    let paths = find_spec_files(files, Path::new("specs"), None).unwrap();
    load_specs(files, &paths)
        .into_iter()
        .map(|(path, spec)| spec.unwrap_or_else(|e| panic!("{}: {e}", path.display())))
        .collect()
}

#[test]
fn ten_routes_six_specs() {
    let files = MemoryFiles::new()
        .add("specs/api/list-users.md", spec_doc("List users", "/users"))
        .add("specs/api/get-user.md", spec_doc("Get user", "/users/{id}"))
        .add("specs/api/create-order.md", spec_doc("Create order", "/orders"))
        .add("specs/api/get-order.md", spec_doc("Get order", "/orders/<int:orderId>"))
        .add("specs/api/health.md", spec_doc("Health", "/health"))
        .add("specs/api/legacy.md", spec_doc("Legacy export", "/export/csv"));
    let specs = load_all(&files);
    assert_eq!(specs.len(), 6);

    let routes = vec![
        route("GET", "/users"),
        route("GET", "/users/:id"),
        route("DELETE", "/users/42"),
        route("POST", "/orders"),
        route("GET", "/orders/{orderId}"),
        route("GET", "/health"),
        route("GET", "/products"),
        route("GET", "/products/:id"),
        route("GET", "/users/:id/posts"),
        route("GET", "/metrics"),
    ];

    let report = CoverageReport::compute(&routes, &specs);

    assert_eq!(report.total_endpoints, 10);
    assert_eq!(report.covered_endpoints, 6);
    assert_eq!(report.uncovered_endpoints, 4);
    assert_eq!(report.coverage_percentage, 60.0);
    assert_eq!(
        report.total_endpoints,
        report.covered_endpoints + report.uncovered_endpoints
    );

    assert_eq!(report.total_specs, 6);
    assert_eq!(report.orphaned_specs, 1);
    assert_eq!(report.orphaned[0].file, "legacy.md");
    assert_eq!(report.orphaned[0].route_path.as_deref(), Some("/export/csv"));

    let covered_by: Vec<_> = report
        .covered
        .iter()
        .map(|item| (item.method.as_str(), item.spec_file.as_deref().unwrap()))
        .collect();
    assert_eq!(
        covered_by,
        vec![
            ("GET", "list-users.md"),
            ("GET", "get-user.md"),
            ("DELETE", "get-user.md"),
            ("POST", "create-order.md"),
            ("GET", "get-order.md"),
            ("GET", "health.md"),
        ]
    );
    assert!(report.uncovered.iter().all(|item| item.spec_file.is_none()));
}

#[test]
fn specs_found_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let specs_dir = dir.path().join("specs");
    std::fs::create_dir_all(specs_dir.join("api")).unwrap();
    std::fs::create_dir_all(specs_dir.join("ui")).unwrap();
    std::fs::write(specs_dir.join("api/users.md"), spec_doc("Users", "/users")).unwrap();
    std::fs::write(specs_dir.join("ui/home.md"), "# Home\n| Path | / |\n").unwrap();
    std::fs::write(specs_dir.join("ui/notes.txt"), "not a spec").unwrap();

    let paths = find_spec_files(&DiskFiles, &specs_dir, None).unwrap();
    assert_eq!(paths.len(), 2);
    let specs: Vec<Spec> = load_specs(&DiskFiles, &paths)
        .into_iter()
        .map(|(_, spec)| spec.unwrap())
        .collect();

    let routes = vec![route("GET", "/users"), route("GET", "/")];
    let report = CoverageReport::compute(&routes, &specs);
    assert_eq!(report.covered_endpoints, 2);
    assert!(report.orphaned.is_empty());

    let api_only = find_spec_files(&DiskFiles, &specs_dir, Some("api")).unwrap();
    assert_eq!(api_only, vec![specs_dir.join("api/users.md")]);

    let missing = find_spec_files(&DiskFiles, &dir.path().join("nope"), None).unwrap();
    assert!(missing.is_empty());
}
