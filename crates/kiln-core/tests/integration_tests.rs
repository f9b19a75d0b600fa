//! Integration tests for kiln-core's public API.

use std::path::Path;

use kiln_core::{
    domain::{DomainError, LICENSE_KEY},
    error::{ErrorCategory, KilnError},
    prelude::*,
};
use serde_json::json;

fn shop_spec() -> ProjectSpec {
    serde_json::from_value(json!({
        "name": "shop",
        "repositoryName": "shop",
        "userName": "alice",
        "coreVersion": "1.0.0",
        "metadata": {"license": {"path": "legal/LICENSE", "spdx": "MIT"}},
        "nodes": [
            {"id": "n1", "name": "orders", "language": "go"},
            {"id": "n2", "name": "billing", "language": "java"},
            {"id": "n3", "name": "ml-worker", "language": "python"}
        ]
    }))
    .unwrap()
}

#[test]
fn convert_then_normalize_then_fill_defaults() {
    let mut project = ProjectConverter::convert(ExternalProject::Spec(shop_spec())).unwrap();
    MetadataNormalizer::new("/repo")
        .unwrap()
        .normalize_project(&mut project)
        .unwrap();

    assert_eq!(
        project.metadata.get(LICENSE_KEY),
        Some(&json!({"path": "/repo/legal/LICENSE", "spdx": "MIT"}))
    );
    assert_eq!(project.languages(), vec!["go", "java", "python"]);

    let plugins = PluginRegistry::with_builtin();
    for node in &mut project.nodes {
        let plugin = plugins.factory_for(node).unwrap()(Path::new("/cache/bundle"));
        plugin.fill_defaults(node).unwrap();
        assert_eq!(plugin.template_root(), Path::new("/cache/bundle/templates"));
    }

    assert_eq!(project.nodes[0].metadata.get_str("goModule"), Some("orders"));
    assert_eq!(project.nodes[1].metadata.get_str("groupId"), Some("com.example"));
    assert_eq!(project.nodes[1].metadata.get_str("artifactId"), Some("billing"));
    assert_eq!(project.nodes[2].metadata.get_str("packageName"), Some("ml_worker"));
}

#[test]
fn render_context_sees_filled_metadata() {
    let mut project = ProjectConverter::convert(ExternalProject::Spec(shop_spec())).unwrap();
    let plugins = PluginRegistry::with_builtin();
    let node = &mut project.nodes[2];
    let plugin = plugins.factory_for(node).unwrap()(Path::new("/b"));
    plugin.fill_defaults(node).unwrap();

    let node = project.nodes[2].clone();
    let ctx = RenderContext::for_node(&project, &node);

    assert_eq!(
        ctx.render("{{NODE_NAME_PASCAL}} in {{META_PACKAGE_NAME}} for {{PROJECT_NAME}}"),
        "MlWorker in ml_worker for shop"
    );
}

#[test]
fn unsupported_language_is_reported_with_node_name() {
    let mut spec = shop_spec();
    spec.nodes[0].language = "cobol".into();
    let project = ProjectConverter::convert(ExternalProject::Spec(spec)).unwrap();

    let err = PluginRegistry::with_builtin()
        .factory_for(&project.nodes[0])
        .err()
        .unwrap();

    let err = KilnError::from(err);
    assert!(matches!(
        err,
        KilnError::Domain(DomainError::UnsupportedLanguage { ref node, ref language })
            if node == "orders" && language == "cobol"
    ));
    assert_eq!(err.category(), ErrorCategory::Compatibility);
    assert!(!err.suggestions().is_empty());
}

#[test]
fn malformed_license_stops_normalization() {
    let mut spec = shop_spec();
    spec.metadata.insert("license", json!("MIT"));
    let mut project = ProjectConverter::convert(ExternalProject::Spec(spec)).unwrap();

    let err = MetadataNormalizer::new("/repo")
        .unwrap()
        .normalize_project(&mut project)
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
}
