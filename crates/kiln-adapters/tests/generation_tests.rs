//! End-to-end generation with real adapters: in-memory or on-disk
//! registries, the on-disk bundle cache and the local filesystem.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use kiln_adapters::{
    DirectoryRegistry, InMemoryRegistry, LocalBundleCache, LocalFilesystem, SimpleRenderer,
    archive,
};
use kiln_core::{
    application::ApplicationError,
    domain::DomainError,
    error::KilnError,
    prelude::*,
};
use serde_json::json;
use tempfile::TempDir;

struct Workspace {
    cache: TempDir,
    out: TempDir,
    registry: Arc<InMemoryRegistry>,
}

impl Workspace {
    fn new() -> Self {
        let registry = InMemoryRegistry::new();
        registry
            .publish(
                "common",
                "1.0.0",
                &[
                    ("README.md", "# {{NODE_NAME}} ({{PROJECT_NAME}})\ncommon"),
                    (".gitignore", "*.log\n"),
                    ("LICENSE", "template license"),
                ],
            )
            .unwrap();
        registry
            .publish(
                "go",
                "1.0.0",
                &[
                    ("README.md", "# {{NODE_NAME}}\ngo service"),
                    ("go.mod", "module {{META_GO_MODULE}}\n"),
                    ("cmd/{{NODE_NAME}}/main.go", "package main\n"),
                ],
            )
            .unwrap();
        registry
            .publish(
                "python",
                "1.0.0",
                &[("{{META_PACKAGE_NAME}}/__init__.py", "__version__ = '{{CORE_VERSION}}'\n")],
            )
            .unwrap();

        Self {
            cache: TempDir::new().unwrap(),
            out: TempDir::new().unwrap(),
            registry: Arc::new(registry),
        }
    }

    fn resolver(&self) -> Arc<ArtifactResolver> {
        Arc::new(ArtifactResolver::new(
            self.registry.clone(),
            Arc::new(LocalBundleCache::new(self.cache.path())),
        ))
    }

    fn service(&self) -> GenerationService {
        GenerationService::new(
            self.resolver(),
            PluginRegistry::with_builtin(),
            Box::new(SimpleRenderer::new()),
            Box::new(LocalFilesystem::new()),
        )
    }

    fn generate(&self, value: serde_json::Value) -> KilnResult<PathBuf> {
        let spec: ProjectSpec = serde_json::from_value(value).unwrap();
        let mut project = ProjectConverter::convert(ExternalProject::Spec(spec))?;
        MetadataNormalizer::from_current_dir()?.normalize_project(&mut project)?;
        self.service().generate(project, self.out.path())
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

fn shop(nodes: serde_json::Value) -> serde_json::Value {
    json!({
        "name": "shop",
        "repositoryName": "shop",
        "userName": "alice",
        "coreVersion": "1.0.0",
        "nodes": nodes
    })
}

#[test]
fn generates_layered_output_per_node() {
    let ws = Workspace::new();

    let dir = ws
        .generate(shop(json!([
            {"id": "n1", "name": "orders", "language": "go"},
            {"id": "n2", "name": "ml-worker", "language": "python"}
        ])))
        .unwrap();

    assert_eq!(dir, ws.out.path().join("shop"));

    let orders = dir.join("orders");
    assert_eq!(read(orders.join("README.md")), "# orders\ngo service");
    assert_eq!(read(orders.join(".gitignore")), "*.log\n");
    assert_eq!(read(orders.join("go.mod")), "module orders\n");
    assert!(orders.join("cmd/orders/main.go").is_file());
    assert_eq!(read(orders.join("LICENSE")), "template license");

    let worker = dir.join("ml-worker");
    assert_eq!(
        read(worker.join("ml_worker/__init__.py")),
        "__version__ = '1.0.0'\n"
    );
    assert_eq!(read(worker.join("README.md")), "# ml-worker (shop)\ncommon");
}

#[test]
fn bundles_are_fetched_once_across_runs() {
    let ws = Workspace::new();
    let nodes = json!([
        {"id": "a", "name": "orders", "language": "go"},
        {"id": "b", "name": "payments", "language": "go"}
    ]);

    ws.generate(shop(nodes.clone())).unwrap();
    fs::remove_dir_all(ws.out.path().join("shop")).unwrap();
    ws.generate(shop(nodes)).unwrap();

    assert_eq!(ws.registry.fetch_count("common", "1.0.0"), 1);
    assert_eq!(ws.registry.fetch_count("go", "1.0.0"), 1);
    assert!(ws.out.path().join("shop/payments/go.mod").is_file());
}

#[test]
fn other_version_is_never_served_from_cache() {
    let ws = Workspace::new();
    ws.generate(shop(json!([{"id": "a", "name": "orders", "language": "go"}])))
        .unwrap();

    let mut spec = shop(json!([{"id": "a", "name": "orders", "language": "go"}]));
    spec["coreVersion"] = json!("1.3.0");
    let err = ws.generate(spec).unwrap_err();

    assert!(matches!(
        err,
        KilnError::Application(ApplicationError::ArtifactNotFound { ref version, .. }) if version == "1.3.0"
    ));
    assert_eq!(ws.registry.fetch_count("common", "1.3.0"), 1);
}

#[test]
fn unsupported_node_fails_after_earlier_nodes_are_written() {
    let ws = Workspace::new();

    let err = ws
        .generate(shop(json!([
            {"id": "a", "name": "orders", "language": "go"},
            {"id": "b", "name": "legacy", "language": "cobol"}
        ])))
        .unwrap_err();

    assert!(matches!(
        err,
        KilnError::Domain(DomainError::UnsupportedLanguage { ref node, .. }) if node == "legacy"
    ));
    assert!(ws.out.path().join("shop/orders/go.mod").is_file());
    assert!(!ws.out.path().join("shop/legacy").exists());
    assert_eq!(ws.registry.fetch_count("cobol", "1.0.0"), 0);
}

#[test]
fn license_file_is_copied_into_every_node() {
    let ws = Workspace::new();
    let legal = TempDir::new().unwrap();
    fs::write(legal.path().join("LICENSE"), "MIT License\n").unwrap();

    let mut spec = shop(json!([
        {"id": "a", "name": "orders", "language": "go"},
        {"id": "b", "name": "ml", "language": "python"}
    ]));
    spec["metadata"] = json!({"license": {"path": legal.path().join("LICENSE")}});
    let dir = ws.generate(spec).unwrap();

    assert_eq!(read(dir.join("orders/LICENSE")), "MIT License\n");
    assert_eq!(read(dir.join("ml/LICENSE")), "MIT License\n");
}

#[test]
fn concurrent_ensure_fetches_once() {
    let ws = Workspace::new();
    let resolver = ws.resolver();

    let dirs: Vec<PathBuf> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                s.spawn(move || resolver.ensure("go", "1.0.0").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(dirs.windows(2).all(|w| w[0] == w[1]));
    assert!(dirs[0].join("templates/go.mod").is_file());
    assert_eq!(ws.registry.fetch_count("go", "1.0.0"), 1);
}

#[test]
fn directory_registry_with_bad_sidecar_is_a_fetch_error() {
    let mirror = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let bundle = archive::pack_files(&[("templates/README.md", "hi")]).unwrap();
    let key = BundleKey::common("1.0.0").unwrap();

    let registry = DirectoryRegistry::new(mirror.path());
    let path = registry.archive_path(&key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, &bundle).unwrap();
    fs::write(
        format!("{}.sha256", path.display()),
        archive::sha256_digest(b"tampered"),
    )
    .unwrap();

    let resolver = ArtifactResolver::new(
        Arc::new(registry),
        Arc::new(LocalBundleCache::new(cache.path())),
    );
    let err = resolver.ensure("common", "1.0.0").unwrap_err();

    assert!(matches!(
        err,
        KilnError::Application(ApplicationError::ArtifactFetch { .. })
    ));
    assert!(!cache.path().join("common/1.0.0").exists());
}

#[test]
fn directory_registry_serves_packed_directory() {
    let mirror = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let src = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("templates")).unwrap();
    fs::write(src.path().join("templates/Makefile"), "all:\n").unwrap();

    let bundle = archive::pack_dir(src.path()).unwrap();
    let key = BundleKey::new("java", "2.0.0").unwrap();
    let registry = DirectoryRegistry::new(mirror.path());
    let path = registry.archive_path(&key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, &bundle).unwrap();
    fs::write(format!("{}.sha256", path.display()), archive::sha256_digest(&bundle)).unwrap();

    let resolver = ArtifactResolver::new(
        Arc::new(registry),
        Arc::new(LocalBundleCache::new(cache.path())),
    );
    let dir = resolver.ensure_key(&key).unwrap();

    assert_eq!(read(dir.join("templates/Makefile")), "all:\n");
}
