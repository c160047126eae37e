//! End-to-end pipeline scenarios.
//!
//! `FakeDllBundler` behaves like webpack with DllPlugin and
//! DllReferencePlugin, minus the transpiling: it follows imports, inlines
//! every module a linked library does not provide, and writes a library
//! manifest for export passes. That is enough to observe de-duplication.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use addon_build::builder::{
    build_entry_configurations, build_export_configurations, BuildContext, BuildSettings,
    BundleConfiguration, Bundler, Pipeline,
};
use addon_build::core::BuildRequest;

const REACT_MARKER: &str = "REACT_STUB_MARKER";
const CORE_MARKER: &str = "CORE_GARDEN_MARKER";

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:from\s+|require\(\s*|import\s+)["']([^"']+)["']"#).unwrap()
});

/// A DLL-aware stand-in for webpack.
struct FakeDllBundler;

impl FakeDllBundler {
    fn module_id(context: &Path, file: &Path) -> String {
        let relative = pathdiff::diff_paths(file, context).unwrap_or_else(|| file.to_path_buf());
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("./{}", parts.join("/"))
    }

    fn with_extension(path: PathBuf) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path);
        }
        let js = PathBuf::from(format!("{}.js", path.display()));
        if js.is_file() {
            return Some(js);
        }
        let index = path.join("index.js");
        index.is_file().then_some(index)
    }

    fn resolve(config: &BundleConfiguration, from: Option<&Path>, request: &str) -> Option<PathBuf> {
        if request.starts_with('/') {
            return Self::with_extension(PathBuf::from(request));
        }
        if request.starts_with("./") || request.starts_with("../") {
            return Self::with_extension(from?.join(request));
        }
        if let Some((namespace, rest)) = request.split_once('/') {
            if let Some(root) = config.aliases.get(namespace) {
                return Self::with_extension(root.join(rest));
            }
        }
        config
            .module_directories
            .iter()
            .find_map(|dir| Self::with_extension(dir.join(request)))
    }

    fn bundle(config: &BundleConfiguration, sources: &[String]) -> Result<(String, Vec<String>)> {
        let context = config.context.canonicalize()?;
        let mut output = String::new();
        let mut inlined = Vec::new();
        let mut seen = BTreeSet::new();
        let mut queue: Vec<(Option<PathBuf>, String)> =
            sources.iter().map(|s| (None, s.clone())).collect();

        while let Some((from, request)) = queue.pop() {
            let Some(file) = Self::resolve(config, from.as_deref(), &request) else {
                output.push_str(&format!("Module not found: Error: Can't resolve '{}'\n", request));
                continue;
            };
            let file = file.canonicalize()?;
            let id = Self::module_id(&context, &file);
            if !seen.insert(id.clone()) {
                continue;
            }

            if let Some(reference) = config.references.iter().find(|r| r.manifest.provides(&id)) {
                output.push_str(&format!("__dll_reference__({:?}, {:?});\n", reference.manifest.name, id));
                continue;
            }

            let source = fs::read_to_string(&file).with_context(|| file.display().to_string())?;
            output.push_str(&format!("/* {} */\n{}\n", id, source));
            inlined.push(id);

            let dir = file.parent().map(Path::to_path_buf);
            for cap in IMPORT.captures_iter(&source) {
                queue.push((dir.clone(), cap[1].to_string()));
            }
        }

        Ok((output, inlined))
    }
}

impl Bundler for FakeDllBundler {
    fn name(&self) -> &str {
        "fake-dll"
    }

    fn run(&self, configs: &[BundleConfiguration]) -> Result<()> {
        for config in configs {
            for (name, sources) in &config.entry {
                let (output, inlined) = Self::bundle(config, sources)?;
                let filename = config.output.filename.replace("[name]", name);
                fs::create_dir_all(&config.output.path)?;
                fs::write(config.output.path.join(filename), output)?;

                if let Some(library) = &config.library {
                    let content: Map<String, Value> = inlined
                        .iter()
                        .enumerate()
                        .map(|(i, id)| (id.clone(), json!({ "id": i })))
                        .collect();
                    fs::create_dir_all(library.manifest_path.parent().unwrap())?;
                    fs::write(
                        &library.manifest_path,
                        json!({ "name": library.name, "content": content }).to_string(),
                    )?;
                }
            }
        }
        Ok(())
    }
}

struct Installation {
    _tmp: TempDir,
    root: PathBuf,
}

impl Installation {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let installation = Installation { _tmp: tmp, root };
        installation.write(
            "node_modules/react/index.js",
            &format!("export const marker = \"{}\";\n", REACT_MARKER),
        );
        installation
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).unwrap()
    }

    fn add_core(&self) -> PathBuf {
        self.write(
            "applications/core/addon.json",
            r#"{
                "key": "core",
                "build": {
                    "process": "core",
                    "exports": {
                        "app": ["./src/scripts/garden.js", "react"],
                        "admin": ["./src/scripts/garden.js", "react"]
                    },
                    "entries": {
                        "app": "./src/scripts/core.js",
                        "admin": "./src/scripts/core-admin.js"
                    }
                }
            }"#,
        );
        self.write(
            "applications/core/src/scripts/garden.js",
            &format!(
                "import {{ marker }} from \"react\";\nexport const garden = \"{}\";\n",
                CORE_MARKER
            ),
        );
        self.write(
            "applications/core/src/scripts/core.js",
            "import { marker } from \"react\";\nimport { garden } from \"./garden\";\nconsole.log(marker, garden);\n",
        );
        self.write(
            "applications/core/src/scripts/core-admin.js",
            "import { marker } from \"react\";\nimport { garden } from \"./garden.js\";\nconsole.log(\"admin\", marker, garden);\n",
        );
        self.root.join("applications/core")
    }
}

fn build(request: &BuildRequest) -> Result<()> {
    let ctx = BuildContext::new(request, BuildSettings::default())?;
    Pipeline::new(&ctx, &FakeDllBundler).run()?;
    Ok(())
}

#[test]
fn test_core_entries_exclude_library_code() {
    let installation = Installation::new();
    let core = installation.add_core();

    let request = BuildRequest::new("core", &installation.root).with_root_directory(&core);
    build(&request).unwrap();

    for group in ["app", "admin"] {
        let library = installation.read(&format!("applications/core/js/webpack/lib-core-{}.js", group));
        assert!(library.contains(REACT_MARKER), "lib-core-{} lacks react", group);
        assert!(library.contains(CORE_MARKER));

        let entry = installation.read(&format!("applications/core/js/{}/core-{}.min.js", group, group));
        assert!(!entry.contains(REACT_MARKER), "core-{} inlined react", group);
        assert!(!entry.contains(CORE_MARKER), "core-{} inlined garden", group);
        assert!(entry.contains("__dll_reference__"));
        assert!(!entry.contains("Module not found"));
    }

    let manifest: Value =
        serde_json::from_str(&installation.read("applications/core/manifests/app-manifest.json"))
            .unwrap();
    assert_eq!(manifest["name"], "core_app");
    assert!(manifest["content"]
        .as_object()
        .unwrap()
        .contains_key("./node_modules/react/index.js"));
}

#[test]
fn test_entries_built_before_exports_inline_library_code() {
    let installation = Installation::new();
    let core = installation.add_core();

    let request = BuildRequest::new("core", &installation.root).with_root_directory(&core);
    let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();

    // Entry configurations resolved before any manifest exists.
    let stale_entries = build_entry_configurations(&ctx).unwrap();
    let exports = build_export_configurations(&ctx).unwrap();
    FakeDllBundler.run(&exports).unwrap();
    FakeDllBundler.run(&stale_entries).unwrap();

    let entry = installation.read("applications/core/js/app/core-app.min.js");
    assert!(entry.contains(REACT_MARKER));

    // Resolved after the export pass, the same entry links the library.
    let fresh_entries = build_entry_configurations(&ctx).unwrap();
    FakeDllBundler.run(&fresh_entries).unwrap();
    let entry = installation.read("applications/core/js/app/core-app.min.js");
    assert!(!entry.contains(REACT_MARKER));
}

#[test]
fn test_dashboard_imports_core_through_alias() {
    let installation = Installation::new();
    let core = installation.add_core();
    build(&BuildRequest::new("core", &installation.root).with_root_directory(&core)).unwrap();

    installation.write(
        "applications/dashboard/addon.json",
        r#"{"key":"dashboard","build":{"process":"core","entries":{"app":"./src/scripts/index.js"}}}"#,
    );
    installation.write(
        "applications/dashboard/src/scripts/index.js",
        "import { garden } from \"@core/garden\";\nimport { marker } from \"react\";\nconsole.log(garden, marker);\n",
    );
    let dashboard = installation.root.join("applications/dashboard");

    let request = BuildRequest::new("dashboard", &installation.root)
        .with_root_directory(&dashboard)
        .with_required_directory(&core);
    build(&request).unwrap();

    let entry = installation.read("applications/dashboard/js/app/dashboard-app.min.js");
    assert!(!entry.contains(CORE_MARKER));
    assert!(!entry.contains(REACT_MARKER));
    assert!(!entry.to_lowercase().contains("module not found"));
    assert!(entry.contains("\"core_app\""));
    assert!(!entry.contains("core_admin"));
}

#[test]
fn test_dashboard_without_core_built_inlines_core() {
    let installation = Installation::new();
    let core = installation.add_core();

    installation.write(
        "applications/dashboard/addon.json",
        r#"{"key":"dashboard","build":{"process":"core","entries":{"app":"./src/scripts/index.js"}}}"#,
    );
    installation.write(
        "applications/dashboard/src/scripts/index.js",
        "import { garden } from \"@core/garden\";\nconsole.log(garden);\n",
    );
    let dashboard = installation.root.join("applications/dashboard");

    // The caller is responsible for building core first.
    let request = BuildRequest::new("dashboard", &installation.root)
        .with_root_directory(&dashboard)
        .with_required_directory(&core);
    build(&request).unwrap();

    let entry = installation.read("applications/dashboard/js/app/dashboard-app.min.js");
    assert!(entry.contains(CORE_MARKER));
}
