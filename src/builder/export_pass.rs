//! Library-export pass.
//!
//! Every export group of the addon becomes one configuration whose sole
//! output is a shared library and the manifest describing it. Export passes
//! never watch: libraries are assumed stable once built.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::builder::config::{
    resolve_source, BundleConfiguration, BundleMode, BundleOutput, LibraryOutput, PassKind,
};
use crate::builder::context::BuildContext;
use crate::core::entry::spread_wildcard;
use crate::core::errors::BuildError;
use crate::core::library_manifest::manifest_path;
use crate::resolver::alias::AliasTable;
use crate::util::naming::library_symbol;

/// Build the export configurations of the addon, one per export group.
///
/// An addon without valid exports yields no configurations.
pub fn build_export_configurations(
    ctx: &BuildContext<'_>,
) -> Result<Vec<BundleConfiguration>, BuildError> {
    let Some(groups) = ctx.addon.export_groups() else {
        tracing::debug!("`{}` declares no exports", ctx.addon_key());
        return Ok(Vec::new());
    };
    let groups: Vec<(String, Vec<String>)> = spread_wildcard(groups).into_iter().collect();

    let libraries = ctx.export_library_directories()?;
    let mut alias_dirs = vec![ctx.primary_directory.clone()];
    alias_dirs.extend(libraries.iter().cloned());
    let aliases = ctx.alias_table(&alias_dirs)?;

    groups
        .into_par_iter()
        .map(|(group, sources)| export_configuration(ctx, &libraries, &aliases, group, sources))
        .collect()
}

fn export_configuration(
    ctx: &BuildContext<'_>,
    libraries: &[PathBuf],
    aliases: &AliasTable,
    group: String,
    sources: Vec<String>,
) -> Result<BundleConfiguration, BuildError> {
    let key = ctx.addon_key();
    let addon_dir = &ctx.primary_directory;
    let references = ctx.linked_manifests(libraries, &group)?;
    let sources = sources
        .iter()
        .map(|source| resolve_source(addon_dir, source))
        .collect();

    Ok(BundleConfiguration {
        name: format!("lib-{}-{}", key, group),
        kind: PassKind::Export,
        addon_key: key.to_string(),
        context: ctx.vanilla_directory.clone(),
        output: BundleOutput {
            path: addon_dir.join("js").join("webpack"),
            filename: format!("lib-{}-[name].js", key),
            chunk_filename: None,
            public_path: None,
        },
        library: Some(LibraryOutput {
            name: library_symbol(key, &group),
            manifest_path: manifest_path(addon_dir, &group),
        }),
        entry: [(group, sources)].into_iter().collect(),
        aliases: aliases.clone(),
        module_directories: module_directories(ctx),
        references,
        mode: BundleMode::Production,
        minify: ctx.process().minify(),
        watch: false,
        hot: None,
    })
}

/// Node module directories, the addon's own first.
pub(crate) fn module_directories(ctx: &BuildContext<'_>) -> Vec<PathBuf> {
    vec![
        ctx.primary_directory.join("node_modules"),
        ctx.vanilla_directory.join("node_modules"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::context::BuildSettings;
    use crate::core::request::BuildRequest;
    use crate::test_support::InstallationFixture;

    fn groups(configs: &[BundleConfiguration]) -> Vec<(String, Vec<String>)> {
        configs
            .iter()
            .flat_map(|c| c.entry.clone().into_iter())
            .collect()
    }

    #[test]
    fn test_invalid_exports_produce_nothing() {
        let fixture = InstallationFixture::new();
        let dir = fixture.add_addon("plugins", "quiet", r#"{"key":"quiet","build":{"exports":{}}}"#);

        let request = BuildRequest::new("quiet", fixture.root()).with_root_directory(&dir);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        assert!(build_export_configurations(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_spread_into_groups() {
        let fixture = InstallationFixture::new();
        let dir = fixture.add_addon(
            "applications",
            "core",
            r#"{"key":"core","build":{"process":"core","exports":{
                "*": ["shared.js"], "app": ["app.js"], "admin": ["admin.js"]
            }}}"#,
        );

        let request = BuildRequest::new("core", fixture.root()).with_root_directory(&dir);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        let configs = build_export_configurations(&ctx).unwrap();

        assert_eq!(
            groups(&configs),
            vec![
                ("admin".to_string(), vec!["shared.js".to_string(), "admin.js".to_string()]),
                ("app".to_string(), vec!["shared.js".to_string(), "app.js".to_string()]),
            ]
        );
        assert!(configs.iter().all(|c| !c.entry.contains_key("*")));
    }

    #[test]
    fn test_library_naming_and_manifest_path() {
        let fixture = InstallationFixture::new();
        let dir = fixture.add_addon(
            "plugins",
            "rich-editor",
            r#"{"key":"rich-editor","build":{"process":"core","exports":{"app":["./src/scripts/index.js"]}}}"#,
        );

        let request = BuildRequest::new("rich-editor", fixture.root()).with_root_directory(&dir);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        let configs = build_export_configurations(&ctx).unwrap();
        let config = &configs[0];

        assert_eq!(config.name, "lib-rich-editor-app");
        assert_eq!(config.kind, PassKind::Export);
        assert_eq!(config.output.filename, "lib-rich-editor-[name].js");
        assert_eq!(config.output.path, dir.join("js/webpack"));
        let library = config.library.as_ref().unwrap();
        assert_eq!(library.name, "richEditor_app");
        assert_eq!(library.manifest_path, dir.join("manifests/app-manifest.json"));
        assert_eq!(
            config.entry["app"],
            vec![dir.join("./src/scripts/index.js").display().to_string()]
        );
        assert!(!config.watch);
    }

    #[test]
    fn test_export_never_watches() {
        let fixture = InstallationFixture::new();
        let dir = fixture.add_addon(
            "plugins",
            "live",
            r#"{"key":"live","build":{"exports":{"app":["react"]}}}"#,
        );

        let request = BuildRequest::new("live", fixture.root())
            .with_root_directory(&dir)
            .with_watch(true)
            .with_hot(true);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        let configs = build_export_configurations(&ctx).unwrap();
        assert!(!configs[0].watch);
        assert!(configs[0].hot.is_none());
        assert_eq!(configs[0].mode, BundleMode::Production);
    }

    #[test]
    fn test_self_reference_excluded_from_links() {
        let fixture = InstallationFixture::new();
        let dir = fixture.add_addon(
            "plugins",
            "loopy",
            r#"{"key":"loopy","build":{"process":"core","exports":{"app":["react"]}}}"#,
        );
        fixture.write_file(
            "plugins/loopy/manifests/app-manifest.json",
            r#"{"name":"loopy_app","content":{}}"#,
        );

        let request = BuildRequest::new("loopy", fixture.root())
            .with_root_directory(&dir)
            .with_required_directory(&dir);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        let configs = build_export_configurations(&ctx).unwrap();

        assert!(configs[0].references.is_empty());
    }

    #[test]
    fn test_links_only_matching_group() {
        let fixture = InstallationFixture::new();
        let core = fixture.add_addon("applications", "core", r#"{"key":"core"}"#);
        fixture.write_file(
            "applications/core/manifests/app-manifest.json",
            r#"{"name":"core_app","content":{}}"#,
        );
        fixture.write_file(
            "applications/core/manifests/admin-manifest.json",
            r#"{"name":"core_admin","content":{}}"#,
        );
        let dir = fixture.add_addon(
            "plugins",
            "ext",
            r#"{"key":"ext","build":{"exports":{"admin":["./a.js"],"app":["./b.js"]}}}"#,
        );

        let request = BuildRequest::new("ext", fixture.root())
            .with_root_directory(&dir)
            .with_required_directory(&core);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        let configs = build_export_configurations(&ctx).unwrap();

        let linked: Vec<(&str, Vec<&str>)> = configs
            .iter()
            .map(|c| {
                (
                    c.name.as_str(),
                    c.references.iter().map(|r| r.manifest.name.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            linked,
            vec![("lib-ext-admin", vec!["core_admin"]), ("lib-ext-app", vec!["core_app"])]
        );
    }

    #[test]
    fn test_corrupt_dependency_manifest_fails_pass() {
        let fixture = InstallationFixture::new();
        let core = fixture.add_addon("applications", "core", r#"{"key":"core"}"#);
        fixture.write_file("applications/core/manifests/app-manifest.json", "not json");
        let dir = fixture.add_addon(
            "plugins",
            "ext",
            r#"{"key":"ext","build":{"exports":{"app":["./b.js"]}}}"#,
        );

        let request = BuildRequest::new("ext", fixture.root())
            .with_root_directory(&dir)
            .with_required_directory(&core);
        let ctx = BuildContext::new(&request, BuildSettings::default()).unwrap();
        assert!(matches!(
            build_export_configurations(&ctx),
            Err(BuildError::LibraryManifestCorrupt { .. })
        ));
    }
}
