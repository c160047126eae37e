//! Entry pass.
//!
//! Each entry of the addon becomes the addon's shippable bundle, linked
//! against every library manifest available from its required, own and
//! parent directories.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::builder::config::{resolve_source, BundleConfiguration, BundleMode, BundleOutput, PassKind};
use crate::builder::context::BuildContext;
use crate::builder::export_pass::module_directories;
use crate::core::entry::output_folder;
use crate::core::errors::BuildError;
use crate::resolver::alias::AliasTable;

/// Build the entry configurations of the addon, one per entry.
///
/// Library manifests are read from disk here, so this must only run once
/// the export pass has finished writing them.
pub fn build_entry_configurations(
    ctx: &BuildContext<'_>,
) -> Result<Vec<BundleConfiguration>, BuildError> {
    let Some(entries) = ctx.addon.entry_groups() else {
        tracing::debug!("`{}` declares no entries", ctx.addon_key());
        return Ok(Vec::new());
    };
    let entries: Vec<(String, Vec<String>)> = entries.into_iter().collect();

    // Recomputed rather than reused from the export pass: entries may
    // import from parents the exports never see.
    let links = ctx.entry_link_directories()?;
    let aliases = ctx.alias_table(&links)?;

    entries
        .into_par_iter()
        .map(|(entry, sources)| entry_configuration(ctx, &links, &aliases, entry, sources))
        .collect()
}

fn entry_configuration(
    ctx: &BuildContext<'_>,
    links: &[PathBuf],
    aliases: &AliasTable,
    entry: String,
    sources: Vec<String>,
) -> Result<BundleConfiguration, BuildError> {
    let key = ctx.addon_key();
    let addon_dir = &ctx.primary_directory;
    let folder = output_folder(&entry).to_string();
    let references = ctx.linked_manifests(links, &entry)?;
    let sources = sources
        .iter()
        .map(|source| resolve_source(addon_dir, source))
        .collect();

    let request = ctx.request;
    let mode = if request.watch || request.hot {
        BundleMode::Development
    } else {
        BundleMode::Production
    };

    Ok(BundleConfiguration {
        name: format!("{}-{}", key, entry),
        kind: PassKind::Entry,
        addon_key: key.to_string(),
        context: ctx.vanilla_directory.clone(),
        output: BundleOutput {
            path: addon_dir.join("js").join(&folder),
            filename: ctx.process().entry_filename(key),
            chunk_filename: Some(format!("{}-[name]-[chunkhash]-{}.chunk.js", key, entry)),
            public_path: Some(public_path(ctx, &folder)),
        },
        entry: [(entry, sources)].into_iter().collect(),
        aliases: aliases.clone(),
        module_directories: module_directories(ctx),
        references,
        library: None,
        mode,
        minify: mode == BundleMode::Production && ctx.process().minify(),
        watch: request.watch,
        hot: request.hot.then_some(ctx.settings.hot_port),
    })
}

/// Runtime request path of an entry's output folder.
///
/// Derived from the addon's location below the installation root, so
/// addons nested at any depth resolve correctly from the browser. Hot
/// builds are served by the dev server instead.
fn public_path(ctx: &BuildContext<'_>, folder: &str) -> String {
    let path = format!("{}/js/{}/", ctx.public_base(), folder);
    if ctx.request.hot {
        format!("http://localhost:{}{}", ctx.settings.hot_port, path)
    } else {
        path
    }
}
