//! `addon-build build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{absolute, addon_target, enabled_keys};
use addon_build::builder::{BuildSettings, WebpackBundler};
use addon_build::core::BuildRequest;
use addon_build::ops;
use addon_build::util::GlobalContext;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let mut gctx = GlobalContext::new()?;
    gctx.set_verbose(verbose);

    let vanilla = gctx.installation_root(args.installation.vanilla_directory.as_deref())?;
    let config = gctx.load_config(&vanilla);
    let (addon_key, root_directories) =
        addon_target(&gctx, args.addon_key, &args.root_directories)?;

    let request = BuildRequest {
        addon_key,
        vanilla_directory: vanilla.clone(),
        root_directories,
        required_directories: args
            .required_directories
            .iter()
            .map(|dir| absolute(&gctx, dir))
            .collect(),
        enabled_addon_keys: enabled_keys(&config.build.enabled_addons, args.enabled),
        watch: args.watch,
        verbose,
        hot: args.hot,
    };

    let mut settings = BuildSettings::from_config(&config).with_process(args.process);
    if let Some(manifest_match) = args.manifest_match {
        settings = settings.with_manifest_match(manifest_match);
    }

    if args.plan {
        let plan = ops::plan(&request, settings)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let bundler = WebpackBundler::locate(&vanilla, &config)?.verbose(gctx.is_verbose());
    ops::build(&request, settings, &bundler)?;

    Ok(())
}
