//! `addon-build clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::addon_target;
use addon_build::core::BuildRequest;
use addon_build::ops::clean;
use addon_build::util::GlobalContext;

pub fn execute(args: CleanArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let vanilla = gctx.installation_root(args.installation.vanilla_directory.as_deref())?;
    let roots: Vec<_> = args.root_directory.into_iter().collect();
    let (addon_key, root_directories) = addon_target(&gctx, args.addon_key, &roots)?;

    let mut request = BuildRequest::new(addon_key, vanilla);
    request.root_directories = root_directories;

    let result = clean(&request)?;
    for dir in &result.removed {
        eprintln!("     Removed {}", dir.display());
    }

    Ok(())
}
