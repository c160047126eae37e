//! `addon-build order` command
//!
//! Prints the enabled core-build addons, required addons first.

use anyhow::Result;

use crate::cli::OrderArgs;
use crate::commands::enabled_keys;
use addon_build::ops::addon_order;
use addon_build::util::GlobalContext;

pub fn execute(args: OrderArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let vanilla = gctx.installation_root(args.installation.vanilla_directory.as_deref())?;
    let config = gctx.load_config(&vanilla);
    let enabled = enabled_keys(&config.build.enabled_addons, args.enabled);

    if enabled.is_empty() {
        eprintln!("warning: no enabled addons; pass --enable or set build.enabled_addons");
        return Ok(());
    }

    let result = addon_order(&vanilla, &enabled)?;
    for (i, addon) in result.addons.iter().enumerate() {
        if addon.requires.is_empty() {
            println!("{:>3}. {}", i + 1, addon.key);
        } else {
            println!("{:>3}. {} (requires {})", i + 1, addon.key, addon.requires.join(", "));
        }
    }

    Ok(())
}
