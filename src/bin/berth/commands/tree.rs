//! `berth tree` command

use anyhow::Result;

use crate::cli::TreeArgs;
use berth::ops;
use berth::resolver::PackageLocator;
use berth::util::GlobalContext;

pub fn execute(args: TreeArgs, ctx: &GlobalContext) -> Result<()> {
    let dir = ctx.resolve_dir(args.dir.as_deref());
    let locator = PackageLocator::new(ctx.locator_config());

    let include_stdlib = args.core || ctx.config().include_stdlib();
    print!("{}", ops::tree(&dir, &locator, include_stdlib)?);
    Ok(())
}
