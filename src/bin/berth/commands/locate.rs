//! `berth locate` command

use anyhow::Result;

use crate::cli::LocateArgs;
use berth::resolver::PackageLocator;
use berth::util::diagnostic::{emit, PackageNotFoundError};
use berth::util::GlobalContext;

pub fn execute(args: LocateArgs, ctx: &GlobalContext) -> Result<()> {
    let from = ctx.resolve_dir(args.from.as_deref());
    let locator = PackageLocator::new(ctx.locator_config());

    let info = locator.resolve(&args.name, &from);
    if !info.is_resolved() {
        let err = PackageNotFoundError::new(&args.name);
        emit(&err.to_diagnostic(), ctx.color());
        return Err(err.into());
    }

    if info.path.as_os_str().is_empty() {
        println!("{}\t{}", info.name, info.loc);
    } else {
        println!("{}\t{}\t{}", info.name, info.loc, info.path.display());
    }
    Ok(())
}
