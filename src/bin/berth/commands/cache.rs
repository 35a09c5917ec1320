//! `berth cache` command
//!
//! Inspect and clear the shared repository cache.

use anyhow::Result;

use crate::cli::{CacheArgs, CacheCommands};
use berth::cache;
use berth::util::fs::remove_dir_all_if_exists;
use berth::util::GlobalContext;

pub fn execute(args: CacheArgs, ctx: &GlobalContext) -> Result<()> {
    match args.command {
        CacheCommands::Path => {
            println!("{}", ctx.cache_home().cache_dir().display());
            Ok(())
        }
        CacheCommands::Key { repo } => {
            println!("{}", cache::key(&repo));
            Ok(())
        }
        CacheCommands::Clean => clean(ctx),
    }
}

fn clean(ctx: &GlobalContext) -> Result<()> {
    let cache_dir = ctx.cache_home().cache_dir();
    if !cache_dir.exists() {
        println!("Cache is already empty");
        return Ok(());
    }

    let lock = ctx.cache_lock();
    lock.acquire()?;
    let removed = remove_dir_all_if_exists(&cache_dir);
    lock.release();
    removed?;

    println!("Removed {}", cache_dir.display());
    Ok(())
}
