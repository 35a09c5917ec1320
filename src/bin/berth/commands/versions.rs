//! `berth versions` command

use anyhow::{Context, Result};

use crate::cli::VersionsArgs;
use berth::cache::VersionCache;
use berth::core::Manifest;
use berth::ops;
use berth::sources::{GitClient, RepoCache};
use berth::util::GlobalContext;

pub fn execute(args: VersionsArgs, ctx: &GlobalContext) -> Result<()> {
    let dir = ctx.resolve_dir(args.dir.as_deref());

    let manifest_path = Manifest::path_in(&dir);
    if !manifest_path.is_file() {
        anyhow::bail!(
            "could not find berth.yaml in {}\n\
             help: Run `berth import --write` to create one from existing metadata",
            dir.display()
        );
    }
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("failed to read file: {}", manifest_path.display()))?;

    let deps: Vec<_> = manifest
        .imports
        .iter()
        .chain(manifest.dev_imports.iter())
        .cloned()
        .collect();
    if deps.is_empty() {
        println!("No dependencies declared in berth.yaml");
        return Ok(());
    }

    let home = ctx.cache_home();
    let client = GitClient::new();
    let lock = ctx.cache_lock();
    let repos = RepoCache::new(&home, &client, lock.clone());
    let versions = VersionCache::new();

    let reports = ops::gather_all(&deps, &repos, &versions);
    lock.release();

    for report in reports? {
        if let Some(error) = &report.error {
            println!("{}\terror: {}", report.name, error);
            continue;
        }
        let current = if report.current.is_empty() {
            "-"
        } else {
            report.current.as_str()
        };
        let latest = if report.latest.is_empty() {
            "-"
        } else {
            report.latest.as_str()
        };
        let marker = if report.is_outdated() { "\t(outdated)" } else { "" };
        println!("{}\t{}\t{}{}", report.name, current, latest, marker);
    }
    Ok(())
}
