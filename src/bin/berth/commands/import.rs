//! `berth import` command

use anyhow::{bail, Result};

use crate::cli::ImportArgs;
use berth::importers::{ImportError, ImportRouter};
use berth::ops;
use berth::util::diagnostic::emit;
use berth::util::GlobalContext;

pub fn execute(args: ImportArgs, ctx: &GlobalContext) -> Result<()> {
    let dir = ctx.resolve_dir(args.dir.as_deref());

    let imported = match ops::import_dir(&dir) {
        Ok(Some(imported)) => imported,
        Ok(None) => {
            bail!(
                "no dependency metadata found in {}\n\
                 help: berth reads {}",
                dir.display(),
                ImportRouter::new().formats().join(", ")
            );
        }
        Err(e) => return Err(report(e, ctx.color())),
    };

    if !args.write {
        println!("# {} dependencies from {}", imported.deps.len(), imported.format);
        for dep in &imported.deps {
            if dep.reference.is_empty() {
                println!("{}", dep.name);
            } else {
                println!("{} {}", dep.name, dep.reference);
            }
        }
        return Ok(());
    }

    let workspace = ctx.workspace_roots();
    match ops::merge_into(&dir, imported, &workspace) {
        Ok(manifest) => {
            println!("{} dependencies in berth.yaml", manifest.imports.len());
            Ok(())
        }
        Err(e) => match e.downcast::<ImportError>() {
            Ok(import) => Err(report(import, ctx.color())),
            Err(e) => Err(e),
        },
    }
}

fn report(err: ImportError, color: bool) -> anyhow::Error {
    emit(&err.to_diagnostic(), color);
    anyhow::Error::new(err)
}
