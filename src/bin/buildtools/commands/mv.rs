//! `buildtools move` command

use anyhow::Result;

use crate::cli::MoveArgs;
use buildtools::FileMover;

pub fn execute(args: MoveArgs) -> Result<()> {
    let mover = FileMover::new(args.source_root, args.destination_root);
    let moved = mover.move_files(&args.src, &args.dst)?;

    eprintln!("       Moved {} path(s)", moved.len());
    Ok(())
}
