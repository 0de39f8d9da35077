//! `buildtools cpp` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::CppArgs;
use buildtools::util::config::{global_config_path, load_config, project_config_path};
use buildtools::CppBuilder;

pub fn execute(args: CppArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    // Load configuration (global + project)
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd)).cpp;

    // CLI > config > defaults
    let prefix = args
        .prefix
        .or(config.prefix)
        .unwrap_or_else(|| PathBuf::from("install"));
    let source_dir = args
        .source_dir
        .or(config.source_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let build_dir = args
        .build_dir
        .or(config.build_dir)
        .unwrap_or_else(|| PathBuf::from("build"));
    let test_dir = args
        .test_dir
        .or(config.test_dir)
        .unwrap_or_else(|| PathBuf::from("bin"));
    let caching = args.caching || config.caching.unwrap_or(false);
    let targets = if args.targets.is_empty() {
        config.targets
    } else {
        args.targets
    };
    let tests = if args.tests.is_empty() {
        config.tests
    } else {
        args.tests
    };

    let mut builder = CppBuilder::new(&prefix, &source_dir, &build_dir, caching)?;
    if let Some(platform) = args.platform {
        builder = builder.with_platform(platform);
    }

    if args.dry_run {
        builder.configure();
        for cmd in builder.configure_commands()? {
            println!("{}", cmd.display_command());
        }
        for target in &targets {
            println!("{}", builder.build_command(target)?.display_command());
        }
        for test in &tests {
            println!("{}", builder.test_path(&test_dir, test)?.display());
        }
        return Ok(());
    }

    builder.enter_build_directory()?;
    builder.configure();
    builder.run_configure_step()?;
    builder.run_build_step(&targets)?;
    builder.run_tests_step(&tests, &test_dir)?;

    eprintln!(
        "    Finished {} target(s), {} test(s) in {}",
        targets.len(),
        tests.len(),
        builder.build_dir().display()
    );

    Ok(())
}
