//! `buildtools docs` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::DocsArgs;
use buildtools::util::config::{
    global_config_path, load_config, project_config_path, DEFAULT_REMOTE_URL,
};
use buildtools::DocsBuilder;

pub fn execute(args: DocsArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd)).docs;

    let prefix = args
        .prefix
        .or(config.prefix)
        .unwrap_or_else(|| PathBuf::from("build"));
    let work_dir = args
        .work_dir
        .or(config.work_dir)
        .unwrap_or_else(|| PathBuf::from(".doctrees"));
    let data_dir = args
        .data_dir
        .or(config.data_dir)
        .unwrap_or_else(|| PathBuf::from("data"));
    let sphinx_builder = args
        .builder
        .or(config.builder)
        .unwrap_or_else(|| "html".to_string());
    let remote_url = args
        .remote_url
        .or(config.remote_url)
        .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string());

    let mut builder = DocsBuilder::new(&args.docs_dir, &prefix, &work_dir, &data_dir)?;
    if let Some(platform) = args.platform {
        builder = builder.with_platform(platform);
    }

    if args.no_setup {
        tracing::debug!("skipping test data and tool configuration setup");
    } else {
        if let Some(ref archive) = args.data_archive {
            builder.download_test_data(archive, &remote_url)?;
        }
        if let Some(ref content) = args.tool_config {
            let path = builder.write_tool_config(content)?;
            eprintln!("     Updated {}", path.display());
        }
    }

    builder.run_doc_build(&sphinx_builder)?;

    eprintln!("    Finished docs -> {}", builder.prefix().display());
    Ok(())
}
