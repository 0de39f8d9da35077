//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use buildtools::Platform;

/// Buildtools - build helpers for CMake projects and Sphinx documentation
#[derive(Parser)]
#[command(name = "buildtools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build and test a CMake project
    Cpp(CppArgs),

    /// Build documentation pages with Sphinx
    Docs(DocsArgs),

    /// Move build artifacts from one directory tree to another
    Move(MoveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CppArgs {
    /// Install prefix [default: install]
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Directory containing the top-level CMakeLists.txt [default: .]
    #[arg(long, alias = "source_dir")]
    pub source_dir: Option<PathBuf>,

    /// Build directory [default: build]
    #[arg(long, alias = "build_dir")]
    pub build_dir: Option<PathBuf>,

    /// Use clcache when it is installed (Windows only)
    #[arg(long)]
    pub caching: bool,

    /// Target to build (repeatable, built in order)
    #[arg(long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Test executable to run after building (repeatable)
    #[arg(long = "test", value_name = "NAME")]
    pub tests: Vec<String>,

    /// Directory holding test executables, relative to the build directory [default: bin]
    #[arg(long, alias = "test_dir")]
    pub test_dir: Option<PathBuf>,

    /// Assemble flags for this platform instead of the host
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Print the commands that would run without executing them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct DocsArgs {
    /// Sphinx source directory; other relative paths are resolved against it
    #[arg(long, alias = "docs_dir", default_value = ".")]
    pub docs_dir: PathBuf,

    /// Output directory [default: build]
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Doctree cache directory [default: .doctrees]
    #[arg(long, alias = "work_dir")]
    pub work_dir: Option<PathBuf>,

    /// Directory test data is downloaded into [default: data]
    #[arg(long, alias = "data_dir")]
    pub data_dir: Option<PathBuf>,

    /// Sphinx builder [default: html]
    #[arg(long)]
    pub builder: Option<String>,

    /// Skip downloading test data and writing tool configuration
    #[arg(long)]
    pub no_setup: bool,

    /// Test data archive to download and extract
    #[arg(long, value_name = "NAME")]
    pub data_archive: Option<String>,

    /// Base URL the data archive is fetched from
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Text appended to the Mantid user properties file
    #[arg(long, value_name = "TEXT")]
    pub tool_config: Option<String>,

    /// Use the invocation style of this platform instead of the host
    #[arg(long)]
    pub platform: Option<Platform>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Root the source segments are joined onto
    #[arg(long)]
    pub source_root: PathBuf,

    /// Root the destination segments are joined onto
    #[arg(long)]
    pub destination_root: PathBuf,

    /// Source path segments (may contain `*`)
    #[arg(long, num_args = 1.., required = true)]
    pub src: Vec<String>,

    /// Destination path segments (may contain `*`)
    #[arg(long, num_args = 1.., required = true)]
    pub dst: Vec<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
