//! Native (CMake) build orchestration.
//!
//! A [`CppBuilder`] drives the usual configure / build / test sequence for
//! a CMake project:
//!
//! ```ignore
//! let mut builder = CppBuilder::new("install", ".", "build", false)?;
//! builder.enter_build_directory()?;
//! builder.configure();
//! builder.run_configure_step()?;
//! builder.run_build_step(&["all-tests", "install"])?;
//! builder.run_tests_step(&["my-test"], Path::new("bin"))?;
//! ```
//!
//! Commands run in the build directory once it has been entered; the
//! process working directory is never changed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::cmake::{BuildEnv, CMakeConfig};
use crate::core::platform::Platform;
use crate::util::fs::{absolute_paths, ensure_dir};
use crate::util::process::ProcessBuilder;

/// Builds a CMake project and runs its C++ tests.
#[derive(Debug, Clone)]
pub struct CppBuilder {
    prefix: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    caching: bool,
    platform: Platform,
    env: BuildEnv,
    cmake: PathBuf,
    config: Option<CMakeConfig>,
    work_dir: Option<PathBuf>,
}

impl CppBuilder {
    /// Create a builder; relative paths are resolved against the current directory.
    pub fn new(
        prefix: impl AsRef<Path>,
        source_dir: impl AsRef<Path>,
        build_dir: impl AsRef<Path>,
        caching: bool,
    ) -> Result<Self> {
        let resolved = absolute_paths(
            &[prefix.as_ref(), source_dir.as_ref(), build_dir.as_ref()],
            None,
        )?;
        let [prefix, source_dir, build_dir]: [PathBuf; 3] = resolved
            .try_into()
            .map_err(|_| anyhow::anyhow!("path resolution returned the wrong number of paths"))?;

        tracing::debug!(
            "prefix={} source_dir={} build_dir={}",
            prefix.display(),
            source_dir.display(),
            build_dir.display()
        );

        Ok(CppBuilder {
            prefix,
            source_dir,
            build_dir,
            caching,
            platform: Platform::current(),
            env: BuildEnv::from_env(),
            cmake: PathBuf::from("cmake"),
            config: None,
            work_dir: None,
        })
    }

    /// Assemble flags for a different platform than the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Use explicit environment inputs instead of the captured ones.
    pub fn with_env(mut self, env: BuildEnv) -> Self {
        self.env = env;
        self
    }

    /// Use a specific `cmake` executable.
    pub fn with_cmake(mut self, cmake: impl Into<PathBuf>) -> Self {
        self.cmake = cmake.into();
        self
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Directory commands run in, if the build directory has been entered.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Create the build directory and run every later command inside it.
    pub fn enter_build_directory(&mut self) -> Result<()> {
        ensure_dir(&self.build_dir)?;
        self.work_dir = Some(self.build_dir.clone());
        Ok(())
    }

    /// Assemble CMake and build flags for the target platform.
    ///
    /// Calling this again recomputes everything from scratch.
    pub fn configure(&mut self) {
        let config = CMakeConfig::assemble(self.platform, &self.prefix, self.caching, &self.env);
        tracing::debug!(
            platform = %self.platform,
            "cmake flags: {:?}; build flags: {:?}",
            config.flags_list(),
            config.build_flags
        );
        self.config = Some(config);
    }

    /// The assembled configuration.
    pub fn config(&self) -> Result<&CMakeConfig> {
        self.config
            .as_ref()
            .context("build is not configured; call `configure` first")
    }

    fn cmake_command(&self, config: &CMakeConfig) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .shell(config.shell)
            .cwd_opt(self.work_dir.as_deref())
    }

    /// The generate and settings-listing commands, in order.
    pub fn configure_commands(&self) -> Result<Vec<ProcessBuilder>> {
        let config = self.config()?;

        let generate = self
            .cmake_command(config)
            .args(config.flags_list())
            .arg(&self.source_dir);

        let list_settings = self
            .cmake_command(config)
            .args(["-B", "."])
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-LA");

        Ok(vec![generate, list_settings])
    }

    /// Generate the build system, then print the resulting cache settings.
    pub fn run_configure_step(&self) -> Result<()> {
        tracing::info!("Configuring {}", self.source_dir.display());
        for cmd in self.configure_commands()? {
            cmd.run()?;
        }
        Ok(())
    }

    /// The build-driver command for one target.
    pub fn build_command(&self, target: &str) -> Result<ProcessBuilder> {
        let config = self.config()?;
        Ok(self
            .cmake_command(config)
            .args(["--build", ".", "--target", target])
            .args(&config.build_flags))
    }

    /// Build each target in order, stopping at the first failure.
    pub fn run_build_step<S: AsRef<str>>(&self, targets: &[S]) -> Result<()> {
        for target in targets {
            let target = target.as_ref();
            tracing::info!("Building target `{}`", target);
            self.build_command(target)?.run()?;
        }
        Ok(())
    }

    /// Location of a test executable: `<test_dir>/<variant>/<test>`.
    ///
    /// A relative `test_dir` is taken relative to the build directory.
    pub fn test_path(&self, test_dir: &Path, test: &str) -> Result<PathBuf> {
        let config = self.config()?;
        let mut path = self.build_dir.join(test_dir);
        let variant = config.variant_dir();
        if !variant.is_empty() {
            path.push(variant);
        }
        path.push(test);
        Ok(path)
    }

    /// Run each test executable in order, stopping at the first failure.
    pub fn run_tests_step<S: AsRef<str>>(&self, tests: &[S], test_dir: &Path) -> Result<()> {
        let config = self.config()?;
        for test in tests {
            let path = self.test_path(test_dir, test.as_ref())?;
            tracing::info!("Running {}", path.display());
            ProcessBuilder::new(&path)
                .shell(config.shell)
                .cwd_opt(self.work_dir.as_deref())
                .run()?;
        }
        Ok(())
    }
}
