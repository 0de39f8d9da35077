//! CMake flag assembly.
//!
//! Everything platform-dependent about a CMake invocation is decided here,
//! from an explicit [`Platform`] and [`BuildEnv`], so the result can be
//! computed (and tested) without touching the process environment.

use std::path::{Path, PathBuf};

use crate::core::platform::Platform;
use crate::util::process::find_python;

/// Generator used on Windows.
pub const WINDOWS_GENERATOR: &str = "Visual Studio 16 2019";

/// Target architecture passed with the Windows generator.
pub const WINDOWS_ARCH: &str = "x64";

/// Build variant selected for multi-config generators.
pub const RELEASE_VARIANT: &str = "Release";

/// Directory holding the macOS SDKs inside an Xcode install.
const XCODE_SDK_DIR: &str =
    "/Applications/Xcode.app/Contents/Developer/Platforms/MacOSX.platform/Developer/SDKs";

/// Inputs taken from the environment of the build host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
    /// Python interpreter CMake should build against
    pub python: Option<PathBuf>,
    /// macOS deployment target (`OSX_VERSION`)
    pub osx_version: Option<String>,
    /// Directory containing `clcache.exe`, if installed
    pub clcache_dir: Option<PathBuf>,
    /// Number of parallel build jobs
    pub jobs: usize,
}

impl Default for BuildEnv {
    fn default() -> Self {
        BuildEnv {
            python: None,
            osx_version: None,
            clcache_dir: None,
            jobs: 1,
        }
    }
}

impl BuildEnv {
    /// Capture the build environment of the current process.
    pub fn from_env() -> Self {
        let osx_version = std::env::var("OSX_VERSION")
            .ok()
            .filter(|v| !v.is_empty());

        // clcache is installed into the Scripts dir of the active conda env
        let clcache_dir = std::env::var_os("CONDA_PREFIX")
            .map(|prefix| PathBuf::from(prefix).join("Scripts"))
            .filter(|scripts| scripts.join("clcache.exe").exists());

        let jobs = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        BuildEnv {
            python: find_python(),
            osx_version,
            clcache_dir,
            jobs,
        }
    }
}

/// macOS SDK selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsxTarget {
    pub deployment_target: String,
    pub sysroot: PathBuf,
}

impl OsxTarget {
    /// Target the given macOS version using the SDK bundled with Xcode.
    pub fn for_version(version: &str) -> Self {
        OsxTarget {
            deployment_target: version.to_string(),
            sysroot: Path::new(XCODE_SDK_DIR).join(format!("MacOSX{}.sdk", version)),
        }
    }
}

/// Generator and platform for IDE generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    pub name: String,
    pub arch: String,
}

/// The `-D`/`-G`/`-A` flags passed when configuring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeFlags {
    pub python_executable: Option<PathBuf>,
    pub install_prefix: PathBuf,
    pub with_ctest: bool,
    pub interprocedural_optimization: bool,
    pub osx: Option<OsxTarget>,
    pub generator: Option<Generator>,
    pub clcache_path: Option<PathBuf>,
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

impl CMakeFlags {
    /// Render as command-line arguments.
    ///
    /// `-G` and `-A` take their value as a separate argument; everything
    /// else uses `KEY=VALUE`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(ref python) = self.python_executable {
            args.push(format!("-DPython_EXECUTABLE={}", python.display()));
        }
        args.push(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            self.install_prefix.display()
        ));
        args.push(format!("-DWITH_CTEST={}", on_off(self.with_ctest)));
        args.push(format!(
            "-DCMAKE_INTERPROCEDURAL_OPTIMIZATION={}",
            on_off(self.interprocedural_optimization)
        ));

        if let Some(ref osx) = self.osx {
            args.push(format!(
                "-DCMAKE_OSX_DEPLOYMENT_TARGET={}",
                osx.deployment_target
            ));
            args.push(format!("-DCMAKE_OSX_SYSROOT={}", osx.sysroot.display()));
        }

        if let Some(ref generator) = self.generator {
            args.push("-G".to_string());
            args.push(generator.name.clone());
            args.push("-A".to_string());
            args.push(generator.arch.clone());
        }

        if let Some(ref clcache) = self.clcache_path {
            args.push(format!("-DCLCACHE_PATH={}", clcache.display()));
        }

        args
    }
}

/// Fully assembled configuration for one CMake project build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeConfig {
    pub platform: Platform,
    pub flags: CMakeFlags,
    /// Extra arguments for `cmake --build`
    pub build_flags: Vec<String>,
    /// Multi-config variant (`--config`), if one is selected
    pub build_variant: Option<String>,
    /// Invoke commands through the shell
    pub shell: bool,
}

impl CMakeConfig {
    /// Decide every flag for `platform`.
    pub fn assemble(
        platform: Platform,
        install_prefix: &Path,
        caching: bool,
        env: &BuildEnv,
    ) -> Self {
        let mut flags = CMakeFlags {
            python_executable: env.python.clone(),
            install_prefix: install_prefix.to_path_buf(),
            with_ctest: false,
            interprocedural_optimization: true,
            osx: None,
            generator: None,
            clcache_path: None,
        };
        let mut build_flags = Vec::new();
        let mut build_variant = None;
        let mut shell = false;

        match platform {
            Platform::MacOs => {
                flags.interprocedural_optimization = false;
                flags.osx = env.osx_version.as_deref().map(OsxTarget::for_version);
            }
            Platform::Windows => {
                flags.generator = Some(Generator {
                    name: WINDOWS_GENERATOR.to_string(),
                    arch: WINDOWS_ARCH.to_string(),
                });
                if caching {
                    flags.clcache_path = env.clcache_dir.clone();
                }
                shell = true;
                build_variant = Some(RELEASE_VARIANT.to_string());
            }
            Platform::Linux | Platform::Other => {}
        }

        // MSBuild schedules its own jobs
        if !platform.is_windows() {
            build_flags.push(format!("-j{}", env.jobs.max(1)));
        }

        if let Some(ref variant) = build_variant {
            build_flags.push("--config".to_string());
            build_flags.push(variant.clone());
        }

        CMakeConfig {
            platform,
            flags,
            build_flags,
            build_variant,
            shell,
        }
    }

    /// Arguments for the configure invocation (source dir not included).
    pub fn flags_list(&self) -> Vec<String> {
        self.flags.to_args()
    }

    /// Variant subdirectory name; empty for single-config generators.
    pub fn variant_dir(&self) -> &str {
        self.build_variant.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL_PLATFORMS: [Platform; 4] = [
        Platform::Linux,
        Platform::MacOs,
        Platform::Windows,
        Platform::Other,
    ];

    fn env() -> BuildEnv {
        BuildEnv {
            python: Some(PathBuf::from("/opt/conda/bin/python")),
            osx_version: None,
            clcache_dir: None,
            jobs: 8,
        }
    }

    fn keys(args: &[String]) -> Vec<String> {
        args.iter()
            .filter(|a| a.starts_with('-'))
            .map(|a| a.split('=').next().unwrap_or(a).to_string())
            .collect()
    }

    #[test]
    fn test_install_prefix_present_and_keys_unique() {
        let prefix = Path::new("/work/install");
        for platform in ALL_PLATFORMS {
            let config = CMakeConfig::assemble(platform, prefix, true, &env());
            let args = config.flags_list();

            assert!(
                args.contains(&"-DCMAKE_INSTALL_PREFIX=/work/install".to_string()),
                "{platform}: {args:?}"
            );

            let keys = keys(&args);
            let unique: HashSet<_> = keys.iter().collect();
            assert_eq!(unique.len(), keys.len(), "{platform}: {args:?}");
        }
    }

    #[test]
    fn test_default_flags_order() {
        let config = CMakeConfig::assemble(Platform::Linux, Path::new("/p"), false, &env());
        assert_eq!(
            config.flags_list(),
            [
                "-DPython_EXECUTABLE=/opt/conda/bin/python",
                "-DCMAKE_INSTALL_PREFIX=/p",
                "-DWITH_CTEST=OFF",
                "-DCMAKE_INTERPROCEDURAL_OPTIMIZATION=ON",
            ]
        );
        assert!(!config.shell);
        assert!(config.build_variant.is_none());
    }

    #[test]
    fn test_missing_python_omits_flag() {
        let env = BuildEnv {
            python: None,
            ..env()
        };
        let config = CMakeConfig::assemble(Platform::Linux, Path::new("/p"), false, &env);
        assert!(config
            .flags_list()
            .iter()
            .all(|a| !a.starts_with("-DPython_EXECUTABLE")));
    }

    #[test]
    fn test_macos_with_version() {
        let env = BuildEnv {
            osx_version: Some("11.0".to_string()),
            ..env()
        };
        let args = CMakeConfig::assemble(Platform::MacOs, Path::new("/p"), false, &env).flags_list();

        let targets: Vec<_> = args
            .iter()
            .filter(|a| a.starts_with("-DCMAKE_OSX_DEPLOYMENT_TARGET="))
            .collect();
        assert_eq!(targets, ["-DCMAKE_OSX_DEPLOYMENT_TARGET=11.0"]);

        let sysroots: Vec<_> = args
            .iter()
            .filter(|a| a.starts_with("-DCMAKE_OSX_SYSROOT="))
            .collect();
        assert_eq!(sysroots.len(), 1);
        assert!(sysroots[0].contains("MacOSX11.0.sdk"));

        assert!(args.contains(&"-DCMAKE_INTERPROCEDURAL_OPTIMIZATION=OFF".to_string()));
    }

    #[test]
    fn test_macos_without_version() {
        let args = CMakeConfig::assemble(Platform::MacOs, Path::new("/p"), false, &env()).flags_list();
        assert!(args.iter().all(|a| !a.starts_with("-DCMAKE_OSX_")));
    }

    #[test]
    fn test_osx_version_ignored_elsewhere() {
        let env = BuildEnv {
            osx_version: Some("11.0".to_string()),
            ..env()
        };
        let args = CMakeConfig::assemble(Platform::Linux, Path::new("/p"), false, &env).flags_list();
        assert!(args.iter().all(|a| !a.starts_with("-DCMAKE_OSX_")));
    }

    #[test]
    fn test_parallel_flag_by_platform() {
        for platform in ALL_PLATFORMS {
            let config = CMakeConfig::assemble(platform, Path::new("/p"), false, &env());
            let has_jobs = config.build_flags.iter().any(|f| f.starts_with("-j"));
            if platform.is_windows() {
                assert!(!has_jobs, "{:?}", config.build_flags);
            } else {
                assert_eq!(config.build_flags, ["-j8"]);
            }
        }
    }

    #[test]
    fn test_zero_jobs_clamped() {
        let env = BuildEnv { jobs: 0, ..env() };
        let config = CMakeConfig::assemble(Platform::Linux, Path::new("/p"), false, &env);
        assert_eq!(config.build_flags, ["-j1"]);
    }

    #[test]
    fn test_windows_flags() {
        let env = BuildEnv {
            clcache_dir: Some(PathBuf::from(r"C:\conda\Scripts")),
            ..env()
        };
        let config = CMakeConfig::assemble(Platform::Windows, Path::new("/p"), true, &env);
        let args = config.flags_list();

        let g = args.iter().position(|a| a == "-G").unwrap();
        assert_eq!(args[g + 1], WINDOWS_GENERATOR);
        let a = args.iter().position(|a| a == "-A").unwrap();
        assert_eq!(args[a + 1], WINDOWS_ARCH);
        assert!(args.contains(&r"-DCLCACHE_PATH=C:\conda\Scripts".to_string()));

        assert!(config.shell);
        assert_eq!(config.variant_dir(), "Release");
        assert_eq!(config.build_flags, ["--config", "Release"]);
    }

    #[test]
    fn test_windows_caching_needs_flag_and_tool() {
        let with_tool = BuildEnv {
            clcache_dir: Some(PathBuf::from(r"C:\conda\Scripts")),
            ..env()
        };
        let args = CMakeConfig::assemble(Platform::Windows, Path::new("/p"), false, &with_tool)
            .flags_list();
        assert!(args.iter().all(|a| !a.starts_with("-DCLCACHE_PATH")));

        let args =
            CMakeConfig::assemble(Platform::Windows, Path::new("/p"), true, &env()).flags_list();
        assert!(args.iter().all(|a| !a.starts_with("-DCLCACHE_PATH")));
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let first = CMakeConfig::assemble(Platform::Windows, Path::new("/p"), true, &env());
        let second = CMakeConfig::assemble(Platform::Windows, Path::new("/p"), true, &env());
        assert_eq!(first, second);
    }
}
