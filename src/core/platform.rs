//! Host platform identification.
//!
//! Every platform-dependent decision in the builders keys off a [`Platform`]
//! value that is detected once and then passed around explicitly.

use std::fmt;
use std::str::FromStr;

/// Operating system family the build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Any other Unix-like host (BSDs, illumos, ...). Treated like Linux.
    Other,
}

impl Platform {
    /// Detect the platform this process is running on.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other => "other",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    pub fn is_macos(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" | "osx" => Ok(Platform::MacOs),
            "windows" | "win32" => Ok(Platform::Windows),
            "other" => Ok(Platform::Other),
            _ => Err(format!(
                "invalid platform '{}'; expected 'linux', 'macos', 'windows', or 'other'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_aliases() {
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("win32".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("Linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert!("beos".parse::<Platform>().is_err());
    }

    #[test]
    fn test_current_matches_cfg() {
        let platform = Platform::current();
        if cfg!(target_os = "windows") {
            assert!(platform.is_windows());
        } else if cfg!(target_os = "macos") {
            assert!(platform.is_macos());
        } else if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Linux);
        }
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for platform in [
            Platform::Linux,
            Platform::MacOs,
            Platform::Windows,
            Platform::Other,
        ] {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }
}
