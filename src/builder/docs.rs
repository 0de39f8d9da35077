//! Sphinx documentation builds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::platform::Platform;
use crate::util::download::{download_file, extract_tarball};
use crate::util::fs::{absolute_paths, append_string, ensure_dir};
use crate::util::process::ProcessBuilder;

/// Name of the per-user Mantid properties file.
pub const PROPERTIES_FILE: &str = "Mantid.user.properties";

/// Per-user Mantid configuration directory (`~/.mantid`).
pub fn default_tool_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mantid"))
}

/// Join an archive name onto a base URL.
pub fn archive_url(remote_url: &str, archive_name: &str) -> String {
    format!("{}/{}", remote_url.trim_end_matches('/'), archive_name)
}

/// Builds documentation pages with `sphinx-build`.
#[derive(Debug, Clone)]
pub struct DocsBuilder {
    docs_dir: PathBuf,
    prefix: PathBuf,
    work_dir: PathBuf,
    data_dir: PathBuf,
    shell: bool,
    sphinx: PathBuf,
    tool_config_dir: Option<PathBuf>,
}

impl DocsBuilder {
    /// Create a builder.
    ///
    /// `docs_dir` is resolved against the current directory; the other
    /// relative paths are resolved against `docs_dir`.
    pub fn new(
        docs_dir: impl AsRef<Path>,
        prefix: impl AsRef<Path>,
        work_dir: impl AsRef<Path>,
        data_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let docs_dir = absolute_paths(&[docs_dir.as_ref()], None)?
            .pop()
            .context("failed to resolve docs directory")?;
        let resolved = absolute_paths(
            &[work_dir.as_ref(), prefix.as_ref(), data_dir.as_ref()],
            Some(docs_dir.as_path()),
        )?;
        let [work_dir, prefix, data_dir]: [PathBuf; 3] = resolved
            .try_into()
            .map_err(|_| anyhow::anyhow!("path resolution returned the wrong number of paths"))?;

        Ok(DocsBuilder {
            docs_dir,
            prefix,
            work_dir,
            data_dir,
            shell: Platform::current().is_windows(),
            sphinx: PathBuf::from("sphinx-build"),
            tool_config_dir: default_tool_config_dir(),
        })
    }

    /// Pick shell mode for `platform` instead of the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.shell = platform.is_windows();
        self
    }

    /// Use a specific `sphinx-build` executable.
    pub fn with_sphinx(mut self, sphinx: impl Into<PathBuf>) -> Self {
        self.sphinx = sphinx.into();
        self
    }

    /// Write tool configuration somewhere other than `~/.mantid`.
    pub fn with_tool_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_config_dir = Some(dir.into());
        self
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Download `<remote_url>/<archive_name>` into the data directory and unpack it there.
    pub fn download_test_data(&self, archive_name: &str, remote_url: &str) -> Result<PathBuf> {
        ensure_dir(&self.data_dir)?;

        let target = self.data_dir.join(archive_name);
        let url = archive_url(remote_url, archive_name);
        download_file(&url, &target)?;

        tracing::info!("Extracting {}", target.display());
        extract_tarball(&target, &self.data_dir)
            .with_context(|| format!("failed to extract test data from {}", url))?;

        Ok(target)
    }

    /// Append `content` to the Mantid user properties file.
    ///
    /// Repeated calls accumulate; the file is never truncated.
    pub fn write_tool_config(&self, content: &str) -> Result<PathBuf> {
        let dir = self
            .tool_config_dir
            .as_deref()
            .context("could not determine the home directory for tool configuration")?;
        ensure_dir(dir)?;

        let properties = dir.join(PROPERTIES_FILE);
        append_string(&properties, content)?;
        tracing::debug!("appended {} bytes to {}", content.len(), properties.display());

        Ok(properties)
    }

    /// The `sphinx-build` invocation for `builder`.
    pub fn doc_build_command(&self, builder: &str) -> ProcessBuilder {
        ProcessBuilder::new(&self.sphinx)
            .args(["-b", builder, "-d"])
            .arg(&self.work_dir)
            .arg(&self.docs_dir)
            .arg(&self.prefix)
            .shell(self.shell)
    }

    /// Generate the documentation with the given Sphinx builder.
    pub fn run_doc_build(&self, builder: &str) -> Result<()> {
        tracing::info!("Building `{}` docs into {}", builder, self.prefix.display());
        self.doc_build_command(builder).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gzip_tarball;
    use tempfile::TempDir;

    fn builder(tmp: &TempDir) -> DocsBuilder {
        DocsBuilder::new(tmp.path().join("docs"), "build", ".doctrees", "data")
            .unwrap()
            .with_tool_config_dir(tmp.path().join("home").join(".mantid"))
    }

    #[test]
    fn test_paths_relative_to_docs_dir() {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        let b = builder(&tmp);

        assert_eq!(b.docs_dir(), docs);
        assert_eq!(b.prefix(), docs.join("build"));
        assert_eq!(b.work_dir(), docs.join(".doctrees"));
        assert_eq!(b.data_dir(), docs.join("data"));
    }

    #[test]
    fn test_absolute_prefix_kept() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("site");
        let b = DocsBuilder::new(tmp.path(), &out, ".doctrees", "data").unwrap();
        assert_eq!(b.prefix(), out);
    }

    #[test]
    fn test_archive_url() {
        assert_eq!(
            archive_url("https://example.org/groups/scipp", "data.tar.gz"),
            "https://example.org/groups/scipp/data.tar.gz"
        );
        assert_eq!(
            archive_url("https://example.org/", "data.tar.gz"),
            "https://example.org/data.tar.gz"
        );
    }

    #[test]
    fn test_doc_build_command() {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        let cmd = builder(&tmp).with_platform(Platform::Linux).doc_build_command("html");

        let expected = vec![
            "-b".to_string(),
            "html".to_string(),
            "-d".to_string(),
            docs.join(".doctrees").display().to_string(),
            docs.display().to_string(),
            docs.join("build").display().to_string(),
        ];
        assert!(cmd.display_command().starts_with("sphinx-build -b html"));
        assert_eq!(cmd.get_args(), expected.as_slice());
        assert!(!cmd.is_shell());

        let cmd = builder(&tmp).with_platform(Platform::Windows).doc_build_command("html");
        assert!(cmd.is_shell());
    }

    #[test]
    fn test_write_tool_config_appends() {
        let tmp = TempDir::new().unwrap();
        let b = builder(&tmp);

        let path = b.write_tool_config("datasearch.directories=/data\n").unwrap();
        b.write_tool_config("logging.loggers.root.level=error\n").unwrap();

        assert_eq!(
            path,
            tmp.path().join("home").join(".mantid").join(PROPERTIES_FILE)
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "datasearch.directories=/data\nlogging.loggers.root.level=error\n"
        );
    }

    #[test]
    fn test_download_test_data() {
        let tarball = gzip_tarball(&[("sample.nxs", b"neutrons".as_slice())]);
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/docs-data.tar.gz")
            .with_status(200)
            .with_body(tarball)
            .create();
        let tmp = TempDir::new().unwrap();
        let b = builder(&tmp);

        let archive = b
            .download_test_data("docs-data.tar.gz", &server.url())
            .unwrap();

        mock.assert();
        assert_eq!(archive, b.data_dir().join("docs-data.tar.gz"));
        assert!(archive.exists());
        assert_eq!(
            std::fs::read_to_string(b.data_dir().join("sample.nxs")).unwrap(),
            "neutrons"
        );
    }

    #[test]
    fn test_download_test_data_malformed_archive() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/docs-data.tar.gz")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create();
        let tmp = TempDir::new().unwrap();
        let b = builder(&tmp);

        assert!(b
            .download_test_data("docs-data.tar.gz", &server.url())
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_doc_build_propagates_failure() {
        let tmp = TempDir::new().unwrap();
        let fake = tmp.path().join("fake-sphinx");
        crate::test_support::write_script(&fake, "exit 4");

        let err = builder(&tmp)
            .with_sphinx(&fake)
            .run_doc_build("html")
            .unwrap_err();
        assert!(err
            .downcast_ref::<crate::util::process::ProcessError>()
            .is_some());
    }
}
