use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::download::{DownloadTask, ExternalDownloader, OUTPUT_EXTENSION};
use crate::error::{DownloadError, Error, Result};

const EXECUTABLE_CANDIDATES: &[&str] = &["yt-dlp", "yt_dlp", "youtube-dl"];

/// Where to find yt-dlp and its plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    pub executable: PathBuf,
    pub plugin_dirs: Vec<PathBuf>,
}

impl DownloaderConfig {
    pub const EXECUTABLE_VAR: &'static str = "STREAMDL_YTDLP";
    pub const PLUGIN_DIRS_VAR: &'static str = "STREAMDL_PLUGIN_DIRS";

    /// Resolves the executable (override first, then `PATH`) and the plugin
    /// directories (a path list override, or the bundled default).
    pub fn resolve(executable_override: Option<PathBuf>, plugin_dirs_override: Option<&OsStr>) -> Result<Self> {
        let executable = match executable_override.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => path,
            None => Self::find_executable().ok_or_else(|| Error::Configuration {
                candidates: EXECUTABLE_CANDIDATES.to_vec(),
                override_var: Self::EXECUTABLE_VAR,
            })?,
        };

        let plugin_dirs = plugin_dirs_override
            .map(|paths| {
                std::env::split_paths(paths)
                    .filter(|path| !path.as_os_str().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|paths| !paths.is_empty())
            .unwrap_or_else(|| vec![Self::default_plugin_dir()]);

        log::debug!("Using {} with plugin dirs {:?}", executable.display(), plugin_dirs);

        Ok(DownloaderConfig {
            executable,
            plugin_dirs,
        })
    }

    pub fn default_plugin_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("yt-dlp-plugins")
    }

    fn executable_name(name: &str) -> String {
        if cfg!(windows) {
            format!("{name}.exe")
        } else {
            name.to_owned()
        }
    }

    fn find_executable() -> Option<PathBuf> {
        EXECUTABLE_CANDIDATES
            .iter()
            .find_map(|name| pathsearch::find_executable_in_path(&Self::executable_name(name)))
    }
}

pub struct YtDlp {
    config: DownloaderConfig,
    quiet: bool,
}

impl YtDlp {
    pub fn new(config: DownloaderConfig) -> Self {
        YtDlp { config, quiet: false }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn args(&self, task: &DownloadTask) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        for plugin_dir in &self.config.plugin_dirs {
            args.push("--plugin-dirs".into());
            args.push(plugin_dir.into());
        }

        args.extend(
            [
                "--merge-output-format",
                OUTPUT_EXTENSION,
                "--restrict-filenames",
                "--no-part",
                "--no-continue",
                "--no-overwrites",
                "--no-playlist",
            ]
            .map(OsString::from),
        );

        if self.quiet {
            args.extend(["--quiet", "--no-warnings"].map(OsString::from));
        }

        args.push("--output".into());
        args.push(task.output_path.as_os_str().to_owned());
        args.push("--".into());
        args.push(task.url.clone().into());

        args
    }
}

impl ExternalDownloader for YtDlp {
    async fn download(&self, task: &DownloadTask) -> Result<(), DownloadError> {
        let mut command = tokio::process::Command::new(&self.config.executable);
        command.args(self.args(task)).stdin(Stdio::null()).kill_on_drop(true);

        if self.quiet {
            command.stdout(Stdio::null());
        }

        log::debug!("Running {:?}", command.as_std());

        let status = command.status().await.map_err(|source| DownloadError::Spawn {
            program: self.config.executable.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(DownloadError::ExitStatus { code: status.code() })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::PathBuf;

    use super::{DownloaderConfig, YtDlp};
    use crate::download::{DownloadTask, ExternalDownloader};
    use crate::error::DownloadError;

    fn config(plugin_dirs: Vec<PathBuf>) -> DownloaderConfig {
        DownloaderConfig {
            executable: PathBuf::from("yt-dlp"),
            plugin_dirs,
        }
    }

    #[test]
    fn test_resolve_with_overrides() {
        let paths = std::env::join_paths(["/opt/plugins", "/home/me/plugins"]).unwrap();
        let config = DownloaderConfig::resolve(Some(PathBuf::from("/opt/bin/yt-dlp")), Some(&paths)).unwrap();

        assert_eq!(config.executable, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(
            config.plugin_dirs,
            [PathBuf::from("/opt/plugins"), PathBuf::from("/home/me/plugins")]
        );
    }

    #[test]
    fn test_resolve_default_plugin_dir() {
        let config = DownloaderConfig::resolve(Some(PathBuf::from("yt-dlp")), None).unwrap();
        assert_eq!(config.plugin_dirs, [DownloaderConfig::default_plugin_dir()]);

        let empty = OsString::new();
        let config = DownloaderConfig::resolve(Some(PathBuf::from("yt-dlp")), Some(&empty)).unwrap();
        assert_eq!(config.plugin_dirs, [DownloaderConfig::default_plugin_dir()]);
    }

    #[test]
    fn test_args() {
        let ytdlp = YtDlp::new(config(vec![PathBuf::from("/plugins")]));
        let task = DownloadTask {
            url: "https://uqload.cx/embed-abc.html".to_owned(),
            output_path: PathBuf::from("/out/Show/Season 01/Show - S01E01.mp4"),
            attempt: 1,
        };

        let args = ytdlp.args(&task);
        let args = args.iter().map(|arg| arg.to_str().unwrap()).collect::<Vec<_>>();

        assert_eq!(
            args,
            [
                "--plugin-dirs",
                "/plugins",
                "--merge-output-format",
                "mp4",
                "--restrict-filenames",
                "--no-part",
                "--no-continue",
                "--no-overwrites",
                "--no-playlist",
                "--output",
                "/out/Show/Season 01/Show - S01E01.mp4",
                "--",
                "https://uqload.cx/embed-abc.html",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_executable_is_a_download_error() {
        let ytdlp = YtDlp::new(DownloaderConfig {
            executable: PathBuf::from("/nonexistent/streamdl-test/yt-dlp"),
            plugin_dirs: Vec::new(),
        })
        .quiet(true);
        let task = DownloadTask {
            url: "https://uqload.cx/embed-abc.html".to_owned(),
            output_path: PathBuf::from("out.mp4"),
            attempt: 1,
        };

        let result = ytdlp.download(&task).await;
        assert!(matches!(result, Err(DownloadError::Spawn { .. })));
    }
}
