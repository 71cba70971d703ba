//! bundletool wrapper.
//!
//! Downloads the bundletool jar and drives its `build-apks` subcommand.
//!
//! # Module Organization
//!
//! - `command` - process execution, output capture and failure reporting
//! - `java` - Java runtime discovery

mod command;
mod java;

pub use command::{printable, run_command};
pub use java::locate_java;

use crate::exporter::{
    error::Result,
    fetch::{FetchSources, FileDownloader},
    signing::SigningConfig,
    utils::fs::create_temp_dir,
};
use std::{
    ffi::{OsStr, OsString},
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::process::Command;
use url::Url;

/// GitHub releases of google/bundletool.
pub const GITHUB_RELEASE_BASE_URL: &str = "https://github.com/google/bundletool/releases/download";

/// bundletool release used when none is configured.
pub const DEFAULT_VERSION: &str = "1.15.4";

const JAR_NAME: &str = "bundletool-all.jar";

/// Where to download bundletool from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSource {
    pub version: String,
    pub base_url: String,
}

impl Default for ToolSource {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            base_url: GITHUB_RELEASE_BASE_URL.to_string(),
        }
    }
}

/// Candidate jar URLs: the versioned file name first, then the generic one.
pub fn sources(version: &str, base_url: &str) -> Result<FetchSources> {
    let base = base_url.trim_end_matches('/');
    let versioned = Url::parse(&format!("{base}/{version}/bundletool-all-{version}.jar"))?;
    let generic = Url::parse(&format!("{base}/{version}/{JAR_NAME}"))?;
    Ok(FetchSources::new(versioned).with_fallback(generic))
}

/// Produces a universal `.apks` archive from an app bundle.
pub trait ApkBuilder {
    /// Builds `apks_path` from `bundle_path`, signing when `signing` is set.
    fn build_universal_apks(
        &self,
        bundle_path: &Path,
        apks_path: &Path,
        signing: Option<&SigningConfig>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Arguments for `build-apks` in universal mode.
///
/// The four signing flags are appended, in fixed order, only when a signing
/// configuration is present.
pub fn build_apks_args(
    bundle_path: &Path,
    apks_path: &Path,
    signing: Option<&SigningConfig>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--mode=universal".into(),
        "--bundle".into(),
        bundle_path.as_os_str().to_os_string(),
        "--output".into(),
        apks_path.as_os_str().to_os_string(),
    ];

    if let Some(cfg) = signing {
        args.extend([
            "--ks".into(),
            cfg.keystore_location.clone().into(),
            "--ks-pass".into(),
            cfg.keystore_password.clone().into(),
            "--ks-key-alias".into(),
            cfg.key_alias.clone().into(),
            "--key-pass".into(),
            cfg.key_password.clone().into(),
        ]);
    }

    args
}

/// A downloaded bundletool jar run through `java -jar`.
#[derive(Debug, Clone)]
pub struct BundleTool {
    java: PathBuf,
    jar_path: PathBuf,
    timeout: Option<Duration>,
}

impl BundleTool {
    pub fn new(java: impl Into<PathBuf>, jar_path: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            jar_path: jar_path.into(),
            timeout: None,
        }
    }

    /// Runs the jar with a specific `java` executable instead of the one on `PATH`.
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    /// Kills bundletool runs that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Downloads the jar for `source` into a fresh temp dir.
    pub async fn install<D: FileDownloader>(source: &ToolSource, downloader: &D) -> Result<Self> {
        let dir = create_temp_dir("bundletool").await?;
        let jar_path = dir.join(JAR_NAME);

        log::info!("Downloading bundletool {}", source.version);
        downloader
            .get_with_fallback(&jar_path, &sources(&source.version, &source.base_url)?)
            .await?;
        log::info!("bundletool path created at: {}", jar_path.display());

        Ok(Self::new("java", jar_path))
    }

    pub fn jar_path(&self) -> &Path {
        &self.jar_path
    }

    /// `java -jar <jar> <subcommand> <args...>`
    pub fn build_command<I, S>(&self, subcommand: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar").arg(&self.jar_path).arg(subcommand).args(args);
        cmd
    }
}

impl ApkBuilder for BundleTool {
    async fn build_universal_apks(
        &self,
        bundle_path: &Path,
        apks_path: &Path,
        signing: Option<&SigningConfig>,
    ) -> Result<()> {
        log::info!("Building universal APKs from {}", bundle_path.display());
        let cmd = self.build_command(
            "build-apks",
            build_apks_args(bundle_path, apks_path, signing),
        );
        run_command(cmd, self.timeout).await
    }
}
