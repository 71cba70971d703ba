//! Command line argument parsing and validation.
//!
//! Every option can also come from the environment variable the CI host sets
//! for the step input of the same name.

use crate::exporter::{
    SigningConfig, ToolSource,
    bundletool::{DEFAULT_VERSION, GITHUB_RELEASE_BASE_URL},
};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

/// Export a universal APK from an Android App Bundle
#[derive(Parser)]
#[command(
    name = "export-universal-apk",
    version,
    about = "Export a universal APK from an Android App Bundle",
    long_about = "Downloads bundletool, builds a universal APK set from the given .aab,
optionally signed with the given keystore, and copies the universal APK into the deploy directory.

Usage:
  export-universal-apk --aab-path app/build/outputs/bundle/release/app-release.aab --deploy-dir ./deploy
  export-universal-apk --aab-path app.aab --keystore-url https://example.com/release.jks \\
      --keystore-password secret --key-alias upload --key-password secret

Exit code 0 = APK guaranteed to exist in the deploy directory."
)]
pub struct Args {
    /// Path of the Android App Bundle to convert
    #[arg(long, env = "aab_path", value_name = "PATH")]
    pub aab_path: PathBuf,

    /// Directory receiving the exported APK
    #[arg(long, env = "BITRISE_DEPLOY_DIR", value_name = "DIR", default_value = ".")]
    pub deploy_dir: PathBuf,

    /// Keystore location: file://<path> or an HTTP(S) URL
    #[arg(long, env = "keystore_url", value_name = "URL")]
    pub keystore_url: Option<String>,

    /// Keystore password, optionally tagged with pass: or file:
    #[arg(long, env = "keystore_password", hide_env_values = true)]
    pub keystore_password: Option<String>,

    /// Alias of the signing key
    #[arg(long, env = "key_alias")]
    pub key_alias: Option<String>,

    /// Signing key password, optionally tagged with pass: or file:
    #[arg(long, env = "key_password", hide_env_values = true)]
    pub key_password: Option<String>,

    /// bundletool release to download
    #[arg(long, env = "bundletool_version", default_value = DEFAULT_VERSION)]
    pub bundletool_version: String,

    /// Base URL bundletool releases are downloaded from
    #[arg(long, env = "bundletool_base_url", default_value = GITHUB_RELEASE_BASE_URL)]
    pub bundletool_base_url: String,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, env = "http_timeout", value_name = "SECONDS")]
    pub http_timeout: Option<u64>,

    /// Timeout for the bundletool run, in seconds
    #[arg(long, env = "tool_timeout", value_name = "SECONDS")]
    pub tool_timeout: Option<u64>,

    /// Step output key receiving the exported APK path
    #[arg(long, default_value = "APK_PATH")]
    pub output_key: String,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.aab_path.as_os_str().is_empty() {
            return Err("AAB path cannot be empty".to_string());
        }
        if !self.aab_path.is_file() {
            return Err(format!(
                "AAB path does not exist or is not a file: {}",
                self.aab_path.display()
            ));
        }
        if self.deploy_dir.is_file() {
            return Err(format!(
                "Deploy directory is a file: {}",
                self.deploy_dir.display()
            ));
        }
        if self.output_key.trim().is_empty() {
            return Err("Output key cannot be empty".to_string());
        }
        Ok(())
    }

    /// Signing input, present only when all four values are given.
    pub fn signing_config(&self) -> Option<SigningConfig> {
        let values = [
            non_empty(&self.keystore_url),
            non_empty(&self.keystore_password),
            non_empty(&self.key_alias),
            non_empty(&self.key_password),
        ];

        match values {
            [Some(url), Some(keystore_password), Some(alias), Some(key_password)] => Some(
                SigningConfig::new(url, keystore_password, alias, key_password),
            ),
            _ => {
                if values.iter().any(Option::is_some) {
                    log::warn!(
                        "Incomplete signing configuration: keystore URL, keystore password, \
                         key alias and key password are all required. Using the debug key."
                    );
                }
                None
            }
        }
    }

    pub fn tool_source(&self) -> ToolSource {
        ToolSource {
            version: self.bundletool_version.clone(),
            base_url: self.bundletool_base_url.clone(),
        }
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout.map(Duration::from_secs)
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout.map(Duration::from_secs)
    }

    /// Logs the effective configuration, passwords masked.
    pub fn log_summary(&self) {
        let mask = |v: &Option<String>| if non_empty(v).is_some() { "<set>" } else { "<empty>" };
        log::info!("Configs:");
        log::info!("- AABPath: {}", self.aab_path.display());
        log::info!("- DeployDir: {}", self.deploy_dir.display());
        log::info!("- KeystoreURL: {}", self.keystore_url.as_deref().unwrap_or(""));
        log::info!("- KeystorePassword: {}", mask(&self.keystore_password));
        log::info!("- KeyAlias: {}", self.key_alias.as_deref().unwrap_or(""));
        log::info!("- KeyPassword: {}", mask(&self.key_password));
        log::info!("- BundletoolVersion: {}", self.bundletool_version);
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
