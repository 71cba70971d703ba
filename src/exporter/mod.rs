//! Universal APK export from Android App Bundles.
//!
//! This module provides the core pipeline behind the step, independent of
//! any CLI or host environment.
//!
//! # Example
//!
//! ```no_run
//! use export_universal_apk::exporter::{
//!     BundleTool, ExportJob, Exporter, HttpDownloader, ToolSource, locate_java,
//! };
//!
//! # async fn example() -> export_universal_apk::exporter::Result<()> {
//! let downloader = HttpDownloader::new(reqwest::Client::new());
//! let tool = BundleTool::install(&ToolSource::default(), &downloader)
//!     .await?
//!     .with_java(locate_java()?);
//!
//! let exporter = Exporter::new(tool, downloader);
//! let job = ExportJob::new("app/build/outputs/bundle/release/app.aab", "deploy", None);
//! let apk = exporter.export_universal_apk(&job).await?;
//! println!("{} ({})", apk.output_path.display(), apk.checksum);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`fetch`] - Downloads with ordered fallback across candidate URLs
//! - [`signing`] - Keystore resolution and password normalisation
//! - [`bundletool`] - bundletool installation and invocation
//! - [`archive`] - `.apks` extraction
//! - [`naming`] - Output file names
//! - [`checksum`] - SHA-256 of the exported artifact
//! - [`orchestrator`] - The [`Exporter`] pipeline

pub mod archive;
pub mod bundletool;
pub mod checksum;
pub mod error;
pub mod fetch;
pub mod naming;
pub mod orchestrator;
pub mod signing;
pub mod utils;

pub use bundletool::{ApkBuilder, BundleTool, ToolSource, locate_java};
pub use error::{Context, Error, ErrorExt, Result};
pub use fetch::{FetchSources, FileDownloader, HttpDownloader, first_success};
pub use orchestrator::{ExportJob, ExportedApk, Exporter};
pub use signing::{KeystoreResolver, SigningConfig, normalize_password};
