//! Universal APK export orchestration.
//!
//! This module provides the [`Exporter`] that sequences the pipeline for one
//! [`ExportJob`]:
//!
//! 1. Allocate a fresh working directory
//! 2. Resolve the signing configuration (downloading remote keystores)
//! 3. Run bundletool to produce `<bundle>.apks` in the working directory
//! 4. Extract `universal.apk` from the archive
//! 5. Rename it to `<bundle>.apk` (hyphens trimmed) in the working directory
//! 6. Copy the renamed APK into the destination directory
//!
//! Every step fails fast; nothing is retried and no later step runs after an
//! error.

use crate::exporter::{
    archive::extract_universal_apk,
    bundletool::ApkBuilder,
    checksum::calculate_sha256,
    error::{ErrorExt, Result},
    fetch::FileDownloader,
    naming::{apks_file_name, universal_apk_name},
    signing::{KeystoreResolver, SigningConfig},
    utils::fs::{copy_file, create_temp_dir},
};
use std::path::{Path, PathBuf};

/// Inputs of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    bundle_path: PathBuf,
    destination_dir: PathBuf,
    signing: Option<SigningConfig>,
}

impl ExportJob {
    pub fn new(
        bundle_path: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
        signing: Option<SigningConfig>,
    ) -> Self {
        Self {
            bundle_path: bundle_path.into(),
            destination_dir: destination_dir.into(),
            signing,
        }
    }

    pub fn bundle_path(&self) -> &Path {
        &self.bundle_path
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    pub fn signing(&self) -> Option<&SigningConfig> {
        self.signing.as_ref()
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedApk {
    /// Renamed APK inside the job's working directory
    pub working_path: PathBuf,
    /// Durable copy in the destination directory
    pub output_path: PathBuf,
    /// Hex-encoded SHA-256 of the exported APK
    pub checksum: String,
}

/// Turns app bundles into universal APKs.
///
/// The packaging tool and the downloader are injected, so the pipeline can run
/// against fakes in tests.
#[derive(Debug)]
pub struct Exporter<B, D> {
    builder: B,
    keystore: KeystoreResolver<D>,
}

impl<B: ApkBuilder, D: FileDownloader> Exporter<B, D> {
    pub fn new(builder: B, downloader: D) -> Self {
        Self {
            builder,
            keystore: KeystoreResolver::new(downloader),
        }
    }

    /// Runs the whole pipeline for `job`.
    pub async fn export_universal_apk(&self, job: &ExportJob) -> Result<ExportedApk> {
        log::info!("Exporting universal APK from {}", job.bundle_path().display());

        let work_dir = create_temp_dir("universal-apk").await?;
        let signing = self.keystore.resolve(job.signing()).await?;

        let apks_path = self
            .export_apks(job.bundle_path(), &work_dir, signing.as_ref())
            .await?;
        let universal = extract_universal_apk(&apks_path, &work_dir).await?;

        let apk_name = universal_apk_name(job.bundle_path())?;
        let working_path = work_dir.join(&apk_name);
        tokio::fs::rename(&universal, &working_path)
            .await
            .fs_context("renaming universal APK", &working_path)?;

        let output_path = job.destination_dir().join(&apk_name);
        copy_file(&working_path, &output_path).await?;
        let checksum = calculate_sha256(&output_path).await?;

        log::info!("✓ Exported universal APK: {}", output_path.display());
        Ok(ExportedApk {
            working_path,
            output_path,
            checksum,
        })
    }

    /// Builds `<work_dir>/<bundle stem>.apks` and returns its path.
    async fn export_apks(
        &self,
        bundle_path: &Path,
        work_dir: &Path,
        signing: Option<&SigningConfig>,
    ) -> Result<PathBuf> {
        let apks_path = work_dir.join(apks_file_name(bundle_path)?);
        self.builder
            .build_universal_apks(bundle_path, &apks_path, signing)
            .await?;
        Ok(apks_path)
    }
}
