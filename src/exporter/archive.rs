//! APK set (`.apks`) extraction.

use crate::exporter::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};

/// File bundletool writes into a universal-mode APK set.
pub const UNIVERSAL_APK: &str = "universal.apk";

/// Extracts `archive` into `dest_dir` and returns the path of the universal
/// APK inside it.
///
/// Fails with [`Error::MissingExpectedOutput`] when the archive had no
/// `universal.apk`.
pub async fn extract_universal_apk(archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
    log::info!("Extracting {}", archive.display());

    let archive_path = archive.to_path_buf();
    let target = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::open(&archive_path)
            .fs_context("opening APK set archive", &archive_path)?;
        let mut zip = zip::ZipArchive::new(file)?;
        zip.extract(&target)?;
        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Archive extraction task panicked: {e}")))??;

    let universal = dest_dir.join(UNIVERSAL_APK);
    let exists = tokio::fs::try_exists(&universal)
        .await
        .fs_context("checking extracted APK", &universal)?;
    if !exists {
        return Err(Error::MissingExpectedOutput { path: universal });
    }

    log::debug!("Universal APK extracted to {}", universal.display());
    Ok(universal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_apks(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn extracts_universal_apk() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("app.apks");
        write_apks(
            &archive,
            &[
                ("toc.pb", b"toc".as_slice()),
                (UNIVERSAL_APK, b"apk-bytes".as_slice()),
            ],
        );

        let apk = extract_universal_apk(&archive, tmp.path()).await.unwrap();

        assert_eq!(apk, tmp.path().join(UNIVERSAL_APK));
        assert_eq!(tokio::fs::read(&apk).await.unwrap(), b"apk-bytes".as_slice());
        assert!(tmp.path().join("toc.pb").exists());
    }

    #[tokio::test]
    async fn missing_universal_apk_is_typed() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("app.apks");
        write_apks(&archive, &[("splits/base-master.apk", b"split".as_slice())]);

        let err = extract_universal_apk(&archive, tmp.path()).await.unwrap_err();

        match err {
            Error::MissingExpectedOutput { path } => {
                assert_eq!(path, tmp.path().join(UNIVERSAL_APK))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn corrupt_archive_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("app.apks");
        tokio::fs::write(&archive, b"not a zip".as_slice()).await.unwrap();

        let err = extract_universal_apk(&archive, tmp.path()).await.unwrap_err();
        assert!(matches!(err, Error::Zip(_)));
    }

    #[tokio::test]
    async fn missing_archive_is_a_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        let err = extract_universal_apk(&tmp.path().join("absent.apks"), tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fs { .. }));
    }
}
