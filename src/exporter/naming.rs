//! File names derived from the input bundle.

use crate::exporter::error::{Context, Result};
use std::path::Path;

/// Base name of `path` with its extension replaced by `extension`
/// (which includes the leading dot).
pub fn file_name_with_extension(path: &Path, extension: &str) -> Result<String> {
    let stem = path
        .file_stem()
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(format!("{}{}", stem.to_string_lossy(), extension))
}

/// `app.aab` -> `app.apks`
pub fn apks_file_name(bundle_path: &Path) -> Result<String> {
    file_name_with_extension(bundle_path, ".apks")
}

/// `app.apks` -> `app.apk`
pub fn apk_file_name(apks_path: &Path) -> Result<String> {
    file_name_with_extension(apks_path, ".apk")
}

/// Name of the exported universal APK for a bundle.
///
/// Leading and trailing hyphens are trimmed from the stem, so `-app-.aab`
/// becomes `app.apk`.
pub fn universal_apk_name(bundle_path: &Path) -> Result<String> {
    Ok(trim_separators(&apk_file_name(bundle_path)?))
}

fn trim_separators(file_name: &str) -> String {
    let (stem, extension) = match file_name.rfind('.') {
        Some(dot) => file_name.split_at(dot),
        None => (file_name, ""),
    };
    format!("{}{}", stem.trim_matches('-'), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apks_name_replaces_bundle_extension() {
        assert_eq!(apks_file_name(Path::new("/path/to/app.aab")).unwrap(), "app.apks");
        assert_eq!(
            apks_file_name(Path::new("/ci/outputs/app-release.aab")).unwrap(),
            "app-release.apks"
        );
    }

    #[test]
    fn apk_name_replaces_archive_extension() {
        assert_eq!(apk_file_name(Path::new("/path/to/app.apks")).unwrap(), "app.apk");
    }

    #[test]
    fn extension_swap_keeps_inner_dots() {
        assert_eq!(
            file_name_with_extension(Path::new("/path/to/afile.oldextension"), ".newextension")
                .unwrap(),
            "afile.newextension"
        );
        assert_eq!(
            file_name_with_extension(Path::new("my.app.v2.aab"), ".apk").unwrap(),
            "my.app.v2.apk"
        );
    }

    #[test]
    fn universal_name_trims_hyphens() {
        assert_eq!(trim_separators("-app-.apk"), "app.apk");
        assert_eq!(universal_apk_name(Path::new("/out/app-.aab")).unwrap(), "app.apk");
        assert_eq!(universal_apk_name(Path::new("/out/-app-.aab")).unwrap(), "app.apk");
        assert_eq!(
            universal_apk_name(Path::new("/out/app-release.aab")).unwrap(),
            "app-release.apk"
        );
    }

    #[test]
    fn path_without_file_name_is_an_error() {
        assert!(apks_file_name(Path::new("/")).is_err());
    }
}
