//! Signing configuration and keystore resolution.
//!
//! A keystore is referenced either as `file://<path>` or as a remote URL.
//! Resolution turns that reference into an absolute local path (downloading
//! remote keystores into a fresh temp dir) and tags both passwords with the
//! `pass:`/`file:` prefix bundletool expects.

use crate::exporter::{
    error::{Context, Error, ErrorExt, Result},
    fetch::{FetchSources, FileDownloader},
    utils::fs::create_temp_dir,
};
use path_absolutize::Absolutize;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use url::Url;

const FILE_SCHEME: &str = "file://";
const PLAIN_PASSWORD_PREFIX: &str = "pass:";
const FILE_PASSWORD_PREFIX: &str = "file:";

/// Parameters required to sign the generated APKs.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// `file://` URI or remote URL before resolution, absolute path after.
    pub keystore_location: String,
    /// Literal (`pass:`) or file-backed (`file:`) keystore password.
    pub keystore_password: String,
    /// Alias of the signing key inside the keystore.
    pub key_alias: String,
    /// Literal (`pass:`) or file-backed (`file:`) key password.
    pub key_password: String,
}

impl SigningConfig {
    pub fn new(
        keystore_location: impl Into<String>,
        keystore_password: impl Into<String>,
        key_alias: impl Into<String>,
        key_password: impl Into<String>,
    ) -> Self {
        Self {
            keystore_location: keystore_location.into(),
            keystore_password: keystore_password.into(),
            key_alias: key_alias.into(),
            key_password: key_password.into(),
        }
    }

    /// Keystore location as a path. Meaningful once the config is resolved.
    pub fn keystore_path(&self) -> &Path {
        Path::new(&self.keystore_location)
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("keystore_location", &self.keystore_location)
            .field("keystore_password", &"<redacted>")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"<redacted>")
            .finish()
    }
}

/// Where a keystore reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystoreLocation {
    /// `file://` reference with the scheme stripped
    Local(PathBuf),
    /// Anything else, fetched over HTTP
    Remote(Url),
}

impl KeystoreLocation {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.strip_prefix(FILE_SCHEME) {
            Some("") => Err(Error::GenericError(format!(
                "keystore location {raw:?} has no path"
            ))),
            Some(path) => Ok(Self::Local(PathBuf::from(path))),
            None => Url::parse(raw)
                .with_context(|| format!("keystore location {raw:?} is neither file:// nor a URL"))
                .map(Self::Remote),
        }
    }
}

/// Prefixes untagged passwords with `pass:`; tagged ones are returned as is.
pub fn normalize_password(password: &str) -> String {
    if password.starts_with(PLAIN_PASSWORD_PREFIX) || password.starts_with(FILE_PASSWORD_PREFIX) {
        password.to_string()
    } else {
        format!("{PLAIN_PASSWORD_PREFIX}{password}")
    }
}

/// File name for a downloaded keystore: the last path segment of the URL,
/// query and fragment excluded.
pub fn keystore_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a keystore file name from {url}"))
}

/// Turns raw signing input into a tool-ready [`SigningConfig`].
#[derive(Debug, Clone)]
pub struct KeystoreResolver<D> {
    downloader: D,
}

impl<D: FileDownloader> KeystoreResolver<D> {
    pub fn new(downloader: D) -> Self {
        Self { downloader }
    }

    /// Resolves the keystore location and normalises both passwords.
    ///
    /// `None` stays `None`: the tool then builds with its debug key. The
    /// input is never modified; a new config is returned.
    pub async fn resolve(&self, raw: Option<&SigningConfig>) -> Result<Option<SigningConfig>> {
        let Some(raw) = raw else {
            log::info!("No keystore configured, the universal APK will use the debug key");
            return Ok(None);
        };

        let keystore_path = match KeystoreLocation::parse(&raw.keystore_location)? {
            KeystoreLocation::Local(path) => path
                .absolutize()
                .fs_context("resolving keystore path", &path)?
                .into_owned(),
            KeystoreLocation::Remote(url) => self.download(url).await?,
        };
        log::info!("Using keystore at: {}", keystore_path.display());

        Ok(Some(SigningConfig {
            keystore_location: keystore_path.to_string_lossy().into_owned(),
            keystore_password: normalize_password(&raw.keystore_password),
            key_alias: raw.key_alias.clone(),
            key_password: normalize_password(&raw.key_password),
        }))
    }

    async fn download(&self, url: Url) -> Result<PathBuf> {
        log::info!("Downloading keystore from: {}", url);
        let name = keystore_name(url.as_str())?;
        let dir = create_temp_dir("keystore").await?;
        let destination = dir.join(name);

        self.downloader
            .get_with_fallback(&destination, &FetchSources::new(url))
            .await?;
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::Error;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDownloader {
        calls: Arc<Mutex<Vec<(PathBuf, Vec<Url>)>>>,
        fail: bool,
    }

    impl RecordingDownloader {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(PathBuf, Vec<Url>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FileDownloader for RecordingDownloader {
        async fn get_with_fallback(&self, destination: &Path, sources: &FetchSources) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((destination.to_path_buf(), sources.as_slice().to_vec()));
            if self.fail {
                return Err(Error::FetchExhausted {
                    artifact: "keystore".into(),
                    attempts: vec!["boom".into()],
                });
            }
            tokio::fs::write(destination, b"keystore")
                .await
                .fs_context("writing fake keystore", destination)
        }
    }

    fn raw_config(location: &str) -> SigningConfig {
        SigningConfig::new(location, "password", "alias", "password")
    }

    #[test]
    fn normalize_password_tags_plain_values() {
        assert_eq!(normalize_password("secret"), "pass:secret");
        assert_eq!(normalize_password("pass:secret"), "pass:secret");
        assert_eq!(normalize_password("file:/p"), "file:/p");
        assert_eq!(normalize_password(""), "pass:");
    }

    #[test]
    fn normalize_password_is_idempotent() {
        for input in ["secret", "pass:secret", "file:/p", "", "passport"] {
            let once = normalize_password(input);
            assert_eq!(normalize_password(&once), once);
        }
    }

    #[test]
    fn keystore_name_strips_query_parameters() {
        let scenarios = [
            "https://something.com/debug-keystore.jks",
            "https://something.com/debug-keystore.jks?queryparams",
            "https://something.com/path/debug-keystore.jks",
            "https://something.com/path/debug-keystore.jks?x=1&y=2",
            "https://h/a/debug-keystore.jks?x=1",
        ];
        for url in scenarios {
            assert_eq!(keystore_name(url).unwrap(), "debug-keystore.jks", "{url}");
        }
    }

    #[test]
    fn keystore_name_requires_a_file_segment() {
        assert!(keystore_name("https://something.com/").is_err());
    }

    #[test]
    fn location_parsing() {
        assert_eq!(
            KeystoreLocation::parse("file:///abs/release.jks").unwrap(),
            KeystoreLocation::Local(PathBuf::from("/abs/release.jks"))
        );
        assert!(matches!(
            KeystoreLocation::parse("https://host/release.jks").unwrap(),
            KeystoreLocation::Remote(_)
        ));
        assert!(KeystoreLocation::parse("/not/a/uri.jks").is_err());
    }

    #[tokio::test]
    async fn empty_file_reference_is_rejected() {
        let downloader = RecordingDownloader::default();
        let resolver = KeystoreResolver::new(downloader.clone());

        let err = resolver
            .resolve(Some(&raw_config("file://")))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("has no path"), "{err}");
        assert!(downloader.calls().is_empty());
    }

    #[test]
    fn debug_output_redacts_passwords() {
        let printed = format!("{:?}", SigningConfig::new("file://k.jks", "hunter2", "alias", "s3cret"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("alias"));
    }

    #[tokio::test]
    async fn absent_config_stays_absent() {
        let downloader = RecordingDownloader::default();
        let resolver = KeystoreResolver::new(downloader.clone());

        assert!(resolver.resolve(None).await.unwrap().is_none());
        assert!(downloader.calls().is_empty());
    }

    #[tokio::test]
    async fn local_keystore_is_absolutized_without_fetching() {
        let downloader = RecordingDownloader::default();
        let resolver = KeystoreResolver::new(downloader.clone());
        let mut raw = raw_config("file://keystore.jks");
        raw.keystore_password = "pass:password".into();
        raw.key_password = "file:/run/secrets/key".into();

        let resolved = resolver.resolve(Some(&raw)).await.unwrap().unwrap();

        assert!(resolved.keystore_path().is_absolute());
        assert!(resolved.keystore_location.ends_with("keystore.jks"));
        assert!(!resolved.keystore_location.contains("file:/"));
        assert_eq!(resolved.keystore_password, "pass:password");
        assert_eq!(resolved.key_password, "file:/run/secrets/key");
        assert!(downloader.calls().is_empty());
        assert_eq!(raw.keystore_location, "file://keystore.jks");
    }

    #[tokio::test]
    async fn remote_keystore_is_downloaded_to_temp_dir() {
        let downloader = RecordingDownloader::default();
        let resolver = KeystoreResolver::new(downloader.clone());

        let resolved = resolver
            .resolve(Some(&raw_config("http://url.com/keystore.jks?token=abc")))
            .await
            .unwrap()
            .unwrap();

        let calls = downloader.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 1, "remote keystores have no fallback");
        assert_eq!(calls[0].0, resolved.keystore_path());
        assert!(resolved.keystore_path().is_absolute());
        assert!(resolved.keystore_location.ends_with("keystore.jks"));
        assert!(resolved.keystore_path().exists());
        assert_eq!(resolved.keystore_password, "pass:password");
        assert_eq!(resolved.key_password, "pass:password");
        assert_eq!(resolved.key_alias, "alias");
    }

    #[tokio::test]
    async fn failed_keystore_download_is_returned() {
        let resolver = KeystoreResolver::new(RecordingDownloader::failing());

        let err = resolver
            .resolve(Some(&raw_config("http://url.com/keystore.jks")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::FetchExhausted { .. }));
    }
}
