//! Artifact downloads with ordered fallback.
//!
//! An artifact is described by a [`FetchSources`] list: the first URL is the
//! primary, the rest are tried in order when it fails. The first candidate
//! answering with a 2xx status wins and the remaining ones are never contacted.

use crate::{
    bail,
    exporter::error::{Error, ErrorExt, Result},
};
use futures_lite::StreamExt;
use std::{
    fmt::Display,
    future::Future,
    path::{Path, PathBuf},
};
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use url::Url;

/// Ordered, non-empty list of candidate URLs for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSources {
    urls: Vec<Url>,
}

impl FetchSources {
    /// Starts a list with its primary URL.
    pub fn new(primary: Url) -> Self {
        Self { urls: vec![primary] }
    }

    /// Appends a fallback tried after every earlier candidate failed.
    pub fn with_fallback(mut self, url: Url) -> Self {
        self.urls.push(url);
        self
    }

    pub fn primary(&self) -> &Url {
        &self.urls[0]
    }

    pub fn as_slice(&self) -> &[Url] {
        &self.urls
    }
}

/// Runs `attempt` on each source in order and returns the first success
/// together with the source that produced it.
///
/// Failures are logged and collected as `<source>: <error>` lines; they are
/// returned only when every source failed.
pub async fn first_success<'a, S, T, F, Fut>(
    sources: &'a [S],
    mut attempt: F,
) -> std::result::Result<(&'a S, T), Vec<String>>
where
    S: Display,
    F: FnMut(&'a S) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut failures = Vec::with_capacity(sources.len());
    for source in sources {
        match attempt(source).await {
            Ok(value) => return Ok((source, value)),
            Err(e) => {
                log::warn!("Source {} failed: {}", source, e);
                failures.push(format!("{source}: {e}"));
            }
        }
    }
    Err(failures)
}

/// Downloads a file from the first working candidate URL.
pub trait FileDownloader {
    /// Writes the body of the first 2xx response to `destination`.
    ///
    /// Fails with [`Error::FetchExhausted`] when no candidate succeeds, in
    /// which case `destination` is not created.
    fn get_with_fallback(
        &self,
        destination: &Path,
        sources: &FetchSources,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`FileDownloader`] backed by an injected `reqwest::Client`.
///
/// Timeouts and proxies are whatever the client was built with.
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, destination: &Path, source: &Url) -> Result<()> {
        log::debug!("GET {}", source);
        let response = self.client.get(source.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            bail!("unexpected status code {}", status);
        }

        let partial = partial_path(destination);
        if let Err(e) = write_body(response, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, destination)
            .await
            .fs_context("moving download into place", destination)?;
        Ok(())
    }
}

impl FileDownloader for HttpDownloader {
    async fn get_with_fallback(&self, destination: &Path, sources: &FetchSources) -> Result<()> {
        match first_success(sources.as_slice(), |url| self.get(destination, url)).await {
            Ok((url, ())) => {
                log::info!("URL used to download file: {}", url);
                Ok(())
            }
            Err(attempts) => Err(Error::FetchExhausted {
                artifact: destination
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| destination.display().to_string()),
                attempts,
            }),
        }
    }
}

/// Streams a response body into `path`.
async fn write_body(response: reqwest::Response, path: &Path) -> Result<u64> {
    let stream = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));
    let reader = StreamReader::new(stream);
    tokio::pin!(reader);

    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating download file", path)?;
    let written = tokio::io::copy(&mut reader, &mut file)
        .await
        .fs_context("writing download", path)?;
    file.flush().await.fs_context("flushing download", path)?;
    Ok(written)
}

/// `<destination>.part`, where a body lands until it is complete.
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}
