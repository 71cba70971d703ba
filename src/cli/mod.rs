//! Command line interface for the export step.
//!
//! This module wires host configuration into the export pipeline and
//! publishes the result as a step output.

mod args;
mod output;

pub use args::Args;
pub use output::export_output;

use crate::{
    error::{CliError, Result},
    exporter::{BundleTool, Error, ErrorExt, ExportJob, Exporter, HttpDownloader, locate_java},
};
use path_absolutize::Absolutize;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    args.log_summary();

    let mut client = reqwest::Client::builder();
    if let Some(timeout) = args.http_timeout() {
        client = client.timeout(timeout);
    }
    let downloader = HttpDownloader::new(client.build().map_err(Error::from)?);

    let tool = BundleTool::install(&args.tool_source(), &downloader)
        .await?
        .with_java(locate_java()?)
        .with_timeout(args.tool_timeout());

    let deploy_dir = args
        .deploy_dir
        .absolutize()
        .fs_context("resolving deploy directory", &args.deploy_dir)?
        .into_owned();
    let job = ExportJob::new(&args.aab_path, deploy_dir, args.signing_config());

    let exporter = Exporter::new(tool, downloader);
    let apk = exporter.export_universal_apk(&job).await?;

    export_output(&args.output_key, &apk.output_path.to_string_lossy()).await?;
    log::info!(
        "Success APK exported to: {} (sha256: {})",
        apk.output_path.display(),
        apk.checksum
    );

    Ok(0)
}
