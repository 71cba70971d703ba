//! Export Universal APK - CI step turning an app bundle into a universal APK.
//!
//! Exit code 0 guarantees the APK exists in the deploy directory and its path
//! was published as a step output.

use export_universal_apk::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
