//! # Bluesky Site Sync
//!
//! Pulls an author's recent Bluesky posts into a static site's content files.
//! Posts tagged `#news` land in the news document, posts tagged
//! `#announcement` or `#announce` in the announcements document. The
//! metadata block already at the top of each file is kept as is; the body
//! below it is regenerated from the three most recent matching posts.
//!
//! ## Usage
//!
//! ```sh
//! BLUESKY_HANDLE=@alice.bsky.social BLUESKY_APP_PASSWORD=xxxx bsky_site_sync
//! ```
//!
//! ## Architecture
//!
//! The run is a strictly sequential pipeline on a single-threaded runtime:
//! 1. **Authenticate**: create a session with the app password
//! 2. **Fetch**: read one page of the author feed
//! 3. **Classify**: route posts into categories by hashtag
//! 4. **Render + write**: per category, render the newest posts and merge them
//!    into the destination file
//!
//! Exit code is 0 when the pipeline completes (even with nothing to write) and
//! 1 on any failure, including unparseable arguments. `--help` and
//! `--version` exit 0.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod bluesky;
mod classify;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use error::SyncError;
use pipeline::RunSummary;

/// Process exit status for a finished run.
fn exit_status(outcome: &Result<RunSummary, SyncError>) -> u8 {
    match outcome {
        Ok(summary) if summary.is_clean() => 0,
        _ => 1,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "bsky_site_sync starting up");

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Help and version requests are also reported through this path.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let outcome = pipeline::sync(args).await;
    match &outcome {
        Ok(summary) if summary.is_clean() => {
            info!(
                fetched = summary.fetched,
                written = ?summary.written,
                empty = ?summary.empty,
                "Sync complete"
            );
        }
        Ok(summary) => {
            warn!(
                written = ?summary.written,
                render_failed = ?summary.render_failed,
                "Sync finished with categories that failed to render"
            );
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, detail = ?e, "Sync failed");
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
    ExitCode::from(exit_status(&outcome))
}
