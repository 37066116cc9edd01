use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::auth::Session;
use crate::ingest::FileInput;
use crate::lexa::{Lexa, ParseOptions};
use crate::runtime::Runtime;

use super::job::report_progress;
use super::{ClientOptions, print_json};

/// Parse local files and print the completed job
#[tracing::instrument(skip(runtime, options))]
pub async fn parse_files<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    files: Vec<PathBuf>,
    parse_options: ParseOptions,
) -> Result<()> {
    let config = options.to_config(&runtime)?;
    let session = Session::connect(config).await.context("Failed to log in")?;
    let lexa = Lexa::with_runtime(session, runtime);

    info!("Parsing {} file(s)...", files.len());
    let inputs = files.into_iter().map(FileInput::from).collect();
    let job = lexa
        .parse(inputs, parse_options, Some(&report_progress))
        .await
        .context("Failed to parse files")?;

    print_json(&job)
}

/// Parse remote files by URL and print the completed job
#[tracing::instrument(skip(runtime, options))]
pub async fn parse_urls<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    urls: Vec<String>,
    parse_options: ParseOptions,
) -> Result<()> {
    let config = options.to_config(&runtime)?;
    let session = Session::connect(config).await.context("Failed to log in")?;
    let lexa = Lexa::with_runtime(session, runtime);

    let job = lexa
        .parse_urls(&urls, parse_options, Some(&report_progress))
        .await
        .context("Failed to parse URLs")?;

    print_json(&job)
}
