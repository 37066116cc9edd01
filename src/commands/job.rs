use anyhow::{Context, Result};
use std::time::Duration;

use crate::auth::Session;
use crate::lexa::Lexa;
use crate::models::JobResponse;
use crate::runtime::Runtime;

use super::{ClientOptions, print_json};

/// Writes one progress line per polled status to stderr.
pub(crate) fn report_progress(job: &JobResponse) {
    match job.progress {
        Some(progress) => eprintln!("{}: {} ({}%)", job.request_id, job.status, progress),
        None => eprintln!("{}: {}", job.request_id, job.status),
    }
}

/// Show the status of a job, optionally waiting for it to finish
#[tracing::instrument(skip(runtime, options))]
pub async fn job_status<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    request_id: &str,
    wait: bool,
    max_wait: Option<Duration>,
) -> Result<()> {
    let config = options.to_config(&runtime)?;
    let session = Session::connect(config).await.context("Failed to log in")?;
    let lexa = Lexa::with_runtime(session, runtime);

    let job = if wait {
        lexa.wait_for_completion(request_id, max_wait, None, Some(&report_progress))
            .await
    } else {
        lexa.get_job_status(request_id).await
    };
    let job = job.with_context(|| format!("Failed to get status of job {}", request_id))?;

    print_json(&job)
}
