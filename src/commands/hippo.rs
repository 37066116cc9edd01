use anyhow::{Context, Result};

use crate::auth::Session;
use crate::hippo::Hippo;
use crate::models::AskRequest;
use crate::runtime::Runtime;

use super::{ClientOptions, print_json};

async fn connect<R: Runtime>(runtime: R, options: &ClientOptions) -> Result<Hippo<R>> {
    let config = options.to_config(&runtime)?;
    let session = Session::connect(config).await.context("Failed to log in")?;
    Ok(Hippo::with_runtime(session, runtime))
}

/// List Hippo folders
#[tracing::instrument(skip(runtime, options))]
pub async fn list_folders<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    search: Option<&str>,
) -> Result<()> {
    let hippo = connect(runtime, options).await?;
    let folders = hippo
        .get_folders(search)
        .await
        .context("Failed to list folders")?;

    if folders.is_empty() {
        println!("No folders found.");
        return Ok(());
    }
    for folder in folders {
        println!(
            "{}\t{}\t{}",
            folder.folder_id,
            folder.folder_name,
            folder.status.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Ask a question in a chat and print the answer
#[tracing::instrument(skip(runtime, options))]
pub async fn ask<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    chat_id: &str,
    query: &str,
    sources_only: bool,
) -> Result<()> {
    let hippo = connect(runtime, options).await?;

    let mut request = AskRequest::new(query);
    if sources_only {
        request = request.sources_only();
    }
    let response = hippo
        .submit_ask(chat_id, &request)
        .await
        .with_context(|| format!("Failed to ask in chat {}", chat_id))?;

    match &response.reply {
        Some(reply) if !sources_only => println!("{}", reply),
        _ => print_json(&response.source_data)?,
    }
    Ok(())
}
