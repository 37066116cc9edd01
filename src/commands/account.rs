use anyhow::{Context, Result};

use crate::account::Account;
use crate::runtime::Runtime;

use super::{ClientOptions, print_json};

async fn connect<R: Runtime>(runtime: &R, options: &ClientOptions) -> Result<Account> {
    let config = options.to_config(runtime)?;
    Account::connect(config).await.context("Failed to log in")
}

/// Show the account of the logged-in user
#[tracing::instrument(skip(runtime, options))]
pub async fn account_info<R: Runtime>(runtime: R, options: &ClientOptions) -> Result<()> {
    let account = connect(&runtime, options).await?;
    let info = account
        .get_account_info()
        .await
        .context("Failed to get account info")?;
    print_json(&info)
}

#[tracing::instrument(skip(runtime, options))]
pub async fn account_plan<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    account_id: &str,
) -> Result<()> {
    let account = connect(&runtime, options).await?;
    let plan = account
        .get_account_plan(account_id)
        .await
        .with_context(|| format!("Failed to get plan for account {}", account_id))?;
    print_json(&plan)
}

#[tracing::instrument(skip(runtime, options))]
pub async fn account_usage<R: Runtime>(
    runtime: R,
    options: &ClientOptions,
    account_id: &str,
) -> Result<()> {
    let account = connect(&runtime, options).await?;
    let usage = account
        .get_account_usage(account_id)
        .await
        .with_context(|| format!("Failed to get usage for account {}", account_id))?;
    print_json(&usage)
}

#[tracing::instrument(skip(runtime, options))]
pub async fn list_users<R: Runtime>(runtime: R, options: &ClientOptions) -> Result<()> {
    let account = connect(&runtime, options).await?;
    let users = account.get_users().await.context("Failed to list users")?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }
    for user in users {
        let role = if user.isadmin { "admin" } else { "member" };
        println!("{}\t{}\t{}\t{}", user.user_id, user.email, user.name, role);
    }
    Ok(())
}
