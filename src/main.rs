use anyhow::Result;
use cerevox::commands::{self, ClientOptions};
use cerevox::lexa::ParseOptions;
use cerevox::models::ProcessingMode;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// cerevox - Cerevox API client
///
/// Parse documents with Lexa, ask questions with Hippo and manage your account.
///
/// The API key is read from --api-key or the CEREVOX_API_KEY environment variable.
///
/// Examples:
///   cerevox parse report.pdf          # Parse a local file and print the result
///   cerevox account info              # Show the current account
#[derive(Parser, Debug)]
#[command(author, version = env!("CEREVOX_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key (defaults to CEREVOX_API_KEY)
    #[arg(long = "api-key", value_name = "KEY", global = true)]
    pub api_key: Option<String>,

    /// Account email, required by the account commands
    #[arg(long, env = "CEREVOX_EMAIL", value_name = "EMAIL", global = true)]
    pub email: Option<String>,

    /// API base URL (defaults to https://dev.cerevox.ai/v1)
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Data API URL used for ingestion and jobs (defaults to https://data.cerevox.ai)
    #[arg(long = "data-url", value_name = "URL", global = true)]
    pub data_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,
}

impl Cli {
    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_key: self.api_key.clone(),
            email: self.email.clone(),
            base_url: self.base_url.clone(),
            data_url: self.data_url.clone(),
            timeout: self.timeout,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Account information and users
    #[command(subcommand)]
    Account(AccountCommands),

    /// Parse local files and wait for the result
    Parse(ParseArgs),

    /// Parse files from URLs and wait for the result
    ParseUrls(ParseUrlsArgs),

    /// Show the status of a processing job
    Job(JobArgs),

    /// List Hippo folders
    Folders(FoldersArgs),

    /// Ask a question in a Hippo chat
    Ask(AskArgs),
}

#[derive(clap::Subcommand, Debug)]
enum AccountCommands {
    /// Show the current account
    Info,

    /// Show the plan of an account
    Plan {
        #[arg(value_name = "ACCOUNT_ID")]
        account_id: String,
    },

    /// Show the usage of an account
    Usage {
        #[arg(value_name = "ACCOUNT_ID")]
        account_id: String,
    },

    /// List users of the current account
    Users,
}

#[derive(clap::Args, Debug)]
pub struct WaitArgs {
    /// Processing mode: default or advanced
    #[arg(long, default_value = "default")]
    pub mode: ProcessingMode,

    /// Maximum time to wait for the job, in seconds
    #[arg(long = "max-wait", value_name = "SECS", value_parser = parse_seconds)]
    pub max_wait: Option<Duration>,

    /// Time between status checks, in seconds
    #[arg(long = "poll-interval", value_name = "SECS", value_parser = parse_seconds)]
    pub poll_interval: Option<Duration>,
}

/// Parses a non-negative, finite number of seconds.
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", value))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("`{}` must be a finite, non-negative number of seconds", value))
}

impl WaitArgs {
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::default().mode(self.mode);
        if let Some(timeout) = self.max_wait {
            options = options.timeout(timeout);
        }
        if let Some(interval) = self.poll_interval {
            options = options.poll_interval(interval);
        }
        options
    }
}

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    /// Files to parse
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(clap::Args, Debug)]
pub struct ParseUrlsArgs {
    /// URLs of the files to parse
    #[arg(value_name = "URL", required = true)]
    pub urls: Vec<String>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(clap::Args, Debug)]
pub struct JobArgs {
    /// Request ID returned by an upload
    #[arg(value_name = "REQUEST_ID")]
    pub request_id: String,

    /// Wait until the job finishes
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait, in seconds
    #[arg(
        long = "max-wait",
        value_name = "SECS",
        requires = "wait",
        value_parser = parse_seconds
    )]
    pub max_wait: Option<Duration>,
}

#[derive(clap::Args, Debug)]
pub struct FoldersArgs {
    /// Only list folders whose name matches
    #[arg(long, value_name = "NAME")]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AskArgs {
    #[arg(value_name = "CHAT_ID")]
    pub chat_id: String,

    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Return the matching sources without generating an answer
    #[arg(long = "sources-only")]
    pub sources_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let options = cli.client_options();
    let runtime = cerevox::runtime::RealRuntime;

    match cli.command {
        Commands::Account(AccountCommands::Info) => {
            commands::account_info(runtime, &options).await?
        }
        Commands::Account(AccountCommands::Plan { account_id }) => {
            commands::account_plan(runtime, &options, &account_id).await?
        }
        Commands::Account(AccountCommands::Usage { account_id }) => {
            commands::account_usage(runtime, &options, &account_id).await?
        }
        Commands::Account(AccountCommands::Users) => {
            commands::list_users(runtime, &options).await?
        }
        Commands::Parse(args) => {
            let parse_options = args.wait.parse_options();
            commands::parse_files(runtime, &options, args.files, parse_options).await?
        }
        Commands::ParseUrls(args) => {
            let parse_options = args.wait.parse_options();
            commands::parse_urls(runtime, &options, args.urls, parse_options).await?
        }
        Commands::Job(args) => {
            commands::job_status(runtime, &options, &args.request_id, args.wait, args.max_wait)
                .await?
        }
        Commands::Folders(args) => {
            commands::list_folders(runtime, &options, args.search.as_deref()).await?
        }
        Commands::Ask(args) => {
            commands::ask(
                runtime,
                &options,
                &args.chat_id,
                &args.query,
                args.sources_only,
            )
            .await?
        }
    }
    Ok(())
}
