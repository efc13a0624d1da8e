// Command-line surface: argument definitions and the glue that runs one
// subcommand end to end (read input, resolve credentials, authenticate,
// submit).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;

use crate::api::{ApiClient, Site};
use crate::credentials::{
    self, Auth, CredentialArgs, Credentials, ENV_PASSWORD, ENV_TOKEN, ENV_URL, ENV_USER,
};
use crate::submit::{self, IdentifierKind, SubmitOptions};
use crate::ui::{self, TerminalPrompter};

const ENV_HELP: &str = "\
Environment:
  QUICKPIN_URL        Base URL of the QuickPin instance
  QUICKPIN_TOKEN      API token (skips username/password)
  QUICKPIN_USER       Username used to obtain a token
  QUICKPIN_PASSWORD   Password used to obtain a token

Values missing from both flags and environment are prompted for.

Example:
  quickpin submit-names usernames.csv twitter --interval 5";

#[derive(Parser, Debug)]
#[command(name = "quickpin", version)]
#[command(about = "Submit usernames or user IDs to a QuickPin instance")]
#[command(after_help = ENV_HELP)]
pub struct Cli {
    /// Base URL of the QuickPin instance
    #[arg(long, global = true, env = ENV_URL)]
    pub url: Option<String>,

    /// API token; takes precedence over username/password
    #[arg(long, global = true, env = ENV_TOKEN, hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, env = ENV_USER)]
    pub username: Option<String>,

    #[arg(long, global = true, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit usernames, one per line
    #[command(alias = "submit_names")]
    SubmitNames(SubmitArgs),

    /// Submit numeric user IDs, one per line
    #[command(alias = "submit_ids")]
    SubmitIds(SubmitArgs),
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// File with one entry per line; blank lines are ignored
    pub input: PathBuf,

    /// Site the profiles belong to
    #[arg(value_enum)]
    pub site: Site,

    /// Seconds to wait between requests
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Number of profiles sent with each request
    #[arg(long, default_value_t = 1)]
    pub chunk: usize,

    /// Import profiles as stubs
    #[arg(long)]
    pub stub: bool,
}

impl Cli {
    pub fn credential_args(&self) -> CredentialArgs {
        CredentialArgs {
            url: self.url.clone(),
            token: self.token.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Run the parsed command. Per-request failures are reported and do not
/// make this return an error; missing credentials, a rejected login or
/// token, or an unreadable input file do.
pub fn run(cli: Cli) -> Result<()> {
    let credential_args = cli.credential_args();
    let (kind, args) = match cli.command {
        Command::SubmitNames(args) => (IdentifierKind::Username, args),
        Command::SubmitIds(args) => (IdentifierKind::UpstreamId, args),
    };

    let identifiers = submit::read_identifiers(&args.input)?;
    if identifiers.is_empty() {
        println!("Empty file");
        return Ok(());
    }

    let creds = credentials::resolve(&credential_args, &mut TerminalPrompter)?;
    let api = connect(&creds, cli.insecure)?;

    let profiles: Vec<_> = identifiers
        .into_iter()
        .map(|id| kind.profile(id, args.site))
        .collect();
    let options = SubmitOptions {
        interval: Duration::from_secs(args.interval),
        chunk_size: args.chunk.max(1),
        stub: args.stub,
    };
    info!(
        profiles = profiles.len(),
        site = %args.site,
        interval = args.interval,
        "starting submission"
    );

    let requests = profiles.len().div_ceil(options.chunk_size);
    let progress = ui::submission_progress(requests as u64);
    let report = submit::run(&api, &profiles, &options, &progress, std::thread::sleep)
        .context("Submission aborted")?;

    for body in &report.responses {
        println!("{body}");
    }
    eprintln!(
        "Submitted {} of {} profile(s) in {} request(s), {} failed",
        report.submitted,
        profiles.len(),
        report.requests,
        report.failed
    );
    Ok(())
}

/// Build the client and make sure it holds a token before anything is
/// submitted.
pub fn connect(creds: &Credentials, insecure: bool) -> Result<ApiClient> {
    let mut api = ApiClient::new(&creds.url, insecure).context("Failed to build HTTP client")?;
    match &creds.auth {
        Auth::Token(token) => api.set_token(token)?,
        Auth::Login { username, password } => api
            .authenticate(username, password)
            .with_context(|| format!("Failed to authenticate against {}", api.base_url()))?,
    }
    Ok(api)
}
