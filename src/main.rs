use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use bulk_meetings::batch::flows;
use bulk_meetings::{OutputTarget, PortalClient, PortalSettings, ScheduleDefaults, SessionContext};

#[derive(Parser)]
#[command(
    name = "bulk-meetings",
    about = "Bulk meeting provisioning over an authenticated portal session",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create one meeting per input row
    Generate(GenerateArgs),
    /// Collect share links for every cloud recording
    Recordings(RecordingsArgs),
    /// Delete meetings recorded in a previous output file
    Ungenerate(UngenerateArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Netscape cookies.txt file
    #[arg(long, default_value = "cookies.txt")]
    cookies: String,

    /// Portal origin (overrides bulk-meetings.toml)
    #[arg(long)]
    origin: Option<String>,

    /// Interval (ms) between requests (overrides bulk-meetings.toml)
    #[arg(long)]
    interval: Option<u64>,

    #[arg(long, hide = true)]
    csrf_token: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Input CSV (requires an Email column)
    #[arg(short, long, default_value = "roster.csv")]
    input: String,

    /// Output CSV (creates Email, Meeting columns), or "stdout"
    #[arg(short, long, default_value = "stdout")]
    output: String,

    /// Name of meeting (@ for email)
    #[arg(short, long, default_value = "Meeting (@)")]
    topic: String,

    /// Description of meeting (@ for email)
    #[arg(long)]
    description: Option<String>,

    /// Date/time of meeting, as ISO timestamp
    #[arg(short, long)]
    when: Option<String>,

    /// Duration of meeting in minutes; 0 leaves the meeting without a set date/time
    #[arg(short, long, default_value_t = 0)]
    duration: u32,

    /// Timezone of meeting
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Add emails as alternate hosts
    #[arg(short, long)]
    cohost: bool,
}

#[derive(Args)]
struct RecordingsArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output CSV, or "stdout"
    #[arg(short, long, default_value = "recordings.csv")]
    output: String,

    /// Password to set for each recording link (empty clears protection)
    #[arg(long, default_value = "")]
    password: String,
}

#[derive(Args)]
struct UngenerateArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Input CSV (requires Email, Meeting columns)
    #[arg(short, long, default_value = "meetings.csv")]
    input: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Progress goes to stderr so data records on stdout stay clean
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Recordings(args) => recordings(args).await,
        Command::Ungenerate(args) => ungenerate(args).await,
    }
}

fn build_context(args: &SessionArgs) -> Result<(PortalSettings, SessionContext, PortalClient)> {
    let mut settings = PortalSettings::load("bulk-meetings")?;
    if let Some(origin) = &args.origin {
        settings.origin = origin.clone();
    }
    if let Some(interval) = args.interval {
        settings.interval_ms = interval;
    }

    let cookie_path = expand_path(&args.cookies);
    let session = SessionContext::from_cookie_file(
        &cookie_path,
        settings.user_agent.clone(),
        settings.origin.clone(),
    )
    .context("failed to load session cookies")?;

    let client = PortalClient::new(args.csrf_token.clone())?;
    Ok((settings, session, client))
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let (settings, mut session, client) = build_context(&args.session)?;
    let defaults = ScheduleDefaults {
        topic: args.topic,
        description: args.description,
        when: args.when,
        duration_minutes: args.duration,
        timezone: args.timezone,
        cohost: args.cohost,
    };

    let input = expand_path(&args.input);
    let target = OutputTarget::parse(&args.output);
    let summary = flows::run_generate(
        &client,
        &mut session,
        &defaults,
        &input,
        &target,
        settings.interval(),
    )
    .await?;

    info!(
        "done (created: {}, failed: {}, skipped: {})",
        summary.processed, summary.failed, summary.skipped
    );
    Ok(())
}

async fn recordings(args: RecordingsArgs) -> Result<()> {
    let (settings, mut session, client) = build_context(&args.session)?;

    let target = OutputTarget::parse(&args.output);
    let summary = flows::run_recordings(
        &client,
        &mut session,
        &args.password,
        &target,
        settings.interval(),
    )
    .await?;

    info!(
        "done (fetched: {}, failed: {}, skipped: {})",
        summary.processed, summary.failed, summary.skipped
    );
    Ok(())
}

async fn ungenerate(args: UngenerateArgs) -> Result<()> {
    let (settings, mut session, client) = build_context(&args.session)?;

    let input = expand_path(&args.input);
    let summary =
        flows::run_ungenerate(&client, &mut session, &input, settings.interval()).await?;

    info!(
        "done (deleted: {}, failed: {}, skipped: {})",
        summary.processed, summary.failed, summary.skipped
    );
    Ok(())
}
