mod display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use domwatch_core::output::{get_formatter, JsonFormatter, OutputFormat, OutputFormatter};
use domwatch_core::{
    ConsoleNotifier, DomainInspector, EmailNotifier, InspectorConfig, Notifier, SmtpConfig,
    SmtpSecurity, TlsProber, WhoisClient,
};
use tracing_subscriber::EnvFilter;

use display::{RunProgress, TracingWriterFactory};

const DRY_RUN_RECIPIENT: &str = "(dry run)";

#[derive(Parser)]
#[command(name = "domwatch")]
#[command(about = "Report TLS certificate and domain registration expiry for a list of domains")]
#[command(version)]
struct Cli {
    /// Path to the file containing domain names, one per line
    #[arg(short = 'd', long)]
    domains_file: PathBuf,

    /// SMTP server for sending emails
    #[arg(short = 's', long, required_unless_present = "dry_run")]
    smtp_server: Option<String>,

    /// SMTP server port
    #[arg(short = 'p', long, default_value_t = domwatch_core::config::DEFAULT_SMTP_PORT)]
    smtp_port: u16,

    /// Username for SMTP authentication
    #[arg(short = 'u', long, required_unless_present = "dry_run")]
    smtp_username: Option<String>,

    /// Password for SMTP authentication
    #[arg(
        short = 'w',
        long,
        env = "DOMWATCH_SMTP_PASSWORD",
        hide_env_values = true,
        required_unless_present = "dry_run"
    )]
    smtp_password: Option<String>,

    /// Email address to send notifications from
    #[arg(short = 'f', long, required_unless_present = "dry_run")]
    from_email: Option<String>,

    /// Email address to send notifications to
    #[arg(short = 't', long, required_unless_present = "dry_run")]
    to_email: Option<String>,

    /// Use implicit TLS (SMTPS) instead of STARTTLS
    #[arg(long)]
    smtps: bool,

    /// Network timeout in seconds for each connect, handshake and read
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Also query the registrar WHOIS server named by the registry
    #[arg(long)]
    follow_referrals: bool,

    /// Print reports to stdout instead of sending email
    #[arg(long)]
    dry_run: bool,

    /// Output format for the run summary (human or json)
    #[arg(long, default_value = "human")]
    format: String,

    /// Print JSON on a single line (with --format json)
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(TracingWriterFactory)
        .init();

    let cli = Cli::parse();
    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();

    let domains = domwatch_core::load_domains(&cli.domains_file).await?;
    if domains.is_empty() {
        eprintln!(
            "{} No domains found in {}. Expected one domain per line, # for comments",
            "Error:".bright_red(),
            cli.domains_file.display()
        );
        std::process::exit(1);
    }

    let notifier = build_notifier(&cli)?;
    let recipient = cli
        .to_email
        .clone()
        .unwrap_or_else(|| DRY_RUN_RECIPIENT.to_string());

    let timeout = Duration::from_secs(cli.timeout.max(1));
    let inspector = DomainInspector::new(InspectorConfig::new(recipient), notifier)
        .with_prober(Arc::new(TlsProber::new().with_timeout(timeout)))
        .with_whois(Arc::new(
            WhoisClient::new()
                .with_timeout(timeout)
                .with_referrals(cli.follow_referrals),
        ));

    let summary = if cli.dry_run {
        // Reports go to stdout; a bar would be torn by them
        inspector.run(&domains, None).await
    } else {
        let progress = RunProgress::new(domains.len());
        let summary = inspector.run(&domains, Some(progress.callback())).await;
        drop(progress);
        summary
    };

    let formatter: Box<dyn OutputFormatter> = match output_format {
        OutputFormat::Json if cli.compact => Box::new(JsonFormatter::new().compact()),
        _ => get_formatter(output_format),
    };
    println!("{}", formatter.format_summary(&summary));

    match output_format {
        OutputFormat::Human => println!("\nExecution complete"),
        OutputFormat::Json => eprintln!("Execution complete"),
    }

    Ok(())
}

fn build_notifier(cli: &Cli) -> anyhow::Result<Arc<dyn Notifier>> {
    if cli.dry_run {
        return Ok(Arc::new(ConsoleNotifier::new()));
    }

    let security = if cli.smtps {
        SmtpSecurity::Tls
    } else {
        SmtpSecurity::StartTls
    };

    let config = SmtpConfig::new(
        cli.smtp_server.clone().unwrap_or_default(),
        cli.smtp_username.clone().unwrap_or_default(),
        cli.smtp_password.clone().unwrap_or_default(),
        cli.from_email.clone().unwrap_or_default(),
    )
    .with_port(cli.smtp_port)
    .with_security(security);

    Ok(Arc::new(EmailNotifier::new(config)?))
}
