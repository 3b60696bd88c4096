use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mailer_rs::api::{ApiServer, AppState};
use mailer_rs::config::{Config, LoggingConfig};
use mailer_rs::mailer::{
    BatchCoordinator, DispatchSettings, MailDispatcher, MailTransport, SendRequest, SendSummary,
    SmtpTransport,
};
use mailer_rs::templates::{
    PromptPicker, RootedPathSource, TemplateRecord, TemplateSource, UserGrantedSource,
};
use mailer_rs::MailerError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mailer-rs")]
#[command(about = "Browse HTML email templates and send them over SMTP", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// List templates under a directory (defaults to the configured path)
    List {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Choose a template directory interactively and list it
    Pick,
    /// Send one HTML file
    Send {
        /// Recipient; the configured default list is used when omitted
        #[arg(short, long)]
        to: Option<String>,
        #[arg(short, long)]
        subject: String,
        /// HTML file used as the body
        #[arg(long)]
        html: PathBuf,
    },
    /// Send every template one by one
    Batch {
        /// Recipient for every template; defaults to the configured list
        #[arg(short, long)]
        to: Option<String>,
        #[arg(short, long, conflicts_with = "pick")]
        path: Option<PathBuf>,
        /// Choose the template directory interactively
        #[arg(long)]
        pick: bool,
    },
    /// Check the SMTP connection
    Verify,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::from_file(path).with_context(|| format!("reading {}", path.display()))
    } else {
        Ok(Config::default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_tracing(&config.logging);

    if cli.config.exists() {
        info!("Configuration loaded from {}", cli.config.display());
    } else {
        info!("No config file found, using defaults");
    }

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::List { path } => {
            let templates = scan_rooted(&config, path).await?;
            print_templates(&templates);
            Ok(())
        }
        Commands::Pick => {
            let templates = scan_picked().await?;
            print_templates(&templates);
            Ok(())
        }
        Commands::Send { to, subject, html } => {
            let html = tokio::fs::read_to_string(&html)
                .await
                .with_context(|| format!("reading {}", html.display()))?;
            let request = SendRequest::from_parts(to, Some(subject), Some(html))?;

            let dispatcher = dispatcher(&config)?;
            let summary = dispatcher.send(&request).await;
            print_summary("send", &summary);
            if !summary.success {
                bail!("{}", summary.error.unwrap_or(summary.message));
            }
            Ok(())
        }
        Commands::Batch { to, path, pick } => {
            let templates = if pick {
                scan_picked().await?
            } else {
                scan_rooted(&config, path).await?
            };
            if templates.is_empty() {
                warn!("No templates to send");
                return Ok(());
            }

            let coordinator =
                BatchCoordinator::new(Arc::new(dispatcher(&config)?), config.pace());
            let results = coordinator.send_batch(&templates, to.as_deref()).await;

            for (template, result) in templates.iter().zip(&results) {
                print_summary(&template.relative_path, result);
            }
            let succeeded = results.iter().filter(|r| r.success).count();
            let failed = results.len() - succeeded;
            println!("{} succeeded, {} failed", succeeded, failed);

            if succeeded == 0 {
                bail!("every template failed to send");
            }
            Ok(())
        }
        Commands::Verify => {
            SmtpTransport::new(&config.smtp)?.verify().await?;
            println!("SMTP server connection successful");
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let transport: Arc<dyn MailTransport> = Arc::new(SmtpTransport::new(&config.smtp)?);

    let probe = transport.clone();
    tokio::spawn(async move {
        match probe.verify().await {
            Ok(()) => info!("SMTP server connection successful"),
            Err(e) => error!("SMTP connection verification failed: {}", e),
        }
    });

    if config.delivery.retry_times > 0 {
        info!(
            "delivery.retry_times = {} is configured; failed sends are not retried",
            config.delivery.retry_times
        );
    }

    let state = AppState::from_config(&config, transport);
    let server = ApiServer::new(state, config.api.listen_addr.clone());
    server.run().await?;

    Ok(())
}

fn dispatcher(config: &Config) -> anyhow::Result<MailDispatcher> {
    let transport = Arc::new(SmtpTransport::new(&config.smtp)?);
    Ok(MailDispatcher::new(
        transport,
        DispatchSettings::from_config(config),
    ))
}

async fn scan_rooted(config: &Config, path: Option<PathBuf>) -> anyhow::Result<Vec<TemplateRecord>> {
    let root = match path {
        Some(path) => path,
        None => match config.template_root() {
            Some(root) => PathBuf::from(root),
            None => {
                info!("No template path configured");
                return Ok(Vec::new());
            }
        },
    };

    Ok(RootedPathSource::new(root).scan().await?)
}

async fn scan_picked() -> anyhow::Result<Vec<TemplateRecord>> {
    let source = UserGrantedSource::new(Arc::new(PromptPicker::default()));
    match source.scan().await {
        Err(MailerError::UserCancelled) => {
            println!("Selection cancelled");
            Ok(Vec::new())
        }
        other => Ok(other?),
    }
}

fn print_templates(templates: &[TemplateRecord]) {
    for template in templates {
        println!("{}", template.relative_path);
    }
    println!("{} templates", templates.len());
}

fn print_summary(label: &str, summary: &SendSummary) {
    match &summary.error {
        Some(error) if summary.success => println!("{}: {} ({})", label, summary.message, error),
        Some(error) => println!("{}: {}: {}", label, summary.message, error),
        None => println!("{}: {}", label, summary.message),
    }
}
