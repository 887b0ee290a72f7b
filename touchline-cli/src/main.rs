use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use touchline_lib::{ApiClient, CoreConfig, Error, Session, session};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod profile;

#[derive(Parser, Debug)]
#[command(name = "touchline")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Subject identifier of the signed-in user
    #[arg(short, long, global = true, env = session::SUBJECT_VAR)]
    subject: Option<String>,

    /// Bearer token sent with every request
    #[arg(short, long, global = true, env = session::TOKEN_VAR, hide_env_values = true)]
    token: Option<String>,

    /// Override the configured content server
    #[arg(long, global = true)]
    endpoint: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Inspect and edit your profile
    #[command(subcommand)]
    Profile(profile::Command),
}

#[tokio::main]
async fn main() -> ExitCode {
    human_panic::setup_panic!();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err).into()
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut cfg = CoreConfig::load()?;
    if let Some(endpoint) = cli.endpoint {
        cfg.base_endpoint = endpoint;
    }

    let subject = cli.subject.ok_or_else(|| {
        Error::Validation(format!(
            "no subject given, pass --subject or set {}",
            session::SUBJECT_VAR
        ))
    })?;
    let session = Session::new(subject, cli.token);
    let api = ApiClient::new(&cfg)?.with_token(session.token.clone());

    match &cli.command {
        Command::Profile(cmd) => profile::handle(api, &cfg, &session, cmd).await,
    }
}

fn exit_code(err: &Error) -> sysexits::ExitCode {
    use sysexits::ExitCode as Code;

    match err {
        Error::Http(_) | Error::Status { .. } => Code::Unavailable,
        Error::Decode(_) | Error::MissingData | Error::EmptyUpload => Code::Protocol,
        Error::UserNotFound(_) => Code::NoUser,
        Error::Io(_) => Code::IoErr,
        Error::Url(_) | Error::ConfigParse(_) | Error::ConfigWrite(_) => Code::Config,
        Error::NoHome => Code::OsFile,
        Error::Validation(_) | Error::InvalidTransition(_) => Code::DataErr,
    }
}
