//!
//! Command-line surface of the gitcap broker.
//!
//! One command maps to one lifecycle pipeline; the process hosts a single
//! current-thread runtime for the duration of that pipeline and exits with
//! its outcome. `start` and a revoke-triggered restart hand the terminal to
//! the daemon and normally do not come back here.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gitcap::lifecycle::LifecycleController;
use gitcap::server::FlappDir;
use gitcap::{BrokerError, GrantKind, ListOutcome, RepositoryRef, ServiceRegistrar};

#[derive(Parser)]
#[command(name = "gitcap")]
#[command(about = "Broker revocable capability URLs for a Git repository", long_about = None)]
#[command(version)]
struct Cli {
    /// Access-daemon directory (defaults to .git/flappserver in the repository)
    #[arg(long, value_name = "DIR")]
    flappserver: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a new capability URL for this repository
    Create {
        /// Privilege level: read-only or read-write
        kind: String,
        /// Free-text note shown by `list`
        comment: Vec<String>,
    },
    /// Revoke a capability URL and every record belonging to it
    Revoke {
        /// The capability to revoke (base or operation form)
        furl: String,
    },
    /// List the capabilities configured on the daemon
    List,
    /// Start the access daemon in the foreground
    Start,
    /// Stop the access daemon
    Stop,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit 1; clap routes --help/--version through the same
    // error path with exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gitcap: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BrokerError> {
    let cwd = std::env::current_dir()?;
    let repo = RepositoryRef::resolve(&cwd)?;
    let server_dir = cli.flappserver.unwrap_or_else(|| repo.server_dir());
    let server = FlappDir::new(server_dir);
    let registrar = ServiceRegistrar::new(&server);

    match cli.command {
        Commands::Create { kind, comment } => {
            let kind = GrantKind::try_from(kind.as_str())?;
            let grant = registrar.create(kind, &comment.join(" "), &repo).await?;
            println!("{} FURL:", grant.kind);
            println!("{}", grant.furl);
            Ok(())
        }
        Commands::Revoke { furl } => {
            let revoked = registrar.revoke(&furl).await?;
            println!("removed {}", revoked.swissnum);
            Ok(())
        }
        Commands::List => {
            match registrar.list().await? {
                ListOutcome::NoneConfigured => println!("no capabilities configured"),
                ListOutcome::Grants(entries) => {
                    for entry in entries {
                        let kind = if entry.writable { "read-write" } else { "read-only" };
                        match &entry.comment {
                            Some(comment) => println!("{} [{kind}] ({comment})", entry.furl),
                            None => println!("{} [{kind}]", entry.furl),
                        }
                    }
                }
            }
            Ok(())
        }
        Commands::Start => LifecycleController::new(&server).start().await,
        Commands::Stop => LifecycleController::new(&server).stop().await,
    }
}
