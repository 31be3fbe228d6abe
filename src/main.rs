//! # Verso CLI
//!
//! Command-line interface for thermal poetry printing.
//!
//! ## Usage
//!
//! ```bash
//! # List printer profiles
//! verso profiles
//!
//! # Print the self-test page
//! verso test
//!
//! # Print a poem (text from the flag or stdin)
//! verso print --kind poem --text "Roses are red"
//! fortune | verso print --kind fortune
//!
//! # Dry run: encode and chunk without hardware
//! verso --simulate test
//!
//! # Start the HTTP API
//! verso serve --listen 0.0.0.0:8080
//! ```

use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use verso::{
    JobError, PrintJob, PrinterProfile, VersoError,
    job::ContentKind,
    orchestrator,
    printer::{
        SessionConfig,
        config::{CHUNK_DELAY_MS, CONNECT_TIMEOUT_SECS, DISCOVERY_TIMEOUT_SECS},
    },
    server::{self, AppState, ServerConfig},
    session::DeviceSession,
    transport::{DeviceHost, MockHost, RfcommHost, rfcomm::DEFAULT_RFCOMM_INDEX},
};

/// Verso - Thermal poetry printer utility
#[derive(Parser, Debug)]
#[command(name = "verso")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// JSON file with printer profiles (defaults to built-in profiles)
    #[arg(long, global = true, value_name = "FILE")]
    profiles: Option<PathBuf>,

    /// RFCOMM device index used when binding a printer
    #[arg(long, global = true, default_value_t = DEFAULT_RFCOMM_INDEX)]
    rfcomm_index: u8,

    /// Seconds allowed for discovery
    #[arg(long, global = true, default_value_t = DISCOVERY_TIMEOUT_SECS)]
    discovery_timeout: u64,

    /// Seconds allowed to open the link
    #[arg(long, global = true, default_value_t = CONNECT_TIMEOUT_SECS)]
    connect_timeout: u64,

    /// Pause between chunks in milliseconds
    #[arg(long, global = true, default_value_t = CHUNK_DELAY_MS)]
    chunk_delay_ms: u64,

    /// Override every profile's chunk size
    #[arg(long, global = true)]
    max_chunk_bytes: Option<usize>,

    /// Use an in-memory printer instead of Bluetooth
    #[arg(long, global = true)]
    simulate: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List printer profiles
    Profiles,

    /// Print the self-test page
    Test,

    /// Print generated content
    Print {
        /// Content kind, used as the title
        #[arg(long, default_value = "poem")]
        kind: ContentKind,

        /// Text to print (read from stdin if omitted)
        #[arg(long)]
        text: Option<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), VersoError> {
    let cli = Cli::parse();
    let profiles = load_profiles(&cli.session)?;

    if let Commands::Profiles = cli.command {
        for profile in &profiles {
            println!(
                "{}  service={}  characteristic={}  prefixes={}  chunk={}B",
                profile.name,
                profile.service_uuid,
                profile.characteristic_uuid,
                profile.name_prefixes.join(","),
                profile.max_chunk_bytes
            );
        }
        return Ok(());
    }

    let config = SessionConfig {
        discovery_timeout: Duration::from_secs(cli.session.discovery_timeout),
        connect_timeout: Duration::from_secs(cli.session.connect_timeout),
        chunk_delay: Duration::from_millis(cli.session.chunk_delay_ms),
    };

    if cli.session.simulate {
        let host = match profiles.first() {
            Some(profile) => MockHost::with_services(vec![profile.service_uuid]),
            None => MockHost::empty(),
        };
        execute(cli.command, host.clone(), config, profiles).await?;
        println!(
            "Simulated: {} bytes in {} chunks",
            host.written_bytes().len(),
            host.writes().len()
        );
        Ok(())
    } else {
        let host = RfcommHost::new(cli.session.rfcomm_index);
        execute(cli.command, host, config, profiles).await
    }
}

fn load_profiles(args: &SessionArgs) -> Result<Vec<PrinterProfile>, VersoError> {
    let mut profiles = match &args.profiles {
        Some(path) => PrinterProfile::load(path)?,
        None => PrinterProfile::built_in(),
    };
    if let Some(max) = args.max_chunk_bytes {
        for profile in &mut profiles {
            profile.max_chunk_bytes = max;
            profile.validate()?;
        }
    }
    Ok(profiles)
}

async fn execute<H: DeviceHost + 'static>(
    command: Commands,
    host: H,
    config: SessionConfig,
    profiles: Vec<PrinterProfile>,
) -> Result<(), VersoError> {
    let session = DeviceSession::new(host, config);

    let job = match command {
        Commands::Profiles => return Ok(()),
        Commands::Serve { listen } => {
            let state = Arc::new(AppState::new(session, profiles));
            return server::serve(ServerConfig { listen_addr: listen }, state).await;
        }
        Commands::Test => PrintJob::self_test(),
        Commands::Print { kind, text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            PrintJob::generated(kind, text.trim_end())
        }
    };

    orchestrator::check(&job).map_err(report)?;

    let profile = orchestrator::connect(&session, &profiles)
        .await
        .map_err(report)?;
    println!("Connected to {}", profile.name);

    let result = orchestrator::print_now(&session, &job).await;
    session.disconnect().await;
    result.map_err(report)?;

    info!(label = %job.label, "job printed");
    println!("Printed successfully!");
    Ok(())
}

fn report(e: JobError) -> VersoError {
    warn!(phase = %e.phase, "{}", e.hint());
    e.source
}
