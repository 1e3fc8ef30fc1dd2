//! otpbridge CLI entry point.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use otpbridge::config::AppConfig;
use otpbridge::error::Result;
use otpbridge::session::Session;
use otpbridge::{commands, logging};
use otpbridge_otp::otp::reader::TokioFileReader;
use otpbridge_otp::otp::{ExportFormat, ManualEntry};

/// otpbridge - otpauth:// links and QR codes for OTP credentials
#[derive(Parser, Debug)]
#[command(name = "otpbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: <config dir>/otpbridge/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the QR code for a manually entered credential
    Manual {
        /// Account name
        #[arg(short, long)]
        account: String,
        /// Issuer
        #[arg(short, long)]
        issuer: String,
        /// Secret key
        #[arg(short, long)]
        secret: String,
        /// Write the QR code to a file (.png, .svg or .txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a file of otpauth:// URIs and list its entries
    Import {
        /// File with one otpauth:// URI per line
        file: PathBuf,
    },

    /// Import a file and write the entries back out
    Export {
        /// File with one otpauth:// URI per line
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportArg::Uris)]
        format: ExportArg,
        /// Destination file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive session reading commands from stdin
    Session {
        /// File to import before the first command
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportArg {
    Uris,
    Json,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Uris => ExportFormat::OtpAuthUris,
            ExportArg::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    tracing::debug!(?config, "configuration resolved");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Manual {
            account,
            issuer,
            secret,
            output,
        } => {
            let form = ManualEntry::new(account, issuer, secret);
            commands::manual(&config, &form, output.as_deref(), &mut out)?;
        }
        Commands::Import { file } => commands::import(&config, &file, &mut out).await?,
        Commands::Export {
            file,
            format,
            output,
        } => commands::export(&file, format.into(), output.as_deref(), &mut out).await?,
        Commands::Session { file } => {
            let reader = TokioFileReader;
            let mut session = Session::new(&config, &reader);
            if let Some(file) = file {
                session.import(&file, &mut out).await?;
            }
            let stdin = std::io::stdin();
            session.run(stdin.lock(), &mut out).await?;
        }
    }

    out.flush()?;
    Ok(())
}
