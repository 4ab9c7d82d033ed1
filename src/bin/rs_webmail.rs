use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::Parser;

use rs_webmail::config::{load_config, load_config_from};
use rs_webmail::store::memory::MemoryStore;
use rs_webmail::terminal::{Outcome, Shell};
use rs_webmail::webmail::Webmail;

#[derive(Parser)]
#[command(name = "rs_webmail")]
#[command(about = "Browse an IMAP inbox with just an address and a password", long_about = None)]
struct Cli {
    /// Email address to log in with
    address: String,

    /// Config file (defaults to <config dir>/rs_webmail/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print listings and messages as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .map_err(|e| anyhow!("Configuration error: {e:#}"))?;

    let webmail = Webmail::from_config(&cfg);
    let store = MemoryStore::new();

    let secret = rpassword::prompt_password(format!("Password for {}: ", cli.address))?;
    let token = match webmail.open_session(&store, &cli.address, &secret) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    drop(secret);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let outcome = Shell::new(&webmail, &store, token)
        .json(cli.json)
        .run(stdin.lock(), &mut stdout)?;

    Ok(match outcome {
        Outcome::Expired => ExitCode::from(2),
        Outcome::LoggedOut | Outcome::EndOfInput => ExitCode::SUCCESS,
    })
}
