//! CONIKS directory server: CLI entry point.
//!
//! `serve` runs a directory over newline-delimited JSON TCP (spec.md §6);
//! `keygen` produces a fresh signing/VRF keypair, grounded on
//! `coniks-crypto`'s key types rather than rolling its own RNG wiring.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coniks_crypto::{SigningKeyPair, VrfKeyPair};
use rand::rngs::OsRng;

mod protocol;
mod server;

#[derive(Parser)]
#[command(name = "coniks-server", about = "A key-transparency directory server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a directory server from a configuration file.
    Serve {
        /// Path to the TOML configuration file.
        #[arg(short, long, default_value = "coniks.toml")]
        config: PathBuf,
    },
    /// Generate a fresh signing/VRF keypair and write their seeds to disk.
    Keygen {
        /// Where to write the Ed25519 signing key seed.
        #[arg(long, default_value = "sign.key")]
        sign_key_path: PathBuf,
        /// Where to write the VRF key seed.
        #[arg(long, default_value = "vrf.key")]
        vrf_key_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config: config_path } => {
            let config = coniks_config::DirectoryConfig::load(&config_path)
                .with_context(|| format!("loading configuration from {}", config_path.display()))?;
            tracing_subscriber::fmt().with_env_filter(config.log_level.clone()).init();
            server::run(config, config_path).await
        }
        Command::Keygen { sign_key_path, vrf_key_path } => {
            tracing_subscriber::fmt::init();
            keygen(&sign_key_path, &vrf_key_path)
        }
    }
}

fn keygen(sign_key_path: &std::path::Path, vrf_key_path: &std::path::Path) -> Result<()> {
    let sign_key = SigningKeyPair::generate(&mut OsRng);
    let vrf_key = VrfKeyPair::generate(&mut OsRng);
    std::fs::write(sign_key_path, sign_key.seed())
        .with_context(|| format!("writing {}", sign_key_path.display()))?;
    std::fs::write(vrf_key_path, vrf_key.seed())
        .with_context(|| format!("writing {}", vrf_key_path.display()))?;
    tracing::info!(
        sign_key_path = %sign_key_path.display(),
        vrf_key_path = %vrf_key_path.display(),
        "generated directory keys"
    );
    Ok(())
}
