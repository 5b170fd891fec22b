//! Wires a loaded configuration into a running directory: binds the TCP
//! listener, drives the epoch timer, and reloads policy on SIGHUP.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use coniks_config::DirectoryConfig;
use coniks_crypto::{SigningKeyPair, VrfKeyPair};
use coniks_directory::Directory;
use coniks_pad::Pad;
use coniks_str::Policies;
use rand::rngs::OsRng;
use tokio::net::TcpListener;

use crate::protocol;

fn load_or_create_sign_key(path: &Path) -> Result<SigningKeyPair> {
    if path.exists() {
        let seed = load_seed(path)?;
        return Ok(SigningKeyPair::from_seed(&seed));
    }
    let key = SigningKeyPair::generate(&mut OsRng);
    std::fs::write(path, key.seed()).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "generated signing key");
    Ok(key)
}

fn load_or_create_vrf_key(path: &Path) -> Result<VrfKeyPair> {
    if path.exists() {
        let seed = load_seed(path)?;
        return Ok(VrfKeyPair::from_seed(&seed));
    }
    let key = VrfKeyPair::generate(&mut OsRng);
    std::fs::write(path, key.seed()).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "generated VRF key");
    Ok(key)
}

fn load_seed(path: &Path) -> Result<[u8; 32]> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let seed: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("key file {} is not 32 bytes", path.display()))?;
    Ok(seed)
}

pub async fn run(config: DirectoryConfig, config_path: std::path::PathBuf) -> Result<()> {
    let sign_key = load_or_create_sign_key(&config.sign_key_path)?;
    let vrf_key = load_or_create_vrf_key(&config.vrf_key_path)?;

    let policies = Policies::new(config.epoch_deadline_secs, vrf_key.public_key());
    let pad = Pad::new(policies, sign_key, vrf_key, config.capacity, &mut OsRng);
    let directory = Arc::new(Directory::new(pad));

    spawn_epoch_timer(directory.clone(), config.epoch_deadline_secs);
    spawn_reload_handler(directory.clone(), config_path)?;

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    tracing::info!(address = %config.bind_address, "directory server listening");

    loop {
        let (socket, peer) = listener.accept().await.context("accepting connection")?;
        tracing::debug!(%peer, "accepted connection");
        let directory = directory.clone();
        tokio::spawn(async move {
            protocol::handle_connection(directory, socket).await;
        });
    }
}

fn spawn_epoch_timer(directory: Arc<Directory>, epoch_deadline_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(epoch_deadline_secs));
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            let str = directory.update();
            tracing::info!(epoch = str.epoch.get(), "advanced epoch");
        }
    });
}

/// The config file's own path doubles as the thing a SIGHUP reload
/// re-reads; only `epoch_deadline_secs` is pushed into the live directory,
/// per spec.md §4.5's "takes effect at the next Update".
fn spawn_reload_handler(directory: Arc<Directory>, config_path: std::path::PathBuf) -> Result<()> {
    #[cfg(unix)]
    {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
            .context("registering SIGHUP handler")?;
        tokio::spawn(async move {
            loop {
                if signal.recv().await.is_none() {
                    break;
                }
                match DirectoryConfig::reload(&config_path) {
                    Ok(config) => directory.set_policies(config.epoch_deadline_secs),
                    Err(error) => tracing::warn!(%error, "failed to reload configuration"),
                }
            }
        });
    }
    #[cfg(not(unix))]
    {
        let _ = (directory, config_path);
    }
    Ok(())
}
