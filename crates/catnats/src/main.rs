//! catnats: a terminal bridge to a NATS server.
//!
//! Connects, prints the server greeting, upgrades to TLS if the server asks,
//! sends CONNECT when credentials or options are given, then relays stdin to the
//! server and the server to stdout.
//!
//!   catnats demo.nats.io 4222
//!   catnats --user alice --pass secret --pong localhost

mod cli;
mod config;

use catnats_client::{ClientError, Exit, NoTls, TlsUpgrader, Upgrader, connect, handshake, run};
use clap::Parser;
use cli::Args;
use config::Settings;
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit code when the server cannot be reached at all.
const EXIT_CONNECT: i32 = 2;
const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("catnats: {e:#}");
        process::exit(EXIT_FAILURE);
    }

    let settings = match Settings::resolve(args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("catnats: {e:#}");
            process::exit(EXIT_FAILURE);
        }
    };

    let code = tokio::select! {
        result = serve(&settings) => exit_code(result),
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Interrupted");
            0
        }
    };

    // Exit without waiting for the runtime: a blocked stdin read would hold
    // shutdown until the user presses enter.
    process::exit(code);
}

fn init_logging() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("catnats=warn".parse()?))
        .init();
    Ok(())
}

async fn serve(settings: &Settings) -> Result<Exit, ClientError> {
    match &settings.tls {
        Some(options) => {
            let upgrader = TlsUpgrader::new(&settings.host, options)?;
            bridge(settings, &upgrader).await
        }
        None => bridge(settings, &NoTls).await,
    }
}

async fn bridge<U: Upgrader>(settings: &Settings, upgrader: &U) -> Result<Exit, ClientError> {
    let stream = connect(&settings.host, settings.port).await?;

    let mut stdout = tokio::io::stdout();
    let session = handshake(
        stream,
        upgrader,
        &settings.params,
        &mut stdout,
        settings.bridge.quiet,
    )
    .await?;
    tracing::info!("Connected to {}", session.info.label());

    run(session, tokio::io::stdin(), stdout, &settings.bridge).await
}

fn exit_code(result: Result<Exit, ClientError>) -> i32 {
    match result {
        Ok(Exit::InputFinished) => 0,
        Ok(Exit::PeerClosed) => {
            tracing::info!("Connection closed by server");
            0
        }
        Err(e) => {
            eprintln!("catnats: {e}");
            if e.is_connect() {
                EXIT_CONNECT
            } else {
                EXIT_FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_endings_exit_zero() {
        assert_eq!(exit_code(Ok(Exit::InputFinished)), 0);
        assert_eq!(exit_code(Ok(Exit::PeerClosed)), 0);
    }

    #[test]
    fn connect_failure_exits_two() {
        let err = ClientError::Connect {
            addr: "127.0.0.1:1".to_string(),
            source: std::io::ErrorKind::ConnectionRefused.into(),
        };
        assert_eq!(exit_code(Err(err)), EXIT_CONNECT);
    }

    #[test]
    fn other_failures_exit_one() {
        assert_eq!(exit_code(Err(ClientError::TlsUnavailable)), EXIT_FAILURE);
        let broken = ClientError::Transport(std::io::ErrorKind::BrokenPipe.into());
        assert_eq!(exit_code(Err(broken)), EXIT_FAILURE);
    }
}
