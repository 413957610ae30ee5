//! Settings resolution: built-in defaults, then the config file, then flags.
//!
//! Credentials read from the environment arrive through the flags, so they
//! also override the file. Switches are additive: a switch set in either
//! place is on.

use crate::cli::Args;
use anyhow::{Context, bail};
use catnats_client::{BridgeConfig, ConnectParams, Framing, TlsOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 4222;

/// Contents of the `--config` file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub token: Option<String>,
    pub name: Option<String>,
    pub verbose: Option<bool>,
    pub quiet: bool,
    pub raw: bool,
    pub pong: bool,
    pub no_exit: bool,
    pub tls_ca: Option<PathBuf>,
    pub tls_insecure: bool,
    pub no_tls: bool,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Everything the client needs, fully resolved.
#[derive(Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub params: ConnectParams,
    pub bridge: BridgeConfig,
    /// `None` when TLS upgrades are refused.
    pub tls: Option<TlsOptions>,
}

impl Settings {
    pub fn resolve(args: Args) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: Args, file: FileConfig) -> anyhow::Result<Self> {
        let Some(host) = args.host.or(file.host) else {
            bail!("no server host given");
        };
        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        if port == 0 {
            bail!("port must be between 1 and 65535");
        }

        let params = ConnectParams {
            verbose: args.verbose.or(file.verbose),
            user: args.user.or(file.user),
            pass: args.pass.or(file.pass),
            auth_token: args.token.or(file.token),
            name: args.name.or(file.name),
        };

        let bridge = BridgeConfig {
            framing: if args.raw || file.raw {
                Framing::Raw
            } else {
                Framing::Line
            },
            quiet: args.quiet || file.quiet,
            auto_pong: args.pong || file.pong,
            exit_on_empty: !(args.no_exit || file.no_exit),
            ..BridgeConfig::default()
        };

        let insecure = args.tls_insecure || file.tls_insecure;
        let no_tls = args.no_tls || file.no_tls;
        if insecure && no_tls {
            bail!("tls_insecure and no_tls cannot both be set");
        }
        let tls = (!no_tls).then(|| TlsOptions {
            ca_file: args.tls_ca.or(file.tls_ca),
            insecure,
        });

        Ok(Self {
            host,
            port,
            params,
            bridge,
            tls,
        })
    }
}
