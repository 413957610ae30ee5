//! Command-line flags.

use clap::Parser;
use std::path::PathBuf;

/// Talk to a NATS server from the terminal.
///
/// Lines typed on stdin are sent to the server with a CRLF appended; whatever
/// the server sends is printed to stdout. An empty line ends the session.
#[derive(Debug, Parser)]
#[command(name = "catnats", version, about)]
pub struct Args {
    /// Server host name or address.
    pub host: Option<String>,

    /// Server port [default: 4222].
    pub port: Option<u16>,

    /// TOML file with defaults for any of these options.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// User name sent in CONNECT.
    #[arg(long, env = "CATNATS_USER")]
    pub user: Option<String>,

    /// Password sent in CONNECT.
    #[arg(long, env = "CATNATS_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Auth token sent in CONNECT.
    #[arg(long, env = "CATNATS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Client name sent in CONNECT.
    #[arg(long)]
    pub name: Option<String>,

    /// Ask the server to acknowledge every command with +OK.
    #[arg(long, value_name = "BOOL")]
    pub verbose: Option<bool>,

    /// Do not print anything the server sends.
    #[arg(short, long)]
    pub quiet: bool,

    /// Send stdin verbatim instead of line by line.
    #[arg(long)]
    pub raw: bool,

    /// Answer server PINGs automatically.
    #[arg(long)]
    pub pong: bool,

    /// Keep running when stdin has nothing more to give.
    #[arg(long)]
    pub no_exit: bool,

    /// PEM file with extra CA certificates to trust.
    #[arg(long, value_name = "PEM")]
    pub tls_ca: Option<PathBuf>,

    /// Skip TLS certificate verification.
    #[arg(long, conflicts_with = "no_tls")]
    pub tls_insecure: bool,

    /// Fail instead of upgrading when the server requires TLS.
    #[arg(long)]
    pub no_tls: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn host_and_port() {
        let args = Args::try_parse_from(["catnats", "demo.nats.io", "4443"]).unwrap();
        assert_eq!(args.host.as_deref(), Some("demo.nats.io"));
        assert_eq!(args.port, Some(4443));
        assert!(!args.quiet && !args.raw && !args.pong && !args.no_exit);
    }

    #[test]
    fn verbose_is_tri_state() {
        let unset = Args::try_parse_from(["catnats", "h"]).unwrap();
        assert_eq!(unset.verbose, None);

        let on = Args::try_parse_from(["catnats", "h", "--verbose", "true"]).unwrap();
        assert_eq!(on.verbose, Some(true));

        let off = Args::try_parse_from(["catnats", "h", "--verbose", "false"]).unwrap();
        assert_eq!(off.verbose, Some(false));
    }

    #[test]
    fn switches() {
        let args =
            Args::try_parse_from(["catnats", "h", "-q", "--raw", "--pong", "--no-exit"]).unwrap();
        assert!(args.quiet && args.raw && args.pong && args.no_exit);
    }

    #[test]
    fn insecure_conflicts_with_no_tls() {
        assert!(Args::try_parse_from(["catnats", "h", "--tls-insecure", "--no-tls"]).is_err());
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Args::try_parse_from(["catnats", "h", "70000"]).is_err());
    }
}
