//! The optional `CONNECT` line.

use crate::frame::CRLF;
use serde::{Deserialize, Serialize};

/// Options sent to the server in `CONNECT <json>\r\n`.
///
/// Unset fields are left out of the JSON. A value with every field unset
/// produces no line at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Ask the server to acknowledge every command with `+OK`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Client name shown in the server's connection list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ConnectParams {
    /// Params carrying a user/password pair.
    pub fn credentials(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            pass: Some(pass.into()),
            ..Self::default()
        }
    }

    /// Params carrying a bearer token.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// True when nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.verbose.is_none()
            && self.user.is_none()
            && self.pass.is_none()
            && self.auth_token.is_none()
            && self.name.is_none()
    }

    /// Whether any credential field is set.
    pub fn has_credentials(&self) -> bool {
        self.user.is_some() || self.pass.is_some() || self.auth_token.is_some()
    }

    /// The full `CONNECT` line, or `None` when there is nothing to send.
    pub fn to_line(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut line = b"CONNECT ".to_vec();
        serde_json::to_writer(&mut line, self)?;
        line.extend_from_slice(CRLF);
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_send_nothing() {
        let params = ConnectParams::default();
        assert!(params.is_empty());
        assert_eq!(params.to_line().unwrap(), None);
    }

    #[test]
    fn credentials_line() {
        let line = ConnectParams::credentials("alice", "s3cret").to_line().unwrap().unwrap();
        assert_eq!(line, b"CONNECT {\"user\":\"alice\",\"pass\":\"s3cret\"}\r\n");
    }

    #[test]
    fn verbose_false_alone_is_sent() {
        let params = ConnectParams {
            verbose: Some(false),
            ..ConnectParams::default()
        };
        assert!(!params.is_empty());
        assert!(!params.has_credentials());
        assert_eq!(params.to_line().unwrap().unwrap(), b"CONNECT {\"verbose\":false}\r\n");
    }

    #[test]
    fn token_line() {
        let line = ConnectParams::token("t0k").to_line().unwrap().unwrap();
        assert_eq!(line, b"CONNECT {\"auth_token\":\"t0k\"}\r\n");
    }

    #[test]
    fn payload_is_json_object() {
        let params = ConnectParams {
            verbose: Some(true),
            name: Some("catnats".to_string()),
            ..ConnectParams::credentials("bob", "pw")
        };
        let line = params.to_line().unwrap().unwrap();
        let json = line
            .strip_prefix(b"CONNECT ")
            .and_then(|rest| rest.strip_suffix(CRLF))
            .unwrap();
        let decoded: ConnectParams = serde_json::from_slice(json).unwrap();
        assert_eq!(decoded, params);
    }
}
