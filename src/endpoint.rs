use std::{fmt, str::FromStr};

use crate::error::{ClientErr, Result};

/// A validated `host:port` address of the coordinating server.
///
/// Validation is purely syntactic; reachability is the transport's problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parses and validates a `host:port` string.
    ///
    /// # Errors
    /// Returns `ClientErr::InvalidEndpoint` when the host is empty or
    /// contains whitespace, or the port is not a number in `1..=65535`.
    pub fn parse(s: &str) -> Result<Self> {
        let Some((host, port)) = s.rsplit_once(':') else {
            return Err(invalid(s, "expected a host:port pair"));
        };

        if host.is_empty() {
            return Err(invalid(s, "host is empty"));
        }
        if host.contains(char::is_whitespace) {
            return Err(invalid(s, "host contains whitespace"));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| invalid(s, "port is not a number in 1..=65535"))?;
        if port == 0 {
            return Err(invalid(s, "port must be non-zero"));
        }

        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ClientErr;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn invalid(given: &str, reason: &'static str) -> ClientErr {
    ClientErr::InvalidEndpoint {
        given: given.to_owned(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_host_and_port() {
        let ep = Endpoint::parse("10.0.2.2:8080").unwrap();
        assert_eq!(ep.host(), "10.0.2.2");
        assert_eq!(ep.port(), 8080);
        assert_eq!(ep.to_string(), "10.0.2.2:8080");
    }

    #[test]
    fn accepts_ipv6_style_hosts() {
        // rsplit keeps everything before the last colon as the host.
        let ep = Endpoint::parse("::1:9000").unwrap();
        assert_eq!(ep.host(), "::1");
        assert_eq!(ep.port(), 9000);
    }

    #[test]
    fn rejects_malformed_inputs() {
        for bad in ["", "localhost", ":80", "host:", "host:abc", "host:0", "host:99999", "a b:80"] {
            let err = Endpoint::parse(bad).unwrap_err();
            assert!(
                matches!(err, ClientErr::InvalidEndpoint { .. }),
                "{bad:?} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn from_str_round_trip() {
        let ep: Endpoint = "server.local:50051".parse().unwrap();
        assert_eq!(ep.to_string(), "server.local:50051");
    }
}
