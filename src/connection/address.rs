//! `<transport>:<endpoint>[;<parameters>]` service addresses.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// `unix:<path>`
    Unix(PathBuf),
    /// `tcp:<host>:<port>`
    Tcp(String),
}

impl FromStr for Address {
    type Err = Error;

    /// Anything after `;` is accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (transport, rest) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;

        let endpoint = match rest.split_once(';') {
            Some((endpoint, _parameters)) => endpoint,
            None => rest,
        };
        if endpoint.is_empty() {
            return Err(Error::InvalidAddress(s.to_string()));
        }

        match transport {
            "unix" => Ok(Address::Unix(PathBuf::from(endpoint))),
            "tcp" => Ok(Address::Tcp(endpoint.to_string())),
            other => Err(Error::UnsupportedTransport(other.to_string())),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Unix(path) => write!(f, "unix:{}", path.display()),
            Address::Tcp(endpoint) => write!(f, "tcp:{endpoint}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_addresses() {
        assert_eq!(
            "unix:/run/org.varlink.resolver".parse::<Address>().expect("unix"),
            Address::Unix(PathBuf::from("/run/org.varlink.resolver"))
        );
        assert_eq!(
            "tcp:127.0.0.1:12345".parse::<Address>().expect("tcp"),
            Address::Tcp("127.0.0.1:12345".into())
        );
        assert_eq!(
            "unix:/run/io.systemd;mode=0666".parse::<Address>().expect("params"),
            Address::Unix(PathBuf::from("/run/io.systemd"))
        );
    }

    #[test]
    fn reject_bad_addresses() {
        assert!(matches!(
            "/run/socket".parse::<Address>(),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!("unix:".parse::<Address>(), Err(Error::InvalidAddress(_))));
        assert!(matches!(
            "unix:;mode=0666".parse::<Address>(),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            "udp:localhost:1".parse::<Address>(),
            Err(Error::UnsupportedTransport(t)) if t == "udp"
        ));
    }

    #[test]
    fn display_round_trips() {
        for text in ["unix:/tmp/x", "tcp:[::1]:80"] {
            assert_eq!(text.parse::<Address>().expect("parse").to_string(), text);
        }
    }
}
