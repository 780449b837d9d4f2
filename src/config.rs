//! Process-wide settings, read once at startup.

/// Where the resolver listens unless configured otherwise.
pub const DEFAULT_RESOLVER_ADDRESS: &str = "unix:/run/org.varlink.resolver";

/// Environment variable overriding the resolver address.
pub const RESOLVER_ADDRESS_ENV: &str = "VARLINK_RESOLVER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub resolver_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver_address: DEFAULT_RESOLVER_ADDRESS.to_string(),
        }
    }
}

impl Config {
    /// Read `VARLINK_RESOLVER`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(address) = lookup(RESOLVER_ADDRESS_ENV).filter(|a| !a.is_empty()) {
            config.resolver_address = address;
        }
        config
    }
}
