//! `org.varlink.resolver`: maps interface names to service addresses.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::service::ServiceInfo;

pub const RESOLVER_INTERFACE: &str = "org.varlink.resolver";
pub const RESOLVE: &str = "org.varlink.resolver.Resolve";
pub const RESOLVER_GET_INFO: &str = "org.varlink.resolver.GetInfo";

#[derive(Deserialize)]
struct ResolveReply {
    address: String,
}

/// Client for the resolver service. Every operation dials the resolver
/// afresh and closes the connection afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    address: String,
}

impl Resolver {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolver_address.clone())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Address of the service implementing `interface`.
    ///
    /// The resolver's own interface is answered locally. Service errors,
    /// including [`crate::INTERFACE_NOT_FOUND`], are returned unchanged.
    pub fn resolve(&self, interface: &str) -> Result<String> {
        if interface == RESOLVER_INTERFACE {
            return Ok(self.address.clone());
        }

        let mut connection = Connection::dial(&self.address)?;
        let reply: ResolveReply =
            connection.call(RESOLVE, Some(json!({ "interface": interface })))?;
        connection.close()?;

        debug!(interface, address = %reply.address, "resolved interface");
        Ok(reply.address)
    }

    /// Vendor information and the list of registered interfaces.
    pub fn get_info(&self) -> Result<ServiceInfo> {
        let mut connection = Connection::dial(&self.address)?;
        let info = connection.call(RESOLVER_GET_INFO, None)?;
        connection.close()?;
        Ok(info)
    }

    /// Resolve `interface` and dial the service behind it.
    pub fn connect(&self, interface: &str) -> Result<Connection> {
        let address = self.resolve(interface)?;
        Connection::dial(&address)
    }

    /// Call a fully-qualified method (`<interface>.<Method>`) on whichever
    /// service implements its interface.
    pub fn call(&self, method: &str, parameters: Option<Value>) -> Result<Value> {
        let interface = interface_of(method)?;
        let mut connection = self.connect(interface)?;
        let reply = connection.call(method, parameters)?;
        connection.close()?;
        Ok(reply)
    }
}

/// `org.example.more.TestMore` -> `org.example.more`
pub fn interface_of(method: &str) -> Result<&str> {
    match method.rsplit_once('.') {
        Some((interface, member)) if !interface.is_empty() && !member.is_empty() => Ok(interface),
        _ => Err(Error::InvalidMethodName(method.to_string())),
    }
}
