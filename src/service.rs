//! `org.varlink.service`: the introspection calls every service answers.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::idl::{parse_interface, Interface};

pub const GET_INFO: &str = "org.varlink.service.GetInfo";
pub const GET_INTERFACE_DESCRIPTION: &str = "org.varlink.service.GetInterfaceDescription";

/// Reply of `GetInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub url: String,
    pub interfaces: Vec<String>,
}

#[derive(Deserialize)]
struct DescriptionReply {
    description: String,
}

impl Connection {
    pub fn get_info(&mut self) -> Result<ServiceInfo> {
        self.call(GET_INFO, None)
    }

    /// The raw IDL text of `interface`.
    pub fn get_interface_description(&mut self, interface: &str) -> Result<String> {
        let reply: DescriptionReply = self.call(
            GET_INTERFACE_DESCRIPTION,
            Some(json!({ "interface": interface })),
        )?;
        Ok(reply.description)
    }

    /// Fetch and parse the description of `interface`.
    pub fn get_interface(&mut self, interface: &str) -> Result<Interface> {
        let description = self.get_interface_description(interface)?;
        debug!(interface, bytes = description.len(), "parsing interface description");
        parse_interface(&description).map_err(|_| Error::InvalidInterface(interface.to_string()))
    }
}
