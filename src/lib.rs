//! Varlink: interface definitions and a blocking client
//!
//! Varlink services describe themselves in a small interface definition
//! language and speak NUL-terminated JSON over a stream socket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  resolver   - interface name → address  │
//! │  service    - GetInfo / descriptions    │
//! ├─────────────────────────────────────────┤
//! │  connection - framing, calls, replies   │
//! ├─────────────────────────────────────────┤
//! │  idl        - parse, render, defaults   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! A typical introspection round trip:
//!
//! ```no_run
//! use varlink::{Config, Resolver};
//!
//! # fn main() -> varlink::Result<()> {
//! let resolver = Resolver::from_config(&Config::from_env());
//! let mut connection = resolver.connect("org.example.more")?;
//! let interface = connection.get_interface("org.example.more")?;
//! println!("{interface}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod idl;
pub mod resolver;
pub mod service;

pub use config::Config;
pub use connection::{Address, CallFlags, Canceller, Connection, PendingReply, Reply};
pub use error::{Error, ErrorKind, Result, ServiceError, INTERFACE_NOT_FOUND};
pub use idl::{parse_interface, DefaultValue, Interface, ParseError, Type};
pub use resolver::Resolver;
pub use service::ServiceInfo;
