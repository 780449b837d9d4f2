//! Blocking client connection to a varlink service.
//!
//! A connection carries one call at a time. [`Connection::send`] writes a
//! call and hands back a [`PendingReply`] that borrows the connection until
//! it is dropped; replies are read with [`PendingReply::receive`] for as long
//! as the service sets `continues`.
//!
//! ```no_run
//! use varlink::{CallFlags, Connection};
//! use serde_json::{json, Value};
//!
//! # fn main() -> varlink::Result<()> {
//! let mut connection = Connection::dial("unix:/run/org.example.more")?;
//! let mut pending = connection.send(
//!     "org.example.more.TestMore",
//!     Some(json!({"n": 3})),
//!     CallFlags::MORE,
//! )?;
//! loop {
//!     let reply = pending.receive::<Value>()?;
//!     println!("{:?}", reply.parameters);
//!     if !reply.continues {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod address;
mod message;
mod stream;

pub use address::Address;
pub use message::CallFlags;

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result, ServiceError};
use message::{CallMessage, ReplyMessage};
use stream::Stream;

/// One decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    /// `None` when the reply carried no `parameters` member.
    pub parameters: Option<T>,
    /// More replies to the same call follow.
    pub continues: bool,
}

pub struct Connection {
    address: String,
    state: State,
}

enum State {
    Open(Io),
    /// An I/O or framing failure left the stream at an unknown position.
    Broken,
    Closed,
}

struct Io {
    reader: BufReader<Stream>,
    writer: BufWriter<Stream>,
    /// A reply stream has not been drained yet.
    in_flight: bool,
}

impl Connection {
    /// Connect to `<transport>:<endpoint>[;<parameters>]`.
    pub fn dial(address: &str) -> Result<Self> {
        let parsed: Address = address.parse()?;
        debug!(address, "dialing");
        let stream = Stream::connect(&parsed)?;
        Self::from_stream(address, stream)
    }

    #[cfg(unix)]
    pub fn from_unix_stream(stream: UnixStream) -> Result<Self> {
        let path = stream
            .peer_addr()
            .ok()
            .and_then(|peer| peer.as_pathname().map(|path| path.display().to_string()));
        let address = format!("unix:{}", path.unwrap_or_default());
        Self::from_stream(address, Stream::Unix(stream))
    }

    pub fn from_tcp_stream(stream: TcpStream) -> Result<Self> {
        let address = match stream.peer_addr() {
            Ok(peer) => format!("tcp:{peer}"),
            Err(_) => "tcp:".to_string(),
        };
        Self::from_stream(address, Stream::Tcp(stream))
    }

    fn from_stream(address: impl Into<String>, stream: Stream) -> Result<Self> {
        let writer = BufWriter::new(stream.try_clone()?);
        Ok(Self {
            address: address.into(),
            state: State::Open(Io {
                reader: BufReader::new(stream),
                writer,
                in_flight: false,
            }),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// A handle that can shut the socket down from another thread,
    /// unblocking a pending read.
    pub fn canceller(&self) -> Result<Canceller> {
        let Io { reader, .. } = self.io()?;
        Ok(Canceller {
            stream: reader.get_ref().try_clone()?,
        })
    }

    /// Write a call. `More` and `Oneway` together are rejected before
    /// anything reaches the socket.
    pub fn send(
        &mut self,
        method: &str,
        parameters: Option<Value>,
        flags: CallFlags,
    ) -> Result<PendingReply<'_>> {
        let more = flags.contains(CallFlags::MORE);
        let oneway = flags.contains(CallFlags::ONEWAY);
        if more && oneway {
            return Err(Error::ConflictingFlags);
        }

        let io = self.io_mut()?;
        if io.in_flight {
            return Err(Error::CallInProgress);
        }

        let frame = CallMessage {
            method,
            parameters: parameters.as_ref(),
            more,
            oneway,
        }
        .to_frame()?;

        trace!(method, more, oneway, bytes = frame.len(), "sending call");
        let written = io
            .writer
            .write_all(&frame)
            .and_then(|()| io.writer.flush());
        if let Err(err) = written {
            return Err(self.fail(err));
        }

        if let State::Open(io) = &mut self.state {
            io.in_flight = !oneway;
        }

        Ok(PendingReply {
            connection: self,
            more,
            done: oneway,
        })
    }

    /// Send a call without flags and read its single reply. A reply without
    /// `parameters` decodes as an empty object. Parameters that do not fit
    /// `T` fail with [`Error::Decode`] and leave the connection usable.
    pub fn call<T: DeserializeOwned>(&mut self, method: &str, parameters: Option<Value>) -> Result<T> {
        let reply = self.send(method, parameters, CallFlags::NONE)?.receive::<Value>()?;
        let parameters = reply
            .parameters
            .unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::from_value(parameters).map_err(Error::Decode)
    }

    /// Release the socket. Closing twice is an error.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Closed => Err(Error::ConnectionClosed),
            State::Broken => Ok(()),
            State::Open(io) => {
                debug!(address = %self.address, "closing connection");
                if let Err(err) = io.reader.get_ref().shutdown() {
                    // The peer may already be gone.
                    trace!(%err, "shutdown failed");
                }
                Ok(())
            }
        }
    }

    fn io(&self) -> Result<&Io> {
        match &self.state {
            State::Open(io) => Ok(io),
            State::Broken => Err(Error::ConnectionBroken),
            State::Closed => Err(Error::ConnectionClosed),
        }
    }

    fn io_mut(&mut self) -> Result<&mut Io> {
        match &mut self.state {
            State::Open(io) => Ok(io),
            State::Broken => Err(Error::ConnectionBroken),
            State::Closed => Err(Error::ConnectionClosed),
        }
    }

    /// Mark the connection unusable after a transport or framing failure.
    fn fail(&mut self, err: impl Into<Error>) -> Error {
        let err = err.into();
        warn!(address = %self.address, %err, "connection failed");
        self.state = State::Broken;
        err
    }

    fn read_reply(&mut self) -> Result<ReplyMessage> {
        let frame = match read_frame(&mut self.io_mut()?.reader) {
            Ok(frame) => frame,
            Err(err) => return Err(self.fail(err)),
        };
        trace!(bytes = frame.len(), "received reply");

        let reply: ReplyMessage = match serde_json::from_slice(&frame) {
            Ok(reply) => reply,
            Err(err) => return Err(self.fail(err)),
        };

        if let State::Open(io) = &mut self.state {
            io.in_flight = reply.continues;
        }
        Ok(reply)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let State::Open(io) = &self.state {
            let _ = io.reader.get_ref().shutdown();
        }
    }
}

/// Read up to and including the next NUL; return the bytes before it.
fn read_frame(reader: &mut impl BufRead) -> io::Result<Vec<u8>> {
    let mut frame = Vec::new();
    reader.read_until(0, &mut frame)?;
    match frame.pop() {
        Some(0) => Ok(frame),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before end of message",
        )),
    }
}

/// The receiving half of one call.
pub struct PendingReply<'c> {
    connection: &'c mut Connection,
    /// The call asked for a stream of replies.
    more: bool,
    done: bool,
}

impl PendingReply<'_> {
    /// Whether the last reply of this call has been read (always true for
    /// oneway calls).
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Read the next reply.
    ///
    /// An error reply becomes [`Error::Service`] and its parameters are not
    /// decoded as `T`. A reply that sets `continues` for a call made without
    /// [`CallFlags::MORE`] breaks the connection.
    pub fn receive<T: DeserializeOwned>(&mut self) -> Result<Reply<T>> {
        if self.done {
            return Err(Error::NoReplyPending);
        }

        let reply = match self.connection.read_reply() {
            Ok(reply) => reply,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        if reply.continues && !self.more {
            self.done = true;
            return Err(self
                .connection
                .fail(Error::ProtocolViolation("continues set on a call without More")));
        }
        self.done = !reply.continues;

        if let Some(name) = reply.error {
            debug!(error = %name, "service returned error");
            return Err(ServiceError::new(name, reply.parameters).into());
        }

        let parameters = reply
            .parameters
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::Decode)?;

        Ok(Reply {
            parameters,
            continues: reply.continues,
        })
    }
}

/// Shuts a connection's socket down from another thread.
#[derive(Debug)]
pub struct Canceller {
    stream: Stream,
}

impl Canceller {
    pub fn cancel(&self) -> Result<()> {
        self.stream.shutdown()?;
        Ok(())
    }
}
