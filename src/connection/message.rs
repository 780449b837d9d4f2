//! Call and reply envelopes.
//!
//! Each message on the wire is one compact JSON object followed by a single
//! NUL byte.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;

bitflags! {
    /// Per-call flags for [`super::Connection::send`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CallFlags: u8 {
        /// The caller accepts a stream of replies.
        const MORE = 1 << 0;
        /// The service must not reply.
        const ONEWAY = 1 << 1;
    }
}

impl CallFlags {
    pub const NONE: CallFlags = CallFlags::empty();
}

impl Default for CallFlags {
    fn default() -> Self {
        Self::NONE
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize)]
pub(crate) struct CallMessage<'a> {
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<&'a Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub more: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub oneway: bool,
}

impl CallMessage<'_> {
    /// Serialized frame including the NUL terminator.
    pub fn to_frame(&self) -> serde_json::Result<Vec<u8>> {
        let mut frame = serde_json::to_vec(self)?;
        frame.push(0);
        Ok(frame)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyMessage {
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub continues: bool,
}
