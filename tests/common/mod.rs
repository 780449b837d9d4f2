//! A scripted varlink peer for integration tests.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use serde_json::Value;

/// Decides the replies to one call. Returning an empty list sends nothing.
pub type Handler = dyn Fn(&Value) -> Vec<Value> + Send + Sync + 'static;

/// Serves calls on a Unix socket inside a temporary directory and records
/// every call it sees.
pub struct FakeService {
    _dir: tempfile::TempDir,
    path: PathBuf,
    calls: mpsc::Receiver<Value>,
}

impl FakeService {
    pub fn spawn(name: &str, handler: impl Fn(&Value) -> Vec<Value> + Send + Sync + 'static) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(name);
        let listener = UnixListener::bind(&path).expect("bind");
        let (tx, calls) = mpsc::channel();
        let handler: std::sync::Arc<Handler> = std::sync::Arc::new(handler);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let tx = tx.clone();
                let handler = handler.clone();
                thread::spawn(move || {
                    let mut writer = stream.try_clone().expect("clone");
                    let mut reader = BufReader::new(stream);
                    loop {
                        let mut frame = Vec::new();
                        match reader.read_until(0, &mut frame) {
                            Ok(0) | Err(_) => break,
                            Ok(_) => {}
                        }
                        if frame.pop() != Some(0) {
                            break;
                        }
                        let call: Value = serde_json::from_slice(&frame).expect("call");
                        let replies = handler(&call);
                        if tx.send(call).is_err() {
                            break;
                        }
                        for reply in replies {
                            let mut out = serde_json::to_vec(&reply).expect("encode");
                            out.push(0);
                            if writer.write_all(&out).is_err() {
                                return;
                            }
                        }
                    }
                });
            }
        });

        Self {
            _dir: dir,
            path,
            calls,
        }
    }

    pub fn address(&self) -> String {
        format!("unix:{}", self.path.display())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<Value> {
        self.calls.try_iter().collect()
    }
}
