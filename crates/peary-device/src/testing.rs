use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use bytes::Bytes;
use peary_session::command::join_command;
use peary_session::{Protocol, ProtocolError, ProtocolHandle};

/// Scripted reply to one request payload.
pub(crate) enum Reply {
    Ok(&'static str),
    Fail(u16, &'static str),
}

/// Protocol double that records every request payload.
///
/// Payloads without a scripted reply are answered with an empty success.
#[derive(Default)]
pub(crate) struct RecordingProtocol {
    replies: HashMap<String, VecDeque<Reply>>,
    pub(crate) requests: Vec<String>,
}

impl RecordingProtocol {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for the next request whose payload equals `payload`.
    pub(crate) fn on(mut self, payload: &str, reply: Reply) -> Self {
        self.replies
            .entry(payload.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn into_handle(self) -> (ProtocolHandle, Rc<RefCell<RecordingProtocol>>) {
        let shared = Rc::new(RefCell::new(self));
        let handle: ProtocolHandle = shared.clone();
        (handle, shared)
    }
}

impl Protocol for RecordingProtocol {
    fn request(&mut self, command: &str, args: &[&str]) -> peary_session::Result<Bytes> {
        let payload = join_command(command, args);
        let reply = self
            .replies
            .get_mut(&payload)
            .and_then(VecDeque::pop_front);
        self.requests.push(payload);

        match reply {
            None => Ok(Bytes::new()),
            Some(Reply::Ok(text)) => Ok(Bytes::from_static(text.as_bytes())),
            Some(Reply::Fail(status, reason)) => Err(ProtocolError::Status {
                command: command.to_string(),
                status,
                reason: reason.to_string(),
            }),
        }
    }
}
