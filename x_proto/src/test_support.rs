//! A scripted in-memory [Transport] used by the state-machine tests in
//! [crate::read_x] and [crate::write_x].

use std::collections::VecDeque;
use std::vec::Vec;

use crate::transport::Transport;

/// One scripted response to a [Transport::recv] call.
#[derive(Debug, Clone)]
pub enum ScriptedRecv {
    Data(Vec<u8>),
    Timeout,
}

/// A [Transport] whose `recv` plays back a fixed script and whose
/// `send` records every frame it was given, in order.
pub struct MockTransport {
    script: VecDeque<ScriptedRecv>,
    pub sent: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new(script: Vec<ScriptedRecv>) -> Self {
        Self {
            script: script.into(),
            sent: Vec::new(),
        }
    }
}

impl Transport for MockTransport {
    type SendError = ();
    type RecvError = ();

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::SendError> {
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<Option<usize>, Self::RecvError> {
        match self.script.pop_front() {
            Some(ScriptedRecv::Data(data)) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok(Some(data.len()))
            }
            Some(ScriptedRecv::Timeout) | None => Ok(None),
        }
    }
}
