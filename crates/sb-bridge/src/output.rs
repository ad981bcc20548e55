//! Capture of remote command output

use bytes::BytesMut;

use sb_core::CommandResult;

/// Appended when output was cut at the byte limit
pub const TRUNCATION_MARKER: &str = "\n… (output truncated)";

/// Combined stdout/stderr of one command, capped at a byte limit
#[derive(Debug)]
pub struct CapturedOutput {
    buffer: BytesMut,
    limit: usize,
    truncated: bool,
}

impl CapturedOutput {
    /// Create an empty capture that keeps at most `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(limit.min(8192)),
            limit,
            truncated: false,
        }
    }

    /// Append a chunk of channel data
    pub fn push(&mut self, data: &[u8]) {
        let room = self.limit.saturating_sub(self.buffer.len());
        if data.len() > room {
            self.truncated = true;
        }
        self.buffer.extend_from_slice(&data[..data.len().min(room)]);
    }

    /// Whether data was dropped because of the limit
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Classify the capture into a command result
    pub fn finish(self) -> CommandResult {
        let text = decode(&self.buffer);
        match CommandResult::from_captured(&text) {
            CommandResult::Output(mut output) if self.truncated => {
                output.push_str(TRUNCATION_MARKER);
                CommandResult::Output(output)
            }
            // Only whitespace survived the cut, but the command did print something
            CommandResult::EmptyOutput if self.truncated => {
                CommandResult::Output(TRUNCATION_MARKER.trim_start().to_string())
            }
            result => result,
        }
    }
}

/// Decode as UTF-8, dropping a multi-byte character split by truncation
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
