//! Line framing for server-sent event streams.

const DATA_PREFIX: &str = "data:";

/// Reassembles `\n`-terminated lines from arbitrarily split byte chunks.
///
/// Bytes are buffered rather than text so a multi-byte character split across
/// two network reads is decoded intact.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the `data:` payloads of every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(payload) = data_payload(&String::from_utf8_lossy(&line)) {
                payloads.push(payload.to_string());
            }
        }
        payloads
    }

    /// Flush a trailing line left unterminated when the stream closed
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        data_payload(&String::from_utf8_lossy(&self.pending)).map(str::to_string)
    }
}

/// Extract the payload of a `data:` line, `None` for any other line
pub fn data_payload(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    Some(payload.strip_prefix(' ').unwrap_or(payload))
}
