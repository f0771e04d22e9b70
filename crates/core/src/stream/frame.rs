use crate::domain::event::StreamEvent;

const FRAME_DELIMITER: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";

/// Splits a chunked event-stream body into blank-line-delimited frames.
///
/// Bytes are buffered rather than text so a multi-byte character split across
/// two chunks is decoded only once the whole frame has arrived.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    // Prefix of `buffer` already known to hold no delimiter.
    scanned: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every frame it completed, in order. The
    /// incomplete tail stays buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        let mut from = self.scanned.saturating_sub(FRAME_DELIMITER.len() - 1);
        while let Some(pos) = find_delimiter(&self.buffer[from..]) {
            let end = from + pos;
            frames.push(String::from_utf8_lossy(&self.buffer[start..end]).into_owned());
            start = end + FRAME_DELIMITER.len();
            from = start;
        }
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        frames
    }

    /// Drains whatever is left once the transport has closed.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let tail = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.scanned = 0;
        Some(tail)
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(FRAME_DELIMITER.len())
        .position(|w| w == FRAME_DELIMITER)
}

/// Decodes one frame. Frames without the `data: ` marker and payloads that
/// are not a valid event object yield `None`.
pub fn decode_frame(frame: &str) -> Option<StreamEvent> {
    let line = frame.trim();
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        if !line.is_empty() {
            tracing::debug!(frame = %line, "skipping frame without data prefix");
        }
        return None;
    };

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!(error = %err, "skipping undecodable frame");
            None
        }
    }
}
