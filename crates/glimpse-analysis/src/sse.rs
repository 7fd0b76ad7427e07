use serde::Deserialize;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq)]
pub enum SseItem {
    Delta(String),
    Done,
}

/// Counters for one decoded stream.
///
/// Lines are only parsed once complete, so a `malformed` event is genuinely
/// corrupt and never a chunk that was still in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub events: u64,
    pub deltas: u64,
    /// Well-formed events without text (role headers, finish reasons)
    pub empty: u64,
    pub malformed: u64,
}

impl DecodeStats {
    pub fn skipped(&self) -> u64 {
        self.empty + self.malformed
    }
}

#[derive(Deserialize)]
struct ChunkEvent {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental `text/event-stream` decoder for chat-completion chunks.
///
/// Bytes are buffered until a newline, so the output does not depend on how
/// the transport split the stream (multi-byte characters included).
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
    stats: DecodeStats,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseItem> {
        let mut items = Vec::new();
        if self.done {
            return items;
        }

        self.buffer.extend_from_slice(chunk);
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let item = self.decode_line(start, end);
            start = end + 1;

            if let Some(item) = item {
                let done = item == SseItem::Done;
                items.push(item);
                if done {
                    self.done = true;
                    self.buffer.clear();
                    return items;
                }
            }
        }
        self.buffer.drain(..start);

        items
    }

    /// Flush a final line the server did not terminate with a newline
    pub fn finish(&mut self) -> Vec<SseItem> {
        if self.done || self.buffer.is_empty() {
            return Vec::new();
        }
        let end = self.buffer.len();
        let item = self.decode_line(0, end);
        self.buffer.clear();
        if item == Some(SseItem::Done) {
            self.done = true;
        }
        item.into_iter().collect()
    }

    fn decode_line(&mut self, start: usize, end: usize) -> Option<SseItem> {
        let line = match std::str::from_utf8(&self.buffer[start..end]) {
            Ok(line) => line.trim(),
            Err(_) => {
                self.stats.malformed += 1;
                tracing::debug!("Skipping SSE line with invalid UTF-8");
                return None;
            }
        };

        // Blank separators, comments and other fields carry nothing for us
        let data = line.strip_prefix(DATA_PREFIX)?.trim_start();
        if data == DONE_SENTINEL {
            return Some(SseItem::Done);
        }

        self.stats.events += 1;
        match serde_json::from_str::<ChunkEvent>(data) {
            Ok(event) => {
                let content = event
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta)
                    .and_then(|d| d.content)
                    .filter(|text| !text.is_empty());

                match content {
                    Some(text) => {
                        self.stats.deltas += 1;
                        Some(SseItem::Delta(text))
                    }
                    None => {
                        self.stats.empty += 1;
                        None
                    }
                }
            }
            Err(e) => {
                self.stats.malformed += 1;
                tracing::debug!("Skipping malformed SSE event: {}", e);
                None
            }
        }
    }
}
