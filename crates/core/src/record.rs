/// Raw payload as delivered by a source, before normalization.
///
/// The broker hands us bytes, the file tail hands us text lines, and tests may
/// inject pre-decoded JSON directly.
#[derive(Debug, Clone)]
pub enum RecordPayload {
    Structured(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

/// One un-normalized record pulled from a source.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub payload: RecordPayload,
    /// Monotonically increasing position within the source, when the source
    /// tracks one. Used for logging only — never for ordering decisions.
    pub offset: Option<u64>,
}

impl RawRecord {
    pub fn text(line: impl Into<String>) -> Self {
        Self {
            payload: RecordPayload::Text(line.into()),
            offset: None,
        }
    }

    pub fn bytes(bytes: Vec<u8>) -> Self {
        Self {
            payload: RecordPayload::Bytes(bytes),
            offset: None,
        }
    }

    pub fn structured(value: serde_json::Value) -> Self {
        Self {
            payload: RecordPayload::Structured(value),
            offset: None,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
