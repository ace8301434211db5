pub mod error;
pub mod event;
pub mod record;
pub mod sample;
pub mod snapshot;

pub use error::{NormalizeError, PulseError, Result};
pub use event::Message;
pub use record::{RawRecord, RecordPayload};
pub use sample::{Sample, SampleKind};
pub use snapshot::{ChartSnapshot, LastSample, SamplePoint};
