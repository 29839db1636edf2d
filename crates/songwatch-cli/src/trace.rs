use std::path::Path;

use serde::Deserialize;
use songwatch_core::dom::{MemoryDocument, MemoryElement};
use songwatch_core::{BatchReport, MutationRecord, NotifyHost, SongwatchError, TrackWatcher};
use tracing::debug;

/// A recorded sequence of page states.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trace {
    pub frames: Vec<Frame>,
}

/// One step of a trace: optionally a new page, then one mutation batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frame {
    /// Replaces the whole page when present; otherwise the previous page
    /// stays as it was.
    #[serde(default)]
    pub elements: Option<MemoryDocument>,
    /// Nodes inserted by this frame's batch, as a single mutation record.
    #[serde(default)]
    pub inserted: Vec<MemoryElement>,
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self, SongwatchError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SongwatchError> {
        let trace: Trace = serde_json::from_str(json)?;
        match trace.frames.first() {
            None => Err(SongwatchError::Trace("trace has no frames".into())),
            Some(frame) if frame.elements.is_none() => Err(SongwatchError::Trace(
                "first frame must describe the page".into(),
            )),
            Some(_) => Ok(trace),
        }
    }
}

/// Attach on the first frame's page, then deliver every frame's batch.
pub fn replay<H: NotifyHost>(
    trace: &Trace,
    watcher: &mut TrackWatcher<H>,
) -> Result<BatchReport, SongwatchError> {
    let mut document = MemoryDocument::default();
    let mut total = BatchReport::default();

    for (index, frame) in trace.frames.iter().enumerate() {
        if let Some(elements) = &frame.elements {
            document = elements.clone();
        }
        if index == 0 {
            watcher.attach(&document)?;
        }

        let records = [MutationRecord::new(frame.inserted.clone())];
        let report = watcher.handle_batch(&document, &records);
        debug!(
            frame = index,
            ignored = report.ignored,
            duplicates = report.duplicates,
            notified = report.notified,
            "Frame replayed"
        );
        total.absorb(report);
    }

    Ok(total)
}
