//! Secondary sort buffer for recordings split across several files.

use anyhow::Result;
use chrono::NaiveDateTime;

use super::EventSink;
use crate::event::EventRecord;
use crate::timeline::RecordingClock;

/// Holds `(absolute time, record)` pairs until every input file has been
/// read, then writes them in timeline order.
#[derive(Debug, Default)]
pub struct MergeBuffer {
    entries: Vec<(NaiveDateTime, EventRecord)>,
}

impl MergeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: NaiveDateTime, record: EventRecord) {
        self.entries.push((time, record));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records ordered by elapsed seconds since the recording start.
    ///
    /// The sort is stable, so records at the same second keep the order in
    /// which they were pushed.
    pub fn into_sorted(mut self, clock: &RecordingClock) -> Vec<EventRecord> {
        self.entries.sort_by_key(|(time, _)| clock.elapsed_seconds(*time));
        self.entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Sort and write every record to `sink`, returning the row count.
    pub fn write_sorted(self, clock: &RecordingClock, sink: &mut dyn EventSink) -> Result<usize> {
        let records = self.into_sorted(clock);
        for record in &records {
            sink.write_event(record)?;
        }
        sink.finish()?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::InMemorySink;
    use crate::timeline::parse_wall_clock;

    #[test]
    fn test_sorted_across_midnight_and_stable() {
        let clock = RecordingClock::from_first_reading(parse_wall_clock("22:00:00").unwrap());
        let at = |s: &str| parse_wall_clock(s).unwrap();

        let mut buffer = MergeBuffer::new();
        buffer.push(at("01:00:00"), EventRecord::keyed("after_midnight"));
        buffer.push(at("22:30:00"), EventRecord::keyed("first_tie"));
        buffer.push(at("22:00:00"), EventRecord::keyed("start"));
        buffer.push(at("22:30:00"), EventRecord::keyed("second_tie"));
        assert_eq!(buffer.len(), 4);

        let mut sink = InMemorySink::new();
        let rows = buffer.write_sorted(&clock, &mut sink).unwrap();
        assert_eq!(rows, 4);

        let keys: Vec<&str> = sink.records().iter().map(|r| r.event_key.as_str()).collect();
        assert_eq!(keys, ["start", "first_tie", "second_tie", "after_midnight"]);
    }
}
