use crate::events::{NoteMarker, ScheduledEvent, VoiceMessage};

pub type EventProducer = ringbuf::HeapProd<ScheduledEvent>;

/// Converts the marker stream into sample-stamped voice events. Markers
/// arrive as `(onset, release)` pairs per note, so each pair becomes one
/// note-on and one note-off; the result is sorted by timestamp because
/// pairs from interleaved tracks are not.
pub fn schedule_markers(
    markers: &[NoteMarker],
    ticks_per_beat: u32,
    bpm: u32,
    sample_rate: f32,
) -> Vec<ScheduledEvent> {
    let samples_per_tick = 60.0 / bpm as f32 * sample_rate / ticks_per_beat as f32;
    let mut events = Vec::with_capacity(markers.len());

    for pair in markers.chunks_exact(2) {
        let (onset, release) = (pair[0], pair[1]);
        events.push(ScheduledEvent {
            sample_timestamp: (onset.tick as f32 * samples_per_tick) as u64,
            message: VoiceMessage::NoteOn { pitch: onset.pitch },
        });
        events.push(ScheduledEvent {
            sample_timestamp: (release.tick as f32 * samples_per_tick) as u64,
            message: VoiceMessage::NoteOff {
                pitch: release.pitch,
            },
        });
    }

    events.sort_by_key(|event| event.sample_timestamp);
    events
}
