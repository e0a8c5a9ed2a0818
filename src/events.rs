/// A single onset or release record from the note stream. Every note
/// contributes two markers at the same pitch: one at its onset tick and one
/// at its release tick. Stream order is significant downstream (the grid's
/// column count is the marker count), so markers are never re-sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMarker {
    pub pitch: u8,
    pub tick: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum VoiceMessage {
    NoteOn { pitch: u8 },
    NoteOff { pitch: u8 },
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledEvent {
    pub sample_timestamp: u64,
    pub message: VoiceMessage,
}
