use std::collections::HashMap;
use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::debug;

use crate::error::Error;
use crate::events::NoteMarker;

/// Ticks per quarter note assumed when the SMF header carries SMPTE timing
/// instead of a metrical division.
const FALLBACK_TICKS_PER_BEAT: u32 = 480;

/// The parsed note stream of a MIDI file, reduced to what the roll and the
/// playback engine consume: onset/release marker pairs in encounter order,
/// the header's tick resolution, and the first declared tempo.
#[derive(Debug, Clone)]
pub struct Score {
    pub markers: Vec<NoteMarker>,
    pub ticks_per_beat: u32,
    pub bpm: Option<u32>,
}

impl Score {
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::InputNotFound(path.to_owned()));
        }

        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let smf = Smf::parse(&bytes)?;
        let score = Self::from_smf(&smf);

        debug!(
            markers = score.markers.len(),
            ticks_per_beat = score.ticks_per_beat,
            bpm = ?score.bpm,
            "parsed {}",
            path.display()
        );

        Ok(score)
    }

    fn from_smf(smf: &Smf<'_>) -> Self {
        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(t) => t.as_int() as u32,
            Timing::Timecode(..) => FALLBACK_TICKS_PER_BEAT,
        };

        Self {
            markers: collect_markers(smf),
            ticks_per_beat,
            bpm: first_tempo_bpm(smf),
        }
    }
}

/// Walks every track, pairing each note-on with the matching note-off and
/// emitting two markers per note: `(pitch, onset)` immediately followed by
/// `(pitch, release)`. The pair is appended when the note *ends*, so the
/// stream order follows release order within a track, interleaved across
/// tracks in track order. A second onset for a pitch that never released
/// overwrites the pending one.
fn collect_markers(smf: &Smf<'_>) -> Vec<NoteMarker> {
    let mut markers = Vec::new();

    for track in &smf.tracks {
        let mut now: u32 = 0;
        let mut pending: HashMap<u8, u32> = HashMap::new();

        for event in track {
            now += event.delta.as_int();

            let TrackEventKind::Midi { message, .. } = event.kind else {
                continue;
            };

            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    pending.insert(key.as_int(), now);
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    if let Some(onset) = pending.remove(&key.as_int()) {
                        markers.push(NoteMarker {
                            pitch: key.as_int(),
                            tick: onset,
                        });
                        markers.push(NoteMarker {
                            pitch: key.as_int(),
                            tick: now,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    markers
}

fn first_tempo_bpm(smf: &Smf<'_>) -> Option<u32> {
    for track in &smf.tracks {
        for event in track {
            if let TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat)) = event.kind {
                return Some(60_000_000 / us_per_beat.as_int());
            }
        }
    }

    None
}
