mod player;
mod schedule;
mod voice;

pub use player::{FADE_OUT, Player};
pub use schedule::{EventProducer, schedule_markers};
pub use voice::{AdsrConfig, VoiceBank};

pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
