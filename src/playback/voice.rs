use std::collections::HashMap;
use std::f32::consts::TAU;

use super::midi_to_freq;

/// Per-voice gain, sized so a handful of simultaneous notes stays clear of
/// clipping before the master gain applies.
const VOICE_GAIN: f32 = 0.2;

/// Envelope segment lengths in seconds; sustain is a level in `0.0..=1.0`.
#[derive(Debug, Clone, Copy)]
pub struct AdsrConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for AdsrConfig {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.06,
            sustain: 0.7,
            release: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
struct Voice {
    freq: f32,
    phase: f32,
    stage: Stage,
    stage_time: f32,
    level: f32,
    released_from: f32,
}

impl Voice {
    fn new(freq: f32) -> Self {
        Self {
            freq,
            phase: 0.0,
            stage: Stage::Attack,
            stage_time: 0.0,
            level: 0.0,
            released_from: 0.0,
        }
    }
}

/// A bank of sine voices keyed by pitch. Retriggering a sounding pitch
/// replaces its voice; released voices are dropped once their envelope
/// runs out.
pub struct VoiceBank {
    adsr: AdsrConfig,
    active: HashMap<u8, Voice>,
}

impl VoiceBank {
    pub fn new(adsr: AdsrConfig) -> Self {
        Self {
            adsr,
            active: HashMap::new(),
        }
    }

    pub fn note_on(&mut self, pitch: u8) {
        self.active.insert(pitch, Voice::new(midi_to_freq(pitch)));
    }

    pub fn note_off(&mut self, pitch: u8) {
        if let Some(voice) = self.active.get_mut(&pitch) {
            voice.released_from = voice.level;
            voice.stage = Stage::Release;
            voice.stage_time = 0.0;
        }
    }

    pub fn is_silent(&self) -> bool {
        self.active.is_empty()
    }

    /// Sums one mono sample over all voices and advances each by one
    /// sample period.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let dt = 1.0 / sample_rate;
        let mut sample = 0.0;

        for voice in self.active.values_mut() {
            voice.level = envelope_level(voice, &self.adsr);
            sample += (voice.phase * TAU).sin() * voice.level;

            voice.phase += voice.freq * dt;
            if voice.phase >= 1.0 {
                voice.phase -= 1.0;
            }
            advance_stage(voice, &self.adsr, dt);
        }

        let release = self.adsr.release;
        self.active
            .retain(|_, voice| !(voice.stage == Stage::Release && voice.stage_time > release));

        sample * VOICE_GAIN
    }
}

fn envelope_level(voice: &Voice, adsr: &AdsrConfig) -> f32 {
    match voice.stage {
        Stage::Attack => {
            if adsr.attack == 0.0 {
                1.0
            } else {
                (voice.stage_time / adsr.attack).min(1.0)
            }
        }
        Stage::Decay => {
            let progress = if adsr.decay == 0.0 {
                1.0
            } else {
                (voice.stage_time / adsr.decay).min(1.0)
            };
            1.0 - (1.0 - adsr.sustain) * progress
        }
        Stage::Sustain => adsr.sustain,
        Stage::Release => {
            let progress = if adsr.release == 0.0 {
                1.0
            } else {
                (voice.stage_time / adsr.release).min(1.0)
            };
            voice.released_from * (1.0 - progress)
        }
    }
}

fn advance_stage(voice: &mut Voice, adsr: &AdsrConfig, dt: f32) {
    voice.stage_time += dt;
    match voice.stage {
        Stage::Attack if voice.stage_time >= adsr.attack => {
            voice.stage = Stage::Decay;
            voice.stage_time = 0.0;
        }
        Stage::Decay if voice.stage_time >= adsr.decay => {
            voice.stage = Stage::Sustain;
            voice.stage_time = 0.0;
        }
        _ => {}
    }
}
