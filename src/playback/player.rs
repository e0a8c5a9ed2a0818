use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::bounded;
use ringbuf::{
    HeapCons, HeapRb,
    traits::{Consumer, Producer, Split},
};
use tracing::{debug, info, warn};

use super::schedule::schedule_markers;
use super::voice::{AdsrConfig, VoiceBank};
use crate::error::Error;
use crate::events::{ScheduledEvent, VoiceMessage};
use crate::midi::Score;

const EVENT_QUEUE_CAPACITY: usize = 4096;
const INITIAL_GAIN: f32 = 0.8;
const START_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BPM: u32 = 120;

/// Length of the fade applied when playback is interrupted.
pub const FADE_OUT: Duration = Duration::from_secs(1);

struct CallbackState {
    bank: VoiceBank,
    pending: Option<ScheduledEvent>,
    consumer: HeapCons<ScheduledEvent>,
    channels: usize,
    sample_rate: f32,
}

/// Synthesizes a score through the default output device. The schedule is
/// fed to the stream callback over a ring buffer by a background thread;
/// the callback owns the voices and a sample counter that doubles as the
/// playback clock.
pub struct Player {
    _stream: cpal::Stream,
    sample_counter: Arc<AtomicU64>,
    master_gain: Arc<AtomicU32>,
    end_sample: u64,
}

impl Player {
    /// Starts playback and returns once the stream callback has begun
    /// pulling samples, so callers can order rendering strictly after the
    /// start of audio.
    pub fn start(score: &Score) -> Result<Self, Error> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoOutputDevice)?;
        let config = device.default_output_config()?;
        let stream_config: cpal::StreamConfig = config.into();

        let sample_rate = stream_config.sample_rate as f32;
        let channels = stream_config.channels as usize;
        let bpm = score.bpm.unwrap_or(DEFAULT_BPM);

        let events = schedule_markers(&score.markers, score.ticks_per_beat, bpm, sample_rate);
        let release_tail = (AdsrConfig::default().release * sample_rate) as u64;
        let end_sample = events.last().map_or(0, |e| e.sample_timestamp) + release_tail;

        let ring = HeapRb::<ScheduledEvent>::new(EVENT_QUEUE_CAPACITY);
        let (mut producer, consumer) = ring.split();

        // Long schedules exceed the queue; drip-feed as the callback drains.
        thread::spawn(move || {
            for event in events {
                let mut event = event;
                while let Err(returned) = producer.try_push(event) {
                    event = returned;
                    thread::sleep(Duration::from_millis(1));
                }
            }
            debug!("schedule fully queued");
        });

        let sample_counter = Arc::new(AtomicU64::new(0));
        let master_gain = Arc::new(AtomicU32::new(INITIAL_GAIN.to_bits()));
        let (started_tx, started_rx) = bounded::<()>(1);

        let counter = sample_counter.clone();
        let gain = master_gain.clone();
        let mut state = CallbackState {
            bank: VoiceBank::new(AdsrConfig::default()),
            pending: None,
            consumer,
            channels,
            sample_rate,
        };
        let mut started = false;

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if !started {
                    started = true;
                    let _ = started_tx.try_send(());
                }
                render_audio(data, &mut state, &counter, &gain);
            },
            |err| warn!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        started_rx
            .recv_timeout(START_TIMEOUT)
            .map_err(|_| Error::PlaybackStalled)?;
        info!(bpm, sample_rate, channels, "playback started");

        Ok(Self {
            _stream: stream,
            sample_counter,
            master_gain,
            end_sample,
        })
    }

    /// Whether the schedule (including the final release tail) has not yet
    /// fully played out.
    pub fn is_busy(&self) -> bool {
        self.sample_counter.load(Ordering::Relaxed) < self.end_sample
    }

    /// Blocks until playback drains. `wait` sleeps for the given duration
    /// and returns `false` to request an interrupt, which fades the audio
    /// out instead of cutting it.
    pub fn finish(self, mut wait: impl FnMut(Duration) -> bool) {
        while self.is_busy() {
            if !wait(Duration::from_millis(100)) {
                self.fade_out();
                return;
            }
        }
        debug!("playback drained");
    }

    /// Bounded linear fade of the master gain to silence; the stream drops
    /// with the player afterwards.
    pub fn fade_out(self) {
        info!("fading out");
        let start = f32::from_bits(self.master_gain.load(Ordering::Relaxed));
        let steps = 20u32;
        for step in 1..=steps {
            let gain = start * (1.0 - step as f32 / steps as f32);
            self.master_gain.store(gain.to_bits(), Ordering::Relaxed);
            thread::sleep(FADE_OUT / steps);
        }
    }
}

fn render_audio(
    data: &mut [f32],
    state: &mut CallbackState,
    counter: &AtomicU64,
    gain: &AtomicU32,
) {
    let frames = data.len() / state.channels;
    let current_sample = counter.load(Ordering::Relaxed);
    let buffer_end = current_sample + frames as u64;
    let master = f32::from_bits(gain.load(Ordering::Relaxed));

    let mut due: Vec<ScheduledEvent> = Vec::with_capacity(16);
    if let Some(event) = state.pending.take() {
        if event.sample_timestamp < buffer_end {
            due.push(event);
        } else {
            state.pending = Some(event);
        }
    }
    while state.pending.is_none() {
        match state.consumer.try_pop() {
            Some(event) if event.sample_timestamp < buffer_end => due.push(event),
            Some(event) => state.pending = Some(event),
            None => break,
        }
    }

    data.fill(0.0);
    let mut next = 0;

    for frame in 0..frames {
        while next < due.len()
            && due[next].sample_timestamp.saturating_sub(current_sample) as usize <= frame
        {
            apply(&mut state.bank, due[next].message);
            next += 1;
        }

        let sample = state.bank.next_sample(state.sample_rate) * master;
        let offset = frame * state.channels;
        for slot in &mut data[offset..offset + state.channels] {
            *slot = sample;
        }
    }

    counter.fetch_add(frames as u64, Ordering::Relaxed);
}

fn apply(bank: &mut VoiceBank, message: VoiceMessage) {
    match message {
        VoiceMessage::NoteOn { pitch } => bank.note_on(pitch),
        VoiceMessage::NoteOff { pitch } => bank.note_off(pitch),
    }
}
