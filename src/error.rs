use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed midi data: {0}")]
    MidiFormat(#[from] midly::Error),

    #[error("could not parse theme {}: {source}", .path.display())]
    Theme {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("no audio output device available")]
    NoOutputDevice,

    #[error(transparent)]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio playback did not start")]
    PlaybackStalled,
}
