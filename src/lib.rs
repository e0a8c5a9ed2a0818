pub mod error;
pub mod events;
pub mod midi;
pub mod playback;
pub mod roll;

pub use error::Error;
pub use events::NoteMarker;
pub use midi::Score;
pub use playback::Player;
pub use roll::{Palette, Renderer, RollConfig};
