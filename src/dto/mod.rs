pub mod game;
pub mod library;

pub use game::{GameDetails, GameInput};
pub use library::{GameRef, LibraryEntry, ProgressUpdate};
