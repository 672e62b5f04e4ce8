//! SeaORM entities for the catalog, libraries and friendships.

pub mod developer;
pub mod friend_request;
pub mod game;
pub mod game_developer;
pub mod game_genre;
pub mod game_platform;
pub mod genre;
pub mod listing;
pub mod platform;
pub mod play_state;
pub mod request_status;
pub mod user;
pub mod user_game;

pub use listing::{Listing, display_names, render_listing};
pub use play_state::PlayState;
pub use request_status::RequestStatus;
