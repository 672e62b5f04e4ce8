//! Game Library - catalog, personal libraries and friendships for a game collection
//!
//! This crate provides the transactional core behind a game catalog:
//! - Games with their genres, platforms and developers
//! - Per-user libraries with play progress
//! - Friend requests and the friendships they establish

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod services;
pub mod store;

pub use auth::{AuthService, Session};
pub use errors::{AppError, EntityKind, ValidationError};
pub use services::{CatalogService, FriendshipService, LibraryService};
pub use store::Store;
