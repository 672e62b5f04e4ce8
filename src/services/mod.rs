pub mod catalog_service;
pub mod friendship_service;
pub mod library_service;

pub use catalog_service::CatalogService;
pub use friendship_service::FriendshipService;
pub use library_service::LibraryService;
