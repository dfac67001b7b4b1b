pub mod registry;
pub mod router;
pub mod search_tracks;
