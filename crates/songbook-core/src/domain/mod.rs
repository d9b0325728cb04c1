pub mod ids;
pub mod rating;
pub mod song;

pub use ids::{SongId, UserId};
pub use rating::Rating;
pub use song::{NewSong, Song, SongDetails, SongOwner, SongUpdate, SongWithOwner};
