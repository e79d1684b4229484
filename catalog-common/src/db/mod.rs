//! Database access

pub mod audio;
pub mod init;

pub use audio::SqliteAudioStore;
pub use init::*;
