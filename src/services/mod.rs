//! External collaborator module
//!
//! This module contains the alert backends (sound and desktop notification)
//! and the durable storage used for the timer store.

pub mod alerts;
pub mod notification;
pub mod sound;
pub mod storage;

// Re-export main types
pub use alerts::{
    AlertDispatcher, NotificationPermission, Notifier, SoundPlayer, NOTIFICATION_TITLE,
};
pub use notification::DesktopNotifier;
pub use sound::TerminalBellPlayer;
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
