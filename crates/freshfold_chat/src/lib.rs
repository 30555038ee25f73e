#![forbid(unsafe_code)]

//! Surface-facing chat core of the freshfold operations portal: room
//! resolution, conversation sessions, read receipts, and per-viewer unread
//! aggregation. Order lists, dashboards, and chat lists all go through the
//! types here instead of talking to the store or hub directly.

pub mod config;
pub mod conversation;
pub mod receipts;
pub mod resolver;
pub mod unread;

mod error;

pub use config::{ChatConfig, load_chat_config, load_chat_config_from_path};
pub use conversation::Conversation;
pub use error::ChatError;
pub use receipts::ReadReceiptTracker;
pub use resolver::RoomResolver;
pub use unread::{RoomListEntry, UnreadAggregator, has_unread, unread_count};
