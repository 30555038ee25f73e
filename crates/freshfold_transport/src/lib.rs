#![forbid(unsafe_code)]

mod channel;
mod hub;



pub use channel::{ChannelEvent, Delivery, LiveChannel, PendingSend};
pub use hub::{HubItem, RoomHub, RoomHubConfig};

use thiserror::Error;

/// Errors for live transport operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
	/// The session carried no usable credential; the channel refuses to
	/// join.
	#[error("missing or empty session credential")]
	Unauthorized,

	/// Outgoing content was empty after trimming; nothing was emitted.
	#[error("message content must not be empty")]
	EmptyContent,
}
