#![forbid(unsafe_code)]

mod backend;
mod client;
mod memory;

#[cfg(test)]
mod client_tests;

pub use backend::{ConversationBackend, HistoryQuery};
pub use client::StoreClient;
pub use memory::MemoryBackend;

use thiserror::Error;

use freshfold_domain::RoomId;

/// Errors surfaced by the conversation store seam.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The persistence collaborator is unreachable or rejected the call.
	#[error("store unavailable: {0}")]
	Unavailable(String),

	/// The referenced room does not exist on the backend.
	#[error("room not found: {0}")]
	RoomNotFound(RoomId),

	/// Input rejected before any backend interaction.
	#[error("validation failed: {0}")]
	Validation(String),
}
