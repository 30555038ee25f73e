#![forbid(unsafe_code)]

use freshfold_store::StoreError;
use freshfold_transport::TransportError;
use thiserror::Error;

/// Errors the chat core surfaces to its callers.
///
/// Propagation policy: `ResolutionFailed` and `ValidationFailed` are handled
/// at the boundary closest to the user action (blocking notice, disabled
/// control); history and transport trouble degrade to an empty or uncertain
/// state inside the core; `ReadMarkFailed` is logged and never blocks
/// navigation. Nothing here should take the rest of the portal down.
#[derive(Debug, Error)]
pub enum ChatError {
	/// Room find-or-create could not complete. No local room id is ever
	/// fabricated in its place.
	#[error("failed to start chat: {0}")]
	ResolutionFailed(String),

	/// Rejected before any network call: empty content or a missing
	/// identity/credential.
	#[error("validation failed: {0}")]
	ValidationFailed(String),

	/// History could not be fetched where degradation to an empty view is
	/// not possible (the paging API).
	#[error("history unavailable: {0}")]
	HistoryUnavailable(String),

	/// The live channel lagged or a send failed; outgoing messages may be
	/// unsent until the view is re-entered.
	#[error("delivery uncertain")]
	DeliveryUncertain,

	/// A mark-as-read call failed. Logged only; the unread badge stays
	/// stale until the next successful call.
	#[error("failed to mark messages read: {0}")]
	ReadMarkFailed(String),
}

impl From<TransportError> for ChatError {
	fn from(e: TransportError) -> Self {
		match e {
			TransportError::Unauthorized => ChatError::ValidationFailed(e.to_string()),
			TransportError::EmptyContent => ChatError::ValidationFailed(e.to_string()),
		}
	}
}

impl ChatError {
	/// Map a store fault from the resolution path.
	pub(crate) fn resolution(e: StoreError) -> Self {
		match e {
			StoreError::Validation(msg) => ChatError::ValidationFailed(msg),
			other => ChatError::ResolutionFailed(other.to_string()),
		}
	}
}
