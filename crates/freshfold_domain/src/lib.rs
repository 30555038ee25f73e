#![forbid(unsafe_code)]

pub mod label;
pub mod model;

use core::fmt;
use core::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles a chat participant can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Customer,
	ServiceProvider,
	Admin,
}

impl Role {
	/// Stable string identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::Customer => "customer",
			Role::ServiceProvider => "service_provider",
			Role::Admin => "admin",
		}
	}

	/// Human-facing capitalized name.
	pub const fn display_name(self) -> &'static str {
		match self {
			Role::Customer => "Customer",
			Role::ServiceProvider => "Provider",
			Role::Admin => "Admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors for parsing identifiers and roles from strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseIdError {
	#[error("empty value")]
	Empty,
	#[error("unknown role: {0}")]
	UnknownRole(String),
}

impl FromStr for Role {
	type Err = ParseIdError;

	/// Parse a role string, normalizing legacy synonyms to the
	/// canonical vocabulary (`supplier` and `provider` both mean
	/// `service_provider`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if s.is_empty() {
			return Err(ParseIdError::Empty);
		}

		match s.to_ascii_lowercase().as_str() {
			"customer" => Ok(Role::Customer),
			"service_provider" | "provider" | "supplier" => Ok(Role::ServiceProvider),
			"admin" | "shop_owner" | "owner" => Ok(Role::Admin),
			other => Err(ParseIdError::UnknownRole(other.to_string())),
		}
	}
}

/// Opaque participant identifier (customer, provider, or admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
	/// Create a non-empty `UserId`.
	pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
		let id = id.into();
		if id.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(id))
	}
	pub fn as_str(&self) -> &str {
		&self.0
	}
	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for UserId {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		UserId::new(s.to_string())
	}
}

/// Opaque reference to an order owned by the order collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
	/// Create a non-empty `OrderId`.
	pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
		let id = id.into();
		if id.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(id))
	}
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Server-assigned room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
	/// Create a non-empty `RoomId`.
	pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
		let id = id.into();
		if id.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(id))
	}

	/// Mint a fresh random room id.
	pub fn new_v4() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for RoomId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Server-assigned message identifier. Never client-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
	/// Mint a fresh random message id.
	pub fn new_v4() -> Self {
		Self(uuid::Uuid::new_v4())
	}
}

impl fmt::Display for MessageId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Logical-conversation key: one room exists per `(customer, order)` pair,
/// where a missing order means the customer's general support room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomKey {
	pub customer_id: UserId,
	pub order_id: Option<OrderId>,
}

impl RoomKey {
	pub fn new(customer_id: UserId, order_id: Option<OrderId>) -> Self {
		Self { customer_id, order_id }
	}

	/// The customer's general support room (not scoped to an order).
	pub fn support(customer_id: UserId) -> Self {
		Self {
			customer_id,
			order_id: None,
		}
	}
}

impl fmt::Display for RoomKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.order_id {
			Some(order) => write!(f, "{}/{}", self.customer_id, order),
			None => write!(f, "{}/support", self.customer_id),
		}
	}
}

/// The acting identity every chat operation receives explicitly from the
/// session collaborator. The core never reads ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
	pub id: UserId,
	pub role: Role,
}

impl Viewer {
	pub fn new(id: UserId, role: Role) -> Self {
		Self { id, role }
	}
}

/// Session handed to the core by the surrounding application: who is acting,
/// and the credential the live transport authenticates with.
#[derive(Debug, Clone)]
pub struct Session {
	pub viewer: Viewer,
	pub credential: SecretString,
}

impl Session {
	pub fn new(viewer: Viewer, credential: SecretString) -> Self {
		Self { viewer, credential }
	}
}

/// String wrapper that never leaks its contents through `Debug`/`Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(s: impl Into<String>) -> Self {
		Self(s.into())
	}

	/// Access the inner secret string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(<redacted>)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("<redacted>")
	}
}

/// Current Unix time in milliseconds.
#[inline]
pub fn unix_ms_now() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or(Duration::from_secs(0))
		.as_millis() as i64
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_parse_normalizes_synonyms() {
		assert_eq!("customer".parse::<Role>().unwrap(), Role::Customer);
		assert_eq!("supplier".parse::<Role>().unwrap(), Role::ServiceProvider);
		assert_eq!("Provider".parse::<Role>().unwrap(), Role::ServiceProvider);
		assert_eq!("shop_owner".parse::<Role>().unwrap(), Role::Admin);
		assert!("courier".parse::<Role>().is_err());
	}

	#[test]
	fn role_serializes_to_closed_vocabulary() {
		let s = serde_json::to_string(&Role::ServiceProvider).unwrap();
		assert_eq!(s, "\"service_provider\"");
	}

	#[test]
	fn rejects_empty_ids() {
		assert!(UserId::new("").is_err());
		assert!(UserId::new("   ").is_err());
		assert!(OrderId::new("").is_err());
		assert!(RoomId::new("  ").is_err());
	}

	#[test]
	fn room_key_display_distinguishes_support() {
		let c = UserId::new("c1").unwrap();
		assert_eq!(RoomKey::support(c.clone()).to_string(), "c1/support");
		let keyed = RoomKey::new(c, Some(OrderId::new("o1").unwrap()));
		assert_eq!(keyed.to_string(), "c1/o1");
	}

	#[test]
	fn secret_string_redacts() {
		let s = SecretString::new("token-123");
		assert_eq!(format!("{s:?}"), "SecretString(<redacted>)");
		assert_eq!(s.to_string(), "<redacted>");
		assert_eq!(s.expose(), "token-123");
	}
}
