#![forbid(unsafe_code)]

use crate::Role;

/// Map a message author's role to the label shown to a given viewer.
///
/// Pure and deterministic; the rules form a closed set and apply in order:
/// customers see providers as "Provider" and admins as "Shop Owner",
/// provider/admin viewers see their own role-context as "Me", providers are
/// "Provider" to everyone else, and anything remaining falls back to the
/// capitalized role name.
pub fn display_label(sender: Role, viewer: Role) -> &'static str {
	match (viewer, sender) {
		(Role::Customer, Role::ServiceProvider) => "Provider",
		(Role::Customer, Role::Admin) => "Shop Owner",
		(Role::ServiceProvider | Role::Admin, s) if s == viewer => "Me",
		(_, Role::ServiceProvider) => "Provider",
		(_, other) => other.display_name(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn customer_viewer_labels() {
		assert_eq!(display_label(Role::ServiceProvider, Role::Customer), "Provider");
		assert_eq!(display_label(Role::Admin, Role::Customer), "Shop Owner");
		assert_eq!(display_label(Role::Customer, Role::Customer), "Customer");
	}

	#[test]
	fn staff_viewer_labels() {
		assert_eq!(display_label(Role::ServiceProvider, Role::ServiceProvider), "Me");
		assert_eq!(display_label(Role::Admin, Role::Admin), "Me");
		assert_eq!(display_label(Role::Customer, Role::Admin), "Customer");
		assert_eq!(display_label(Role::ServiceProvider, Role::Admin), "Provider");
		assert_eq!(display_label(Role::Admin, Role::ServiceProvider), "Admin");
	}
}
