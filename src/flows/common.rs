//! Shared helpers for flow implementations.

// self
use crate::{_prelude::*, auth::IdentifierError, auth::UserId};

/// Parses a caller-supplied user id, mapping an absent value to [`Error::MissingParameter`].
pub(crate) fn parse_user_id(raw: &str, name: &'static str) -> Result<UserId> {
	if raw.trim().is_empty() {
		return Err(Error::MissingParameter { name });
	}

	UserId::new(raw).map_err(|err| match err {
		IdentifierError::Empty => Error::MissingParameter { name },
		other => Error::Identifier(other),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_input_maps_to_missing_parameter() {
		assert!(matches!(
			parse_user_id("", "userid"),
			Err(Error::MissingParameter { name: "userid" }),
		));
		assert!(matches!(
			parse_user_id("   ", "id"),
			Err(Error::MissingParameter { name: "id" }),
		));
	}

	#[test]
	fn malformed_input_surfaces_identifier_error() {
		assert!(matches!(parse_user_id("a b", "userid"), Err(Error::Identifier(_))));

		let id = parse_user_id("abc123", "userid").expect("Valid id should parse.");

		assert_eq!(id.as_ref(), "abc123");
	}
}
