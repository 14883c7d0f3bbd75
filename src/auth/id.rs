//! Strongly typed credential names used as credential-store keys.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Credential name cannot be empty.")]
	Empty,
	/// The identifier contains whitespace or control characters.
	#[error("Credential name contains whitespace or control characters.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Credential name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Name under which a set of app credentials lives in a [`CredentialStore`].
///
/// [`CredentialStore`]: crate::store::CredentialStore
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialName(String);
impl CredentialName {
	/// Creates a new name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for CredentialName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CredentialName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CredentialName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CredentialName> for String {
	fn from(value: CredentialName) -> Self {
		value.0
	}
}
impl TryFrom<String> for CredentialName {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CredentialName {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CredentialName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CredentialName({})", self.0)
	}
}
impl Display for CredentialName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
