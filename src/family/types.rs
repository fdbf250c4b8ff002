use std::borrow::Borrow;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Opaque, stable person identifier. Ordering is lexical on the raw string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
	/// Wrap a raw identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for PersonId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for PersonId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for PersonId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

/// Used for father/mother slot hints and card colors only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
	/// Male.
	Male,
	/// Female.
	Female,
}

/// Lifecycle state, derived from the presence of a death date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeStatus {
	/// No death date recorded.
	Alive,
	/// A death date is recorded.
	Deceased,
}

/// A stored person record as supplied by the repository.
///
/// Relationship fields are raw references: they may point at ids that do not
/// exist in the snapshot. Derived structure lives on [`super::TreeNode`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
	/// Unique id within a snapshot.
	pub id: PersonId,
	/// Display name.
	pub full_name: String,
	/// Gender.
	pub gender: Gender,
	/// ISO-8601 birth date.
	#[serde(default)]
	pub birth_date: Option<NaiveDate>,
	/// ISO-8601 death date; its presence marks the person deceased.
	#[serde(default)]
	pub death_date: Option<NaiveDate>,
	/// Free-form biography.
	#[serde(default)]
	pub bio: Option<String>,
	/// Father reference.
	#[serde(default)]
	pub father_id: Option<PersonId>,
	/// Mother reference.
	#[serde(default)]
	pub mother_id: Option<PersonId>,
	/// Spouse reference. Only one is stored per person.
	#[serde(default)]
	pub spouse_id: Option<PersonId>,
}

impl Person {
	/// A record with only the required fields set.
	pub fn new(id: impl Into<String>, full_name: impl Into<String>, gender: Gender) -> Self {
		Self {
			id: PersonId::new(id),
			full_name: full_name.into(),
			gender,
			birth_date: None,
			death_date: None,
			bio: None,
			father_id: None,
			mother_id: None,
			spouse_id: None,
		}
	}

	/// Builder-style father link.
	pub fn with_father(mut self, id: impl Into<String>) -> Self {
		self.father_id = Some(PersonId::new(id));
		self
	}

	/// Builder-style mother link.
	pub fn with_mother(mut self, id: impl Into<String>) -> Self {
		self.mother_id = Some(PersonId::new(id));
		self
	}

	/// Builder-style spouse link.
	pub fn with_spouse(mut self, id: impl Into<String>) -> Self {
		self.spouse_id = Some(PersonId::new(id));
		self
	}

	/// Builder-style life dates.
	pub fn with_dates(mut self, birth: Option<NaiveDate>, death: Option<NaiveDate>) -> Self {
		self.birth_date = birth;
		self.death_date = death;
		self
	}

	/// Deceased iff a death date is recorded.
	pub fn status(&self) -> LifeStatus {
		if self.death_date.is_some() {
			LifeStatus::Deceased
		} else {
			LifeStatus::Alive
		}
	}

	/// Completed years between birth and death, or `today` when alive.
	pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
		let birth = self.birth_date?;
		let end = self.death_date.unwrap_or(today);
		let mut age = end.year() - birth.year();
		if (end.month(), end.day()) < (birth.month(), birth.day()) {
			age -= 1;
		}
		Some(age)
	}

	/// Up to two uppercase initials taken from the first words of the name.
	pub fn initials(&self) -> String {
		self.full_name
			.split_whitespace()
			.filter_map(|word| word.chars().next())
			.flat_map(char::to_uppercase)
			.take(2)
			.collect()
	}

	/// Both parent references, resolved or not, in father/mother order.
	pub fn parent_ids(&self) -> impl Iterator<Item = &PersonId> {
		self.father_id.iter().chain(self.mother_id.iter())
	}
}
