use std::collections::HashSet;

use log::info;

use super::types::{Person, PersonId};

/// Bundled demo family.
pub const SAMPLE_FAMILY: &str = include_str!("../../assets/sample_family.json");

/// Failures at the data boundary. Nothing past this point can fail.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
	/// The payload is not a list of well-typed person records.
	#[error("malformed person list: {0}")]
	Malformed(#[from] serde_json::Error),
	/// Two records share an id.
	#[error("duplicate person id: {0}")]
	DuplicateId(PersonId),
}

/// Source of a complete, materialized person list.
pub trait PersonRepository {
	/// Every person in the family, in a stable order.
	fn persons(&self) -> Result<Vec<Person>, RepositoryError>;
}

impl PersonRepository for [Person] {
	fn persons(&self) -> Result<Vec<Person>, RepositoryError> {
		Ok(self.to_vec())
	}
}

/// In-memory snapshot decoded from a JSON array of person records.
#[derive(Clone, Debug, Default)]
pub struct JsonRepository {
	persons: Vec<Person>,
}

impl JsonRepository {
	/// Decode and validate a snapshot.
	pub fn from_json(text: &str) -> Result<Self, RepositoryError> {
		let persons: Vec<Person> = serde_json::from_str(text)?;
		let mut seen = HashSet::with_capacity(persons.len());
		if let Some(dup) = persons.iter().find(|p| !seen.insert(&p.id)) {
			return Err(RepositoryError::DuplicateId(dup.id.clone()));
		}
		info!("Loaded {} persons", persons.len());
		Ok(Self { persons })
	}

	/// The bundled demo family.
	pub fn sample() -> Result<Self, RepositoryError> {
		Self::from_json(SAMPLE_FAMILY)
	}
}

impl PersonRepository for JsonRepository {
	fn persons(&self) -> Result<Vec<Person>, RepositoryError> {
		Ok(self.persons.clone())
	}
}
