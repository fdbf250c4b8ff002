use log::debug;

use super::graph::FamilyGraph;
use super::layout::{LayoutConfig, TreeLayout};
use super::levels::assign_levels;
use super::repository::{PersonRepository, RepositoryError};
use super::types::Person;

/// One rebuild of the whole pipeline: graph, levels and layout.
///
/// Any change to the person list means building a new snapshot; nothing is
/// patched in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FamilyTree {
	graph: FamilyGraph,
	layout: TreeLayout,
}

impl FamilyTree {
	/// Build, level and lay out `persons`.
	pub fn from_persons(persons: impl IntoIterator<Item = Person>, config: LayoutConfig) -> Self {
		Self::from_graph(FamilyGraph::build(persons), config)
	}

	/// Fetch the full list from `repo`, then rebuild.
	pub fn from_repository<R>(repo: &R, config: LayoutConfig) -> Result<Self, RepositoryError>
	where
		R: PersonRepository + ?Sized,
	{
		Ok(Self::from_persons(repo.persons()?, config))
	}

	fn from_graph(graph: FamilyGraph, config: LayoutConfig) -> Self {
		let graph = assign_levels(graph);
		let layout = TreeLayout::compute(&graph, config);
		debug!(
			"Rebuilt family tree: {} persons, {} connectors",
			graph.len(),
			layout.connectors().len()
		);
		Self { graph, layout }
	}

	/// The branch below one person, rebuilt as its own tree.
	pub fn focused(&self, id: &str) -> Option<Self> {
		let branch = self.graph.subtree(id)?;
		Some(Self::from_graph(branch, *self.layout.config()))
	}

	/// Same graph laid out with different card geometry.
	pub fn relayout(&self, config: LayoutConfig) -> Self {
		Self {
			graph: self.graph.clone(),
			layout: TreeLayout::compute(&self.graph, config),
		}
	}

	/// The level-annotated graph.
	pub fn graph(&self) -> &FamilyGraph {
		&self.graph
	}

	/// Positions and connectors.
	pub fn layout(&self) -> &TreeLayout {
		&self.layout
	}
}
