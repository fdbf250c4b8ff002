//! Family graph model and tree layout.
//!
//! Stages run leaf-first over immutable snapshots:
//! person records → [`FamilyGraph::build`] → [`assign_levels`] →
//! [`TreeLayout::compute`]. [`FamilyTree`] runs all three.

mod graph;
mod layout;
mod levels;
mod pipeline;
mod repository;
mod types;

pub use graph::{FamilyGraph, Relations, TreeNode};
pub use layout::{
	Bounds, Connector, ConnectorKind, LayoutConfig, LayoutPosition, Point, TreeLayout,
};
pub use levels::assign_levels;
pub use pipeline::FamilyTree;
pub use repository::{JsonRepository, PersonRepository, RepositoryError, SAMPLE_FAMILY};
pub use types::{Gender, LifeStatus, Person, PersonId};
