use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use log::{debug, warn};

use super::types::{Person, PersonId};

/// A person plus the structure derived from every record in the snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
	/// The stored record, untouched.
	pub person: Person,
	/// Ids of persons whose resolved father or mother is this person, in input order.
	pub children: Vec<PersonId>,
	/// Resolved spouse links, symmetric across the graph.
	pub spouses: Vec<PersonId>,
	/// Generation depth; 0 until the level assigner runs.
	pub level: usize,
}

impl TreeNode {
	fn new(person: Person) -> Self {
		Self {
			person,
			children: Vec::new(),
			spouses: Vec::new(),
			level: 0,
		}
	}

	/// Shorthand for `self.person.id`.
	pub fn id(&self) -> &PersonId {
		&self.person.id
	}
}

/// Read-only projection of a person and their direct relatives.
#[derive(Clone, Debug)]
pub struct Relations<'a> {
	/// The selected person.
	pub person: &'a TreeNode,
	/// Resolved father.
	pub father: Option<&'a TreeNode>,
	/// Resolved mother.
	pub mother: Option<&'a TreeNode>,
	/// First resolved spouse.
	pub spouse: Option<&'a TreeNode>,
	/// Resolved children, in input order.
	pub children: Vec<&'a TreeNode>,
}

/// Flat person records linked into parent/child and spouse structure.
///
/// Nodes keep the input order of the records they were built from. Dangling
/// references are dropped, never errored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FamilyGraph {
	nodes: Vec<TreeNode>,
	index: HashMap<PersonId, usize>,
	root_ids: Vec<PersonId>,
}

impl FamilyGraph {
	/// Build the graph from a complete person list.
	pub fn build(persons: impl IntoIterator<Item = Person>) -> Self {
		let mut graph = Self::default();
		for person in persons {
			if graph.index.contains_key(&person.id) {
				warn!("Duplicate person id {}, keeping first record", person.id);
				continue;
			}
			graph.index.insert(person.id.clone(), graph.nodes.len());
			graph.nodes.push(TreeNode::new(person));
		}

		for idx in 0..graph.nodes.len() {
			let (father, mother) = graph.resolved_parents(idx);
			let (id, person) = (graph.nodes[idx].id().clone(), &graph.nodes[idx].person);
			for dangling in person
				.parent_ids()
				.filter(|parent| !graph.index.contains_key(*parent))
			{
				warn!("Person {id} references unknown parent {dangling}, dropping link");
			}

			if let Some(f) = father {
				graph.nodes[f].children.push(id.clone());
			}
			if let Some(m) = mother.filter(|&m| Some(m) != father) {
				graph.nodes[m].children.push(id.clone());
			}
			if father.is_none() && mother.is_none() {
				graph.root_ids.push(id.clone());
			}

			let Some(spouse_id) = graph.nodes[idx].person.spouse_id.clone() else {
				continue;
			};
			match graph.index.get(&spouse_id).copied() {
				Some(s) if s == idx => warn!("Person {id} lists itself as spouse, ignoring"),
				Some(s) => {
					push_unique(&mut graph.nodes[idx].spouses, &spouse_id);
					push_unique(&mut graph.nodes[s].spouses, &id);
				}
				None => warn!("Person {id} references unknown spouse {spouse_id}, dropping link"),
			}
		}

		debug!(
			"Built family graph: {} nodes, {} roots",
			graph.nodes.len(),
			graph.root_ids.len()
		);
		graph
	}

	/// Father and mother slots resolved to node indices.
	fn resolved_parents(&self, idx: usize) -> (Option<usize>, Option<usize>) {
		let person = &self.nodes[idx].person;
		(
			person.father_id.as_ref().and_then(|f| self.index.get(f).copied()),
			person.mother_id.as_ref().and_then(|m| self.index.get(m).copied()),
		)
	}

	/// Number of persons.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when the snapshot held no persons.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Nodes in input order.
	pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
		self.nodes.iter()
	}

	/// Persons with no resolved father or mother, in input order.
	pub fn root_ids(&self) -> &[PersonId] {
		&self.root_ids
	}

	/// Look up a node by id.
	pub fn get(&self, id: &str) -> Option<&TreeNode> {
		self.index.get(id).map(|&idx| &self.nodes[idx])
	}

	/// Whether `id` resolves to a node.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub(crate) fn set_level(&mut self, idx: usize, level: usize) {
		self.nodes[idx].level = level;
	}

	/// Resolved father of `node`.
	pub fn father(&self, node: &TreeNode) -> Option<&TreeNode> {
		node.person.father_id.as_ref().and_then(|id| self.get(id.as_str()))
	}

	/// Resolved mother of `node`.
	pub fn mother(&self, node: &TreeNode) -> Option<&TreeNode> {
		node.person.mother_id.as_ref().and_then(|id| self.get(id.as_str()))
	}

	/// The person with their father, mother, first spouse and children.
	pub fn relations(&self, id: &str) -> Option<Relations<'_>> {
		let person = self.get(id)?;
		Some(Relations {
			person,
			father: self.father(person),
			mother: self.mother(person),
			spouse: person.spouses.first().and_then(|s| self.get(s.as_str())),
			children: person
				.children
				.iter()
				.filter_map(|c| self.get(c.as_str()))
				.collect(),
		})
	}

	/// Persons sharing a resolved father or mother with `id`, excluding `id`.
	pub fn siblings(&self, id: &str) -> Vec<&TreeNode> {
		let Some(node) = self.get(id) else {
			return Vec::new();
		};
		let mut seen = HashSet::new();
		[self.father(node), self.mother(node)]
			.into_iter()
			.flatten()
			.flat_map(|parent| parent.children.iter())
			.filter(|child| child.as_str() != id && seen.insert(*child))
			.filter_map(|child| self.get(child.as_str()))
			.collect()
	}

	/// All transitive resolved parents, nearest first, each once.
	pub fn ancestors(&self, id: &str) -> Vec<PersonId> {
		self.walk(id, |node| {
			node.person
				.parent_ids()
				.filter(|p| self.contains(p.as_str()))
				.cloned()
				.collect()
		})
	}

	/// All transitive children, nearest first, each once.
	pub fn descendants(&self, id: &str) -> Vec<PersonId> {
		self.walk(id, |node| node.children.clone())
	}

	/// Breadth-first walk guarded by a visited set, so cyclic data terminates.
	fn walk(&self, id: &str, next: impl Fn(&TreeNode) -> Vec<PersonId>) -> Vec<PersonId> {
		let Some(start) = self.get(id) else {
			return Vec::new();
		};
		let mut visited: HashSet<PersonId> = HashSet::from([start.id().clone()]);
		let mut queue = VecDeque::from([start]);
		let mut found = Vec::new();
		while let Some(node) = queue.pop_front() {
			for next_id in next(node) {
				if !visited.insert(next_id.clone()) {
					continue;
				}
				if let Some(next_node) = self.get(next_id.as_str()) {
					queue.push_back(next_node);
				}
				found.push(next_id);
			}
		}
		found
	}

	/// A rebuilt graph of `id`, its descendants, and the spouses of all of them.
	///
	/// Links leaving the subset become dangling and are dropped, so `id` is a
	/// root of the result. Levels are not assigned.
	pub fn subtree(&self, id: &str) -> Option<Self> {
		let start = self.get(id)?;
		let mut members: HashSet<&PersonId> = HashSet::from([start.id()]);
		let descendants = self.descendants(id);
		members.extend(descendants.iter());
		let spouses: Vec<&PersonId> = members
			.iter()
			.filter_map(|m| self.get(m.as_str()))
			.flat_map(|node| node.spouses.iter())
			.collect();
		members.extend(spouses);

		Some(Self::build(
			self.nodes
				.iter()
				.filter(|node| members.contains(node.id()))
				.map(|node| node.person.clone()),
		))
	}

	/// Number of distinct generation levels present.
	pub fn generation_count(&self) -> usize {
		self.nodes
			.iter()
			.map(|node| node.level)
			.collect::<BTreeSet<_>>()
			.len()
	}
}

fn push_unique(list: &mut Vec<PersonId>, id: &PersonId) {
	if !list.contains(id) {
		list.push(id.clone());
	}
}
