use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use super::graph::{FamilyGraph, TreeNode};
use super::types::PersonId;

/// Detailed card width.
pub const NODE_WIDTH: f64 = 224.0;
/// Detailed card height.
pub const NODE_HEIGHT: f64 = 160.0;
/// Distance between level tops.
pub const LEVEL_HEIGHT: f64 = 200.0;
/// Distance between slots on one level.
pub const SIBLING_SPACING: f64 = 280.0;
/// Spouse offset from the shared slot; leaves a 40px gap between the cards.
pub const PAIR_OFFSET: f64 = 132.0;

/// Card footprint and spacing used by the layout engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Card width.
	pub node_width: f64,
	/// Card height.
	pub node_height: f64,
	/// Vertical distance between the tops of consecutive levels.
	pub level_height: f64,
	/// Horizontal distance between consecutive slots of one level.
	pub sibling_spacing: f64,
	/// How far each spouse of a pair sits from the slot it shares.
	pub pair_offset: f64,
}

impl LayoutConfig {
	/// Full person cards.
	pub const fn detailed() -> Self {
		Self {
			node_width: NODE_WIDTH,
			node_height: NODE_HEIGHT,
			level_height: LEVEL_HEIGHT,
			sibling_spacing: SIBLING_SPACING,
			pair_offset: PAIR_OFFSET,
		}
	}

	/// Avatar-sized cards.
	pub const fn compact() -> Self {
		Self {
			node_width: 96.0,
			node_height: 112.0,
			level_height: 150.0,
			sibling_spacing: 140.0,
			pair_offset: 60.0,
		}
	}
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self::detailed()
	}
}

/// A world-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downward.
	pub y: f64,
}

impl Point {
	/// Shorthand constructor.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Top-left corner of a person's card.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPosition {
	/// Person placed here.
	pub person_id: PersonId,
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
}

/// What a connector depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorKind {
	/// Parent above, child below.
	ParentChild,
	/// Two spouses side by side.
	Spouse,
}

/// A drawable relationship line.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
	/// Parent, or the lexically smaller spouse.
	pub from_id: PersonId,
	/// Child, or the lexically larger spouse.
	pub to_id: PersonId,
	/// Relationship drawn.
	pub kind: ConnectorKind,
	/// The other parent when one line serves both spouses of a couple.
	pub co_parent: Option<PersonId>,
	/// Polyline through world space.
	pub path: Vec<Point>,
}

/// World-space box around all cards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Top-left corner.
	pub min: Point,
	/// Bottom-right corner.
	pub max: Point,
}

impl Bounds {
	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}
}

enum Slot<'a> {
	Single(&'a PersonId),
	Pair(&'a PersonId, &'a PersonId),
}

/// Positions and connectors for a level-annotated graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeLayout {
	config: LayoutConfig,
	positions: Vec<LayoutPosition>,
	index: HashMap<PersonId, usize>,
	connectors: Vec<Connector>,
}

impl TreeLayout {
	/// Lay out `graph`. Deterministic for a given node order and levels.
	pub fn compute(graph: &FamilyGraph, config: LayoutConfig) -> Self {
		let mut layout = Self {
			config,
			..Self::default()
		};

		let mut by_level: BTreeMap<usize, Vec<&TreeNode>> = BTreeMap::new();
		for node in graph.nodes() {
			by_level.entry(node.level).or_default().push(node);
		}

		let mut claimed: HashSet<&PersonId> = HashSet::new();
		let mut paired: HashSet<(&PersonId, &PersonId)> = HashSet::new();
		for (level, members) in &by_level {
			let mut slots = Vec::with_capacity(members.len());
			for node in members {
				if !claimed.insert(node.id()) {
					continue;
				}
				let partner = node
					.spouses
					.iter()
					.find(|s| graph.contains(s.as_str()) && !claimed.contains(s));
				match partner {
					Some(spouse) => {
						claimed.insert(spouse);
						paired.insert((node.id().min(spouse), node.id().max(spouse)));
						if let Some(moved) = graph.get(spouse.as_str()).filter(|s| s.level != *level) {
							debug!(
								"Spouse {spouse} of {} drawn on level {level} instead of {}, its parent connectors run sideways",
								node.id(),
								moved.level
							);
						}
						slots.push(Slot::Pair(node.id(), spouse));
					}
					None => slots.push(Slot::Single(node.id())),
				}
			}

			let y = *level as f64 * config.level_height;
			let start = -(slots.len().saturating_sub(1) as f64) * config.sibling_spacing / 2.0;
			for (i, slot) in slots.into_iter().enumerate() {
				let x = start + i as f64 * config.sibling_spacing;
				match slot {
					Slot::Single(id) => layout.place(id, x, y),
					Slot::Pair(first, second) => {
						layout.place(first, x - config.pair_offset, y);
						layout.place(second, x + config.pair_offset, y);
					}
				}
			}
		}

		for node in graph.nodes() {
			for child in &node.children {
				if let Some(connector) = layout.parent_connector(graph, &paired, node, child) {
					layout.connectors.push(connector);
				}
			}
			for spouse in node.spouses.iter().filter(|s| node.id() < *s) {
				if let Some(connector) = layout.spouse_connector(node.id(), spouse) {
					layout.connectors.push(connector);
				}
			}
		}

		debug!(
			"Laid out {} nodes on {} levels with {} connectors",
			layout.positions.len(),
			by_level.len(),
			layout.connectors.len()
		);
		layout
	}

	fn place(&mut self, id: &PersonId, x: f64, y: f64) {
		self.index.insert(id.clone(), self.positions.len());
		self.positions.push(LayoutPosition {
			person_id: id.clone(),
			x,
			y,
		});
	}

	/// Elbow from a parent (or the middle of a couple's spouse line) to a child.
	fn parent_connector(
		&self,
		graph: &FamilyGraph,
		paired: &HashSet<(&PersonId, &PersonId)>,
		parent: &TreeNode,
		child_id: &PersonId,
	) -> Option<Connector> {
		if parent.id() == child_id {
			return None;
		}
		let (cfg, child) = (&self.config, self.position(child_id.as_str())?);
		let end = Point::new(child.x + cfg.node_width / 2.0, child.y);

		let (from_id, co_parent, start, bottom) = match self.couple_of(graph, paired, child_id) {
			Some((left, right)) => {
				let canonical = left.person_id.clone().min(right.person_id.clone());
				if parent.id() != &canonical {
					return None;
				}
				let other = if left.person_id == canonical { right } else { left };
				let start = Point::new(
					(left.x + cfg.node_width + right.x) / 2.0,
					left.y + cfg.node_height / 2.0,
				);
				(canonical, Some(other.person_id.clone()), start, left.y + cfg.node_height)
			}
			None => {
				let pos = self.position(parent.id().as_str())?;
				let start = Point::new(pos.x + cfg.node_width / 2.0, pos.y + cfg.node_height);
				(parent.id().clone(), None, start, start.y)
			}
		};

		let mid_y = bottom + (end.y - bottom) / 2.0;
		Some(Connector {
			from_id,
			to_id: child_id.clone(),
			kind: ConnectorKind::ParentChild,
			co_parent,
			path: vec![
				start,
				Point::new(start.x, mid_y),
				Point::new(end.x, mid_y),
				end,
			],
		})
	}

	/// The child's father and mother as a (left, right) pair when they were
	/// placed side by side as one slot.
	fn couple_of(
		&self,
		graph: &FamilyGraph,
		paired: &HashSet<(&PersonId, &PersonId)>,
		child_id: &PersonId,
	) -> Option<(&LayoutPosition, &LayoutPosition)> {
		let child = graph.get(child_id.as_str())?;
		let (father, mother) = (graph.father(child)?.id(), graph.mother(child)?.id());
		if !paired.contains(&(father.min(mother), father.max(mother))) {
			return None;
		}
		let (f, m) = (
			self.position(father.as_str())?,
			self.position(mother.as_str())?,
		);
		Some(if f.x <= m.x { (f, m) } else { (m, f) })
	}

	/// Straight line between the facing edges of two spouses, at mid-height.
	fn spouse_connector(&self, from: &PersonId, to: &PersonId) -> Option<Connector> {
		let (a, b) = (self.position(from.as_str())?, self.position(to.as_str())?);
		let (left, right) = if a.x <= b.x { (a, b) } else { (b, a) };
		let half = self.config.node_height / 2.0;
		Some(Connector {
			from_id: from.clone(),
			to_id: to.clone(),
			kind: ConnectorKind::Spouse,
			co_parent: None,
			path: vec![
				Point::new(left.x + self.config.node_width, left.y + half),
				Point::new(right.x, right.y + half),
			],
		})
	}

	/// Configuration the layout was computed with.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Every placed card, level by level, left to right.
	pub fn positions(&self) -> &[LayoutPosition] {
		&self.positions
	}

	/// Every connector, parent-child and spouse interleaved per node.
	pub fn connectors(&self) -> &[Connector] {
		&self.connectors
	}

	/// Position of one person.
	pub fn position(&self, id: &str) -> Option<&LayoutPosition> {
		self.index.get(id).map(|&idx| &self.positions[idx])
	}

	/// Center of one person's card.
	pub fn center(&self, id: &str) -> Option<Point> {
		self.position(id).map(|pos| {
			Point::new(
				pos.x + self.config.node_width / 2.0,
				pos.y + self.config.node_height / 2.0,
			)
		})
	}

	/// The card containing `point`, topmost (last drawn) first.
	pub fn node_at(&self, point: Point) -> Option<&PersonId> {
		let (w, h) = (self.config.node_width, self.config.node_height);
		self.positions
			.iter()
			.rev()
			.find(|pos| {
				point.x >= pos.x && point.x <= pos.x + w && point.y >= pos.y && point.y <= pos.y + h
			})
			.map(|pos| &pos.person_id)
	}

	/// Box around every card, `None` when nothing was placed.
	pub fn bounds(&self) -> Option<Bounds> {
		let (w, h) = (self.config.node_width, self.config.node_height);
		let mut iter = self.positions.iter();
		let first = iter.next()?;
		let init = Bounds {
			min: Point::new(first.x, first.y),
			max: Point::new(first.x + w, first.y + h),
		};
		Some(iter.fold(init, |b, pos| Bounds {
			min: Point::new(b.min.x.min(pos.x), b.min.y.min(pos.y)),
			max: Point::new(b.max.x.max(pos.x + w), b.max.y.max(pos.y + h)),
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::family::levels::assign_levels;
	use crate::family::types::{Gender, Person};

	fn layout_of(persons: Vec<Person>) -> (FamilyGraph, TreeLayout) {
		let graph = assign_levels(FamilyGraph::build(persons));
		let layout = TreeLayout::compute(&graph, LayoutConfig::detailed());
		(graph, layout)
	}

	fn couple_with_child() -> Vec<Person> {
		vec![
			Person::new("A", "A", Gender::Male).with_spouse("B"),
			Person::new("B", "B", Gender::Female).with_spouse("A"),
			Person::new("C", "C", Gender::Female)
				.with_father("A")
				.with_mother("B"),
		]
	}

	fn of_kind(layout: &TreeLayout, kind: ConnectorKind) -> Vec<&Connector> {
		layout.connectors().iter().filter(|c| c.kind == kind).collect()
	}

	#[test]
	fn child_sits_under_the_couple() {
		let (_, layout) = layout_of(couple_with_child());
		let (a, b, c) = (
			layout.position("A").unwrap(),
			layout.position("B").unwrap(),
			layout.position("C").unwrap(),
		);
		assert_eq!((a.x, a.y), (-PAIR_OFFSET, 0.0));
		assert_eq!((b.x, b.y), (PAIR_OFFSET, 0.0));
		assert_eq!((c.x, c.y), (0.0, LEVEL_HEIGHT));
		assert_eq!(c.x, (a.x + b.x) / 2.0, "child centered under the pair");
	}

	#[test]
	fn couple_shares_one_parent_connector() {
		let (_, layout) = layout_of(couple_with_child());
		let parent_lines = of_kind(&layout, ConnectorKind::ParentChild);
		assert_eq!(parent_lines.len(), 1);
		let line = parent_lines[0];
		assert_eq!(line.from_id.as_str(), "A");
		assert_eq!(line.to_id.as_str(), "C");
		assert_eq!(line.co_parent.as_ref().map(PersonId::as_str), Some("B"));

		let mid_x = NODE_WIDTH / 2.0;
		assert_eq!(
			line.path,
			vec![
				Point::new(mid_x, NODE_HEIGHT / 2.0),
				Point::new(mid_x, 180.0),
				Point::new(mid_x, 180.0),
				Point::new(mid_x, LEVEL_HEIGHT),
			]
		);
	}

	#[test]
	fn spouse_line_joins_facing_edges() {
		let (_, layout) = layout_of(couple_with_child());
		let spouse_lines = of_kind(&layout, ConnectorKind::Spouse);
		assert_eq!(spouse_lines.len(), 1);
		assert_eq!(
			spouse_lines[0].path,
			vec![
				Point::new(-PAIR_OFFSET + NODE_WIDTH, NODE_HEIGHT / 2.0),
				Point::new(PAIR_OFFSET, NODE_HEIGHT / 2.0),
			]
		);
	}

	#[test]
	fn single_parent_gets_an_elbow() {
		let (_, layout) = layout_of(vec![
			Person::new("p", "P", Gender::Male),
			Person::new("x", "X", Gender::Male).with_father("p"),
			Person::new("y", "Y", Gender::Female).with_father("p"),
		]);
		let (x, y) = (layout.position("x").unwrap(), layout.position("y").unwrap());
		assert_eq!((x.x, y.x), (-SIBLING_SPACING / 2.0, SIBLING_SPACING / 2.0));

		let lines = of_kind(&layout, ConnectorKind::ParentChild);
		assert_eq!(lines.len(), 2);
		let start = Point::new(NODE_WIDTH / 2.0, NODE_HEIGHT);
		let mid_y = NODE_HEIGHT + (LEVEL_HEIGHT - NODE_HEIGHT) / 2.0;
		assert_eq!(
			lines[0].path,
			vec![
				start,
				Point::new(start.x, mid_y),
				Point::new(x.x + NODE_WIDTH / 2.0, mid_y),
				Point::new(x.x + NODE_WIDTH / 2.0, LEVEL_HEIGHT),
			]
		);
		assert!(lines.iter().all(|l| l.co_parent.is_none()));
	}

	#[test]
	fn pair_takes_one_slot() {
		let (_, layout) = layout_of(vec![
			Person::new("a", "A", Gender::Male).with_spouse("b"),
			Person::new("s", "S", Gender::Male),
			Person::new("b", "B", Gender::Female),
		]);
		// Two slots: the a-b pair and s.
		let half = SIBLING_SPACING / 2.0;
		assert_eq!(layout.position("a").unwrap().x, -half - PAIR_OFFSET);
		assert_eq!(layout.position("b").unwrap().x, -half + PAIR_OFFSET);
		assert_eq!(layout.position("s").unwrap().x, half);
	}

	#[test]
	fn spouse_on_deeper_level_joins_the_first_row() {
		let (graph, layout) = layout_of(vec![
			Person::new("g", "G", Gender::Male),
			Person::new("p", "P", Gender::Male).with_father("g"),
			Person::new("w", "W", Gender::Female).with_spouse("p"),
		]);
		assert_eq!(graph.get("p").unwrap().level, 1);
		assert_eq!(graph.get("w").unwrap().level, 0);
		// w is processed on level 0 and pulls p up beside her, so the line
		// from g to p starts and ends on the same row.
		assert_eq!(layout.position("w").unwrap().y, 0.0);
		assert_eq!(layout.position("p").unwrap().y, 0.0);
		assert_eq!(layout.positions().len(), 3);
	}

	#[test]
	fn already_paired_spouse_is_not_reused() {
		// b is claimed by a; c also names b but must be placed alone.
		let (_, layout) = layout_of(vec![
			Person::new("a", "A", Gender::Male).with_spouse("b"),
			Person::new("b", "B", Gender::Female).with_spouse("a"),
			Person::new("c", "C", Gender::Male).with_spouse("b"),
		]);
		assert_eq!(layout.positions().len(), 3);
		let half = SIBLING_SPACING / 2.0;
		assert_eq!(layout.position("a").unwrap().x, -half - PAIR_OFFSET);
		assert_eq!(layout.position("c").unwrap().x, half);
		assert_eq!(of_kind(&layout, ConnectorKind::Spouse).len(), 2);
	}

	#[test]
	fn parents_paired_elsewhere_get_separate_elbows() {
		// m is paired with x, so f stands alone and c's parents are not adjacent.
		let (_, layout) = layout_of(vec![
			Person::new("x", "X", Gender::Male),
			Person::new("m", "M", Gender::Female).with_spouse("x"),
			Person::new("f", "F", Gender::Male).with_spouse("m"),
			Person::new("c", "C", Gender::Female)
				.with_father("f")
				.with_mother("m"),
		]);
		let lines = of_kind(&layout, ConnectorKind::ParentChild);
		assert_eq!(lines.len(), 2);
		assert!(lines.iter().all(|l| l.co_parent.is_none()));
		for line in lines {
			let parent = layout.position(line.from_id.as_str()).unwrap();
			assert_eq!(
				line.path[0],
				Point::new(parent.x + NODE_WIDTH / 2.0, parent.y + NODE_HEIGHT),
				"{} line must start below its own card",
				line.from_id
			);
		}
	}

	#[test]
	fn self_parent_draws_no_connector() {
		let (_, layout) = layout_of(vec![Person::new("s", "S", Gender::Male).with_father("s")]);
		assert!(layout.connectors().is_empty());
		assert_eq!(layout.positions().len(), 1);
	}

	#[test]
	fn empty_graph_lays_out_nothing() {
		let (_, layout) = layout_of(Vec::new());
		assert!(layout.positions().is_empty());
		assert!(layout.connectors().is_empty());
		assert!(layout.bounds().is_none());
	}

	#[test]
	fn hit_testing_and_bounds() {
		let (_, layout) = layout_of(couple_with_child());
		assert_eq!(
			layout.node_at(Point::new(0.0, LEVEL_HEIGHT + 10.0)).map(PersonId::as_str),
			Some("C")
		);
		assert!(layout.node_at(Point::new(0.0, -10.0)).is_none());
		let bounds = layout.bounds().unwrap();
		assert_eq!(bounds.min, Point::new(-PAIR_OFFSET, 0.0));
		assert_eq!(bounds.max, Point::new(PAIR_OFFSET + NODE_WIDTH, LEVEL_HEIGHT + NODE_HEIGHT));
		assert_eq!(
			layout.center("C"),
			Some(Point::new(NODE_WIDTH / 2.0, LEVEL_HEIGHT + NODE_HEIGHT / 2.0))
		);
	}

	#[test]
	fn compact_preset_changes_geometry_only() {
		let graph = assign_levels(FamilyGraph::build(couple_with_child()));
		let detailed = TreeLayout::compute(&graph, LayoutConfig::detailed());
		let compact = TreeLayout::compute(&graph, LayoutConfig::compact());
		assert_eq!(detailed.connectors().len(), compact.connectors().len());
		assert_eq!(compact.position("C").unwrap().y, LayoutConfig::compact().level_height);
	}
}
