use std::collections::HashSet;

use chrono::NaiveDate;
use log::debug;

use super::viewport::ViewportController;
use crate::family::{FamilyTree, PersonId};

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<PersonId>,
	pub related: HashSet<PersonId>,
}

pub struct TreeCanvasState {
	pub tree: FamilyTree,
	pub view: ViewportController,
	pub hover: HoverState,
	pub selected: Option<PersonId>,
	pub width: f64,
	pub height: f64,
	pub today: NaiveDate,
}

impl TreeCanvasState {
	pub fn new(tree: &FamilyTree, width: f64, height: f64, today: NaiveDate) -> Self {
		Self {
			tree: tree.clone(),
			view: ViewportController::new(width),
			hover: HoverState::default(),
			selected: None,
			width,
			height,
			today,
		}
	}

	/// Swap in a rebuilt snapshot, keeping the current card geometry.
	pub fn replace_tree(&mut self, tree: &FamilyTree) {
		let config = self.view.layout_config();
		self.tree = if *tree.layout().config() == config {
			tree.clone()
		} else {
			tree.relayout(config)
		};
		if let Some(id) = &self.selected {
			if !self.tree.graph().contains(id.as_str()) {
				self.selected = None;
			}
		}
		self.set_hover(None);
	}

	pub fn toggle_compact(&mut self) {
		let compact = self.view.toggle_compact();
		self.tree = self.tree.relayout(self.view.layout_config());
		debug!("Compact mode {}", if compact { "on" } else { "off" });
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<PersonId> {
		let point = self.view.screen_to_world(sx, sy);
		self.tree.layout().node_at(point).cloned()
	}

	/// Hovering highlights the person plus parents, spouses and children.
	pub fn set_hover(&mut self, node: Option<PersonId>) {
		if self.hover.node == node {
			return;
		}
		self.hover.related.clear();
		if let Some(tree_node) = node.as_ref().and_then(|id| self.tree.graph().get(id.as_str())) {
			let graph = self.tree.graph();
			self.hover.related.extend(
				tree_node
					.person
					.parent_ids()
					.filter(|p| graph.contains(p.as_str()))
					.chain(tree_node.spouses.iter())
					.chain(tree_node.children.iter())
					.cloned(),
			);
		}
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &PersonId) -> bool {
		self.hover.node.as_ref() == Some(id) || self.hover.related.contains(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some()
	}

	pub fn is_selected(&self, id: &PersonId) -> bool {
		self.selected.as_ref() == Some(id)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.view.resize(width);
	}
}
