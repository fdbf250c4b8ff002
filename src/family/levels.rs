//! Generation depth assignment.
//!
//! Every node reachable from a root receives the length of the longest
//! parent-to-child path leading to it, so a child always sits strictly below
//! each of its parents. Parent cycles are collapsed into strongly connected
//! components: a component starts one level below its deepest outside parent,
//! and its members are spread below that by a visited-set BFS from the members
//! entered from outside. Nodes unreachable from any root stay at level 0.

use std::collections::VecDeque;

use log::{debug, warn};

use super::graph::FamilyGraph;

/// Populate `level` on every node of `graph`.
pub fn assign_levels(mut graph: FamilyGraph) -> FamilyGraph {
	let children: Vec<Vec<usize>> = graph
		.nodes()
		.map(|node| {
			node.children
				.iter()
				.filter_map(|child| graph.index_of(child.as_str()))
				.collect()
		})
		.collect();
	let count = children.len();
	let mut parents = vec![Vec::new(); count];
	for (idx, list) in children.iter().enumerate() {
		for &child in list {
			parents[child].push(idx);
		}
	}

	let mut reachable = vec![false; count];
	let mut queue: VecDeque<usize> = graph
		.root_ids()
		.iter()
		.filter_map(|id| graph.index_of(id.as_str()))
		.collect();
	for &root in &queue {
		reachable[root] = true;
	}
	while let Some(idx) = queue.pop_front() {
		for &child in &children[idx] {
			if !reachable[child] {
				reachable[child] = true;
				queue.push_back(child);
			}
		}
	}

	let components = components(&children, &reachable);
	let mut component_of = vec![usize::MAX; count];
	for (c, members) in components.iter().enumerate() {
		for &member in members {
			component_of[member] = c;
		}
	}

	let mut levels = vec![0usize; count];
	let mut visited = vec![false; count];
	let mut cyclic = 0;
	// Components come out sinks first, so walk them backwards.
	for (c, members) in components.iter().enumerate().rev() {
		if members.len() > 1 || children[members[0]].contains(&members[0]) {
			cyclic += members.len();
		}
		let mut base = 0;
		let mut entries = Vec::new();
		for &member in members {
			let mut outside = parents[member]
				.iter()
				.filter(|&&p| reachable[p] && component_of[p] != c)
				.peekable();
			let is_root = !parents[member].iter().any(|&p| reachable[p]);
			if is_root || outside.peek().is_some() {
				entries.push(member);
			}
			for &p in outside {
				base = base.max(levels[p] + 1);
			}
		}
		if entries.is_empty() {
			entries.push(members[0]);
		}

		for &entry in &entries {
			visited[entry] = true;
			levels[entry] = base;
			queue.push_back(entry);
		}
		while let Some(idx) = queue.pop_front() {
			for &child in &children[idx] {
				if component_of[child] != c || visited[child] {
					continue;
				}
				visited[child] = true;
				levels[child] = levels[idx] + 1;
				queue.push_back(child);
			}
		}
	}

	if cyclic > 0 {
		warn!("{cyclic} persons sit on a parent cycle, their levels may be undercounted");
	}
	let unreachable = reachable.iter().filter(|r| !**r).count();
	if unreachable > 0 {
		warn!("{unreachable} persons are not reachable from any root, leaving them at level 0");
	}

	for (idx, level) in levels.into_iter().enumerate() {
		graph.set_level(idx, level);
	}
	debug!("Assigned levels: {} generations", graph.generation_count());
	graph
}

/// Strongly connected components of the reachable nodes, sinks first.
///
/// Iterative Tarjan; members of each component are sorted by input order.
fn components(children: &[Vec<usize>], reachable: &[bool]) -> Vec<Vec<usize>> {
	let count = children.len();
	let mut index: Vec<Option<usize>> = vec![None; count];
	let mut low = vec![0usize; count];
	let mut on_stack = vec![false; count];
	let mut stack = Vec::new();
	let mut found = Vec::new();
	let mut next = 0;

	for start in (0..count).filter(|&idx| reachable[idx]) {
		if index[start].is_some() {
			continue;
		}
		index[start] = Some(next);
		low[start] = next;
		next += 1;
		stack.push(start);
		on_stack[start] = true;
		let mut work = vec![(start, 0usize)];

		while let Some(frame) = work.last_mut() {
			let node = frame.0;
			if let Some(&child) = children[node].get(frame.1) {
				frame.1 += 1;
				match index[child] {
					None => {
						index[child] = Some(next);
						low[child] = next;
						next += 1;
						stack.push(child);
						on_stack[child] = true;
						work.push((child, 0));
					}
					Some(child_index) if on_stack[child] => {
						low[node] = low[node].min(child_index);
					}
					Some(_) => {}
				}
				continue;
			}

			work.pop();
			if let Some(&(parent, _)) = work.last() {
				low[parent] = low[parent].min(low[node]);
			}
			if Some(low[node]) == index[node] {
				let mut component = Vec::new();
				while let Some(member) = stack.pop() {
					on_stack[member] = false;
					component.push(member);
					if member == node {
						break;
					}
				}
				component.sort_unstable();
				found.push(component);
			}
		}
	}
	found
}
