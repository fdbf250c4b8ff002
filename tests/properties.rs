use std::collections::HashSet;

use family_tree_canvas::family::{
	ConnectorKind, FamilyGraph, FamilyTree, Gender, LayoutConfig, Person, TreeLayout,
	assign_levels,
};
use proptest::prelude::*;

/// Link targets are drawn from `0..len + 3`, so some references dangle.
fn links(len: usize) -> impl Strategy<Value = Vec<(Option<usize>, Option<usize>, Option<usize>)>> {
	let target = || proptest::option::of(0..len + 3);
	proptest::collection::vec((target(), target(), target()), len)
}

fn family(max: usize) -> impl Strategy<Value = Vec<Person>> {
	(0..max).prop_flat_map(links).prop_map(|links| {
		links
			.into_iter()
			.enumerate()
			.map(|(i, (father, mother, spouse))| {
				let mut person = Person::new(format!("p{i}"), format!("Person {i}"), Gender::Male);
				person.father_id = father.map(|f| format!("p{f}").as_str().into());
				person.mother_id = mother.map(|m| format!("p{m}").as_str().into());
				person.spouse_id = spouse.map(|s| format!("p{s}").as_str().into());
				person
			})
			.collect()
	})
}

/// Parents always come earlier in the list, so no parent cycles exist.
fn acyclic_family(max: usize) -> impl Strategy<Value = Vec<Person>> {
	family(max).prop_map(|persons| {
		persons
			.into_iter()
			.enumerate()
			.map(|(i, mut person)| {
				let earlier = |id: &Option<family_tree_canvas::family::PersonId>| {
					id.as_ref()
						.and_then(|id| id.as_str()[1..].parse::<usize>().ok())
						.is_some_and(|n| n < i)
				};
				if !earlier(&person.father_id) {
					person.father_id = None;
				}
				if !earlier(&person.mother_id) {
					person.mother_id = None;
				}
				person
			})
			.collect()
	})
}

proptest! {
	#[test]
	fn roots_are_exactly_the_parentless(persons in family(12)) {
		let graph = FamilyGraph::build(persons.clone());
		let ids: HashSet<&str> = persons.iter().map(|p| p.id.as_str()).collect();
		for person in &persons {
			let has_parent = person.parent_ids().any(|p| ids.contains(p.as_str()));
			let is_root = graph.root_ids().contains(&person.id);
			prop_assert_eq!(is_root, !has_parent, "root mismatch for {}", person.id);
		}
	}

	#[test]
	fn children_sit_below_parents(persons in acyclic_family(12)) {
		let graph = assign_levels(FamilyGraph::build(persons));
		for node in graph.nodes() {
			for child in &node.children {
				let child_level = graph.get(child.as_str()).unwrap().level;
				prop_assert!(
					child_level > node.level,
					"{} (level {}) is not below {} (level {})",
					child, child_level, node.id(), node.level
				);
			}
		}
	}

	#[test]
	fn children_sit_below_parents_off_cycles(persons in family(12)) {
		let graph = assign_levels(FamilyGraph::build(persons));
		let mut reachable: HashSet<&str> = graph.root_ids().iter().map(|id| id.as_str()).collect();
		for root in graph.root_ids() {
			for id in graph.descendants(root.as_str()) {
				reachable.insert(graph.get(id.as_str()).unwrap().id().as_str());
			}
		}
		for node in graph.nodes().filter(|n| reachable.contains(n.id().as_str())) {
			for child in &node.children {
				let on_cycle = child == node.id()
					|| graph.descendants(child.as_str()).contains(node.id());
				if on_cycle {
					continue;
				}
				let child_level = graph.get(child.as_str()).unwrap().level;
				prop_assert!(
					child_level > node.level,
					"{} (level {}) is not below {} (level {})",
					child, child_level, node.id(), node.level
				);
			}
		}
	}

	#[test]
	fn spouse_links_are_symmetric(persons in family(12)) {
		let graph = FamilyGraph::build(persons);
		for node in graph.nodes() {
			if let Some(spouse) = node.person.spouse_id.as_ref().and_then(|s| graph.get(s.as_str())) {
				if spouse.id() != node.id() {
					prop_assert!(spouse.spouses.contains(node.id()));
					prop_assert!(node.spouses.contains(spouse.id()));
				}
			}
		}
	}

	#[test]
	fn any_input_terminates_and_places_everyone(persons in family(16)) {
		let tree = FamilyTree::from_persons(persons.clone(), LayoutConfig::detailed());
		let placed: HashSet<&str> = tree
			.layout()
			.positions()
			.iter()
			.map(|pos| pos.person_id.as_str())
			.collect();
		prop_assert_eq!(placed.len(), tree.graph().len());
		prop_assert_eq!(tree.layout().positions().len(), tree.graph().len());
	}

	#[test]
	fn layout_is_deterministic(persons in family(12)) {
		let graph = assign_levels(FamilyGraph::build(persons));
		let first = TreeLayout::compute(&graph, LayoutConfig::detailed());
		let second = TreeLayout::compute(&graph, LayoutConfig::detailed());
		prop_assert_eq!(first, second);
	}

	#[test]
	fn one_spouse_line_per_pair(persons in family(12)) {
		let tree = FamilyTree::from_persons(persons.clone(), LayoutConfig::detailed());
		let ids: HashSet<&str> = persons.iter().map(|p| p.id.as_str()).collect();
		let pairs: HashSet<(&str, &str)> = persons
			.iter()
			.filter_map(|p| {
				let spouse = p.spouse_id.as_ref()?.as_str();
				let own = p.id.as_str();
				(ids.contains(spouse) && spouse != own).then(|| (own.min(spouse), own.max(spouse)))
			})
			.collect();
		let lines = tree
			.layout()
			.connectors()
			.iter()
			.filter(|c| c.kind == ConnectorKind::Spouse)
			.count();
		prop_assert_eq!(lines, pairs.len());
	}
}

#[test]
fn three_person_scenario() {
	let tree = FamilyTree::from_persons(
		[
			Person::new("A", "A", Gender::Male).with_spouse("B"),
			Person::new("B", "B", Gender::Female).with_spouse("A"),
			Person::new("C", "C", Gender::Female)
				.with_father("A")
				.with_mother("B"),
		],
		LayoutConfig::detailed(),
	);
	let graph = tree.graph();
	let root_ids: Vec<&str> = graph.root_ids().iter().map(|id| id.as_str()).collect();
	assert_eq!(root_ids, ["A", "B"]);
	assert_eq!(graph.get("C").unwrap().level, 1);

	let layout = tree.layout();
	let (a, b, c) = (
		layout.center("A").unwrap(),
		layout.center("B").unwrap(),
		layout.center("C").unwrap(),
	);
	assert_eq!(c.x, (a.x + b.x) / 2.0);
	assert!(c.y > a.y);

	let count = |kind| layout.connectors().iter().filter(|c| c.kind == kind).count();
	assert_eq!(count(ConnectorKind::ParentChild), 1);
	assert_eq!(count(ConnectorKind::Spouse), 1);
}

#[test]
fn dangling_father_scenario() {
	let graph = FamilyGraph::build([Person::new("D", "D", Gender::Male).with_father("zzz")]);
	let root_ids: Vec<&str> = graph.root_ids().iter().map(|id| id.as_str()).collect();
	assert_eq!(root_ids, ["D"]);
}
