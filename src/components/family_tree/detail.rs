use chrono::NaiveDate;
use leptos::prelude::*;

use crate::family::{FamilyTree, Gender, LifeStatus, PersonId, TreeNode};

fn format_date(date: Option<NaiveDate>) -> String {
	date.map(|d| d.format("%-d %B %Y").to_string())
		.unwrap_or_else(|| "-".to_string())
}

fn entry(node: &TreeNode) -> (PersonId, String) {
	(node.id().clone(), node.person.full_name.clone())
}

/// Clickable list of relatives; clicking one moves the selection there.
fn relative_list(
	relatives: Vec<(PersonId, String)>,
	selected: RwSignal<Option<PersonId>>,
) -> impl IntoView {
	if relatives.is_empty() {
		return view! { <p class="muted">"-"</p> }.into_any();
	}
	view! {
		<ul class="relatives">
			{relatives
				.into_iter()
				.map(|(id, name)| {
					view! {
						<li on:click=move |_| selected.set(Some(id.clone()))>{name}</li>
					}
				})
				.collect_view()}
		</ul>
	}
	.into_any()
}

/// Side panel with the selected person's details and direct relatives.
#[component]
pub fn MemberDetail(
	#[prop(into)] tree: Signal<FamilyTree>,
	selected: RwSignal<Option<PersonId>>,
	today: NaiveDate,
) -> impl IntoView {
	move || {
		let id = selected.get()?;
		let tree = tree.get();
		let graph = tree.graph();
		let rel = graph.relations(id.as_str())?;
		let person = &rel.person.person;

		let gender = match person.gender {
			Gender::Male => "Male",
			Gender::Female => "Female",
		};
		let status = match person.status() {
			LifeStatus::Alive => "Living",
			LifeStatus::Deceased => "Deceased",
		};
		let age = person
			.age_on(today)
			.map(|age| format!("{age} years"))
			.unwrap_or_else(|| "-".to_string());
		let (born, died) = (format_date(person.birth_date), format_date(person.death_date));
		let generation = rel.person.level + 1;
		let (name, bio) = (person.full_name.clone(), person.bio.clone());

		let parents: Vec<_> = [rel.father, rel.mother].into_iter().flatten().map(entry).collect();
		let spouses: Vec<_> = rel
			.person
			.spouses
			.iter()
			.filter_map(|s| graph.get(s.as_str()))
			.map(entry)
			.collect();
		let children: Vec<_> = rel.children.iter().copied().map(entry).collect();
		let siblings: Vec<_> = graph.siblings(id.as_str()).into_iter().map(entry).collect();

		Some(view! {
			<aside class="member-detail">
				<button class="close" title="Close" on:click=move |_| selected.set(None)>
					"×"
				</button>
				<h2>{name}</h2>
				<p class="meta">{gender} " · " {status} " · generation " {generation}</p>
				<dl>
					<dt>"Born"</dt>
					<dd>{born}</dd>
					<dt>"Died"</dt>
					<dd>{died}</dd>
					<dt>"Age"</dt>
					<dd>{age}</dd>
				</dl>
				{bio.map(|bio| view! { <p class="bio">{bio}</p> })}
				<h3>"Parents"</h3>
				{relative_list(parents, selected)}
				<h3>"Spouse"</h3>
				{relative_list(spouses, selected)}
				<h3>"Children"</h3>
				{relative_list(children, selected)}
				<h3>"Siblings"</h3>
				{relative_list(siblings, selected)}
			</aside>
		})
	}
}
