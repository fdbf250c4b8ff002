use leptos::prelude::*;
use log::info;

use crate::components::family_tree::{FamilyTreeCanvas, MemberDetail, today};
use crate::family::{FamilyTree, JsonRepository, LayoutConfig, PersonId, RepositoryError};

fn load_sample() -> Result<FamilyTree, RepositoryError> {
	let repo = JsonRepository::sample()?;
	let tree = FamilyTree::from_repository(&repo, LayoutConfig::detailed())?;
	info!(
		"Loaded sample family: {} persons over {} generations",
		tree.graph().len(),
		tree.graph().generation_count()
	);
	Ok(tree)
}

/// Family tree page backed by the bundled sample family.
#[component]
pub fn Tree() -> impl IntoView {
	let selected = RwSignal::new(None::<PersonId>);
	let loaded = load_sample().map(|tree| {
		let tree = Signal::stored(tree);
		view! {
			<div class="fullscreen-tree">
				<FamilyTreeCanvas tree=tree selected=selected fullscreen=true />
				<div class="tree-overlay">
					<h1>"Family Tree"</h1>
					<p class="subtitle">
						"Click a card for details. Scroll to zoom. Drag the background to pan."
					</p>
				</div>
				<MemberDetail tree=tree selected=selected today=today() />
			</div>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>{loaded}</ErrorBoundary>
	}
}
