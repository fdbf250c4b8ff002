use std::f64::consts::PI;

use chrono::Datelike;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::TreeCanvasState;
use crate::family::{ConnectorKind, Gender, LayoutPosition, LifeStatus, TreeNode};

const BACKGROUND: &str = "#f3f4f6";
const LINE_COLOR: &str = "#cbd5e1";
const SPOUSE_COLOR: &str = "#f472b6";
const SELECTED_COLOR: &str = "#6366f1";

fn gender_color(gender: Gender) -> &'static str {
	match gender {
		Gender::Male => "#3b82f6",
		Gender::Female => "#ec4899",
	}
}

fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_string();
	}
	let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
	out.push('…');
	out
}

pub fn render(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	if state.tree.graph().is_empty() {
		draw_empty_state(state, ctx);
		return;
	}

	let v = state.view.viewport();
	ctx.save();
	let _ = ctx.translate(v.pan_x, v.pan_y);
	let _ = ctx.scale(v.scale, v.scale);
	draw_connectors(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_empty_state(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	ctx.set_text_align("center");
	ctx.set_fill_style_str("#6b7280");
	ctx.set_font("18px sans-serif");
	let _ = ctx.fill_text("No family members yet", cx, cy);
	ctx.set_fill_style_str("#9ca3af");
	ctx.set_font("13px sans-serif");
	let _ = ctx.fill_text("Add the first family member to start the tree", cx, cy + 24.0);
}

fn draw_connectors(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	let dim = state.has_active_highlight();
	ctx.set_line_width(2.0);
	ctx.set_line_cap("round");
	ctx.set_line_join("round");

	for connector in state.tree.layout().connectors() {
		let lit = state.is_highlighted(&connector.from_id) && state.is_highlighted(&connector.to_id);
		ctx.set_global_alpha(if dim && !lit { 0.3 } else { 1.0 });
		let color = match connector.kind {
			ConnectorKind::ParentChild => LINE_COLOR,
			ConnectorKind::Spouse => SPOUSE_COLOR,
		};
		ctx.set_stroke_style_str(color);

		let mut points = connector.path.iter();
		let Some(first) = points.next() else {
			continue;
		};
		ctx.begin_path();
		ctx.move_to(first.x, first.y);
		for p in points {
			ctx.line_to(p.x, p.y);
		}
		ctx.stroke();

		if connector.kind == ConnectorKind::Spouse {
			if let (Some(a), Some(b)) = (connector.path.first(), connector.path.last()) {
				ctx.set_fill_style_str(SPOUSE_COLOR);
				ctx.set_font("14px sans-serif");
				ctx.set_text_align("center");
				let _ = ctx.fill_text("♥", (a.x + b.x) / 2.0, (a.y + b.y) / 2.0 - 5.0);
			}
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	let (graph, cfg) = (state.tree.graph(), *state.tree.layout().config());
	let (dim, compact) = (state.has_active_highlight(), state.view.is_compact());

	for pos in state.tree.layout().positions() {
		let Some(node) = graph.get(pos.person_id.as_str()) else {
			continue;
		};
		let faded = dim && !state.is_highlighted(node.id());
		ctx.set_global_alpha(if faded { 0.35 } else { 1.0 });
		if compact {
			draw_compact_card(state, ctx, node, pos, cfg.node_width);
		} else {
			draw_detailed_card(state, ctx, node, pos, cfg.node_width, cfg.node_height);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn set_border(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d, node: &TreeNode) {
	let selected = state.is_selected(node.id());
	ctx.set_stroke_style_str(if selected {
		SELECTED_COLOR
	} else {
		gender_color(node.person.gender)
	});
	ctx.set_line_width(if selected { 3.0 } else { 1.5 });
	let dash = match node.person.status() {
		LifeStatus::Deceased => {
			js_sys::Array::of2(&JsValue::from_f64(6.0), &JsValue::from_f64(4.0))
		}
		LifeStatus::Alive => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&dash);
}

fn draw_detailed_card(
	state: &TreeCanvasState,
	ctx: &CanvasRenderingContext2d,
	node: &TreeNode,
	pos: &LayoutPosition,
	w: f64,
	h: f64,
) {
	let person = &node.person;
	ctx.set_fill_style_str("white");
	ctx.fill_rect(pos.x, pos.y, w, h);
	set_border(state, ctx, node);
	ctx.stroke_rect(pos.x, pos.y, w, h);
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	// avatar
	let (ax, ay, r) = (pos.x + 36.0, pos.y + 40.0, 24.0);
	ctx.begin_path();
	let _ = ctx.arc(ax, ay, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(gender_color(person.gender));
	ctx.fill();
	ctx.set_fill_style_str("white");
	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	let _ = ctx.fill_text(&person.initials(), ax, ay + 5.0);

	ctx.set_text_align("left");
	ctx.set_fill_style_str("#111827");
	ctx.set_font("bold 14px sans-serif");
	let _ = ctx.fill_text(&truncate(&person.full_name, 18), pos.x + 70.0, pos.y + 36.0);
	if person.status() == LifeStatus::Deceased {
		ctx.set_fill_style_str("#6b7280");
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text("Deceased", pos.x + 70.0, pos.y + 54.0);
	}

	ctx.set_fill_style_str("#4b5563");
	ctx.set_font("12px sans-serif");
	let years = match (person.birth_date, person.death_date) {
		(Some(b), Some(d)) => format!("{} – {}", b.year(), d.year()),
		(Some(b), None) => format!("Born {}", b.year()),
		(None, Some(d)) => format!("† {}", d.year()),
		(None, None) => "-".to_string(),
	};
	let _ = ctx.fill_text(&years, pos.x + 16.0, pos.y + 92.0);
	if let Some(age) = person.age_on(state.today) {
		let _ = ctx.fill_text(&format!("{age} years"), pos.x + 16.0, pos.y + 110.0);
	}
	if let Some(spouse) = node.spouses.first().and_then(|s| state.tree.graph().get(s.as_str())) {
		ctx.set_fill_style_str(SPOUSE_COLOR);
		let _ = ctx.fill_text(
			&format!("♥ {}", truncate(&spouse.person.full_name, 22)),
			pos.x + 16.0,
			pos.y + 128.0,
		);
	}
	if let Some(bio) = &person.bio {
		ctx.set_fill_style_str("#6b7280");
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text(&truncate(bio, 32), pos.x + 16.0, pos.y + h - 12.0);
	}
}

fn draw_compact_card(
	state: &TreeCanvasState,
	ctx: &CanvasRenderingContext2d,
	node: &TreeNode,
	pos: &LayoutPosition,
	w: f64,
) {
	let person = &node.person;
	let (cx, cy, r) = (pos.x + w / 2.0, pos.y + 34.0, 32.0);
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(gender_color(person.gender));
	ctx.fill();
	set_border(state, ctx, node);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	ctx.set_text_align("center");
	ctx.set_fill_style_str("white");
	ctx.set_font("bold 16px sans-serif");
	let _ = ctx.fill_text(&person.initials(), cx, cy + 6.0);

	let first_name = person.full_name.split_whitespace().next().unwrap_or_default();
	ctx.set_fill_style_str("#111827");
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(&truncate(first_name, 12), cx, pos.y + 84.0);
	if let Some(birth) = person.birth_date {
		ctx.set_fill_style_str("#9ca3af");
		ctx.set_font("10px sans-serif");
		let _ = ctx.fill_text(&birth.year().to_string(), cx, pos.y + 100.0);
	}
}
