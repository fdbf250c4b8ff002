use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::render;
use super::state::TreeCanvasState;
use crate::family::{FamilyTree, PersonId};

type SharedState = Rc<RefCell<Option<TreeCanvasState>>>;

/// Today's date from the browser clock, for age labels.
pub fn today() -> NaiveDate {
	let now = js_sys::Date::new_0();
	NaiveDate::from_ymd_opt(
		now.get_full_year() as i32,
		now.get_month() + 1,
		now.get_date(),
	)
	.unwrap_or_default()
}

fn canvas_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	client_x: f64,
	client_y: f64,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x - rect.left(), client_y - rect.top()))
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0),
		window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0),
	)
}

#[component]
pub fn FamilyTreeCanvas(
	#[prop(into)] tree: Signal<FamilyTree>,
	selected: RwSignal<Option<PersonId>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	let (zoom, set_zoom) = signal(100u32);
	let (compact, set_compact) = signal(false);
	let (dragging, set_dragging) = signal(false);

	Effect::new(move |_| {
		let snapshot = tree.get();
		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.replace_tree(&snapshot);
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("No window, family tree canvas disabled");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("Canvas 2d context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(TreeCanvasState::new(&snapshot, w, h, today()));
		info!(
			"Family tree canvas ready: {} persons, {}x{}",
			snapshot.graph().len(),
			w,
			h
		);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.selected = selected.get_untracked();
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, ev.client_x() as f64, ev.client_y() as f64)
		else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			match s.node_at_position(x, y) {
				Some(id) => {
					s.selected = Some(id.clone());
					selected.set(Some(id));
				}
				None => {
					s.view.begin_pan(x, y);
					set_dragging.set(s.view.is_panning());
				}
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, ev.client_x() as f64, ev.client_y() as f64)
		else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if !s.view.pan_to(x, y) {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.view.end_pan();
		}
		set_dragging.set(false);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.view.end_pan();
			s.set_hover(None);
		}
		set_dragging.set(false);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, ev.client_x() as f64, ev.client_y() as f64)
		else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.view.zoom_at(x, y, ev.delta_y() < 0.0);
			set_zoom.set(s.view.scale_percent());
		}
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let Some(touch) = ev.touches().get(0) else {
			return;
		};
		let Some((x, y)) = canvas_point(canvas_ref, touch.client_x() as f64, touch.client_y() as f64)
		else {
			return;
		};
		if let Some(ref mut s) = *state_ts.borrow_mut() {
			s.view.begin_pan(x, y);
		}
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let Some(touch) = ev.touches().get(0) else {
			return;
		};
		let Some((x, y)) = canvas_point(canvas_ref, touch.client_x() as f64, touch.client_y() as f64)
		else {
			return;
		};
		if let Some(ref mut s) = *state_tm.borrow_mut() {
			if s.view.pan_to(x, y) {
				ev.prevent_default();
			}
		}
	};

	let state_te = state.clone();
	let on_touchend = move |_: TouchEvent| {
		if let Some(ref mut s) = *state_te.borrow_mut() {
			s.view.end_pan();
		}
	};

	let state_zi = state.clone();
	let on_zoom_in = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zi.borrow_mut() {
			s.view.zoom_in();
			set_zoom.set(s.view.scale_percent());
		}
	};

	let state_zo = state.clone();
	let on_zoom_out = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zo.borrow_mut() {
			s.view.zoom_out();
			set_zoom.set(s.view.scale_percent());
		}
	};

	let state_rs = state.clone();
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_rs.borrow_mut() {
			s.view.reset();
			set_zoom.set(s.view.scale_percent());
		}
	};

	let state_cm = state.clone();
	let on_compact = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_cm.borrow_mut() {
			s.toggle_compact();
			set_compact.set(s.view.is_compact());
		}
	};

	view! {
		<div class="tree-surface">
			<canvas
				node_ref=canvas_ref
				class="family-tree-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				style:display="block"
				style:cursor=move || if dragging.get() { "grabbing" } else { "grab" }
			/>
			<div class="tree-controls">
				<button title="Zoom in" on:click=on_zoom_in>"+"</button>
				<button title="Zoom out" on:click=on_zoom_out>"−"</button>
				<button title="Reset view" on:click=on_reset>"⤢"</button>
				<button title="Compact cards" class:active=move || compact.get() on:click=on_compact>
					"◉"
				</button>
			</div>
			<div class="zoom-indicator">{move || format!("{}%", zoom.get())}</div>
		</div>
	}
}
