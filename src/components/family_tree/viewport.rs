use crate::family::{LayoutConfig, Point};

pub const ZOOM_FACTOR: f64 = 1.2;
pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 3.0;
pub const INITIAL_PAN_Y: f64 = 50.0;

/// Screen offset and zoom applied to the world-space layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub pan_x: f64,
	pub pan_y: f64,
	pub scale: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub pan_start_x: f64,
	pub pan_start_y: f64,
}

/// Pan, zoom and compact/detailed mode. Never touches graph or layout data.
#[derive(Clone, Debug)]
pub struct ViewportController {
	viewport: Viewport,
	pan: PanState,
	compact: bool,
	center_x: f64,
}

impl ViewportController {
	/// Start centered horizontally on the container.
	pub fn new(container_width: f64) -> Self {
		let center_x = container_width / 2.0;
		Self {
			viewport: Self::initial(center_x),
			pan: PanState::default(),
			compact: false,
			center_x,
		}
	}

	fn initial(center_x: f64) -> Viewport {
		Viewport {
			pan_x: center_x,
			pan_y: INITIAL_PAN_Y,
			scale: 1.0,
		}
	}

	/// Current pan and scale.
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// One zoom step in, capped at `MAX_SCALE`.
	pub fn zoom_in(&mut self) {
		self.viewport.scale = (self.viewport.scale * ZOOM_FACTOR).min(MAX_SCALE);
	}

	/// One zoom step out, floored at `MIN_SCALE`.
	pub fn zoom_out(&mut self) {
		self.viewport.scale = (self.viewport.scale / ZOOM_FACTOR).max(MIN_SCALE);
	}

	/// Wheel zoom that keeps the world point under the cursor fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, zoom_in: bool) {
		let v = &mut self.viewport;
		let next = if zoom_in {
			v.scale * ZOOM_FACTOR
		} else {
			v.scale / ZOOM_FACTOR
		}
		.clamp(MIN_SCALE, MAX_SCALE);
		let ratio = next / v.scale;
		v.pan_x = sx - (sx - v.pan_x) * ratio;
		v.pan_y = sy - (sy - v.pan_y) * ratio;
		v.scale = next;
	}

	/// Back to the initial pan and scale.
	pub fn reset(&mut self) {
		self.viewport = Self::initial(self.center_x);
		self.pan = PanState::default();
	}

	/// Recenter horizontally after the container changes size.
	pub fn resize(&mut self, container_width: f64) {
		let center_x = container_width / 2.0;
		self.viewport.pan_x += center_x - self.center_x;
		self.center_x = center_x;
	}

	/// Start a background drag at a screen point.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			pan_start_x: self.viewport.pan_x,
			pan_start_y: self.viewport.pan_y,
		};
	}

	/// Follow the pointer; ignored unless a drag is active.
	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		self.viewport.pan_x = self.pan.pan_start_x + (sx - self.pan.start_x);
		self.viewport.pan_y = self.pan.pan_start_y + (sy - self.pan.start_y);
		true
	}

	/// Stop following the pointer.
	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Whether a drag is active.
	pub fn is_panning(&self) -> bool {
		self.pan.active
	}

	/// Flip between compact and detailed cards; returns the new mode.
	pub fn toggle_compact(&mut self) -> bool {
		self.compact = !self.compact;
		self.compact
	}

	/// Whether compact cards are shown.
	pub fn is_compact(&self) -> bool {
		self.compact
	}

	/// Card geometry for the current mode.
	pub fn layout_config(&self) -> LayoutConfig {
		if self.compact {
			LayoutConfig::compact()
		} else {
			LayoutConfig::detailed()
		}
	}

	/// Map a canvas pixel into layout coordinates.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		let v = &self.viewport;
		Point::new((sx - v.pan_x) / v.scale, (sy - v.pan_y) / v.scale)
	}

	/// Zoom as a whole percentage for the on-screen indicator.
	pub fn scale_percent(&self) -> u32 {
		(self.viewport.scale * 100.0).round() as u32
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_centered() {
		let vc = ViewportController::new(800.0);
		assert_eq!(
			vc.viewport(),
			Viewport {
				pan_x: 400.0,
				pan_y: INITIAL_PAN_Y,
				scale: 1.0
			}
		);
		assert_eq!(vc.scale_percent(), 100);
	}

	#[test]
	fn zoom_saturates_at_bounds() {
		let mut vc = ViewportController::new(800.0);
		for _ in 0..50 {
			vc.zoom_in();
			assert!(vc.viewport().scale <= MAX_SCALE);
		}
		assert_eq!(vc.viewport().scale, MAX_SCALE);
		for _ in 0..50 {
			vc.zoom_out();
			assert!(vc.viewport().scale >= MIN_SCALE);
		}
		assert_eq!(vc.viewport().scale, MIN_SCALE);
	}

	#[test]
	fn wheel_zoom_keeps_cursor_point() {
		let mut vc = ViewportController::new(800.0);
		let before = vc.screen_to_world(300.0, 200.0);
		vc.zoom_at(300.0, 200.0, true);
		let after = vc.screen_to_world(300.0, 200.0);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);
		for _ in 0..50 {
			vc.zoom_at(0.0, 0.0, false);
		}
		assert_eq!(vc.viewport().scale, MIN_SCALE);
	}

	#[test]
	fn pan_follows_drag_only_while_active() {
		let mut vc = ViewportController::new(800.0);
		assert!(!vc.pan_to(10.0, 10.0));
		vc.begin_pan(100.0, 100.0);
		assert!(vc.pan_to(130.0, 90.0));
		assert_eq!((vc.viewport().pan_x, vc.viewport().pan_y), (430.0, 40.0));
		vc.end_pan();
		assert!(!vc.pan_to(500.0, 500.0));
		assert_eq!(vc.viewport().pan_x, 430.0);
	}

	#[test]
	fn reset_restores_initial_state() {
		let mut vc = ViewportController::new(800.0);
		vc.zoom_in();
		vc.begin_pan(0.0, 0.0);
		vc.pan_to(50.0, 50.0);
		vc.reset();
		assert_eq!(vc.viewport(), ViewportController::new(800.0).viewport());
		assert!(!vc.is_panning());
	}

	#[test]
	fn resize_keeps_relative_pan() {
		let mut vc = ViewportController::new(800.0);
		vc.begin_pan(0.0, 0.0);
		vc.pan_to(20.0, 0.0);
		vc.end_pan();
		vc.resize(1000.0);
		assert_eq!(vc.viewport().pan_x, 520.0);
		vc.reset();
		assert_eq!(vc.viewport().pan_x, 500.0);
	}

	#[test]
	fn screen_to_world_undoes_pan_and_scale() {
		let mut vc = ViewportController::new(800.0);
		vc.zoom_in();
		let world = vc.screen_to_world(400.0 + 120.0, INITIAL_PAN_Y + 60.0);
		assert!((world.x - 100.0).abs() < 1e-9);
		assert!((world.y - 50.0).abs() < 1e-9);
	}

	#[test]
	fn compact_toggle_switches_preset() {
		let mut vc = ViewportController::new(800.0);
		assert_eq!(vc.layout_config(), LayoutConfig::detailed());
		assert!(vc.toggle_compact());
		assert_eq!(vc.layout_config(), LayoutConfig::compact());
		assert!(!vc.toggle_compact());
	}
}
