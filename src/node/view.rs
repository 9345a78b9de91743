use glam::{IVec2, UVec2, Vec2, Vec4};
use tracing::{debug, warn};

use crate::math::transform::TransformOffset;
use crate::render::{CanvasId, Renderer, ShaderId};

use super::NodeId;

/// Output rectangle of a view, in surface pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewBounds {
	pub position: IVec2,
	pub size: UVec2,
}

impl ViewBounds {
	pub fn new(position: IVec2, size: UVec2) -> Self {
		Self { position, size }
	}

	/// Covers a whole surface of `size`.
	pub fn full(size: UVec2) -> Self {
		Self {
			position: IVec2::ZERO,
			size,
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct CanvasSlot {
	id: CanvasId,
	size: UVec2,
}

/// View state: where the scene lands on the output surface and how it gets there.
///
/// The node's position is the pan (the scene point shown at the pivot), its rotation and scale
/// turn and zoom the scene around the pivot.
#[derive(Debug, Clone)]
pub struct View {
	bounds: ViewBounds,
	origin: Vec2,
	background: Vec4,
	shader: Option<ShaderId>,
	canvas: Option<CanvasSlot>,
	canvas_failed: bool,
	camera: Option<NodeId>,
}

impl Default for View {
	fn default() -> Self {
		Self {
			bounds: ViewBounds::default(),
			origin: Vec2::splat(0.5),
			background: Vec4::new(0., 0., 0., 1.),
			shader: None,
			canvas: None,
			canvas_failed: false,
			camera: None,
		}
	}
}

impl View {
	pub fn bounds(&self) -> ViewBounds {
		self.bounds
	}

	pub fn set_bounds(&mut self, bounds: ViewBounds) {
		if bounds.size != self.bounds.size {
			self.canvas_failed = false;
		}
		self.bounds = bounds;
	}

	/// Resizes the view, keeping its position.
	pub fn set_dimensions(&mut self, size: UVec2) {
		self.set_bounds(ViewBounds::new(self.bounds.position, size));
	}

	/// Pivot as a ratio of the view size, `(0.5, 0.5)` being the center.
	pub fn origin(&self) -> Vec2 {
		self.origin
	}

	pub fn set_origin(&mut self, origin: Vec2) {
		self.origin = origin;
	}

	/// Pivot in pixels, relative to the view's top-left corner.
	pub fn pivot(&self) -> Vec2 {
		self.origin * self.bounds.size.as_vec2()
	}

	pub fn background(&self) -> Vec4 {
		self.background
	}

	pub fn set_background(&mut self, rgba: Vec4) {
		self.background = rgba;
	}

	/// Post-process shader. The offscreen canvas it needs is allocated at the next draw; clearing
	/// the shader keeps the canvas around.
	pub fn shader(&self) -> Option<ShaderId> {
		self.shader
	}

	pub fn set_shader(&mut self, shader: Option<ShaderId>) {
		self.shader = shader;
		self.canvas_failed = false;
	}

	pub fn camera(&self) -> Option<NodeId> {
		self.camera
	}

	pub fn set_camera(&mut self, camera: Option<NodeId>) {
		self.camera = camera;
	}

	/// The offscreen canvas, if one exists at the view's current size.
	pub fn canvas(&self) -> Option<CanvasId> {
		self.canvas.filter(|slot| slot.size == self.bounds.size).map(|slot| slot.id)
	}

	/// Removes the canvas, whatever its size, leaving the view to allocate a new one if needed.
	pub(crate) fn take_canvas(&mut self) -> Option<CanvasId> {
		self.canvas.take().map(|slot| slot.id)
	}

	/// Makes sure a canvas of the current size exists while a shader is set.
	///
	/// A failed allocation leaves the view without a canvas, so it renders directly and the shader
	/// has no effect. It is not retried until the shader or the view size changes.
	pub(crate) fn prepare_canvas<R: Renderer>(&mut self, renderer: &mut R) {
		if self.shader.is_none() || self.canvas().is_some() || self.canvas_failed {
			return;
		}

		if let Some(stale) = self.canvas.take() {
			renderer.release_canvas(stale.id);
		}

		let size = self.bounds.size;
		match renderer.create_canvas(size) {
			Ok(id) => {
				debug!("Allocated {}x{} canvas {:?}", size.x, size.y, id);
				self.canvas = Some(CanvasSlot { id, size });
			}
			Err(e) => {
				warn!("Could not allocate {}x{} view canvas, rendering directly: {}", size.x, size.y, e);
				self.canvas_failed = true;
			}
		}
	}

	/// Maps a surface pixel to the view's local (scene) space.
	pub(crate) fn screen_to_local(&self, trans_offset: &TransformOffset, point: Vec2) -> Vec2 {
		let centered = point - self.bounds.position.as_vec2() - self.pivot();
		let unrotated = Vec2::from_angle(-trans_offset.rotation).rotate(centered);
		unrotated / trans_offset.scale + trans_offset.translation
	}

	/// Maps a point of the view's local (scene) space to a surface pixel.
	pub(crate) fn local_to_screen(&self, trans_offset: &TransformOffset, point: Vec2) -> Vec2 {
		let scaled = (point - trans_offset.translation) * trans_offset.scale;
		Vec2::from_angle(trans_offset.rotation).rotate(scaled) + self.pivot() + self.bounds.position.as_vec2()
	}
}
