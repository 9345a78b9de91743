#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use glam::{Affine2, IVec2, UVec2, Vec2, Vec4};
use tracing::{debug, trace, warn};

use crate::node::sprite::{AlphaMode, BlendMode, Sprite};
use crate::node::view::{View, ViewBounds};
use crate::node::{NodeData, NodeId, NodeKind, SceneNode};
use crate::scene::{Scene, SceneError};

/// Handle to an image or other drawable owned by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawableId(pub u64);

/// Handle to a sub-region (quad) of a drawable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuadId(pub u64);

/// Handle to a shader program owned by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShaderId(pub u64);

/// Handle to an offscreen render target allocated by the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanvasId(pub u64);

macro_rules! impl_raw {
	($($t:ty),*) => {
		$(impl $t {
			pub fn raw(&self) -> u64 {
				self.0
			}
		})*
	};
}

impl_raw!(DrawableId, QuadId, ShaderId, CanvasId);

/// Backend the scene draws through. Strata2D does not rasterize anything itself: a host
/// implements this trait on top of its graphics API and the scene dispatches calls in draw order.
///
/// The backend keeps a transform stack. `push_transform` saves the current transform and
/// multiplies it by the given one, `pop_transform` restores the saved one. Transforms passed to
/// `draw` are relative to the current top of the stack.
pub trait Renderer {
	type Error: fmt::Display;

	/// Size of the output surface in pixels.
	fn surface_size(&self) -> UVec2;

	fn push_transform(&mut self, transform: &Affine2);
	fn pop_transform(&mut self);

	/// Restricts drawing to `rect` in surface pixels, or lifts the restriction.
	fn set_scissor(&mut self, rect: Option<ViewBounds>);

	fn set_color(&mut self, color: Vec4);
	/// Fills `rect`, in surface pixels, with the current color.
	fn fill_rect(&mut self, rect: ViewBounds);
	/// Clears the current render target.
	fn clear(&mut self, color: Vec4);

	fn set_blend_mode(&mut self, mode: BlendMode, alpha_mode: AlphaMode);

	/// Allocates an offscreen render target. May fail on resource exhaustion.
	fn create_canvas(&mut self, size: UVec2) -> Result<CanvasId, Self::Error>;
	/// Called when a canvas is replaced by one of another size, or its view is destroyed.
	fn release_canvas(&mut self, _canvas: CanvasId) {}
	/// Redirects drawing to `canvas`, or back to the surface.
	fn set_canvas(&mut self, canvas: Option<CanvasId>);

	/// Activates a shader program, or restores the default one.
	fn set_shader(&mut self, shader: Option<ShaderId>);

	fn draw(&mut self, drawable: DrawableId, quad: Option<QuadId>, transform: &Affine2);
	/// Draws `canvas` with its top-left corner at `position`, in surface pixels.
	fn draw_canvas(&mut self, canvas: CanvasId, position: IVec2);
}

impl Scene {
	/// Draws a view and everything it shows: the camera's subtree first, then the view's own
	/// children.
	///
	/// Canvases left behind by destroyed views are handed back to the renderer first.
	pub fn draw<R: Renderer>(&mut self, view: NodeId, renderer: &mut R) -> Result<(), SceneError> {
		self.release_canvases(renderer);

		let node = self.get_mut(view)?;
		if !node.visible() {
			return Ok(());
		}
		if let NodeData::View(state) = node.data_mut() {
			state.prepare_canvas(renderer);
		}

		self.draw_node(view, renderer);
		Ok(())
	}

	/// Hands the canvases of destroyed views back to `renderer`. [`draw`](Self::draw) does this on
	/// its own; call it before dropping the scene or the renderer.
	pub fn release_canvases<R: Renderer>(&mut self, renderer: &mut R) {
		for canvas in self.released_canvases.drain(..) {
			debug!("Releasing canvas {:?} of a destroyed view", canvas);
			renderer.release_canvas(canvas);
		}
	}

	/// Draws a single node with whatever transform is currently on the renderer's stack.
	///
	/// Invisible nodes and everything below them are skipped. Cameras draw nothing here, they
	/// only render on behalf of a view.
	pub fn draw_node<R: Renderer>(&self, id: NodeId, renderer: &mut R) {
		let Some(node) = self.lookup(id) else {
			return;
		};
		if !node.visible() {
			return;
		}

		match node.data() {
			NodeData::Node | NodeData::Camera(_) => {}
			NodeData::Layer => self.draw_layer(id, node, renderer),
			NodeData::Sprite(sprite) => draw_sprite(node, sprite, renderer),
			NodeData::View(view) => self.draw_view(id, node, view, renderer),
		}
	}

	fn draw_layer<R: Renderer>(&self, id: NodeId, node: &SceneNode, renderer: &mut R) {
		renderer.push_transform(&node.matrix());
		for child in id.children(&self.arena) {
			self.draw_node(child, renderer);
		}
		renderer.pop_transform();
	}

	fn draw_view<R: Renderer>(&self, id: NodeId, node: &SceneNode, view: &View, renderer: &mut R) {
		let bounds = view.bounds();
		trace!("Drawing view {:?} at {:?}", id, bounds);

		let offscreen = view.canvas().zip(view.shader());
		let mut transform = node.matrix();
		match offscreen {
			Some((canvas, _)) => {
				renderer.set_canvas(Some(canvas));
				renderer.clear(view.background());
			}
			None => {
				renderer.set_scissor(Some(bounds));
				renderer.set_color(view.background());
				renderer.fill_rect(bounds);
				transform = Affine2::from_translation(bounds.position.as_vec2()) * transform;
			}
		}

		renderer.push_transform(&transform);
		if let Some(camera) = view.camera() {
			self.render_camera(camera, id, renderer);
		}
		for child in id.children(&self.arena) {
			self.draw_node(child, renderer);
		}
		renderer.pop_transform();

		match offscreen {
			Some((canvas, shader)) => {
				renderer.set_canvas(None);
				renderer.set_shader(Some(shader));
				renderer.draw_canvas(canvas, bounds.position);
				renderer.set_shader(None);
			}
			None => renderer.set_scissor(None),
		}
	}

	/// Renders the tree a camera belongs to, as seen through the camera, into `view`.
	///
	/// The projection is the zoom times the inverse of the camera's placement in the space its
	/// root is drawn in, so a camera nested deep in the tree follows its ancestors. Nothing is
	/// drawn for an invisible camera, a camera without a parent, or a camera whose root is a
	/// view.
	pub fn render_camera<R: Renderer>(&self, camera: NodeId, view: NodeId, renderer: &mut R) {
		let Some(projection) = self.camera_projection(camera, view) else {
			return;
		};
		let Some(root) = self.root(camera) else {
			return;
		};

		renderer.push_transform(&projection);
		self.draw_node(root, renderer);
		renderer.pop_transform();
	}

	/// Zoom of a camera rendering into `view`, if the camera sits in a tree it can observe.
	pub(crate) fn camera_zoom(&self, camera: NodeId, view: NodeId) -> Option<Vec2> {
		let node = self.lookup(camera)?;
		let camera_state = node.as_camera()?;
		let view_size = self.lookup(view)?.as_view()?.bounds().size.as_vec2();

		let root = self.root(camera)?;
		if root == camera {
			return None;
		}
		if self.lookup(root)?.kind() == NodeKind::View {
			warn!(
				"Camera {:?} is inside the tree of view {:?} and can only observe a free-standing layer",
				camera, root
			);
			return None;
		}

		Some(camera_state.zoom(view_size, node.scale()))
	}

	/// `Scale(zoom) * placement⁻¹` for a camera rendering into `view`, if it can render at all.
	pub(crate) fn camera_projection(&self, camera: NodeId, view: NodeId) -> Option<Affine2> {
		let node = self.lookup(camera)?;
		if !node.visible() {
			return None;
		}

		let zoom = self.camera_zoom(camera, view)?;
		let placement = camera
			.ancestors(&self.arena)
			.skip(1)
			.filter_map(|id| self.lookup(id))
			.fold(node.matrix(), |placement, ancestor| ancestor.matrix() * placement);

		Some(Affine2::from_scale(zoom) * placement.inverse())
	}
}

fn draw_sprite<R: Renderer>(node: &SceneNode, sprite: &Sprite, renderer: &mut R) {
	let (Some(drawable), quad) = sprite.graphic() else {
		return;
	};

	let (blend_mode, alpha_mode) = sprite.mode();
	renderer.set_color(sprite.color());
	renderer.set_blend_mode(blend_mode, alpha_mode);

	match sprite.shader() {
		Some(shader) => {
			renderer.set_shader(Some(shader));
			renderer.draw(drawable, quad, &node.matrix());
			renderer.set_shader(None);
		}
		None => renderer.draw(drawable, quad, &node.matrix()),
	}
}
