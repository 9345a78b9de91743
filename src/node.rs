/*!
Scene node types:
- Node -> plain positioned entity, draws nothing
- Sprite -> leaf drawing an external graphic
- Layer -> container drawing its children in sequence order
- Camera -> projection rendered on behalf of a View
- View -> output-bound container, the rendering entry point
*/

pub mod camera;
pub mod sprite;
pub mod view;

use std::cmp::Ordering;

use glam::{Affine2, Vec2};

use crate::math::transform::{CachedMatrix, TransformOffset};

use camera::Camera;
use sprite::Sprite;
use view::View;

pub use indextree::NodeId;

/// Type tag of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Node,
	Sprite,
	Layer,
	Camera,
	View,
}

impl NodeKind {
	pub const VALUES: [NodeKind; 5] = [
		NodeKind::Node,
		NodeKind::Sprite,
		NodeKind::Layer,
		NodeKind::Camera,
		NodeKind::View,
	];

	/// Whether nodes of this kind own a child sequence.
	pub fn is_container(self) -> bool {
		matches!(self, NodeKind::Layer | NodeKind::View)
	}

	pub fn name(self) -> &'static str {
		match self {
			NodeKind::Node => "Node",
			NodeKind::Sprite => "Sprite",
			NodeKind::Layer => "Layer",
			NodeKind::Camera => "Camera",
			NodeKind::View => "View",
		}
	}

	pub(crate) fn index(self) -> usize {
		self as usize
	}
}

/// Per-kind state of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
	Node,
	Sprite(Sprite),
	Layer,
	Camera(Camera),
	View(View),
}

impl NodeData {
	/// Default state for a freshly created node of `kind`.
	pub fn new(kind: NodeKind) -> Self {
		match kind {
			NodeKind::Node => NodeData::Node,
			NodeKind::Sprite => NodeData::Sprite(Sprite::default()),
			NodeKind::Layer => NodeData::Layer,
			NodeKind::Camera => NodeData::Camera(Camera::default()),
			NodeKind::View => NodeData::View(View::default()),
		}
	}

	pub fn kind(&self) -> NodeKind {
		match self {
			NodeData::Node => NodeKind::Node,
			NodeData::Sprite(_) => NodeKind::Sprite,
			NodeData::Layer => NodeKind::Layer,
			NodeData::Camera(_) => NodeKind::Camera,
			NodeData::View(_) => NodeKind::View,
		}
	}

	pub fn is_node(&self) -> bool {
		matches!(self, NodeData::Node)
	}

	pub fn is_sprite(&self) -> bool {
		matches!(self, NodeData::Sprite(_))
	}

	pub fn is_layer(&self) -> bool {
		matches!(self, NodeData::Layer)
	}

	pub fn is_camera(&self) -> bool {
		matches!(self, NodeData::Camera(_))
	}

	pub fn is_view(&self) -> bool {
		matches!(self, NodeData::View(_))
	}
}

/// A node of a [`Scene`](crate::scene::Scene).
///
/// Tree links live in the scene's arena; this struct only holds the node's own state. Every
/// position, rotation or scale mutation marks the cached matrix stale, and the matrix is rebuilt
/// the next time it is read.
#[derive(Debug, Clone)]
pub struct SceneNode {
	name: String,
	trans_offset: TransformOffset,
	visible: bool,
	matrix: CachedMatrix,
	pub(crate) freed: bool,
	data: NodeData,
}

impl SceneNode {
	pub fn new(kind: NodeKind) -> Self {
		Self {
			name: String::new(),
			trans_offset: TransformOffset::default(),
			visible: true,
			matrix: CachedMatrix::default(),
			freed: false,
			data: NodeData::new(kind),
		}
	}

	pub fn kind(&self) -> NodeKind {
		self.data.kind()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn set_name(&mut self, name: impl Into<String>) {
		self.name = name.into();
	}

	pub fn position(&self) -> Vec2 {
		self.trans_offset.translation
	}

	pub fn set_position(&mut self, position: Vec2) {
		self.trans_offset.translation = position;
		self.matrix.invalidate();
	}

	pub fn rotation(&self) -> f32 {
		self.trans_offset.rotation
	}

	pub fn set_rotation(&mut self, rotation: f32) {
		self.trans_offset.rotation = rotation;
		self.matrix.invalidate();
	}

	pub fn scale(&self) -> Vec2 {
		self.trans_offset.scale
	}

	pub fn set_scale(&mut self, scale: Vec2) {
		self.trans_offset.scale = scale;
		self.matrix.invalidate();
	}

	/// Position and rotation.
	pub fn transform(&self) -> (Vec2, f32) {
		(self.trans_offset.translation, self.trans_offset.rotation)
	}

	pub fn set_transform(&mut self, position: Vec2, rotation: f32) {
		self.trans_offset.translation = position;
		self.trans_offset.rotation = rotation;
		self.matrix.invalidate();
	}

	pub fn trans_offset(&self) -> &TransformOffset {
		&self.trans_offset
	}

	pub fn visible(&self) -> bool {
		self.visible
	}

	pub fn set_visible(&mut self, visible: bool) {
		self.visible = visible;
	}

	/// Whether the cached matrix is stale.
	pub fn is_dirty(&self) -> bool {
		self.matrix.is_dirty()
	}

	/// The matrix this node pushes when drawn, rebuilt if stale.
	///
	/// - Node, Layer: `Translate * Rotate * Scale`
	/// - Sprite: the above, followed by the sprite's graphic offset
	/// - Camera: `Translate * Rotate`, zoom is applied by the camera projection instead
	/// - View: `Translate(pivot) * Rotate * Scale * Translate(-position)`, excluding the screen position
	pub fn matrix(&self) -> Affine2 {
		self.matrix.get_or_update(|| match &self.data {
			NodeData::Node | NodeData::Layer => self.trans_offset.to_matrix(),
			NodeData::Sprite(sprite) => self.trans_offset.to_matrix() * sprite.offset_matrix(),
			NodeData::Camera(_) => self.trans_offset.to_rigid_matrix(),
			NodeData::View(view) => {
				Affine2::from_translation(view.pivot())
					* Affine2::from_scale_angle_translation(self.trans_offset.scale, self.trans_offset.rotation, Vec2::ZERO)
					* Affine2::from_translation(-self.trans_offset.translation)
			}
		})
	}

	/// Maps a point from this node's space to its parent's space.
	pub fn local_to_parent(&self, point: Vec2) -> Vec2 {
		self.trans_offset.apply(point)
	}

	/// Maps a point from the parent's space to this node's space.
	pub fn parent_to_local(&self, point: Vec2) -> Vec2 {
		self.trans_offset.apply_inverse(point)
	}

	pub fn data(&self) -> &NodeData {
		&self.data
	}

	pub(crate) fn data_mut(&mut self) -> &mut NodeData {
		&mut self.data
	}

	pub fn as_sprite(&self) -> Option<&Sprite> {
		match &self.data {
			NodeData::Sprite(sprite) => Some(sprite),
			_ => None,
		}
	}

	/// Mutable sprite state. Marks the cached matrix stale, as the graphic offset may change.
	pub fn as_sprite_mut(&mut self) -> Option<&mut Sprite> {
		match &mut self.data {
			NodeData::Sprite(sprite) => {
				self.matrix.invalidate();
				Some(sprite)
			}
			_ => None,
		}
	}

	pub fn as_camera(&self) -> Option<&Camera> {
		match &self.data {
			NodeData::Camera(camera) => Some(camera),
			_ => None,
		}
	}

	pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
		match &mut self.data {
			NodeData::Camera(camera) => Some(camera),
			_ => None,
		}
	}

	pub fn as_view(&self) -> Option<&View> {
		match &self.data {
			NodeData::View(view) => Some(view),
			_ => None,
		}
	}

	/// Frames a view: `center` shows at the pivot and, with a `range`, the view zooms so that an
	/// area of that size fills it. Zero range components leave the scale on that axis alone. Does
	/// nothing on other kinds.
	pub fn set_scene(&mut self, center: Vec2, range: Option<Vec2>) {
		let Some(view) = self.as_view() else {
			return;
		};
		let size = view.bounds().size.as_vec2();

		self.set_position(center);
		if let Some(range) = range {
			let scale = Vec2::select(range.cmpne(Vec2::ZERO), size / range, self.scale());
			self.set_scale(scale);
		}
	}

	/// Mutable view state. Marks the cached matrix stale, as bounds and origin feed into it.
	pub fn as_view_mut(&mut self) -> Option<&mut View> {
		match &mut self.data {
			NodeData::View(view) => {
				self.matrix.invalidate();
				Some(view)
			}
			_ => None,
		}
	}

	/// Puts the node back into its freshly created state, keeping its kind.
	pub(crate) fn reset(&mut self) {
		*self = Self::new(self.kind());
	}
}

/// Default depth ordering: by y, then by x on ties. Lower values sort first, i.e. get a lower
/// depth index and are drawn earlier.
pub fn compare_depth(a: &SceneNode, b: &SceneNode) -> Ordering {
	let (a, b) = (a.position(), b.position());
	a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;

	fn node_at(x: f32, y: f32) -> SceneNode {
		let mut node = SceneNode::new(NodeKind::Node);
		node.set_position(vec2(x, y));
		node
	}

	#[test]
	fn depth_comparator_orders_by_y_then_x() {
		let back = node_at(0., 5.);
		let front = node_at(0., 3.);
		assert_eq!(compare_depth(&back, &front), Ordering::Greater);
		assert_eq!(compare_depth(&front, &back), Ordering::Less);

		let left = node_at(-2., 3.);
		assert_eq!(compare_depth(&left, &front), Ordering::Less);
		assert_eq!(compare_depth(&front, &front.clone()), Ordering::Equal);
	}

	#[test]
	fn setters_mark_matrix_stale() {
		let mut node = SceneNode::new(NodeKind::Layer);
		node.matrix();
		assert!(!node.is_dirty());

		node.set_position(vec2(1., 2.));
		assert!(node.is_dirty());
		node.matrix();

		node.set_rotation(0.5);
		assert!(node.is_dirty());
		node.matrix();

		node.set_scale(vec2(2., 2.));
		assert!(node.is_dirty());
		node.matrix();

		node.set_transform(vec2(3., 3.), 1.);
		assert!(node.is_dirty());
		node.matrix();

		node.set_visible(false);
		assert!(!node.is_dirty());
	}

	#[test]
	fn lazy_matrix_reflects_latest_state() {
		let mut node = SceneNode::new(NodeKind::Layer);
		node.set_position(vec2(10., 0.));
		node.set_position(vec2(20., 0.));
		assert_eq!(node.matrix(), Affine2::from_translation(vec2(20., 0.)));
	}

	#[test]
	fn camera_matrix_excludes_scale() {
		let mut node = SceneNode::new(NodeKind::Camera);
		node.set_position(vec2(4., 4.));
		node.set_scale(vec2(3., 3.));
		assert_eq!(node.matrix(), Affine2::from_translation(vec2(4., 4.)));
	}

	#[test]
	fn parent_conversions_are_inverse() {
		let mut node = SceneNode::new(NodeKind::Sprite);
		node.set_transform(vec2(-7., 12.), 0.8);
		node.set_scale(vec2(-2., 0.5));

		let point = vec2(3., 4.);
		assert!(node.parent_to_local(node.local_to_parent(point)).abs_diff_eq(point, 1e-4));
		assert!(node.local_to_parent(node.parent_to_local(point)).abs_diff_eq(point, 1e-4));
	}

	#[test]
	fn kind_tags_match_data() {
		for kind in NodeKind::VALUES {
			let node = SceneNode::new(kind);
			assert_eq!(node.kind(), kind);
			assert_eq!(node.data().kind(), kind);
			assert_eq!(kind.is_container(), matches!(kind, NodeKind::Layer | NodeKind::View));
		}
		assert!(SceneNode::new(NodeKind::Sprite).as_sprite().is_some());
		assert!(SceneNode::new(NodeKind::Layer).as_sprite().is_none());
	}

	#[test]
	fn reset_restores_defaults_and_kind() {
		let mut node = SceneNode::new(NodeKind::Camera);
		node.set_name("cam");
		node.set_transform(vec2(1., 1.), 2.);
		node.set_visible(false);
		node.freed = true;

		node.reset();
		assert_eq!(node.kind(), NodeKind::Camera);
		assert_eq!(node.name(), "");
		assert_eq!(node.position(), Vec2::ZERO);
		assert!(node.visible());
		assert!(!node.freed);
	}

	#[test]
	fn set_scene_pans_and_zooms_views_only() {
		let mut view = SceneNode::new(NodeKind::View);
		view.as_view_mut()
			.unwrap()
			.set_bounds(view::ViewBounds::full(glam::uvec2(400, 200)));

		view.set_scene(vec2(50., 60.), None);
		assert_eq!(view.position(), vec2(50., 60.));
		assert_eq!(view.scale(), Vec2::ONE);

		view.set_scene(vec2(0., 0.), Some(vec2(100., 100.)));
		assert_eq!(view.position(), Vec2::ZERO);
		assert_eq!(view.scale(), vec2(4., 2.));

		let mut layer = SceneNode::new(NodeKind::Layer);
		layer.set_scene(vec2(5., 5.), Some(vec2(1., 1.)));
		assert_eq!(layer.position(), Vec2::ZERO);
	}

	#[test]
	fn set_scene_ignores_zero_range_components() {
		let mut view = SceneNode::new(NodeKind::View);
		view.as_view_mut()
			.unwrap()
			.set_bounds(view::ViewBounds::full(glam::uvec2(400, 200)));
		view.set_scale(vec2(3., 3.));

		view.set_scene(Vec2::ZERO, Some(vec2(0., 100.)));
		assert_eq!(view.scale(), vec2(3., 2.));

		view.set_scene(Vec2::ZERO, Some(Vec2::ZERO));
		assert_eq!(view.scale(), vec2(3., 2.));
		assert!(view.scale().is_finite());
	}
}
