//! Point conversions between the spaces a node lives in.
//!
//! - local: the node's own space, before its position, rotation and scale.
//! - parent: the space of its parent, after them.
//! - root: the local space of the topmost ancestor. The root's own transform is not applied.
//! - window: surface pixels, reachable when the root is a view.

use glam::Vec2;

use crate::math::transform::TransformOffset;
use crate::node::view::View;
use crate::node::{NodeId, SceneNode};

use super::Scene;

impl Scene {
	pub fn local_to_parent(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
		Some(self.lookup(id)?.local_to_parent(point))
	}

	pub fn parent_to_local(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
		Some(self.lookup(id)?.parent_to_local(point))
	}

	pub fn local_to_root(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
		self.lookup(id)?;
		let mut point = point;
		let mut current = id;
		while let Some(parent) = self.arena[current].parent() {
			point = self.arena[current].get().local_to_parent(point);
			current = parent;
		}
		Some(point)
	}

	pub fn root_to_local(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
		self.lookup(id)?;
		let chain: Vec<NodeId> = id.ancestors(&self.arena).collect();
		let below_root = &chain[..chain.len() - 1];
		Some(
			below_root
				.iter()
				.rev()
				.fold(point, |point, ancestor| self.arena[*ancestor].get().parent_to_local(point)),
		)
	}

	/// `None` unless the root of `id` is a view.
	pub fn local_to_window(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
		let (node, view) = self.root_view(id)?;
		let point = self.local_to_root(id, point)?;
		Some(view.local_to_screen(node.trans_offset(), point))
	}

	/// `None` unless the root of `id` is a view.
	pub fn window_to_local(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
		let (node, view) = self.root_view(id)?;
		self.root_to_local(id, view.screen_to_local(node.trans_offset(), point))
	}

	/// Maps a surface pixel to the root space of what `view` shows there.
	///
	/// Through a camera, that is the root space of the tree the camera observes. Without one, it
	/// is the view's own local space.
	pub fn window_to_root(&self, view: NodeId, point: Vec2) -> Option<Vec2> {
		let node = self.lookup(view)?;
		let local = node.as_view()?.screen_to_local(node.trans_offset(), point);

		match self.observing_camera(view) {
			Some((camera, parent, zoom)) => self.local_to_root(parent, rigid(camera).apply(local / zoom)),
			None => Some(local),
		}
	}

	/// Inverse of [`window_to_root`](Self::window_to_root).
	pub fn root_to_window(&self, view: NodeId, point: Vec2) -> Option<Vec2> {
		let node = self.lookup(view)?;
		let state = node.as_view()?;

		let local = match self.observing_camera(view) {
			Some((camera, parent, zoom)) => rigid(camera).apply_inverse(self.root_to_local(parent, point)?) * zoom,
			None => point,
		};
		Some(state.local_to_screen(node.trans_offset(), local))
	}

	fn root_view(&self, id: NodeId) -> Option<(&SceneNode, &View)> {
		let node = self.lookup(self.root(id)?)?;
		Some((node, node.as_view()?))
	}

	/// The camera a view looks through, its parent and its zoom.
	fn observing_camera(&self, view: NodeId) -> Option<(&SceneNode, NodeId, Vec2)> {
		let camera = self.lookup(view)?.as_view()?.camera()?;
		let zoom = self.camera_zoom(camera, view)?;
		Some((self.lookup(camera)?, self.parent(camera)?, zoom))
	}
}

/// Camera placement within its parent, which leaves scale out.
fn rigid(camera: &SceneNode) -> TransformOffset {
	TransformOffset {
		scale: Vec2::ONE,
		..*camera.trans_offset()
	}
}
