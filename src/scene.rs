mod coords;
mod display;
mod pool;
mod tree;

use indextree::Arena;
use tracing::debug;

use crate::node::view::ViewBounds;
use crate::node::{NodeData, NodeId, NodeKind, SceneNode};
use crate::render::{CanvasId, Renderer};

use pool::NodePool;

pub use display::SceneDump;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneConfig {
	/// Maximum number of nodes kept between live and pooled ones. Destroyed nodes past this
	/// are released instead of pooled.
	pub cache_budget: usize,
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self { cache_budget: 2048 }
	}
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
	#[error("node {0:?} does not exist or was destroyed")]
	UnknownNode(NodeId),
	#[error("{1:?} node {0:?} cannot hold children")]
	NotAContainer(NodeId, NodeKind),
	#[error("invalid tree operation: {0}")]
	Tree(#[from] indextree::NodeError),
}

/// Owner of every node, and of the pool recycling destroyed ones.
///
/// Nodes are addressed by [`NodeId`]. Containers (layers and views) own their children through
/// the arena; a node's parent is only an index, never an owner. Independent scenes do not share
/// anything.
#[derive(Debug)]
pub struct Scene {
	pub(crate) arena: Arena<SceneNode>,
	pool: NodePool,
	/// Canvases of destroyed views, waiting for a renderer to take them back.
	pub(crate) released_canvases: Vec<CanvasId>,
}

impl Default for Scene {
	fn default() -> Self {
		Self::new()
	}
}

impl Scene {
	pub fn new() -> Self {
		Self::with_config(SceneConfig::default())
	}

	pub fn with_config(config: SceneConfig) -> Self {
		Self {
			arena: Arena::new(),
			pool: NodePool::new(config.cache_budget),
			released_canvases: Vec::new(),
		}
	}

	pub fn cache_budget(&self) -> usize {
		self.pool.cache_budget()
	}

	/// Number of nodes created and not destroyed yet.
	pub fn live_count(&self) -> usize {
		self.pool.live()
	}

	/// Number of destroyed nodes of `kind` waiting for reuse.
	pub fn pooled_count(&self, kind: NodeKind) -> usize {
		self.pool.pooled(kind)
	}

	/// Creates a detached node in its default state, reusing a pooled one of the same kind if
	/// there is one.
	pub fn create(&mut self, kind: NodeKind) -> NodeId {
		if let Some(id) = self.pool.take(kind) {
			debug!("Reusing pooled {} {:?}", kind.name(), id);
			self.arena[id].get_mut().reset();
			return id;
		}

		self.pool.track_new();
		self.arena.new_node(SceneNode::new(kind))
	}

	pub fn create_node(&mut self) -> NodeId {
		self.create(NodeKind::Node)
	}

	pub fn create_sprite(&mut self) -> NodeId {
		self.create(NodeKind::Sprite)
	}

	pub fn create_layer(&mut self) -> NodeId {
		self.create(NodeKind::Layer)
	}

	pub fn create_camera(&mut self) -> NodeId {
		self.create(NodeKind::Camera)
	}

	pub fn create_view(&mut self, bounds: ViewBounds) -> NodeId {
		let id = self.create(NodeKind::View);
		if let Some(view) = self.arena[id].get_mut().as_view_mut() {
			view.set_bounds(bounds);
		}
		id
	}

	/// Creates a view covering the renderer's whole output surface.
	pub fn create_view_fullscreen<R: Renderer>(&mut self, renderer: &R) -> NodeId {
		self.create_view(ViewBounds::full(renderer.surface_size()))
	}

	/// Destroys a node: detaches it, releases all of its descendants, then pools it for reuse or
	/// releases it too if the cache budget is exhausted.
	///
	/// The id must not be used afterwards. It may come back from [`create`](Self::create). Views
	/// looking through a destroyed camera lose their camera, and the canvases of destroyed views
	/// are queued for [`release_canvases`](Self::release_canvases).
	pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
		self.assert_not_freed(id);
		let kind = self.get(id)?.kind();

		self.destroy_children(id)?;
		self.retire_subtree(id);
		id.detach(&mut self.arena);

		if self.pool.retire() {
			let node = self.arena[id].get_mut();
			node.reset();
			node.freed = true;
			self.pool.put(kind, id);
			debug!("Pooled {} {:?}", kind.name(), id);
		} else {
			id.remove(&mut self.arena);
			debug!("Released {} {:?}", kind.name(), id);
		}
		Ok(())
	}

	/// Releases every pooled node.
	pub fn purge_pool(&mut self) {
		let pooled = self.pool.drain();
		debug!("Purging {} pooled nodes", pooled.len());
		for id in pooled {
			id.remove(&mut self.arena);
		}
	}

	/// Gives up what the nodes of a subtree about to be destroyed hold outside of it: view
	/// canvases, and camera links from other views.
	pub(crate) fn retire_subtree(&mut self, root: NodeId) {
		let subtree: Vec<NodeId> = root.descendants(&self.arena).collect();
		let mut cameras = Vec::new();
		for id in subtree {
			match self.arena[id].get_mut().data_mut() {
				NodeData::View(view) => self.released_canvases.extend(view.take_canvas()),
				NodeData::Camera(_) => cameras.push(id),
				_ => {}
			}
		}
		if cameras.is_empty() {
			return;
		}

		for node in self.arena.iter_mut().filter(|node| !node.is_removed()) {
			let node = node.get_mut();
			if node.freed {
				continue;
			}
			if let NodeData::View(view) = node.data_mut() {
				if view.camera().is_some_and(|camera| cameras.contains(&camera)) {
					debug!("Unlinking destroyed camera {:?} from its view", view.camera());
					view.set_camera(None);
				}
			}
		}
	}

	pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
		self.assert_not_freed(id);
		self.lookup(id)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
		self.assert_not_freed(id);
		self.get_mut(id).ok()
	}

	pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
		self.lookup(id).map(SceneNode::kind)
	}

	/// Whether `id` refers to a node that was created and not destroyed since.
	pub fn is_alive(&self, id: NodeId) -> bool {
		self.lookup(id).is_some()
	}

	pub(crate) fn lookup(&self, id: NodeId) -> Option<&SceneNode> {
		let node = self.arena.get(id)?;
		if node.is_removed() || node.get().freed {
			return None;
		}
		Some(node.get())
	}

	pub(crate) fn get(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
		self.lookup(id).ok_or(SceneError::UnknownNode(id))
	}

	pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
		match self.arena.get_mut(id) {
			Some(node) if !node.is_removed() && !node.get().freed => Ok(node.get_mut()),
			_ => Err(SceneError::UnknownNode(id)),
		}
	}

	fn assert_not_freed(&self, id: NodeId) {
		debug_assert!(
			!self.arena.get(id).is_some_and(|node| !node.is_removed() && node.get().freed),
			"use of destroyed node {id:?}"
		);
	}
}
