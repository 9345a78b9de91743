use std::cmp::Ordering;

use tracing::debug;

use crate::node::{compare_depth, NodeId, SceneNode};

use super::{Scene, SceneError};

/// Maps a 1-based, possibly negative or out of range index onto `1..=len`.
///
/// `0` is the last position, `-1` the one before it, and so on. Returns `None` for an empty
/// sequence.
pub(crate) fn wrap_index(index: isize, len: usize) -> Option<usize> {
	if len == 0 {
		return None;
	}
	let len = len as isize;
	Some(((index - 1).rem_euclid(len) + 1) as usize)
}

impl Scene {
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.lookup(id)?;
		self.arena[id].parent()
	}

	/// Moves `id` under `parent`, at the end of its children, or detaches it with `None`.
	///
	/// The node is detached from its previous parent first, so it never belongs to two
	/// containers.
	pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
		match parent {
			Some(parent) => self.insert_child(parent, id),
			None => {
				self.get(id)?;
				id.detach(&mut self.arena);
				Ok(())
			}
		}
	}

	/// Topmost ancestor of `id`, which is `id` itself if it has no parent.
	pub fn root(&self, id: NodeId) -> Option<NodeId> {
		self.lookup(id)?;
		id.ancestors(&self.arena).last()
	}

	/// Appends `child` to the children of `parent`, detaching it from its previous parent.
	pub fn insert_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
		let kind = self.get(parent)?.kind();
		if !kind.is_container() {
			return Err(SceneError::NotAContainer(parent, kind));
		}
		self.get(child)?;

		parent.checked_append(child, &mut self.arena)?;
		Ok(())
	}

	/// Detaches `child` from `parent`. Does nothing if it is not one of its children.
	pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
		self.get(parent)?;
		if self.parent(child) == Some(parent) {
			child.detach(&mut self.arena);
		}
		Ok(())
	}

	/// Children of `id` in draw order.
	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		match self.lookup(id) {
			Some(_) => id.children(&self.arena).collect(),
			None => Vec::new(),
		}
	}

	pub fn child_count(&self, id: NodeId) -> usize {
		match self.lookup(id) {
			Some(_) => id.children(&self.arena).count(),
			None => 0,
		}
	}

	/// Child at a 1-based depth index. Out of range and negative indices wrap around, so `0` is
	/// the last child and `-1` the one before it.
	pub fn child(&self, parent: NodeId, index: isize) -> Option<NodeId> {
		let index = wrap_index(index, self.child_count(parent))?;
		parent.children(&self.arena).nth(index - 1)
	}

	/// 1-based position of `child` among the children of `parent`.
	pub fn child_depth(&self, parent: NodeId, child: NodeId) -> Option<usize> {
		self.lookup(parent)?;
		parent.children(&self.arena).position(|id| id == child).map(|i| i + 1)
	}

	/// Moves `child` to a 1-based (wrapped) depth index, shifting the siblings in between by one.
	/// Does nothing if it is not one of the children of `parent`.
	pub fn set_child_depth(&mut self, parent: NodeId, child: NodeId, index: isize) -> Result<(), SceneError> {
		self.get(parent)?;
		let len = self.child_count(parent);
		if self.child_depth(parent, child).is_none() {
			return Ok(());
		}
		let Some(target) = wrap_index(index, len) else {
			return Ok(());
		};

		child.detach(&mut self.arena);
		match parent.children(&self.arena).nth(target - 1) {
			Some(sibling) => sibling.checked_insert_before(child, &mut self.arena)?,
			None => parent.checked_append(child, &mut self.arena)?,
		}
		Ok(())
	}

	/// Depth index of `id` within its parent, `None` if it has no parent.
	pub fn depth(&self, id: NodeId) -> Option<usize> {
		let parent = self.parent(id)?;
		self.child_depth(parent, id)
	}

	/// Moves `id` within its parent. Does nothing if it has no parent.
	pub fn set_depth(&mut self, id: NodeId, index: isize) -> Result<(), SceneError> {
		self.get(id)?;
		match self.parent(id) {
			Some(parent) => self.set_child_depth(parent, id, index),
			None => Ok(()),
		}
	}

	/// Sorts the children of `parent` with [`compare_depth`]: by y, then by x.
	pub fn sort_children(&mut self, parent: NodeId) -> Result<(), SceneError> {
		self.sort_children_by(parent, compare_depth)
	}

	/// Sorts the children of `parent`. The sort is stable: children comparing equal keep their
	/// relative order.
	pub fn sort_children_by<F>(&mut self, parent: NodeId, mut compare: F) -> Result<(), SceneError>
	where
		F: FnMut(&SceneNode, &SceneNode) -> Ordering,
	{
		self.get(parent)?;
		let mut children = self.children(parent);
		children.sort_by(|a, b| compare(self.arena[*a].get(), self.arena[*b].get()));

		for child in children {
			parent.checked_append(child, &mut self.arena)?;
		}
		Ok(())
	}

	/// Fully releases every descendant of `parent`. Released nodes are not pooled.
	pub fn destroy_children(&mut self, parent: NodeId) -> Result<(), SceneError> {
		self.get(parent)?;
		let children = self.children(parent);
		if children.is_empty() {
			return Ok(());
		}

		let mut released = 0;
		for child in children {
			released += child.descendants(&self.arena).count();
			self.retire_subtree(child);
			child.remove_subtree(&mut self.arena);
		}
		self.pool.track_released(released);
		debug!("Released {} descendants of {:?}", released, parent);
		Ok(())
	}
}
