use indextree::NodeId;

use crate::node::NodeKind;

/// Free lists of destroyed nodes waiting for reuse, one per kind, plus the live count.
///
/// Pooled nodes stay in the scene arena, detached and tagged as freed. At most `cache_budget`
/// nodes are kept between live and pooled ones; past that, destroyed nodes are released.
#[derive(Debug)]
pub(crate) struct NodePool {
	free: [Vec<NodeId>; NodeKind::VALUES.len()],
	live: usize,
	cache_budget: usize,
}

impl NodePool {
	pub fn new(cache_budget: usize) -> Self {
		Self {
			free: Default::default(),
			live: 0,
			cache_budget,
		}
	}

	pub fn cache_budget(&self) -> usize {
		self.cache_budget
	}

	pub fn live(&self) -> usize {
		self.live
	}

	pub fn pooled(&self, kind: NodeKind) -> usize {
		self.free[kind.index()].len()
	}

	pub fn pooled_total(&self) -> usize {
		self.free.iter().map(Vec::len).sum()
	}

	/// A pooled node of `kind`, most recently destroyed first.
	pub fn take(&mut self, kind: NodeKind) -> Option<NodeId> {
		let id = self.free[kind.index()].pop()?;
		self.live += 1;
		Some(id)
	}

	pub fn track_new(&mut self) {
		self.live += 1;
	}

	pub fn track_released(&mut self, count: usize) {
		debug_assert!(count <= self.live, "released more nodes than are live");
		self.live = self.live.saturating_sub(count);
	}

	/// Marks one live node destroyed. Returns whether it should be kept for reuse.
	pub fn retire(&mut self) -> bool {
		self.track_released(1);
		self.live + self.pooled_total() < self.cache_budget
	}

	pub fn put(&mut self, kind: NodeKind, id: NodeId) {
		debug_assert!(!self.free[kind.index()].contains(&id), "node pooled twice");
		self.free[kind.index()].push(id);
	}

	pub fn drain(&mut self) -> Vec<NodeId> {
		self.free.iter_mut().flat_map(|free| free.drain(..)).collect()
	}
}
