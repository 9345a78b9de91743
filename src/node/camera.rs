use glam::Vec2;

/// Camera state. Pan and rotation come from the node's own transform.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Camera {
	range: Vec2,
}

impl Camera {
	/// Scene-space size framed by the camera. Zero means no explicit range.
	pub fn range(&self) -> Vec2 {
		self.range
	}

	pub fn set_range(&mut self, range: Vec2) {
		self.range = range;
	}

	/// A range only counts when both components are non-zero.
	pub fn has_range(&self) -> bool {
		self.range.x != 0. && self.range.y != 0.
	}

	/// Zoom applied when rendering into a viewport of `viewport_size` pixels: derived from the
	/// range if set, otherwise the camera node's own `scale`.
	pub fn zoom(&self, viewport_size: Vec2, scale: Vec2) -> Vec2 {
		if self.has_range() {
			viewport_size / self.range
		} else {
			scale
		}
	}
}
