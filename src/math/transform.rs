use std::cell::Cell;

use glam::{Affine2, Mat2, Vec2};

/// Transform of a node relative to its parent: `Translate * Rotate * Scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOffset {
	/// X Y
	pub translation: Vec2,
	/// Radians
	pub rotation: f32,
	/// X Y zoom, negative values mirror
	pub scale: Vec2,
}

impl Default for TransformOffset {
	fn default() -> Self {
		Self {
			translation: Vec2::ZERO,
			rotation: 0.,
			scale: Vec2::ONE,
		}
	}
}

impl TransformOffset {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_translation(mut self, translation: Vec2) -> Self {
		self.translation = translation;
		self
	}

	pub fn with_rotation(mut self, rotation: f32) -> Self {
		self.rotation = rotation;
		self
	}

	pub fn with_scale(mut self, scale: Vec2) -> Self {
		self.scale = scale;
		self
	}

	pub fn to_matrix(&self) -> Affine2 {
		Affine2::from_scale_angle_translation(self.scale, self.rotation, self.translation)
	}

	/// Translation and rotation only.
	pub fn to_rigid_matrix(&self) -> Affine2 {
		Affine2::from_angle_translation(self.rotation, self.translation)
	}

	/// Maps a point from the space this offset is expressed in to its parent's space.
	pub fn apply(&self, point: Vec2) -> Vec2 {
		self.translation + Vec2::from_angle(self.rotation).rotate(point * self.scale)
	}

	/// Inverse of [`apply`](Self::apply). Undefined for a zero scale component.
	pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
		Vec2::from_angle(-self.rotation).rotate(point - self.translation) / self.scale
	}
}

/// Secondary transform between a sprite and the graphic it draws.
///
/// Composed as `Translate * Rotate * Scale * Shear * Translate(-origin)`, so `origin` is the point
/// of the graphic that lands on `translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicOffset {
	pub translation: Vec2,
	pub rotation: f32,
	pub scale: Vec2,
	pub origin: Vec2,
	pub shear: Vec2,
}

impl Default for GraphicOffset {
	fn default() -> Self {
		Self {
			translation: Vec2::ZERO,
			rotation: 0.,
			scale: Vec2::ONE,
			origin: Vec2::ZERO,
			shear: Vec2::ZERO,
		}
	}
}

impl GraphicOffset {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_translation(mut self, translation: Vec2) -> Self {
		self.translation = translation;
		self
	}

	pub fn with_rotation(mut self, rotation: f32) -> Self {
		self.rotation = rotation;
		self
	}

	pub fn with_scale(mut self, scale: Vec2) -> Self {
		self.scale = scale;
		self
	}

	pub fn with_origin(mut self, origin: Vec2) -> Self {
		self.origin = origin;
		self
	}

	pub fn with_shear(mut self, shear: Vec2) -> Self {
		self.shear = shear;
		self
	}

	pub fn to_matrix(&self) -> Affine2 {
		let shear = Mat2::from_cols(Vec2::new(1., self.shear.y), Vec2::new(self.shear.x, 1.));

		Affine2::from_scale_angle_translation(self.scale, self.rotation, self.translation)
			* Affine2::from_mat2(shear)
			* Affine2::from_translation(-self.origin)
	}
}

/// Affine matrix derived from other state, recomputed on read only when marked stale.
#[derive(Debug, Clone)]
pub struct CachedMatrix {
	matrix: Cell<Affine2>,
	dirty: Cell<bool>,
}

impl Default for CachedMatrix {
	fn default() -> Self {
		Self {
			matrix: Cell::new(Affine2::IDENTITY),
			dirty: Cell::new(true),
		}
	}
}

impl CachedMatrix {
	pub fn invalidate(&self) {
		self.dirty.set(true);
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty.get()
	}

	/// Returns the cached matrix, running `compute` first if it is stale.
	pub fn get_or_update(&self, compute: impl FnOnce() -> Affine2) -> Affine2 {
		if self.dirty.get() {
			self.matrix.set(compute());
			self.dirty.set(false);
		}
		self.matrix.get()
	}
}
