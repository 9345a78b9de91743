use glam::{Affine2, Vec3, Vec4};

use crate::math::transform::GraphicOffset;
use crate::render::{DrawableId, QuadId, ShaderId};

/// Blending mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
	/// Normal alpha blending.
	#[default]
	Alpha,
	/// Overwrite the destination, ignoring its content.
	Replace,
	/// Screen.
	Screen,
	/// Additive blending.
	Add,
	/// Subtractive blending.
	Subtract,
	/// Multiply blending mode.
	Multiply,
	/// Keep the lighter of source and destination.
	Lighten,
	/// Keep the darker of source and destination.
	Darken,
}

impl BlendMode {
	pub const VALUES: [BlendMode; 8] = [
		BlendMode::Alpha,
		BlendMode::Replace,
		BlendMode::Screen,
		BlendMode::Add,
		BlendMode::Subtract,
		BlendMode::Multiply,
		BlendMode::Lighten,
		BlendMode::Darken,
	];
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown blend mode {0:?}")]
pub struct UnknownBlendModeError(String);

impl TryFrom<&str> for BlendMode {
	type Error = UnknownBlendModeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"alpha" => Ok(BlendMode::Alpha),
			"replace" => Ok(BlendMode::Replace),
			"screen" => Ok(BlendMode::Screen),
			"add" => Ok(BlendMode::Add),
			"subtract" => Ok(BlendMode::Subtract),
			"multiply" => Ok(BlendMode::Multiply),
			"lighten" => Ok(BlendMode::Lighten),
			"darken" => Ok(BlendMode::Darken),
			unknown => Err(UnknownBlendModeError(unknown.to_owned())),
		}
	}
}

/// How the source alpha is composed with the source color.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaMode {
	/// Source color is multiplied by its alpha while blending.
	#[default]
	AlphaMultiply,
	/// Source color already carries its alpha.
	PreMultiplied,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown alpha mode {0:?}")]
pub struct UnknownAlphaModeError(String);

impl TryFrom<&str> for AlphaMode {
	type Error = UnknownAlphaModeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"alphamultiply" => Ok(AlphaMode::AlphaMultiply),
			"premultiplied" => Ok(AlphaMode::PreMultiplied),
			unknown => Err(UnknownAlphaModeError(unknown.to_owned())),
		}
	}
}

/// Leaf node state: an external graphic plus its modulation.
///
/// Without a drawable the sprite draws nothing.
#[derive(Debug, Clone)]
pub struct Sprite {
	drawable: Option<DrawableId>,
	quad: Option<QuadId>,
	offset: GraphicOffset,
	offset_matrix: Affine2,
	color: Vec4,
	blend_mode: BlendMode,
	alpha_mode: AlphaMode,
	shader: Option<ShaderId>,
}

impl Default for Sprite {
	fn default() -> Self {
		Self {
			drawable: None,
			quad: None,
			offset: GraphicOffset::default(),
			offset_matrix: Affine2::IDENTITY,
			color: Vec4::ONE,
			blend_mode: BlendMode::default(),
			alpha_mode: AlphaMode::default(),
			shader: None,
		}
	}
}

impl Sprite {
	/// Sets the graphic, an optional sub-region of it, and where it sits relative to the sprite.
	pub fn set_graphic(&mut self, drawable: Option<DrawableId>, quad: Option<QuadId>, offset: GraphicOffset) {
		self.drawable = drawable;
		self.quad = quad;
		self.offset = offset;
		self.offset_matrix = offset.to_matrix();
	}

	pub fn graphic(&self) -> (Option<DrawableId>, Option<QuadId>) {
		(self.drawable, self.quad)
	}

	pub fn graphic_offset(&self) -> &GraphicOffset {
		&self.offset
	}

	pub(crate) fn offset_matrix(&self) -> Affine2 {
		self.offset_matrix
	}

	/// RGBA, each channel in `0..=1`.
	pub fn color(&self) -> Vec4 {
		self.color
	}

	/// Sets RGB, keeping the current alpha.
	pub fn set_color(&mut self, rgb: Vec3) {
		self.color = rgb.clamp(Vec3::ZERO, Vec3::ONE).extend(self.color.w);
	}

	pub fn set_color_rgba(&mut self, rgba: Vec4) {
		self.color = rgba.clamp(Vec4::ZERO, Vec4::ONE);
	}

	pub fn alpha(&self) -> f32 {
		self.color.w
	}

	pub fn set_alpha(&mut self, alpha: f32) {
		self.color.w = alpha.clamp(0., 1.);
	}

	pub fn mode(&self) -> (BlendMode, AlphaMode) {
		(self.blend_mode, self.alpha_mode)
	}

	pub fn set_mode(&mut self, blend_mode: BlendMode, alpha_mode: AlphaMode) {
		self.blend_mode = blend_mode;
		self.alpha_mode = alpha_mode;
	}

	/// Shader used for this sprite only, instead of whatever shader is active around it.
	pub fn shader(&self) -> Option<ShaderId> {
		self.shader
	}

	pub fn set_shader(&mut self, shader: Option<ShaderId>) {
		self.shader = shader;
	}
}
