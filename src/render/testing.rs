//! Renderer double that tracks the transform stack and records every call.

use glam::{Affine2, IVec2, UVec2, Vec4};

use crate::node::sprite::{AlphaMode, BlendMode};
use crate::node::view::ViewBounds;

use super::{CanvasId, DrawableId, QuadId, Renderer, ShaderId};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
	Push,
	Pop,
	Scissor(Option<ViewBounds>),
	Color(Vec4),
	FillRect(ViewBounds),
	Clear(Vec4),
	Blend(BlendMode, AlphaMode),
	CreateCanvas(UVec2),
	ReleaseCanvas(CanvasId),
	SetCanvas(Option<CanvasId>),
	Shader(Option<ShaderId>),
	/// `transform` is absolute: the stack top multiplied by the transform handed to `draw`.
	Draw {
		drawable: DrawableId,
		quad: Option<QuadId>,
		transform: Affine2,
	},
	DrawCanvas(CanvasId, IVec2),
}

#[derive(Debug, thiserror::Error)]
#[error("out of video memory")]
pub(crate) struct OutOfMemory;

#[derive(Debug)]
pub(crate) struct RecordingRenderer {
	pub calls: Vec<Call>,
	pub surface: UVec2,
	pub fail_canvas: bool,
	stack: Vec<Affine2>,
	next_canvas: u64,
}

impl Default for RecordingRenderer {
	fn default() -> Self {
		Self {
			calls: Vec::new(),
			surface: UVec2::new(800, 600),
			fail_canvas: false,
			stack: vec![Affine2::IDENTITY],
			next_canvas: 1,
		}
	}
}

impl RecordingRenderer {
	/// A renderer whose canvas allocations fail.
	pub fn failing() -> Self {
		Self {
			fail_canvas: true,
			..Default::default()
		}
	}

	/// Drawables in the order they were drawn, with their absolute transforms.
	pub fn draws(&self) -> Vec<(DrawableId, Affine2)> {
		self.calls
			.iter()
			.filter_map(|call| match call {
				Call::Draw {
					drawable, transform, ..
				} => Some((*drawable, *transform)),
				_ => None,
			})
			.collect()
	}

	pub fn drawn(&self) -> Vec<DrawableId> {
		self.draws().into_iter().map(|(drawable, _)| drawable).collect()
	}

	/// Depth of the transform stack, 0 when balanced.
	pub fn depth(&self) -> usize {
		self.stack.len() - 1
	}

	fn top(&self) -> Affine2 {
		self.stack.last().copied().unwrap_or(Affine2::IDENTITY)
	}
}

impl Renderer for RecordingRenderer {
	type Error = OutOfMemory;

	fn surface_size(&self) -> UVec2 {
		self.surface
	}

	fn push_transform(&mut self, transform: &Affine2) {
		let top = self.top();
		self.stack.push(top * *transform);
		self.calls.push(Call::Push);
	}

	fn pop_transform(&mut self) {
		assert!(self.stack.len() > 1, "transform stack underflow");
		self.stack.pop();
		self.calls.push(Call::Pop);
	}

	fn set_scissor(&mut self, rect: Option<ViewBounds>) {
		self.calls.push(Call::Scissor(rect));
	}

	fn set_color(&mut self, color: Vec4) {
		self.calls.push(Call::Color(color));
	}

	fn fill_rect(&mut self, rect: ViewBounds) {
		self.calls.push(Call::FillRect(rect));
	}

	fn clear(&mut self, color: Vec4) {
		self.calls.push(Call::Clear(color));
	}

	fn set_blend_mode(&mut self, mode: BlendMode, alpha_mode: AlphaMode) {
		self.calls.push(Call::Blend(mode, alpha_mode));
	}

	fn create_canvas(&mut self, size: UVec2) -> Result<CanvasId, Self::Error> {
		self.calls.push(Call::CreateCanvas(size));
		if self.fail_canvas {
			return Err(OutOfMemory);
		}
		let id = CanvasId(self.next_canvas);
		self.next_canvas += 1;
		Ok(id)
	}

	fn release_canvas(&mut self, canvas: CanvasId) {
		self.calls.push(Call::ReleaseCanvas(canvas));
	}

	fn set_canvas(&mut self, canvas: Option<CanvasId>) {
		self.calls.push(Call::SetCanvas(canvas));
	}

	fn set_shader(&mut self, shader: Option<ShaderId>) {
		self.calls.push(Call::Shader(shader));
	}

	fn draw(&mut self, drawable: DrawableId, quad: Option<QuadId>, transform: &Affine2) {
		let transform = self.top() * *transform;
		self.calls.push(Call::Draw {
			drawable,
			quad,
			transform,
		});
	}

	fn draw_canvas(&mut self, canvas: CanvasId, position: IVec2) {
		self.calls.push(Call::DrawCanvas(canvas, position));
	}
}
