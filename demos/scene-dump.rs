use std::fmt;

use clap::Parser;
use glam::{ivec2, uvec2, vec2, Affine2, IVec2, UVec2, Vec4};
use strata2d::node::sprite::{AlphaMode, BlendMode};
use strata2d::node::view::ViewBounds;
use strata2d::render::{CanvasId, DrawableId, QuadId, Renderer, ShaderId};
use strata2d::{NodeKind, Scene, SceneConfig};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt as log_fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(long, default_value_t = 4, help = "Sprites per row and column of the grid")]
	grid: u32,
	#[arg(long, default_value_t = 64, help = "Node cache budget of the scene")]
	budget: usize,
	#[arg(long, help = "Render the view through a post-process shader")]
	shader: bool,
	#[arg(long, help = "Log every renderer call")]
	verbose: bool,
}

#[derive(Debug)]
struct NoCanvas;

impl fmt::Display for NoCanvas {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "this backend has no offscreen targets")
	}
}

/// Backend that logs what it is asked to draw instead of drawing it.
#[derive(Default)]
struct LogRenderer {
	stack: Vec<Affine2>,
	draws: usize,
	canvases: u64,
}

impl LogRenderer {
	fn top(&self) -> Affine2 {
		self.stack.last().copied().unwrap_or(Affine2::IDENTITY)
	}
}

impl Renderer for LogRenderer {
	type Error = NoCanvas;

	fn surface_size(&self) -> UVec2 {
		uvec2(640, 480)
	}

	fn push_transform(&mut self, transform: &Affine2) {
		let top = self.top();
		self.stack.push(top * *transform);
	}

	fn pop_transform(&mut self) {
		self.stack.pop();
	}

	fn set_scissor(&mut self, rect: Option<ViewBounds>) {
		tracing::debug!("scissor {:?}", rect);
	}

	fn set_color(&mut self, color: Vec4) {
		tracing::trace!("color {}", color);
	}

	fn fill_rect(&mut self, rect: ViewBounds) {
		tracing::debug!("fill {:?}", rect);
	}

	fn clear(&mut self, color: Vec4) {
		tracing::debug!("clear {}", color);
	}

	fn set_blend_mode(&mut self, mode: BlendMode, alpha_mode: AlphaMode) {
		tracing::trace!("blend {:?} {:?}", mode, alpha_mode);
	}

	fn create_canvas(&mut self, size: UVec2) -> Result<CanvasId, Self::Error> {
		tracing::debug!("canvas {}x{}", size.x, size.y);
		self.canvases += 1;
		Ok(CanvasId(self.canvases))
	}

	fn set_canvas(&mut self, canvas: Option<CanvasId>) {
		tracing::debug!("target {:?}", canvas);
	}

	fn set_shader(&mut self, shader: Option<ShaderId>) {
		tracing::debug!("shader {:?}", shader);
	}

	fn draw(&mut self, drawable: DrawableId, quad: Option<QuadId>, transform: &Affine2) {
		let at = (self.top() * *transform).translation;
		tracing::debug!("draw {:?} {:?} at ({:.1}, {:.1})", drawable, quad, at.x, at.y);
		self.draws += 1;
	}

	fn draw_canvas(&mut self, canvas: CanvasId, position: IVec2) {
		tracing::debug!("blit {:?} at {}", canvas, position);
	}
}

fn main() {
	let cli = Cli::parse();

	let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
	tracing_subscriber::registry().with(log_fmt::layer()).with(level).init();

	let mut scene = Scene::with_config(SceneConfig { cache_budget: cli.budget });
	let mut renderer = LogRenderer::default();

	let view = scene.create_view(ViewBounds::new(ivec2(0, 0), uvec2(640, 480)));
	let world = scene.create_layer();
	let camera = scene.create_camera();
	scene.node_mut(view).unwrap().set_name("main");
	scene.node_mut(world).unwrap().set_name("world");
	scene.insert_child(world, camera).unwrap();

	let camera_node = scene.node_mut(camera).unwrap();
	camera_node.set_name("camera");
	camera_node.set_position(vec2(cli.grid as f32 * 16., cli.grid as f32 * 16.));
	camera_node.as_camera_mut().unwrap().set_range(vec2(320., 240.));

	let view_state = scene.node_mut(view).unwrap().as_view_mut().unwrap();
	view_state.set_camera(Some(camera));
	if cli.shader {
		view_state.set_shader(Some(ShaderId(1)));
	}

	for row in 0..cli.grid {
		for col in 0..cli.grid {
			let sprite = scene.create_sprite();
			scene.insert_child(world, sprite).unwrap();
			let node = scene.node_mut(sprite).unwrap();
			node.set_name(format!("tile {row}x{col}"));
			node.set_position(vec2(col as f32 * 32., (cli.grid - row) as f32 * 32.));
			node.as_sprite_mut()
				.unwrap()
				.set_graphic(Some(DrawableId((row * cli.grid + col) as u64)), None, Default::default());
		}
	}
	scene.sort_children(world).unwrap();

	println!("== World ==\n{}", scene.dump(world));

	scene.draw(view, &mut renderer).unwrap();
	info!("Frame 1: {} draws, {} live nodes", renderer.draws, scene.live_count());

	// churn half of the tiles to exercise the pool
	let tiles: Vec<_> = scene.children(world).into_iter().skip(1).step_by(2).collect();
	for tile in &tiles {
		scene.destroy(*tile).unwrap();
	}
	info!(
		"Destroyed {} tiles, {} sprites pooled",
		tiles.len(),
		scene.pooled_count(NodeKind::Sprite)
	);
	for _ in &tiles {
		let sprite = scene.create_sprite();
		scene.insert_child(world, sprite).unwrap();
	}

	renderer.draws = 0;
	scene.draw(view, &mut renderer).unwrap();
	info!("Frame 2: {} draws, {} live nodes", renderer.draws, scene.live_count());

	let center = scene.window_to_root(view, vec2(320., 240.)).unwrap();
	info!("Window center shows world point ({:.1}, {:.1})", center.x, center.y);
}
