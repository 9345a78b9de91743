use std::fmt::{self, Display};

use crate::node::NodeId;

use super::Scene;

/// Indented listing of a subtree, one node per line.
///
/// ```text
/// - [View] main
///   - [Layer] world
///     - [Sprite] hero (hidden)
/// ```
pub struct SceneDump<'a> {
	scene: &'a Scene,
	root: NodeId,
}

impl Scene {
	pub fn dump(&self, id: NodeId) -> SceneDump<'_> {
		SceneDump { scene: self, root: id }
	}
}

fn rec_fmt(indent: usize, f: &mut fmt::Formatter<'_>, id: NodeId, scene: &Scene) -> fmt::Result {
	let Some(node) = scene.lookup(id) else {
		return Ok(());
	};

	let type_name = node.kind().name();
	#[cfg(feature = "owo")]
	let type_name = {
		use owo_colors::OwoColorize;
		type_name.magenta()
	};

	write!(f, "{}- [{}] {}", "  ".repeat(indent), type_name, node.name())?;
	if !node.visible() {
		write!(f, " (hidden)")?;
	}
	writeln!(f)?;

	for child in id.children(&scene.arena) {
		rec_fmt(indent + 1, f, child, scene)?;
	}

	Ok(())
}

impl Display for SceneDump<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.scene.lookup(self.root).is_none() {
			return write!(f, "(empty)");
		}
		rec_fmt(0, f, self.root, self.scene)
	}
}
