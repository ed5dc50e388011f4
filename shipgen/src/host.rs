//! Host engine ports
//!
//! The generator never talks to a concrete engine. Asset lookup, scene graph
//! mutation and the editor/runtime query are injected through these traits;
//! [`crate::assets`] and [`crate::scene`] provide in-process implementations.

use std::fmt::Debug;

use glam::Vec3;

use crate::mesh::MeshBuffer;

/// Surface material handed to mesh renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Linear RGBA
    pub base_color: [f32; 4],
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Fresh, unshared copy of this material for one section's renderer
    pub fn instantiate(&self, label: &str) -> Self {
        Self {
            name: format!("{} ({})", self.name, label),
            base_color: self.base_color,
        }
    }
}

/// Read-only template storage keyed by asset path (e.g. `Models/hull01`)
pub trait AssetStore {
    fn load_mesh(&self, path: &str) -> Option<&MeshBuffer>;

    fn load_material(&self, path: &str) -> Option<&Material>;
}

/// Scene graph capabilities the assembler needs
pub trait SceneGraph {
    type Node: Copy + Eq + Debug;

    fn create_node(&mut self, name: &str) -> Self::Node;

    /// Give a node a renderer drawing `mesh` with `material`
    fn attach_mesh_renderer(&mut self, node: Self::Node, mesh: &MeshBuffer, material: &Material);

    fn set_parent(&mut self, child: Self::Node, parent: Self::Node);

    /// Set a node's position relative to its parent
    fn set_position(&mut self, node: Self::Node, position: Vec3);

    /// Every live node, in creation order
    fn find_all_nodes(&self) -> Vec<Self::Node>;

    /// Name of a live node, `None` once destroyed
    fn node_name(&self, node: Self::Node) -> Option<&str>;

    /// Destroy a node together with all of its descendants
    fn destroy_node(&mut self, node: Self::Node);
}

/// Query whether the host is an editor that is not in play mode
pub trait HostEnvironment {
    fn is_editor_not_playing(&self) -> bool;
}

/// Host run modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostMode {
    /// Editing a scene; regenerating replaces previously generated ships
    Editor,
    /// Editor in play mode
    EditorPlaying,
    /// Shipped game or command-line tool
    #[default]
    Standalone,
}

impl HostEnvironment for HostMode {
    fn is_editor_not_playing(&self) -> bool {
        matches!(self, HostMode::Editor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_idle_editor_clears() {
        assert!(HostMode::Editor.is_editor_not_playing());
        assert!(!HostMode::EditorPlaying.is_editor_not_playing());
        assert!(!HostMode::Standalone.is_editor_not_playing());
    }

    #[test]
    fn test_material_instances_are_distinct() {
        let base = Material::new("matTest");
        let a = base.instantiate("Hull0");
        let b = base.instantiate("Hull1");

        assert_eq!(a.name, "matTest (Hull0)");
        assert_ne!(a, b);
        assert_eq!(a.base_color, base.base_color);
    }
}
