//! In-process scene graph
//!
//! Arena of named nodes with parent links, local positions and optional mesh
//! renderers. Destroying a node destroys its whole subtree.

use glam::Vec3;
use tracing::warn;

use crate::host::{Material, SceneGraph};
use crate::mesh::MeshBuffer;

/// Handle to a node in a [`MemoryScene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Renderer attached to a node
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: MeshBuffer,
    pub material: Material,
}

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    position: Vec3,
    renderer: Option<MeshRenderer>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: Vec<Option<NodeData>>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Position relative to the parent
    pub fn local_position(&self, id: NodeId) -> Option<Vec3> {
        self.node(id).map(|n| n.position)
    }

    /// Position accumulated up the parent chain
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        let mut node = self.node(id)?;
        let mut position = node.position;
        while let Some(parent) = node.parent.and_then(|p| self.node(p)) {
            position += parent.position;
            node = parent;
        }
        Some(position)
    }

    pub fn renderer(&self, id: NodeId) -> Option<&MeshRenderer> {
        self.node(id).and_then(|n| n.renderer.as_ref())
    }

    /// Live root nodes (no parent), in creation order
    pub fn roots(&self) -> Vec<NodeId> {
        self.find_all_nodes()
            .into_iter()
            .filter(|&id| self.parent(id).is_none())
            .collect()
    }

    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}

impl SceneGraph for MemoryScene {
    type Node = NodeId;

    fn create_node(&mut self, name: &str) -> NodeId {
        self.nodes.push(Some(NodeData {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            position: Vec3::ZERO,
            renderer: None,
        }));
        NodeId(self.nodes.len() - 1)
    }

    fn attach_mesh_renderer(&mut self, node: NodeId, mesh: &MeshBuffer, material: &Material) {
        if let Some(data) = self.node_mut(node) {
            data.renderer = Some(MeshRenderer {
                mesh: mesh.clone(),
                material: material.clone(),
            });
        }
    }

    fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        if !self.contains(child) || !self.contains(parent) {
            return;
        }
        if self.is_ancestor(child, parent) {
            warn!("set_parent: {:?} is an ancestor of {:?}, ignoring", child, parent);
            return;
        }

        if let Some(old) = self.parent(child)
            && let Some(old_data) = self.node_mut(old)
        {
            old_data.children.retain(|&c| c != child);
        }
        if let Some(data) = self.node_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.node_mut(parent) {
            data.children.push(child);
        }
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) {
        if let Some(data) = self.node_mut(node) {
            data.position = position;
        }
    }

    fn find_all_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn destroy_node(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).map(|n| n.parent) else {
            return;
        };
        if let Some(parent_data) = parent.and_then(|p| self.node_mut(p)) {
            parent_data.children.retain(|&c| c != node);
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(data.children);
            }
        }
    }
}
