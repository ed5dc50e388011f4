//! Hardpoint location
//!
//! A hardpoint is a template vertex lying exactly on one of the axis
//! directions. Adjoining sections are aligned by making their hardpoints
//! coincide in world space.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::MeshBuffer;

/// One of the six unit axis directions in section-local space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// +Z
    Forward,
    /// -Z
    Back,
    /// -X
    Left,
    /// +X
    Right,
    /// +Y
    Up,
    /// -Y
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Directions scanned by the locator (up/down are never used for joints)
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub fn vector(self) -> Vec3 {
        match self {
            Direction::Forward => Vec3::Z,
            Direction::Back => Vec3::NEG_Z,
            Direction::Left => Vec3::NEG_X,
            Direction::Right => Vec3::X,
            Direction::Up => Vec3::Y,
            Direction::Down => Vec3::NEG_Y,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    /// True when `position` normalizes to exactly this direction's unit vector.
    ///
    /// Equivalent to both off-axis components being exactly zero and the
    /// on-axis component having the direction's sign; the origin matches nothing.
    fn contains(self, position: Vec3) -> bool {
        let (along, off_a, off_b) = match self {
            Direction::Forward | Direction::Back => (position.z, position.x, position.y),
            Direction::Left | Direction::Right => (position.x, position.y, position.z),
            Direction::Up | Direction::Down => (position.y, position.x, position.z),
        };
        let sign = self.vector().dot(Vec3::ONE);
        off_a == 0.0 && off_b == 0.0 && along * sign > 0.0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Forward => "forward",
            Direction::Back => "back",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

/// How to resolve several vertices lying on the same axis direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardpointPolicy {
    /// Later vertices overwrite earlier ones
    #[default]
    LastWins,
    /// The vertex farthest along the axis wins; equal distances fall back to last-wins
    Extremal,
}

/// Direction -> vertex index table for one section's mesh
///
/// Built once when a section is created and never mutated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HardpointSet {
    slots: [Option<u16>; 6],
}

impl HardpointSet {
    /// Vertex index for a direction, if one was found
    pub fn get(&self, direction: Direction) -> Option<u16> {
        self.slots[direction.slot()]
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.get(direction).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present hardpoints in `Direction::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, u16)> + '_ {
        Direction::ALL
            .iter()
            .filter_map(|&d| self.get(d).map(|index| (d, index)))
    }
}

/// Locate hardpoints with last-wins collision handling
pub fn locate(mesh: &MeshBuffer) -> HardpointSet {
    locate_with(mesh, HardpointPolicy::LastWins)
}

/// Locate hardpoints on the four horizontal directions
pub fn locate_with(mesh: &MeshBuffer, policy: HardpointPolicy) -> HardpointSet {
    let mut set = HardpointSet::default();

    for (index, position) in mesh.positions.iter().enumerate() {
        let position = Vec3::from(*position);
        let Some(direction) = Direction::HORIZONTAL
            .into_iter()
            .find(|d| d.contains(position))
        else {
            continue;
        };

        let slot = &mut set.slots[direction.slot()];
        let replace = match (policy, *slot) {
            (HardpointPolicy::LastWins, _) | (_, None) => true,
            (HardpointPolicy::Extremal, Some(current)) => {
                let axis = direction.vector();
                let current_reach = mesh.vertex_at(current).map_or(0.0, |p| p.dot(axis));
                position.dot(axis) >= current_reach
            }
        };
        if replace {
            *slot = Some(index as u16);
        }
    }

    set
}
