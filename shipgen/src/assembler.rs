//! Ship assembler
//!
//! Builds a spine of hull sections joined forward-to-back, then hangs wings
//! off random hull sections. Every section is generated and positioned
//! before the scene is touched, so a failed generation leaves no partial
//! ship behind.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info, warn};

use crate::config::{MissingHardpointPolicy, ShipGenConfig};
use crate::error::{Result, ShipGenError};
use crate::host::{AssetStore, HostEnvironment, SceneGraph};
use crate::mesh::Direction;
use crate::section::{Section, SectionFactory, attach_offset};

/// Side of a hull section a wing hangs from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Hardpoint on the hull section
    pub fn hull_direction(self) -> Direction {
        match self {
            Side::Left => Direction::Left,
            Side::Right => Direction::Right,
        }
    }

    /// Hardpoint on the wing that meets the hull
    pub fn wing_direction(self) -> Direction {
        self.hull_direction().opposite()
    }
}

/// A section with its scene node
#[derive(Debug, Clone)]
pub struct PlacedSection<N> {
    pub node: N,
    pub section: Section,
}

#[derive(Debug, Clone)]
pub struct WingMount<N> {
    pub node: N,
    pub section: Section,
    /// Index into [`Ship::hulls`]
    pub hull_index: usize,
    pub side: Side,
}

/// A generated ship as placed in the scene
#[derive(Debug, Clone)]
pub struct Ship<N> {
    pub name: String,
    pub root: N,
    /// Spine, back to front
    pub hulls: Vec<PlacedSection<N>>,
    pub wings: Vec<WingMount<N>>,
    /// Wing cap drawn for this ship
    pub wing_budget: usize,
}

impl<N> Ship<N> {
    /// Hull sections in spine order, then wings in attachment order
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.hulls
            .iter()
            .map(|h| &h.section)
            .chain(self.wings.iter().map(|w| &w.section))
    }

    pub fn hull_count(&self) -> usize {
        self.hulls.len()
    }

    pub fn wing_count(&self) -> usize {
        self.wings.len()
    }
}

/// A wing waiting to be placed in the scene
#[derive(Debug, Clone)]
pub struct WingPlan {
    pub section: Section,
    pub hull_index: usize,
    pub side: Side,
}

/// Fully generated and positioned sections, not yet in any scene
#[derive(Debug, Clone)]
pub struct ShipBlueprint {
    pub hulls: Vec<Section>,
    pub wings: Vec<WingPlan>,
    pub wing_budget: usize,
}

impl ShipBlueprint {
    /// Create the ship root and one renderer node per section under it
    pub fn instantiate<S: SceneGraph + ?Sized>(self, scene: &mut S, name: &str) -> Ship<S::Node> {
        let root = scene.create_node(name);
        scene.set_position(root, Vec3::ZERO);

        let mut place = |section: &Section| {
            let node = scene.create_node(&section.name);
            scene.attach_mesh_renderer(node, &section.mesh, &section.material);
            scene.set_parent(node, root);
            scene.set_position(node, section.position);
            node
        };

        let hulls = self
            .hulls
            .into_iter()
            .map(|section| PlacedSection {
                node: place(&section),
                section,
            })
            .collect();
        let wings = self
            .wings
            .into_iter()
            .map(|plan| WingMount {
                node: place(&plan.section),
                section: plan.section,
                hull_index: plan.hull_index,
                side: plan.side,
            })
            .collect();

        Ship {
            name: name.to_string(),
            root,
            hulls,
            wings,
            wing_budget: self.wing_budget,
        }
    }
}

/// Destroy every node whose name contains `marker`, with its subtree
///
/// Returns the number of matching nodes destroyed.
pub fn clear_ships<S: SceneGraph + ?Sized>(scene: &mut S, marker: &str) -> usize {
    let matches: Vec<S::Node> = scene
        .find_all_nodes()
        .into_iter()
        .filter(|&node| scene.node_name(node).is_some_and(|name| name.contains(marker)))
        .collect();

    let mut removed = 0;
    for node in matches {
        // May already be gone with an earlier match's subtree
        if scene.node_name(node).is_some() {
            scene.destroy_node(node);
            removed += 1;
        }
    }
    removed
}

/// Procedural ship generator
///
/// Owns the configuration and the only random source used during
/// generation, so a seed fully determines the ships it builds.
pub struct ShipGenerator<R: Rng = Pcg64> {
    config: ShipGenConfig,
    rng: R,
    seed: Option<u64>,
}

impl ShipGenerator<Pcg64> {
    /// Generator seeded from `config.seed`, or from a fresh random seed
    pub fn new(config: ShipGenConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        info!("Ship generator seed: {}", seed);

        Ok(Self {
            config,
            rng: Pcg64::seed_from_u64(seed),
            seed: Some(seed),
        })
    }
}

impl<R: Rng> ShipGenerator<R> {
    /// Generator drawing from an injected random source
    pub fn with_rng(config: ShipGenConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            seed: None,
        })
    }

    /// Seed in use, when the generator seeded itself
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn config(&self) -> &ShipGenConfig {
        &self.config
    }

    /// Generate a ship into `scene`
    ///
    /// In an idle editor, previously generated ships are cleared first.
    /// Asset and hardpoint failures are reported before any node is created
    /// or removed.
    pub fn generate_ship<A, S, E>(
        &mut self,
        assets: &A,
        scene: &mut S,
        env: &E,
    ) -> Result<Ship<S::Node>>
    where
        A: AssetStore + ?Sized,
        S: SceneGraph + ?Sized,
        E: HostEnvironment + ?Sized,
    {
        let blueprint = self.build_blueprint(assets)?;

        if env.is_editor_not_playing() {
            let removed = clear_ships(scene, &self.config.ship_name);
            debug!("Cleared {} previous ship node(s)", removed);
        }

        let ship = blueprint.instantiate(scene, &self.config.ship_name);
        info!(
            "Generated {}: {} hull sections, {} wings (budget {})",
            ship.name,
            ship.hull_count(),
            ship.wing_count(),
            ship.wing_budget
        );
        Ok(ship)
    }

    /// Generate and position every section without touching a scene
    pub fn build_blueprint<A: AssetStore + ?Sized>(
        &mut self,
        assets: &A,
    ) -> Result<ShipBlueprint> {
        let factory = SectionFactory::new(assets, &self.config);
        let missing = self.config.hardpoints.missing;

        let [min_hulls, max_hulls] = self.config.hull.count;
        let hull_count = self.rng.random_range(min_hulls..=max_hulls) as usize;

        let mut hulls: Vec<Section> = Vec::with_capacity(hull_count);
        for index in 0..hull_count {
            let parent = hulls.last().map(|h| h.params);
            let mut hull = factory.generate_hull(index, parent.as_ref(), &mut self.rng)?;

            if let Some(prev) = hulls.last() {
                let joint = attach_offset(prev, Direction::Forward, &hull, Direction::Back);
                hull.position = match joint {
                    Some(position) => position,
                    None => {
                        let (section, direction) = if prev.hardpoints.contains(Direction::Forward)
                        {
                            (&hull.name, Direction::Back)
                        } else {
                            (&prev.name, Direction::Forward)
                        };
                        on_missing_hardpoint(missing, section, direction)?;
                        prev.position
                    }
                };
            }
            hulls.push(hull);
        }

        let wing_budget = self.rng.random_range(2..2 * hull_count);
        let mounter = WingMounter {
            factory: &factory,
            missing,
            budget: wing_budget,
        };
        let mut wings: Vec<WingPlan> = Vec::with_capacity(wing_budget);

        for hull_index in 0..hulls.len() {
            if wings.len() >= wing_budget {
                break;
            }
            if !self.rng.random_bool(self.config.wing.attach_probability) {
                continue;
            }

            let sides: &[Side] = match self.rng.random_range(0..3) {
                0 => &[Side::Left, Side::Right],
                1 => &[Side::Left],
                _ => &[Side::Right],
            };
            mounter.attach(&hulls, hull_index, sides, &mut wings, &mut self.rng)?;
        }

        Ok(ShipBlueprint {
            hulls,
            wings,
            wing_budget,
        })
    }
}

/// Hangs wings off one hull section while the wing budget lasts
struct WingMounter<'f, 'a, A: AssetStore + ?Sized> {
    factory: &'f SectionFactory<'a, A>,
    missing: MissingHardpointPolicy,
    budget: usize,
}

impl<A: AssetStore + ?Sized> WingMounter<'_, '_, A> {
    /// Attach one wing per side in order, stopping as soon as the budget is spent
    fn attach<R: Rng>(
        &self,
        hulls: &[Section],
        hull_index: usize,
        sides: &[Side],
        wings: &mut Vec<WingPlan>,
        rng: &mut R,
    ) -> Result<()> {
        let hull = &hulls[hull_index];

        for &side in sides {
            if wings.len() >= self.budget {
                break;
            }
            if !hull.hardpoints.contains(side.hull_direction()) {
                on_missing_hardpoint(self.missing, &hull.name, side.hull_direction())?;
                continue;
            }

            let mut wing = self.factory.generate_wing(wings.len(), rng)?;
            let joint = attach_offset(hull, side.hull_direction(), &wing, side.wing_direction());
            match joint {
                Some(position) => wing.position = position,
                None => {
                    on_missing_hardpoint(self.missing, &wing.name, side.wing_direction())?;
                    continue;
                }
            }

            debug!("{} attached to {} ({:?})", wing.name, hull.name, side);
            wings.push(WingPlan {
                section: wing,
                hull_index,
                side,
            });
        }

        Ok(())
    }
}

fn on_missing_hardpoint(
    policy: MissingHardpointPolicy,
    section: &str,
    direction: Direction,
) -> Result<()> {
    match policy {
        MissingHardpointPolicy::Skip => {
            warn!("{} has no {} hardpoint, skipping joint", section, direction);
            Ok(())
        }
        MissingHardpointPolicy::Abort => Err(ShipGenError::HardpointMissing {
            section: section.to_string(),
            direction,
        }),
    }
}
