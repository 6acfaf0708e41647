//! The physics world
//!
//! Owns every body, the levels with their broad-phase grids, the attachment
//! and ignore tables, and the queue of events raised while ticking. All state
//! that used to be global lives here, so several worlds can run side by side.
//!
//! A tick runs in four phases:
//! 1. Timers: ignore exemptions and player timers
//! 2. Solids move, shoving and carrying actors (registration order)
//! 3. Actors update flags, gravity, grounding and friction (registration order)
//! 4. Actors spend their whole units under the configured schedule

use ahash::AHashSet;
use indexmap::IndexSet;
use tilestep_core::{BodyId, Directions, SlotMap, StepAccumulator, Vec2};

use crate::body::{Body, BodyDesc, BodyFeatures, BodyKind};
use crate::config::{PhysicsConfig, ScheduleMode};
use crate::error::{PhysicsError, PhysicsResult};
use crate::event::{Diagnostics, PhysicsEvent};
use crate::ignore::IgnoreTable;
use crate::integrator::OnBlock;
use crate::level::{LevelSet, TILE_SIZE};
use crate::relation::RelationTable;

#[cfg(test)]
mod tests;

/// A deterministic fixed-step physics world
pub struct World {
    pub(crate) config: PhysicsConfig,
    pub(crate) bodies: SlotMap<Body>,
    /// Actors and solids in registration order; tiles are not listed
    pub(crate) order: IndexSet<BodyId>,
    pub(crate) levels: LevelSet,
    pub(crate) relations: RelationTable,
    pub(crate) ignores: IgnoreTable,
    pub(crate) events: Vec<PhysicsEvent>,
    pub(crate) diagnostics: Diagnostics,
    accumulator: StepAccumulator,
}

impl World {
    /// Build a world over `levels`, spawning a static body for every tile
    pub fn new(config: PhysicsConfig, mut levels: LevelSet) -> PhysicsResult<Self> {
        config.validate()?;
        levels.validate_links()?;
        levels.build_grids(config.cell_size)?;

        let mut bodies = SlotMap::new();
        let mut tile_count = 0;
        for level_index in 0..levels.len() {
            let Some(level) = levels.get_mut(level_index) else {
                continue;
            };
            let placements: Vec<(usize, usize, usize, Body)> = level
                .layers()
                .iter()
                .enumerate()
                .flat_map(|(layer, tiles)| tiles.tiles().map(move |(x, y, tile)| (layer, x, y, tile)))
                .map(|(layer, x, y, tile)| {
                    let position = level.tile_centre(x, y);
                    let material = config.materials.get(&tile.material);
                    let body = Body::tile(BodyId::null(), position, tile.shape.collider(), material, level_index);
                    (layer, x, y, body)
                })
                .collect();

            for (layer, x, y, body) in placements {
                let id = bodies.insert_with(|id| Body { id, ..body });
                if let Some(layer) = level.layers_mut().get_mut(layer) {
                    layer.set_body(x, y, id);
                }
                tile_count += 1;
            }
            log::debug!("Loaded level '{}'", level.id());
        }

        log::info!("Physics world created: {} levels, {} tiles", levels.len(), tile_count);

        Ok(Self {
            config,
            bodies,
            order: IndexSet::new(),
            levels,
            relations: RelationTable::new(),
            ignores: IgnoreTable::new(),
            events: Vec::new(),
            diagnostics: Diagnostics::default(),
            accumulator: StepAccumulator::new(),
        })
    }

    /// A world with no levels; bodies move without a broad phase
    pub fn empty(config: PhysicsConfig) -> PhysicsResult<Self> {
        Self::new(config, LevelSet::new())
    }

    /// Add an actor or solid
    pub fn register(&mut self, desc: BodyDesc) -> PhysicsResult<BodyId> {
        let label = desc.label();
        let material = self.config.materials.get(&desc.material);
        let body = Body::from_desc(BodyId::null(), desc, material)?;
        let id = self.bodies.insert_with(|id| Body { id, ..body });

        self.order.insert(id);
        self.update_membership(id);
        log::debug!("Registered {} as {}", label, id);
        self.events.push(PhysicsEvent::Spawned { body: id });
        Ok(id)
    }

    /// Remove an actor or solid, detaching everything related to it
    pub fn unregister(&mut self, id: BodyId) -> PhysicsResult<()> {
        let kind = self.bodies.get(id).map(|body| body.kind).ok_or(PhysicsError::BodyNotFound(id))?;
        if kind == BodyKind::Tile {
            return Err(PhysicsError::InvalidConfig(format!("{id} is a level tile and cannot be unregistered")));
        }

        let riders: Vec<BodyId> = self
            .relations
            .attached_to(id)
            .filter(|&rider| {
                self.bodies
                    .get(rider)
                    .is_some_and(|body| body.ground.is_some_and(|ground| ground.remote == id))
            })
            .collect();
        for rider in riders {
            self.unground(rider);
        }

        if let Some(body) = self.bodies.get(id) {
            if let (Some(level), Some(cell)) = (body.level, body.cell) {
                if let Some(level) = self.levels.get_mut(level) {
                    level.grid_mut().remove(cell, id, kind);
                }
            }
        }
        self.relations.detach_all(id);
        self.ignores.remove_body(id);
        self.order.shift_remove(&id);
        self.bodies.remove(id);

        log::debug!("Unregistered {}", id);
        self.events.push(PhysicsEvent::Despawned { body: id });
        Ok(())
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains(id)
    }

    /// Registered actors and solids in registration order
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.order.iter().filter_map(|&id| self.bodies.get(id))
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    pub fn relations(&self) -> &RelationTable {
        &self.relations
    }

    pub fn ignores(&self) -> &IgnoreTable {
        &self.ignores
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[PhysicsEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fraction of a tick left over from [`World::advance`], for rendering
    pub fn interpolation(&self) -> f64 {
        self.accumulator.interpolation(&self.config.time_step)
    }

    fn require(&self, id: BodyId) -> PhysicsResult<()> {
        if self.bodies.contains(id) {
            Ok(())
        } else {
            Err(PhysicsError::BodyNotFound(id))
        }
    }

    /// Attach two bodies; false if they already were
    pub fn attach(&mut self, a: BodyId, b: BodyId) -> PhysicsResult<bool> {
        self.require(a)?;
        self.require(b)?;
        Ok(self.relations.attach(a, b))
    }

    /// Detach two bodies; false if they were not attached
    pub fn detach(&mut self, a: BodyId, b: BodyId) -> PhysicsResult<bool> {
        self.require(a)?;
        self.require(b)?;
        Ok(self.relations.detach(a, b))
    }

    /// Let `owner` pass through `other`, permanently or for `duration` seconds
    pub fn ignore(&mut self, owner: BodyId, other: BodyId, duration: Option<f32>) -> PhysicsResult<()> {
        self.require(owner)?;
        self.require(other)?;
        self.ignores.ignore(owner, other, duration);
        Ok(())
    }

    pub fn unignore(&mut self, owner: BodyId, other: BodyId) -> PhysicsResult<bool> {
        self.require(owner)?;
        self.require(other)?;
        Ok(self.ignores.unignore(owner, other))
    }

    /// Replace a body's velocity, in step units per tick
    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> PhysicsResult<()> {
        let body = self.bodies.get_mut(id).ok_or(PhysicsError::BodyNotFound(id))?;
        body.velocity = velocity;
        Ok(())
    }

    /// Teleport a body without resolving collisions on the way
    pub fn set_position(&mut self, id: BodyId, position: Vec2) -> PhysicsResult<()> {
        let body = self.bodies.get_mut(id).ok_or(PhysicsError::BodyNotFound(id))?;
        if body.kind == BodyKind::Tile {
            return Err(PhysicsError::InvalidConfig(format!("{id} is a level tile and cannot move")));
        }
        body.position = position;
        self.update_membership(id);
        Ok(())
    }

    /// Run one fixed tick
    pub fn tick(&mut self) {
        let dt = self.config.dt();
        self.tick_timers(dt);

        let (solids, actors): (Vec<BodyId>, Vec<BodyId>) = self
            .order
            .iter()
            .copied()
            .partition(|&id| self.bodies.get(id).is_some_and(|body| body.kind == BodyKind::Solid));

        for &id in &solids {
            self.tick_solid(id);
        }
        for &id in &actors {
            self.tick_actor(id);
        }

        match self.config.schedule {
            ScheduleMode::Interleaved => self.run_interleaved(&actors),
            ScheduleMode::Sequential => {
                for &id in &actors {
                    self.run_sequential(id, OnBlock::Respond);
                }
            }
        }

        for &id in &actors {
            self.update_membership(id);
        }
        self.diagnostics.ticks += 1;
    }

    /// Feed host frame time and run every tick that is due
    pub fn advance(&mut self, dt: f64) -> u32 {
        self.accumulator.accumulate(dt);
        let steps = self.accumulator.steps_due(&self.config.time_step);
        for _ in 0..steps {
            self.tick();
        }
        self.accumulator.consume(&self.config.time_step, steps);
        steps
    }

    fn tick_timers(&mut self, dt: f32) {
        for (owner, other) in self.ignores.tick(dt) {
            log::trace!("Body {} no longer ignores {}", owner, other);
        }
        let players: Vec<BodyId> = self.order.iter().copied().filter(|&id| self.is_player(id)).collect();
        for id in players {
            self.tick_player_timers(id, dt);
        }
    }

    fn tick_actor(&mut self, id: BodyId) {
        self.update_membership(id);
        self.update_moveable(id);

        let Some(features) = self.bodies.get(id).map(|body| body.features) else {
            return;
        };
        if features.contains(BodyFeatures::GRAVITY) {
            self.apply_gravity(id);
            self.update_grounded(id);
        }

        if let Some(body) = self.bodies.get_mut(id) {
            let velocity = body.velocity;
            body.motion.accumulate(velocity.x as f64, velocity.y as f64);
        }

        if features.contains(BodyFeatures::GRAVITY) {
            self.apply_friction(id);
            self.inherit_motion(id);
        }
        if features.contains(BodyFeatures::PLAYER) {
            self.update_wallplant(id);
        }

        if let Some(body) = self.bodies.get_mut(id) {
            body.sliding = Directions::empty();
        }
    }

    /// Bodies a body could touch this step, minus the ones it ignores
    ///
    /// Actors in the surrounding cells come first, then solids, then tiles
    /// within reach. A solid only looks for actors. A body outside every
    /// level has nothing nearby.
    pub fn nearby(&self, id: BodyId) -> Vec<BodyId> {
        let Some(body) = self.bodies.get(id) else {
            return Vec::new();
        };
        let (Some(level_index), Some(cell)) = (body.level, body.cell) else {
            return Vec::new();
        };
        let Some(level) = self.levels.get(level_index) else {
            return Vec::new();
        };
        let grid = level.grid();
        let is_solid = body.kind == BodyKind::Solid;

        let mut seen = AHashSet::new();
        seen.insert(id);
        let mut nearby = Vec::new();
        let mut visit = |other: BodyId| {
            if seen.insert(other) && !self.ignores.is_ignored(id, other) {
                nearby.push(other);
            }
        };

        for other in grid.neighbourhood(cell).flat_map(|cell| cell.actors()) {
            visit(*other);
        }
        if !is_solid {
            for other in grid.neighbourhood(cell).flat_map(|cell| cell.solids()) {
                visit(*other);
            }
            let range = self.config.tile_range as i64 + (body.reach() / TILE_SIZE).ceil() as i64;
            for other in self.levels.tiles_nearby(level_index, body.position, range) {
                visit(other);
            }
        }
        nearby
    }

    /// Move a body between levels and grid cells to match its position
    ///
    /// A body that leaves every level stays filed under the last one.
    pub(crate) fn update_membership(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get(id) else {
            return;
        };
        if body.kind == BodyKind::Tile {
            return;
        }
        let (position, kind, old_level, old_cell) = (body.position, body.kind, body.level, body.cell);

        let level = old_level
            .filter(|&index| self.levels.get(index).is_some_and(|level| level.contains(position)))
            .or_else(|| self.levels.level_at(position))
            .or(old_level);
        let cell = level
            .and_then(|index| self.levels.get(index))
            .and_then(|level| level.grid().cell_index(position));
        if level == old_level && cell == old_cell {
            return;
        }

        if let (Some(index), Some(cell)) = (old_level, old_cell) {
            if let Some(old) = self.levels.get_mut(index) {
                old.grid_mut().remove(cell, id, kind);
            }
        }
        if let (Some(index), Some(cell)) = (level, cell) {
            if let Some(new) = self.levels.get_mut(index) {
                new.grid_mut().insert(cell, id, kind);
            }
        }
        if level != old_level {
            log::trace!("Body {} moved to level {:?}", id, level);
        }
        if let Some(body) = self.bodies.get_mut(id) {
            body.level = level;
            body.cell = cell;
        }
    }
}
