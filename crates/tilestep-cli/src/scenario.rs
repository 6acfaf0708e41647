//! Scenario files
//!
//! A scenario is one JSON document holding the world configuration, the
//! levels as text rows, the bodies to register and a list of per-tick player
//! inputs. Bodies are referred to by name from the inputs and the report.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tilestep_core::{BodyId, Directions, Vec2};
use tilestep_physics::{
    BodyDesc, Compass, Diagnostics, Groundable, LevelSet, Movable, PhysicsConfig, PhysicsEvent, Slideable, TileLayer,
    TileLegend, TileLevel, World,
};

fn default_ticks() -> u64 {
    60
}

/// A tile layer written as rows of legend symbols, top row first
#[derive(Debug, Clone, Deserialize)]
pub struct LayerSpec {
    pub key: String,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelSpec {
    pub id: String,
    /// Top-left corner
    #[serde(default)]
    pub origin: Vec2,
    /// Defaults to the widest layer
    pub width: Option<usize>,
    /// Defaults to the tallest layer
    pub height: Option<usize>,
    #[serde(default)]
    pub legend: TileLegend,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    /// Level ids on each side
    #[serde(default)]
    pub east: Vec<String>,
    #[serde(default)]
    pub south: Vec<String>,
}

/// Player commands applied before a tick runs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    pub tick: u64,
    /// Repeat the frame every tick up to and including this one
    pub until: Option<u64>,
    pub body: String,
    pub walk: Option<f32>,
    pub jump: bool,
    /// Seconds the jump button has been held
    pub long_jump: Option<f32>,
    pub crouch: Option<bool>,
    pub impulse: Option<Vec2>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: PhysicsConfig,
    #[serde(default)]
    pub levels: Vec<LevelSpec>,
    #[serde(default)]
    pub bodies: Vec<BodyDesc>,
    #[serde(default)]
    pub inputs: Vec<InputFrame>,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

impl InputFrame {
    fn applies_at(&self, tick: u64) -> bool {
        (self.tick..=self.until.unwrap_or(self.tick)).contains(&tick)
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json).context("Failed to parse scenario")?;
        scenario.config.validate().context("Invalid scenario config")?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Failed to load scenario {}", path.display()))
    }

    fn build_levels(&self) -> Result<LevelSet> {
        let mut levels = LevelSet::new();
        for spec in &self.levels {
            let mut layers = Vec::with_capacity(spec.layers.len());
            for layer in &spec.layers {
                let built = TileLayer::from_rows(layer.key.as_str(), layer.rows.as_slice(), &spec.legend)
                    .with_context(|| format!("Level '{}'", spec.id))?;
                layers.push(built);
            }
            let width = spec
                .width
                .unwrap_or_else(|| layers.iter().map(|layer| layer.width()).max().unwrap_or(0));
            let height = spec
                .height
                .unwrap_or_else(|| layers.iter().map(|layer| layer.height()).max().unwrap_or(0));

            let level = layers
                .into_iter()
                .fold(TileLevel::new(spec.id.as_str(), spec.origin, width, height), TileLevel::with_layer);
            levels.add(level)?;
        }

        for spec in &self.levels {
            for east in &spec.east {
                levels.link(&spec.id, Compass::East, east)?;
            }
            for south in &spec.south {
                levels.link(&spec.id, Compass::South, south)?;
            }
        }
        Ok(levels)
    }

    /// Create the world and register every body, keyed by name
    pub fn build(&self) -> Result<(World, IndexMap<String, BodyId>)> {
        let levels = self.build_levels()?;
        let mut world = World::new(self.config.clone(), levels).context("Failed to create world")?;
        let mut names = IndexMap::new();

        for (index, desc) in self.bodies.iter().enumerate() {
            let name = desc.name.clone().unwrap_or_else(|| format!("body{index}"));
            if names.contains_key(&name) {
                bail!("Duplicate body name '{}'", name);
            }
            let id = world
                .register(desc.clone())
                .with_context(|| format!("Failed to register '{}'", name))?;
            names.insert(name, id);
        }
        Ok((world, names))
    }

    /// Run for `ticks` ticks, calling `on_tick` after each one
    pub fn run(&self, ticks: u64, mut on_tick: impl FnMut(u64, &World, &IndexMap<String, BodyId>)) -> Result<Report> {
        let (mut world, names) = self.build()?;
        let mut events = Vec::new();

        for tick in 0..ticks {
            for frame in self.inputs.iter().filter(|frame| frame.applies_at(tick)) {
                apply_input(&mut world, &names, frame).with_context(|| format!("Input at tick {}", tick))?;
            }
            world.tick();
            events.extend(world.drain_events());
            on_tick(tick, &world, &names);
        }

        Ok(Report {
            ticks,
            bodies: snapshot(&world, &names),
            events,
            diagnostics: world.diagnostics(),
        })
    }
}

fn apply_input(world: &mut World, names: &IndexMap<String, BodyId>, frame: &InputFrame) -> Result<()> {
    let id = *names
        .get(&frame.body)
        .ok_or_else(|| anyhow!("Unknown body '{}'", frame.body))?;
    if let Some(crouched) = frame.crouch {
        world.crouch(id, crouched)?;
    }
    if let Some(input) = frame.walk {
        world.walk(id, input)?;
    }
    if frame.jump {
        world.jump(id)?;
    }
    if let Some(hold_time) = frame.long_jump {
        world.long_jump(id, hold_time)?;
    }
    if let Some(impulse) = frame.impulse {
        world.apply_impulse(id, impulse)?;
    }
    Ok(())
}

/// State of one named body
#[derive(Debug, Clone, Serialize)]
pub struct BodyState {
    pub name: String,
    pub id: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    pub sliding: Directions,
}

pub fn snapshot(world: &World, names: &IndexMap<String, BodyId>) -> Vec<BodyState> {
    names
        .iter()
        .filter_map(|(name, &id)| {
            world.body(id).map(|body| BodyState {
                name: name.clone(),
                id,
                position: body.position(),
                velocity: body.velocity(),
                grounded: body.is_grounded(),
                sliding: body.sliding(),
            })
        })
        .collect()
}

/// Result of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub ticks: u64,
    pub bodies: Vec<BodyState>,
    pub events: Vec<PhysicsEvent>,
    pub diagnostics: Diagnostics,
}
