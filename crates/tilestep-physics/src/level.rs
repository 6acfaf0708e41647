//! Tile levels
//!
//! A level is a rectangle of unit tiles anchored at its top-left corner. Tile
//! rows count downward from the top. Each level carries:
//! - Named tile layers, every tile becoming a static body when the world is built
//! - The broad-phase [`Grid`] for actors and solids inside it
//! - Neighbour links to adjacent levels so tile lookups stitch across seams

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tilestep_core::{BodyId, Vec2};

use crate::collider::Collider;
use crate::error::{PhysicsError, PhysicsResult};
use crate::grid::Grid;
use crate::material::DEFAULT_MATERIAL;

/// World size of one tile
pub const TILE_SIZE: f32 = 1.0;

/// Tile geometry, named after the corner the shape is anchored to
///
/// Triangles have their right angle in the named corner. Circles are a disc of
/// radius one tile centred on the named corner; the part outside the tile is
/// expected to sit inside neighbouring solid tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileShape {
    Square,
    CircleTopLeft,
    CircleTopRight,
    CircleBottomLeft,
    CircleBottomRight,
    TriangleTopLeft,
    TriangleTopRight,
    TriangleBottomLeft,
    TriangleBottomRight,
}

impl TileShape {
    /// Collider for a tile body positioned at the tile centre
    pub fn collider(self) -> Collider {
        let h = TILE_SIZE * 0.5;
        let corner = |x: f32, y: f32| Vec2::new(x * h, y * h);
        match self {
            TileShape::Square => Collider::square(Vec2::splat(TILE_SIZE)),
            TileShape::CircleTopLeft => Collider::circle(TILE_SIZE).with_centre(corner(-1.0, 1.0)),
            TileShape::CircleTopRight => Collider::circle(TILE_SIZE).with_centre(corner(1.0, 1.0)),
            TileShape::CircleBottomLeft => Collider::circle(TILE_SIZE).with_centre(corner(-1.0, -1.0)),
            TileShape::CircleBottomRight => Collider::circle(TILE_SIZE).with_centre(corner(1.0, -1.0)),
            TileShape::TriangleTopLeft => Collider::triangle(corner(-1.0, -1.0), corner(-1.0, 1.0), corner(1.0, 1.0)),
            TileShape::TriangleTopRight => Collider::triangle(corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)),
            TileShape::TriangleBottomLeft => Collider::triangle(corner(-1.0, 1.0), corner(-1.0, -1.0), corner(1.0, -1.0)),
            TileShape::TriangleBottomRight => Collider::triangle(corner(1.0, 1.0), corner(1.0, -1.0), corner(-1.0, -1.0)),
        }
    }
}

fn default_material() -> String {
    DEFAULT_MATERIAL.to_string()
}

/// A tile definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub shape: TileShape,
    #[serde(default = "default_material")]
    pub material: String,
}

impl Tile {
    pub fn new(shape: TileShape) -> Self {
        Self {
            shape,
            material: default_material(),
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }
}

/// Character to tile mapping for text layouts
///
/// `.` and space are always empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileLegend {
    entries: IndexMap<char, Tile>,
}

impl TileLegend {
    pub fn empty() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn with(mut self, symbol: char, tile: Tile) -> Self {
        self.entries.insert(symbol, tile);
        self
    }

    pub fn get(&self, symbol: char) -> Option<&Tile> {
        self.entries.get(&symbol)
    }
}

/// `#` square, `/` and `\` floor slopes, `r` and `7` ceiling slopes
impl Default for TileLegend {
    fn default() -> Self {
        Self::empty()
            .with('#', Tile::new(TileShape::Square))
            .with('/', Tile::new(TileShape::TriangleBottomRight))
            .with('\\', Tile::new(TileShape::TriangleBottomLeft))
            .with('r', Tile::new(TileShape::TriangleTopLeft))
            .with('7', Tile::new(TileShape::TriangleTopRight))
    }
}

/// A named grid of optional tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    key: String,
    width: usize,
    height: usize,
    tiles: Vec<Option<Tile>>,
    #[serde(skip)]
    bodies: Vec<Option<BodyId>>,
}

impl TileLayer {
    pub fn new(key: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            key: key.into(),
            width,
            height,
            tiles: vec![None; width * height],
            bodies: vec![None; width * height],
        }
    }

    /// Build from text rows, top row first
    pub fn from_rows<S: AsRef<str>>(key: impl Into<String>, rows: &[S], legend: &TileLegend) -> PhysicsResult<Self> {
        let key = key.into();
        let width = rows.iter().map(|row| row.as_ref().chars().count()).max().unwrap_or(0);
        let mut layer = TileLayer::new(key, width, rows.len());

        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.as_ref().chars().enumerate() {
                if symbol == '.' || symbol == ' ' {
                    continue;
                }
                let tile = legend.get(symbol).cloned().ok_or_else(|| {
                    PhysicsError::InvalidTileLayer(layer.key.clone(), format!("unknown symbol '{symbol}' at ({x}, {y})"))
                })?;
                layer.set(x, y, Some(tile))?;
            }
        }
        Ok(layer)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        self.index(x, y).and_then(|index| self.tiles[index].as_ref())
    }

    pub fn set(&mut self, x: usize, y: usize, tile: Option<Tile>) -> PhysicsResult<()> {
        let index = self.index(x, y).ok_or_else(|| {
            PhysicsError::InvalidTileLayer(
                self.key.clone(),
                format!("({x}, {y}) is outside {}x{}", self.width, self.height),
            )
        })?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Body spawned for the tile at `(x, y)`, once the world is built
    pub fn body(&self, x: usize, y: usize) -> Option<BodyId> {
        self.index(x, y).and_then(|index| self.bodies.get(index).copied().flatten())
    }

    /// Occupied tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(index, tile)| tile.as_ref().map(|tile| (index % self.width, index / self.width, tile)))
    }

    pub(crate) fn set_body(&mut self, x: usize, y: usize, body: BodyId) {
        if self.bodies.len() != self.tiles.len() {
            self.bodies = vec![None; self.tiles.len()];
        }
        if let Some(index) = self.index(x, y) {
            self.bodies[index] = Some(body);
        }
    }

    fn collect_bodies(&self, columns: (usize, usize), rows: (usize, usize), out: &mut Vec<BodyId>) {
        for y in rows.0..=rows.1 {
            for x in columns.0..=columns.1 {
                if let Some(body) = self.body(x, y) {
                    out.push(body);
                }
            }
        }
    }
}

/// One of the four sides a level can have neighbours on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compass {
    North,
    East,
    South,
    West,
}

impl Compass {
    pub fn opposite(self) -> Compass {
        match self {
            Compass::North => Compass::South,
            Compass::East => Compass::West,
            Compass::South => Compass::North,
            Compass::West => Compass::East,
        }
    }
}

/// Neighbouring level ids per side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neighbours {
    pub north: Vec<String>,
    pub east: Vec<String>,
    pub south: Vec<String>,
    pub west: Vec<String>,
}

impl Neighbours {
    pub fn side(&self, compass: Compass) -> &[String] {
        match compass {
            Compass::North => &self.north,
            Compass::East => &self.east,
            Compass::South => &self.south,
            Compass::West => &self.west,
        }
    }

    fn side_mut(&mut self, compass: Compass) -> &mut Vec<String> {
        match compass {
            Compass::North => &mut self.north,
            Compass::East => &mut self.east,
            Compass::South => &mut self.south,
            Compass::West => &mut self.west,
        }
    }
}

/// A tile level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileLevel {
    id: String,
    /// Top-left corner in world space
    origin: Vec2,
    /// Size in tiles
    width: usize,
    height: usize,
    #[serde(default)]
    layers: Vec<TileLayer>,
    #[serde(default)]
    neighbours: Neighbours,
    #[serde(skip)]
    grid: Grid,
}

impl TileLevel {
    pub fn new(id: impl Into<String>, origin: Vec2, width: usize, height: usize) -> Self {
        Self {
            id: id.into(),
            origin,
            width,
            height,
            layers: Vec::new(),
            neighbours: Neighbours::default(),
            grid: Grid::default(),
        }
    }

    pub fn with_layer(mut self, layer: TileLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World size
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * TILE_SIZE
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, key: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.key == key)
    }

    pub fn neighbours(&self) -> &Neighbours {
        &self.neighbours
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [TileLayer] {
        &mut self.layers
    }

    /// Half-open on the right and bottom so shared seams belong to one level
    pub fn contains(&self, position: Vec2) -> bool {
        let size = self.size();
        position.x >= self.origin.x
            && position.x < self.origin.x + size.x
            && position.y <= self.origin.y
            && position.y > self.origin.y - size.y
    }

    /// World centre of tile `(x, y)`
    pub fn tile_centre(&self, x: usize, y: usize) -> Vec2 {
        self.origin + Vec2::new(x as f32 + 0.5, -(y as f32 + 0.5)) * TILE_SIZE
    }

    /// Tile coordinates of a world position, possibly outside the level
    pub fn tile_coords(&self, position: Vec2) -> (i64, i64) {
        let x = ((position.x - self.origin.x) / TILE_SIZE).floor() as i64;
        let y = ((self.origin.y - position.y) / TILE_SIZE).floor() as i64;
        (x, y)
    }

    fn validate(&self) -> PhysicsResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PhysicsError::InvalidLevel(self.id.clone(), "level has no tiles".to_string()));
        }
        for layer in &self.layers {
            if layer.tiles.len() != layer.width * layer.height {
                return Err(PhysicsError::InvalidTileLayer(
                    layer.key.clone(),
                    format!("{} tiles for {}x{}", layer.tiles.len(), layer.width, layer.height),
                ));
            }
            if layer.width > self.width || layer.height > self.height {
                return Err(PhysicsError::InvalidLevel(
                    self.id.clone(),
                    format!(
                        "layer '{}' is {}x{} but the level is {}x{}",
                        layer.key, layer.width, layer.height, self.width, self.height
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// All levels of a world
#[derive(Debug, Clone, Default)]
pub struct LevelSet {
    levels: Vec<TileLevel>,
    index: AHashMap<String, usize>,
}

impl LevelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a level; ids must be unique
    pub fn add(&mut self, level: TileLevel) -> PhysicsResult<usize> {
        level.validate()?;
        if self.index.contains_key(&level.id) {
            return Err(PhysicsError::InvalidLevel(level.id.clone(), "duplicate level id".to_string()));
        }
        let slot = self.levels.len();
        self.index.insert(level.id.clone(), slot);
        self.levels.push(level);
        Ok(slot)
    }

    /// Make `b` the `side` neighbour of `a`, and `a` the opposite neighbour of `b`
    pub fn link(&mut self, a: &str, side: Compass, b: &str) -> PhysicsResult<()> {
        let first = self.find(a)?;
        let second = self.find(b)?;
        if first == second {
            return Err(PhysicsError::InvalidLevel(a.to_string(), "a level cannot neighbour itself".to_string()));
        }
        let link = |level: &mut TileLevel, side: Compass, other: &str| {
            let list = level.neighbours.side_mut(side);
            if !list.iter().any(|id| id == other) {
                list.push(other.to_string());
            }
        };
        link(&mut self.levels[first], side, b);
        link(&mut self.levels[second], side.opposite(), a);
        Ok(())
    }

    fn find(&self, id: &str) -> PhysicsResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| PhysicsError::InvalidLevel(id.to_string(), "no such level".to_string()))
    }

    /// Check every declared neighbour exists
    pub fn validate_links(&self) -> PhysicsResult<()> {
        for level in &self.levels {
            for side in [Compass::North, Compass::East, Compass::South, Compass::West] {
                for neighbour in level.neighbours.side(side) {
                    if !self.index.contains_key(neighbour) {
                        return Err(PhysicsError::InvalidLevel(
                            level.id.clone(),
                            format!("unknown {side:?} neighbour '{neighbour}'"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn build_grids(&mut self, cell_size: f32) -> PhysicsResult<()> {
        for level in &mut self.levels {
            level.grid = Grid::new(level.origin, level.size(), cell_size)?;
        }
        Ok(())
    }

    pub fn by_id(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, index: usize) -> Option<&TileLevel> {
        self.levels.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TileLevel> {
        self.levels.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileLevel> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// First level containing `position`
    pub fn level_at(&self, position: Vec2) -> Option<usize> {
        self.levels.iter().position(|level| level.contains(position))
    }

    /// Tile bodies within `range` tiles of `position`
    ///
    /// When the window runs past an edge of the level, the neighbours on that
    /// side are searched too, each level at most once.
    pub fn tiles_nearby(&self, level: usize, position: Vec2, range: i64) -> Vec<BodyId> {
        let mut out = Vec::new();
        let mut visited = vec![false; self.levels.len()];
        self.gather_tiles(level, position, range, &mut visited, &mut out);
        out
    }

    fn gather_tiles(&self, level: usize, position: Vec2, range: i64, visited: &mut [bool], out: &mut Vec<BodyId>) {
        let Some(tile_level) = self.levels.get(level) else {
            return;
        };
        if visited[level] {
            return;
        }
        visited[level] = true;

        let (x, y) = tile_level.tile_coords(position);
        let last_column = tile_level.width as i64 - 1;
        let last_row = tile_level.height as i64 - 1;

        let columns = ((x - range).max(0), (x + range).min(last_column));
        let rows = ((y - range).max(0), (y + range).min(last_row));
        if columns.0 <= columns.1 && rows.0 <= rows.1 {
            let columns = (columns.0 as usize, columns.1 as usize);
            let rows = (rows.0 as usize, rows.1 as usize);
            for layer in &tile_level.layers {
                layer.collect_bodies(columns, rows, out);
            }
        }

        let mut sides = Vec::with_capacity(4);
        if x + range > last_column {
            sides.push(Compass::East);
        }
        if x - range < 0 {
            sides.push(Compass::West);
        }
        if y - range < 0 {
            sides.push(Compass::North);
        }
        if y + range > last_row {
            sides.push(Compass::South);
        }
        for side in sides {
            for neighbour in tile_level.neighbours.side(side) {
                if let Some(&next) = self.index.get(neighbour) {
                    self.gather_tiles(next, position, range, visited, out);
                }
            }
        }
    }
}
