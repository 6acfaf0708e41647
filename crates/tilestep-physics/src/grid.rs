//! Broad-phase grid
//!
//! A level is cut into square cells. Each cell lists the actors and solids
//! whose position falls inside it and knows its 8-connected neighbours, so
//! the candidates for a body are its own cell plus the ring around it.

use smallvec::SmallVec;
use tilestep_core::{BodyId, Vec2};

use crate::body::BodyKind;
use crate::error::{PhysicsError, PhysicsResult};

/// One grid cell
#[derive(Debug, Clone, Default)]
pub struct Cell {
    actors: Vec<BodyId>,
    solids: Vec<BodyId>,
    neighbours: SmallVec<[usize; 8]>,
}

impl Cell {
    pub fn actors(&self) -> &[BodyId] {
        &self.actors
    }

    pub fn solids(&self) -> &[BodyId] {
        &self.solids
    }

    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }

    fn list_mut(&mut self, kind: BodyKind) -> Option<&mut Vec<BodyId>> {
        match kind {
            BodyKind::Actor => Some(&mut self.actors),
            BodyKind::Solid => Some(&mut self.solids),
            BodyKind::Tile => None,
        }
    }
}

/// Cells covering a rectangle whose top-left corner is `origin`
#[derive(Debug, Clone, Default)]
pub struct Grid {
    origin: Vec2,
    cell_size: f32,
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Cover `size` (width, height) below and right of `origin`
    pub fn new(origin: Vec2, size: Vec2, cell_size: f32) -> PhysicsResult<Self> {
        if !(cell_size > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!("cell size {cell_size} must be positive")));
        }
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!("grid size {size} must be positive")));
        }

        let columns = (size.x / cell_size).ceil() as usize;
        let rows = (size.y / cell_size).ceil() as usize;
        let mut cells = vec![Cell::default(); columns * rows];

        for row in 0..rows {
            for column in 0..columns {
                let neighbours = &mut cells[row * columns + column].neighbours;
                for dy in -1_isize..=1 {
                    for dx in -1_isize..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (Some(x), Some(y)) = (column.checked_add_signed(dx), row.checked_add_signed(dy)) else {
                            continue;
                        };
                        if x < columns && y < rows {
                            neighbours.push(y * columns + x);
                        }
                    }
                }
            }
        }

        Ok(Self {
            origin,
            cell_size,
            columns,
            rows,
            cells,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell containing `position`, clamped to the grid; `None` for an empty grid
    pub fn cell_index(&self, position: Vec2) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }
        let clamp = |value: f32, count: usize| {
            if value.is_nan() || value < 0.0 {
                0
            } else {
                (value as usize).min(count - 1)
            }
        };
        let column = clamp(((position.x - self.origin.x) / self.cell_size).floor(), self.columns);
        let row = clamp(((self.origin.y - position.y) / self.cell_size).floor(), self.rows);
        Some(row * self.columns + column)
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// The cell itself followed by its neighbours
    pub fn neighbourhood(&self, index: usize) -> impl Iterator<Item = &Cell> {
        let neighbours = self.cells.get(index).map(|cell| cell.neighbours.as_slice()).unwrap_or(&[]);
        self.cells
            .get(index)
            .into_iter()
            .chain(neighbours.iter().filter_map(|&neighbour| self.cells.get(neighbour)))
    }

    pub(crate) fn insert(&mut self, index: usize, id: BodyId, kind: BodyKind) {
        if let Some(list) = self.cells.get_mut(index).and_then(|cell| cell.list_mut(kind)) {
            if !list.contains(&id) {
                list.push(id);
            }
        }
    }

    pub(crate) fn remove(&mut self, index: usize, id: BodyId, kind: BodyKind) {
        if let Some(list) = self.cells.get_mut(index).and_then(|cell| cell.list_mut(kind)) {
            list.retain(|&other| other != id);
        }
    }
}
