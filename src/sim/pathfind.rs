//! Grid A* for route planning around (or through) obstacles
//!
//! The live simulation steers greedily, but AI experiments and debug tooling
//! want real routes. `NavGrid` rasterizes the obstacle set onto a coarse cell
//! grid; `find_path` runs A* over it where destructible cells cost extra in
//! proportion to how long the walker would chew through them.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use glam::Vec2;

use crate::consts::{WORLD_H, WORLD_W};

use super::collision::Rect;
use super::state::Obstacle;

/// Side length of one nav cell in world units
pub const CELL_SIZE: f32 = 4.0;

/// What occupies a nav cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellBlock {
    Open,
    /// Passable at a cost scaled by remaining integrity against the
    /// walker's attack
    Destructible { integrity: f32 },
    Indestructible,
}

/// Coarse occupancy grid over the world rectangle
#[derive(Debug, Clone)]
pub struct NavGrid {
    width: usize,
    height: usize,
    cells: Vec<CellBlock>,
}

impl NavGrid {
    pub fn empty() -> Self {
        let width = (WORLD_W / CELL_SIZE) as usize;
        let height = (WORLD_H / CELL_SIZE) as usize;
        Self {
            width,
            height,
            cells: vec![CellBlock::Open; width * height],
        }
    }

    /// Rasterize the living obstacles into a fresh grid
    pub fn from_obstacles(obstacles: &[Obstacle]) -> Self {
        let mut grid = Self::empty();
        for o in obstacles.iter().filter(|o| o.alive) {
            grid.fill_rect(&o.rect, CellBlock::Destructible { integrity: o.hp });
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn fill_rect(&mut self, rect: &Rect, block: CellBlock) {
        let x0 = (rect.left() / CELL_SIZE).floor().max(0.0) as usize;
        let y0 = (rect.top() / CELL_SIZE).floor().max(0.0) as usize;
        let x1 = ((rect.right() / CELL_SIZE).ceil() as usize).min(self.width);
        let y1 = ((rect.bottom() / CELL_SIZE).ceil() as usize).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.cells[y * self.width + x] = block;
            }
        }
    }

    pub fn set(&mut self, cell: (usize, usize), block: CellBlock) {
        if cell.0 < self.width && cell.1 < self.height {
            self.cells[cell.1 * self.width + cell.0] = block;
        }
    }

    pub fn get(&self, cell: (usize, usize)) -> CellBlock {
        if cell.0 < self.width && cell.1 < self.height {
            self.cells[cell.1 * self.width + cell.0]
        } else {
            CellBlock::Indestructible
        }
    }

    /// World position to containing cell, clamped to the grid
    pub fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        let x = ((pos.x / CELL_SIZE) as usize).min(self.width.saturating_sub(1));
        let y = ((pos.y / CELL_SIZE) as usize).min(self.height.saturating_sub(1));
        (x, y)
    }

    /// Center of a cell in world units
    pub fn center_of(&self, cell: (usize, usize)) -> Vec2 {
        Vec2::new(
            cell.0 as f32 * CELL_SIZE + CELL_SIZE / 2.0,
            cell.1 as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        )
    }
}

// BinaryHeap is a max-heap; order by reversed f-score for the frontier.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    f: f32,
    cell: (usize, usize),
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f)
    }
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> f32 {
    (a.0.abs_diff(b.0) + a.1.abs_diff(b.1)) as f32
}

/// Cost to step into a cell for a walker with the given attack damage.
/// Destructible cells add a tenth of the hit count needed to clear them;
/// indestructible cells are not enterable at all.
fn step_cost(block: CellBlock, attack: f32) -> Option<f32> {
    match block {
        CellBlock::Open => Some(1.0),
        CellBlock::Destructible { integrity } => {
            let hits = (integrity / attack.max(1.0)).ceil();
            Some(1.0 + hits * 0.1)
        }
        CellBlock::Indestructible => None,
    }
}

/// 4-connected A* from `start` to `goal`. Returns the cell path including
/// both endpoints, or `None` when the goal is unreachable.
pub fn find_path(
    grid: &NavGrid,
    start: (usize, usize),
    goal: (usize, usize),
    attack: f32,
) -> Option<Vec<(usize, usize)>> {
    if grid.get(goal) == CellBlock::Indestructible {
        return None;
    }
    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut g_score: HashMap<(usize, usize), f32> = HashMap::new();
    g_score.insert(start, 0.0);
    open.push(Frontier {
        f: manhattan(start, goal),
        cell: start,
    });

    while let Some(Frontier { cell, .. }) = open.pop() {
        if cell == goal {
            let mut path = vec![cell];
            let mut cur = cell;
            while let Some(&prev) = came_from.get(&cur) {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return Some(path);
        }
        let g_here = g_score[&cell];

        let (x, y) = cell;
        let mut neighbors: [Option<(usize, usize)>; 4] = [None; 4];
        if x > 0 {
            neighbors[0] = Some((x - 1, y));
        }
        if x + 1 < grid.width() {
            neighbors[1] = Some((x + 1, y));
        }
        if y > 0 {
            neighbors[2] = Some((x, y - 1));
        }
        if y + 1 < grid.height() {
            neighbors[3] = Some((x, y + 1));
        }

        for next in neighbors.into_iter().flatten() {
            let Some(cost) = step_cost(grid.get(next), attack) else {
                continue;
            };
            let tentative = g_here + cost;
            if tentative < *g_score.get(&next).unwrap_or(&f32::INFINITY) {
                g_score.insert(next, tentative);
                came_from.insert(next, cell);
                open.push(Frontier {
                    f: tentative + manhattan(next, goal),
                    cell: next,
                });
            }
        }
    }
    None
}
