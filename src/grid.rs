use std::collections::HashSet;
use rand::Rng;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_MAX_X: usize = 10;
pub const DEFAULT_MAX_Y: usize = 10;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Colour {
    Red,
    Green,
    Blue,
    Yellow,
    /// Sentinel for a cleared block. Never a valid paint target.
    Grey,
}

/// The fixed set of colours assignable to a block (sentinel excluded).
pub const PALETTE: [Colour; 4] = [Colour::Red, Colour::Green, Colour::Blue, Colour::Yellow];

impl Colour {
    pub fn is_palette_member(&self) -> bool {
        !matches!(self, Colour::Grey)
    }

    fn random() -> Self {
        let mut rng = rand::thread_rng();
        PALETTE[rng.gen_range(0..PALETTE.len())]
    }
}

/// A single grid cell. Coordinates are fixed at construction; only the
/// colour mutates, and only through `paint` and `clear`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block {
    x: i16,
    y: i16,
    colour: Colour,
}

impl Block {
    pub fn new(x: i16, y: i16, colour: Colour) -> Self {
        Self { x, y, colour }
    }

    pub fn x(&self) -> i16 {
        self.x
    }

    pub fn y(&self) -> i16 {
        self.y
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn is_cleared(&self) -> bool {
        self.colour == Colour::Grey
    }

    /// Idempotent: clearing a cleared block is a no-op.
    pub fn clear(&mut self) {
        self.colour = Colour::Grey;
    }

    /// Repaints the block, silently ignoring the sentinel. The only other
    /// colour mutation is `clear`.
    pub fn paint(&mut self, colour: Colour) {
        if colour.is_palette_member() {
            self.colour = colour;
        }
    }

    /// `None` never matches. Two cleared blocks compare equal, which is
    /// what lets cleared regions connect symmetrically.
    pub fn is_same_colour(&self, other: Option<&Block>) -> bool {
        match other {
            Some(other) => self.colour == other.colour,
            None => false,
        }
    }

    /// North, west, east, south, in that fixed order. Traversal ordering
    /// downstream depends on it.
    pub fn four_way_neighbour_coordinates(&self) -> [(i16, i16); 4] {
        [
            (self.x, self.y + 1),
            (self.x - 1, self.y),
            (self.x + 1, self.y),
            (self.x, self.y - 1),
        ]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GridEvent {
    GridChanged,
}

// ============================================================================
// Colour Provider Trait
// ============================================================================

pub trait ColourProvider {
    fn next_colour(&mut self) -> Colour;
}

struct RandomColourProvider;

impl ColourProvider for RandomColourProvider {
    fn next_colour(&mut self) -> Colour {
        Colour::random()
    }
}

pub struct SequenceColourProvider {
    colours: Vec<Colour>,
    index: usize,
}

impl SequenceColourProvider {
    /// # Panics
    ///
    /// Panics if `colours` is empty; the provider cycles through the
    /// sequence indefinitely and has nothing to hand out otherwise.
    pub fn new(colours: Vec<Colour>) -> Self {
        assert!(
            !colours.is_empty(),
            "SequenceColourProvider requires at least one colour"
        );
        Self { colours, index: 0 }
    }
}

impl ColourProvider for SequenceColourProvider {
    fn next_colour(&mut self) -> Colour {
        let colour = self.colours[self.index % self.colours.len()];
        self.index += 1;
        colour
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Owns one block per slot for its whole lifetime. Column-major: the outer
/// index is the column `x`, the inner index the row `y`, with `y = 0` the
/// bottom row.
pub struct Grid {
    pub max_x: usize,
    pub max_y: usize,
    grid: Vec<Vec<Block>>,
    events: Vec<GridEvent>,
}

impl Grid {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_MAX_X, DEFAULT_MAX_Y)
    }

    /// A dimension of zero falls back to the default for that axis.
    pub fn with_size(max_x: usize, max_y: usize) -> Self {
        Self::with_provider(max_x, max_y, &mut RandomColourProvider)
    }

    pub fn with_provider(max_x: usize, max_y: usize, provider: &mut dyn ColourProvider) -> Self {
        let max_x = if max_x == 0 { DEFAULT_MAX_X } else { max_x };
        let max_y = if max_y == 0 { DEFAULT_MAX_Y } else { max_y };

        // Columns outside, rows inside: the provider is drawn column-major.
        let mut grid = Vec::with_capacity(max_x);
        for x in 0..max_x {
            let mut column = Vec::with_capacity(max_y);
            for y in 0..max_y {
                column.push(Block::new(x as i16, y as i16, provider.next_colour()));
            }
            grid.push(column);
        }

        Self {
            max_x,
            max_y,
            grid,
            events: Vec::new(),
        }
    }

    pub fn coordinates_within_boundaries(&self, x: i16, y: i16) -> bool {
        x >= 0 && (x as usize) < self.max_x && y >= 0 && (y as usize) < self.max_y
    }

    pub fn block(&self, x: i16, y: i16) -> Option<&Block> {
        if self.coordinates_within_boundaries(x, y) {
            Some(&self.grid[x as usize][y as usize])
        } else {
            None
        }
    }

    /// Pre-order depth-first search over 4-way adjacency, restricted to
    /// blocks whose colour matches the start block. The result begins with
    /// the start coordinates; neighbours are examined in N/W/E/S order and
    /// each newly discovered block is descended into before its remaining
    /// siblings are examined. The exact ordering is part of the contract.
    ///
    /// Explicit frame stack (one frame per block being expanded, advancing
    /// one neighbour at a time), so large regions cannot exhaust the call
    /// stack.
    pub fn connected_blocks(&self, x: i16, y: i16) -> Vec<(i16, i16)> {
        let start = match self.block(x, y) {
            Some(block) => *block,
            None => return Vec::new(),
        };

        let mut result = vec![(x, y)];
        let mut seen: HashSet<(i16, i16)> = HashSet::new();
        seen.insert((x, y));
        let mut stack: Vec<((i16, i16), usize)> = vec![((x, y), 0)];

        while let Some(frame) = stack.last_mut() {
            let ((cx, cy), next) = *frame;
            if next == 4 {
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let block = self.grid[cx as usize][cy as usize];
            let (nx, ny) = block.four_way_neighbour_coordinates()[next];
            if !self.coordinates_within_boundaries(nx, ny) {
                continue;
            }
            if seen.contains(&(nx, ny)) {
                continue;
            }
            let neighbour = &self.grid[nx as usize][ny as usize];
            if start.is_same_colour(Some(neighbour)) {
                seen.insert((nx, ny));
                result.push((nx, ny));
                stack.push(((nx, ny), 0));
            }
        }

        result
    }

    /// Clears the connected region of `(x, y)` in place and returns the
    /// distinct column indices touched, for the gravity pass.
    pub fn clear_connected_blocks(&mut self, x: i16, y: i16) -> HashSet<usize> {
        let mut affected_columns = HashSet::new();
        for (cx, cy) in self.connected_blocks(x, y) {
            self.grid[cx as usize][cy as usize].clear();
            affected_columns.insert(cx as usize);
        }
        affected_columns
    }

    /// One ascending scan per column: each cleared cell pulls down the
    /// colour of the first non-cleared cell above it. Chained gaps settle
    /// within the single scan because every row is revisited on the way up.
    pub fn apply_gravity<I>(&mut self, affected_columns: I)
    where
        I: IntoIterator<Item = usize>,
    {
        for x in affected_columns {
            if x >= self.max_x {
                continue;
            }
            for y in 0..self.max_y {
                if !self.grid[x][y].is_cleared() {
                    continue;
                }
                for yy in (y + 1)..self.max_y {
                    if !self.grid[x][yy].is_cleared() {
                        let falling = self.grid[x][yy].colour();
                        self.grid[x][y].paint(falling);
                        self.grid[x][yy].clear();
                        break;
                    }
                }
            }
        }
    }

    /// The single externally-triggered action. No-ops on a cleared or
    /// out-of-bounds block; otherwise clears the connected region, settles
    /// the affected columns, and signals a change.
    pub fn select_block(&mut self, x: i16, y: i16) {
        match self.block(x, y) {
            Some(block) if !block.is_cleared() => {}
            _ => return,
        }

        let affected_columns = self.clear_connected_blocks(x, y);
        self.apply_gravity(affected_columns);
        self.events.push(GridEvent::GridChanged);
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Count of blocks not yet cleared
    pub fn remaining_blocks(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|block| !block.is_cleared())
            .count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    /// Builds a grid from explicit columns, bottom row first within each
    /// column. `Colour::Grey` entries are allowed so tests can start from
    /// partially cleared boards.
    pub fn grid_from_columns(columns: Vec<Vec<Colour>>) -> Grid {
        let max_x = columns.len();
        let max_y = columns.first().map(Vec::len).unwrap_or(0);
        let mut provider = SequenceColourProvider::new(columns.concat());
        Grid::with_provider(max_x, max_y, &mut provider)
    }

    pub fn uniform_grid(max_x: usize, max_y: usize, colour: Colour) -> Grid {
        let mut provider = SequenceColourProvider::new(vec![colour]);
        Grid::with_provider(max_x, max_y, &mut provider)
    }
}
