use std::fmt::{self, Write as _};

use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{ConfigError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealResult {
    NoOp,
    RevealedSafe,
    HitMine,
}

/// Game status. `Won` and `Lost` are terminal until [`Board::restart`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

impl Status {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// What a cell holds, independent of whether the player can see it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellContent {
    Empty,
    Number(u8),
    Mine,
}

#[derive(Clone, Debug)]
pub struct Cell {
    content: CellContent,
    revealed: bool,
    flagged: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self { content: CellContent::Empty, revealed: false, flagged: false }
    }
}

/// Construction parameters of a game. A `seed` of 0 picks a fresh one from OS entropy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub seed: u64,
}

impl GameConfig {
    pub fn new(width: usize, height: usize, mines: usize) -> Self {
        Self { width, height, mines, seed: 0 }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Number of cells on the board, `None` if it does not fit in `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Rejects layouts where some first click could leave no room for the mines.
    ///
    /// The bound assumes the largest safe zone any click can produce, a full 3x3
    /// block (clipped on boards narrower or shorter than 3). Mine counts that would
    /// only fit around an edge or corner click, such as 8 mines on 4x4, are rejected.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid { width: self.width, height: self.height });
        }
        let cells = self
            .cells()
            .ok_or(ConfigError::TooManyCells { width: self.width, height: self.height })?;
        if self.mines >= cells {
            return Err(ConfigError::TooManyMines { mines: self.mines, cells });
        }
        let capacity = cells - largest_safe_zone(self.width, self.height);
        if self.mines > capacity {
            return Err(ConfigError::NoSafeOpening { mines: self.mines, capacity });
        }
        Ok(())
    }
}

pub struct Board {
    width: usize,
    height: usize,
    mines: usize,
    cells: Vec<Cell>,
    mines_flagged: usize,
    status: Status,
    first_move: bool,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Board {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let seed = if config.seed == 0 { seed_from_entropy() } else { config.seed };
        Ok(Self::blank(config.width, config.height, config.mines, seed))
    }

    /// Builds a board with mines at the given positions. Placement is already done,
    /// so the first reveal gets no safety guarantee.
    pub fn with_layout(width: usize, height: usize, mines: &[(usize, usize)]) -> Result<Self> {
        GameConfig::new(width, height, mines.len()).validate()?;
        let mut board = Self::blank(width, height, mines.len(), seed_from_entropy());
        for &(x, y) in mines {
            if x >= width || y >= height {
                return Err(ConfigError::MineOutOfBounds { x, y });
            }
            let cell = &mut board.cells[idx(width, x, y)];
            if cell.is_mine() {
                return Err(ConfigError::DuplicateMine { x, y });
            }
            cell.content = CellContent::Mine;
        }
        board.compute_adjacency();
        board.first_move = false;
        Ok(board)
    }

    fn blank(width: usize, height: usize, mines: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            mines,
            cells: vec![Cell::default(); width * height],
            mines_flagged: 0,
            status: Status::Playing,
            first_move: true,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Throws the current game away and starts an unplayed one of the same shape.
    /// The new seed comes from this game's generator, so seeded sessions stay reproducible.
    pub fn restart(&mut self) {
        let seed = self.rng.gen::<u64>().max(1);
        debug!("restarting {}x{} board with {} mines (seed {})", self.width, self.height, self.mines, seed);
        *self = Self::blank(self.width, self.height, self.mines, seed);
    }

    pub fn toggle_flag(&mut self, x: usize, y: usize) -> bool {
        if self.status.is_finished() || x >= self.width || y >= self.height {
            trace!("flag at ({}, {}) ignored", x, y);
            return false;
        }
        let cell = &mut self.cells[idx(self.width, x, y)];
        if cell.revealed {
            return false;
        }
        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.mines_flagged += 1;
        } else {
            self.mines_flagged -= 1;
        }
        true
    }

    pub fn reveal(&mut self, x: usize, y: usize) -> RevealResult {
        if self.status.is_finished() || x >= self.width || y >= self.height {
            trace!("reveal at ({}, {}) ignored", x, y);
            return RevealResult::NoOp;
        }
        let i = idx(self.width, x, y);
        if self.cells[i].flagged || self.cells[i].revealed {
            return RevealResult::NoOp;
        }

        if self.first_move {
            self.place_mines(x, y);
            self.first_move = false;
        }
        if self.cells[i].is_mine() {
            self.status = Status::Lost;
            info!("mine hit at ({}, {})", x, y);
            return RevealResult::HitMine;
        }

        let opened = self.flood_reveal(x, y);
        debug!("reveal at ({}, {}) opened {} cells", x, y, opened);
        if self.remaining_safe() == 0 {
            self.status = Status::Won;
            info!("board cleared");
        }
        RevealResult::RevealedSafe
    }

    fn place_mines(&mut self, first_x: usize, first_y: usize) {
        let safe: Vec<(usize, usize)> = std::iter::once((first_x, first_y))
            .chain(neighbors(self.width, self.height, first_x, first_y))
            .collect();

        // Terminates: validate() keeps mines within the cells outside any safe zone.
        let mut placed = 0;
        while placed < self.mines {
            let x = self.rng.gen_range(0..self.width);
            let y = self.rng.gen_range(0..self.height);
            let cell = &mut self.cells[idx(self.width, x, y)];
            if cell.is_mine() || safe.contains(&(x, y)) {
                continue;
            }
            cell.content = CellContent::Mine;
            placed += 1;
        }
        debug!("placed {} mines outside a {}-cell safe zone (seed {})", placed, safe.len(), self.seed);
        self.compute_adjacency();
    }

    fn compute_adjacency(&mut self) {
        let (w, h) = (self.width, self.height);
        for i in 0..self.cells.len() {
            if self.cells[i].is_mine() {
                continue;
            }
            let count = neighbors(w, h, i % w, i / w)
                .filter(|&(nx, ny)| self.cells[idx(w, nx, ny)].is_mine())
                .count() as u8;
            self.cells[i].content = if count == 0 { CellContent::Empty } else { CellContent::Number(count) };
        }
    }

    /// Reveals `(x, y)` and, through empty cells, everything connected to it.
    /// Cells are marked revealed before they are pushed, so each is visited once.
    fn flood_reveal(&mut self, x: usize, y: usize) -> usize {
        let (w, h) = (self.width, self.height);
        self.cells[idx(w, x, y)].revealed = true;
        let mut stack = vec![(x, y)];
        let mut opened = 0;
        while let Some((cx, cy)) = stack.pop() {
            opened += 1;
            if self.cells[idx(w, cx, cy)].content != CellContent::Empty {
                continue;
            }
            for (nx, ny) in neighbors(w, h, cx, cy) {
                let n = &mut self.cells[idx(w, nx, ny)];
                if n.revealed || n.flagged || n.is_mine() {
                    continue;
                }
                n.revealed = true;
                stack.push((nx, ny));
            }
        }
        opened
    }

    pub fn render(&self, show_mines: bool, one_based: bool) -> String {
        let base = usize::from(one_based);
        let labels: Vec<String> = (0..self.width).map(|x| format!("{:>2}", x + base)).collect();
        let mut s = format!("    {}\n   +{}\n", labels.join(" "), "-".repeat(self.width * 3));
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            let glyphs: Vec<String> = row.iter().map(|c| c.glyph(show_mines).to_string()).collect();
            let _ = writeln!(s, "{:>2} | {}", y + base, glyphs.join("  "));
        }
        s
    }
}

fn idx(w: usize, x: usize, y: usize) -> usize { y * w + x }

fn neighbors(w: usize, h: usize, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
    (-1isize..=1)
        .flat_map(|dy| (-1isize..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(move |(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            (nx < w && ny < h).then_some((nx, ny))
        })
}

/// Size of the 3x3 neighbourhood around an interior click, clipped to the board.
fn largest_safe_zone(w: usize, h: usize) -> usize {
    w.min(3) * h.min(3)
}

fn seed_from_entropy() -> u64 {
    rand::random::<u64>().max(1)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false, true))
    }
}

// Read view for the render and input layers
impl Board {
    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn mines(&self) -> usize { self.mines }
    pub fn mines_flagged(&self) -> usize { self.mines_flagged }
    pub fn status(&self) -> Status { self.status }
    pub fn first_move(&self) -> bool { self.first_move }
    pub fn seed(&self) -> u64 { self.seed }

    /// Mine count shown to the player. Goes negative when over-flagged.
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.mines_flagged as isize
    }

    pub fn remaining_safe(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_mine() && !c.revealed).count()
    }

    pub fn config(&self) -> GameConfig {
        GameConfig { width: self.width, height: self.height, mines: self.mines, seed: self.seed }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height { Some(&self.cells[idx(self.width, x, y)]) } else { None }
    }

    /// Mines the player has not flagged; drawn by the view once the game is lost.
    pub fn unflagged_mines(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_mine() && !c.flagged)
            .map(move |(i, _)| (i % self.width, i / self.width))
    }
}

impl CellContent {
    pub fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Number(n) => char::from_digit(n as u32, 10).unwrap_or('?'),
            Self::Mine => '*',
        }
    }
}

impl Cell {
    /// What the player sees. `show_mines` uncovers mines that are not flagged.
    pub fn glyph(&self, show_mines: bool) -> char {
        if self.flagged {
            'F'
        } else if self.revealed || (show_mines && self.is_mine()) {
            self.content.glyph()
        } else {
            '.'
        }
    }

    pub fn content(&self) -> CellContent { self.content }
    pub fn is_mine(&self) -> bool { self.content == CellContent::Mine }
    pub fn revealed(&self) -> bool { self.revealed }
    pub fn flagged(&self) -> bool { self.flagged }

    pub fn adjacent(&self) -> u8 {
        match self.content {
            CellContent::Number(n) => n,
            _ => 0,
        }
    }
}
