use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board dimensions must be positive (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },
    #[error("a {width}x{height} board has more cells than can be addressed")]
    TooManyCells { width: usize, height: usize },
    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },
    #[error("{mines} mines leave no room for a safe first click (at most {capacity} allowed)")]
    NoSafeOpening { mines: usize, capacity: usize },
    #[error("mine at ({x}, {y}) is outside the board")]
    MineOutOfBounds { x: usize, y: usize },
    #[error("mine at ({x}, {y}) is listed twice")]
    DuplicateMine { x: usize, y: usize },
}

pub type Result<T> = core::result::Result<T, ConfigError>;
