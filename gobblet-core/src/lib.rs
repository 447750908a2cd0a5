//! Gobblet (4×4) game logic: stacked cells, per-player supplies, move
//! generation and pure state transitions.
//!
//! # Board Layout
//!
//! ```text
//! Cell indices (row-major order):
//!   ( 0) ( 1) ( 2) ( 3)
//!   ( 4) ( 5) ( 6) ( 7)
//!   ( 8) ( 9) (10) (11)
//!   (12) (13) (14) (15)
//! ```
//!
//! # Stack Storage
//!
//! A piece may only cover a strictly smaller one, so the pieces on a cell
//! strictly increase in size from bottom to top and a cell holds at most one
//! piece per size. Stacks are therefore indexed by SIZE, not by stack
//! position: the top (visible) piece is the largest one present.
//!
//! # State Key Encoding
//!
//! ```text
//! cells (u128), 8 bits per cell, cell i at bits i*8..i*8+8:
//!   Bits 0-1: Tiny piece owner   (0=empty, 1=P1, 2=P2)
//!   Bits 2-3: Small piece owner
//!   Bits 4-5: Medium piece owner
//!   Bits 6-7: Large piece owner
//!
//! supplies (u128), 4 bits per supply slot, P1 slots 0-11 then P2 slots 0-11:
//!   0 = no piece in slot, else 1 + (size - 1) * 2 + used
//!   Bit 96: side to move (0 = P1, 1 = P2)
//! ```

use std::fmt;

mod error;
mod record;
mod state;

pub use error::{GameError, GameResult};
pub use record::{MoveRecord, PieceRecord, StateRecord, SupplyPieceRecord};
pub use state::{GameState, Stack, StateKey, Supply, SupplySlot};

/// Cells per board side.
pub const BOARD_SIDE: u8 = 4;
/// Total number of cells.
pub const CELL_COUNT: usize = 16;
/// Pieces per player in a fresh game.
pub const SUPPLY_SIZE: usize = 12;
/// Pieces of each size per player in a fresh game.
pub const PIECES_PER_SIZE: usize = 3;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Zero-based index (P1 = 0, P2 = 1) for per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Piece size. The discriminant is the size value used by the rules.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Size {
    Tiny = 1,
    Small = 2,
    Medium = 3,
    Large = 4,
}

impl Size {
    /// All sizes, smallest first.
    pub const ALL: [Size; 4] = [Size::Tiny, Size::Small, Size::Medium, Size::Large];

    /// Check if this size can gobble (cover) another size.
    #[inline]
    pub fn can_gobble(self, other: Size) -> bool {
        (self as u8) > (other as u8)
    }

    /// Numeric size (1-4).
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Layer index (0-3) inside a stack.
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Convert from a numeric size (1-4).
    #[inline]
    pub fn from_value(value: u8) -> Option<Size> {
        match value {
            1 => Some(Size::Tiny),
            2 => Some(Size::Small),
            3 => Some(Size::Medium),
            4 => Some(Size::Large),
            _ => None,
        }
    }

    /// Get all sizes as an iterator.
    pub fn all() -> impl Iterator<Item = Size> {
        Self::ALL.into_iter()
    }
}

/// Position on the 4x4 board (0-15).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row and column (0-3 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < BOARD_SIDE && col < BOARD_SIDE);
        Pos(row * BOARD_SIDE + col)
    }

    /// Checked variant of [`Pos::from_row_col`] for untrusted input.
    #[inline]
    pub fn try_from_row_col(row: u8, col: u8) -> Option<Pos> {
        (row < BOARD_SIDE && col < BOARD_SIDE).then(|| Pos::from_row_col(row, col))
    }

    /// Get the row (0-3).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / BOARD_SIDE
    }

    /// Get the column (0-3).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % BOARD_SIDE
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a valid position (0-15).
    #[inline]
    pub fn is_valid(self) -> bool {
        (self.0 as usize) < CELL_COUNT
    }

    /// Iterate over all 16 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..CELL_COUNT as u8).map(Pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// The 10 lines: 4 rows, 4 columns, main diagonal, anti-diagonal.
///
/// Order matters for [`GameState::winner`]: rows, then columns, then diagonals.
pub const LINES: [[Pos; 4]; 10] = [
    [Pos(0), Pos(1), Pos(2), Pos(3)],     // Row 0
    [Pos(4), Pos(5), Pos(6), Pos(7)],     // Row 1
    [Pos(8), Pos(9), Pos(10), Pos(11)],   // Row 2
    [Pos(12), Pos(13), Pos(14), Pos(15)], // Row 3
    [Pos(0), Pos(4), Pos(8), Pos(12)],    // Col 0
    [Pos(1), Pos(5), Pos(9), Pos(13)],    // Col 1
    [Pos(2), Pos(6), Pos(10), Pos(14)],   // Col 2
    [Pos(3), Pos(7), Pos(11), Pos(15)],   // Col 3
    [Pos(0), Pos(5), Pos(10), Pos(15)],   // Main diagonal
    [Pos(3), Pos(6), Pos(9), Pos(12)],    // Anti-diagonal
];

/// A physical piece. `id` identifies it inside its owner's supply for the
/// whole game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Piece {
    pub owner: Player,
    pub size: Size,
    pub id: u8,
}

impl Piece {
    #[inline]
    pub fn new(owner: Player, size: Size, id: u8) -> Piece {
        Piece { owner, size, id }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}-{}[{}]", self.owner, self.id, self.size.value())
    }
}

/// A move in the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Move {
    /// Place an unused piece from the mover's supply onto the board.
    Supply { piece: Piece, to: Pos },
    /// Pick up the mover's own top piece and put it on another cell.
    Relocate { piece: Piece, from: Pos, to: Pos },
}

impl Move {
    /// Get the destination position of the move.
    #[inline]
    pub fn to(&self) -> Pos {
        match self {
            Move::Supply { to, .. } => *to,
            Move::Relocate { to, .. } => *to,
        }
    }

    /// Get the piece being moved.
    #[inline]
    pub fn piece(&self) -> Piece {
        match self {
            Move::Supply { piece, .. } => *piece,
            Move::Relocate { piece, .. } => *piece,
        }
    }

    /// Source cell for relocations, None for supply placements.
    #[inline]
    pub fn from_pos(&self) -> Option<Pos> {
        match self {
            Move::Supply { .. } => None,
            Move::Relocate { from, .. } => Some(*from),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Supply { piece, to } => write!(f, "Supply({} -> {})", piece, to),
            Move::Relocate { piece, from, to } => {
                write!(f, "Relocate({} {} -> {})", piece, from, to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
    }

    #[test]
    fn test_player_from_bits() {
        assert_eq!(Player::from_bits(1), Some(Player::One));
        assert_eq!(Player::from_bits(2), Some(Player::Two));
        assert_eq!(Player::from_bits(0), None);
        assert_eq!(Player::from_bits(3), None);
    }

    #[test]
    fn test_size_can_gobble() {
        for small in Size::all() {
            for big in Size::all() {
                assert_eq!(
                    big.can_gobble(small),
                    big.value() > small.value(),
                    "{:?} over {:?}",
                    big,
                    small
                );
            }
        }
        assert!(Size::Large.can_gobble(Size::Medium));
        assert!(!Size::Tiny.can_gobble(Size::Tiny));
    }

    #[test]
    fn test_size_from_value() {
        for size in Size::all() {
            assert_eq!(Size::from_value(size.value()), Some(size));
        }
        assert_eq!(Size::from_value(0), None);
        assert_eq!(Size::from_value(5), None);
    }

    #[test]
    fn test_pos_from_row_col() {
        assert_eq!(Pos::from_row_col(0, 0), Pos(0));
        assert_eq!(Pos::from_row_col(0, 3), Pos(3));
        assert_eq!(Pos::from_row_col(1, 2), Pos(6));
        assert_eq!(Pos::from_row_col(3, 3), Pos(15));
        assert_eq!(Pos::try_from_row_col(4, 0), None);
        assert_eq!(Pos::try_from_row_col(0, 4), None);
    }

    #[test]
    fn test_pos_row_col() {
        for pos in Pos::all() {
            assert!(pos.is_valid());
            assert_eq!(Pos::from_row_col(pos.row(), pos.col()), pos);
        }
        assert!(!Pos(16).is_valid());
    }

    #[test]
    fn test_lines_cover_each_cell() {
        // Every cell sits on its row and column; diagonal cells on one more.
        for pos in Pos::all() {
            let count = LINES.iter().filter(|line| line.contains(&pos)).count();
            let on_diagonal = pos.row() == pos.col() || pos.row() + pos.col() == 3;
            assert_eq!(count, if on_diagonal { 3 } else { 2 }, "cell {}", pos);
        }
    }

    #[test]
    fn test_move_accessors() {
        let piece = Piece::new(Player::One, Size::Medium, 7);
        let place = Move::Supply { piece, to: Pos(5) };
        assert_eq!(place.to(), Pos(5));
        assert_eq!(place.from_pos(), None);
        assert_eq!(place.piece(), piece);

        let slide = Move::Relocate {
            piece,
            from: Pos(1),
            to: Pos(9),
        };
        assert_eq!(slide.to(), Pos(9));
        assert_eq!(slide.from_pos(), Some(Pos(1)));
    }

    #[test]
    fn test_move_display() {
        let piece = Piece::new(Player::Two, Size::Large, 12);
        let mov = Move::Supply {
            piece,
            to: Pos::from_row_col(1, 2),
        };
        assert_eq!(mov.to_string(), "Supply(P2-12[4] -> (1, 2))");
    }
}
