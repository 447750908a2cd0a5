//! Error types for rule violations and malformed state records.

use thiserror::Error;

use crate::{Player, Pos};

/// Errors raised when a move does not fit the state it is applied to, or
/// when a state record does not describe a reachable-shaped position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("piece {id} belongs to player {owner}, but player {to_move} is to move")]
    NotSideToMove {
        id: u8,
        owner: Player,
        to_move: Player,
    },

    #[error("piece {id} is not in player {owner}'s supply")]
    PieceNotInSupply { owner: Player, id: u8 },

    #[error("piece {id} of player {owner} has already left the supply")]
    PieceAlreadyUsed { owner: Player, id: u8 },

    #[error("piece {id} of player {owner} has size {actual}, not {claimed}")]
    SizeMismatch {
        owner: Player,
        id: u8,
        claimed: u8,
        actual: u8,
    },

    #[error("piece {id} is not the top piece at {from}")]
    NotTopPiece { id: u8, from: Pos },

    #[error("relocation starts and ends on {0}")]
    SameCell(Pos),

    #[error("a size {size} piece cannot be placed on {to}")]
    IllegalDestination { size: u8, to: Pos },

    #[error("invalid player {0} (expected 1 or 2)")]
    InvalidPlayer(u8),

    #[error("invalid piece size {0} (expected 1-4)")]
    InvalidSize(u8),

    #[error("board must be 4 rows of 4 stacks")]
    BoardShape,

    #[error("cell ({row}, {col}) is off the 4x4 board")]
    OffBoard { row: usize, col: usize },

    #[error("stack at {pos} does not strictly increase in size from bottom to top")]
    StackOrder { pos: Pos },

    #[error("supply of player {owner} holds more than {max} pieces")]
    SupplyOverflow { owner: Player, max: usize },

    #[error("piece {id} in player {owner}'s supply is tagged for player {tagged}")]
    ForeignSupplyPiece {
        owner: Player,
        id: u8,
        tagged: Player,
    },

    #[error("piece {id} of player {owner} appears more than once")]
    DuplicatePiece { owner: Player, id: u8 },

    #[error("piece {id} of player {owner} is on the board but not marked used")]
    UnusedPieceOnBoard { owner: Player, id: u8 },

    #[error("piece {id} of player {owner} is marked used but is not on the board")]
    MissingPiece { owner: Player, id: u8 },

    #[error("piece {id} of player {owner} on the board is not in its supply")]
    UnknownPiece { owner: Player, id: u8 },
}

/// Result alias for game operations.
pub type GameResult<T> = Result<T, GameError>;
