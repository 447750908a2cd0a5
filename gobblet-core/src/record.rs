//! Plain serde records for exchanging states and moves with the outside
//! world (CLI, browser worker, storage). Coordinates are `[row, col]`.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::state::{GameState, Stack, Supply, SupplySlot};
use crate::{Move, Piece, Player, Pos, Size, BOARD_SIDE, CELL_COUNT};

/// A piece as it appears on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub player: u8,
    pub size: u8, // 1-4
    pub id: u8,
}

/// A supply entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPieceRecord {
    pub player: u8,
    pub size: u8,
    pub id: u8,
    #[serde(default)]
    pub used: bool,
}

/// Full position: 4×4 grid of stacks (bottom to top), both supplies and the
/// side to move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub board: Vec<Vec<Vec<PieceRecord>>>,
    pub supply1: Vec<SupplyPieceRecord>,
    pub supply2: Vec<SupplyPieceRecord>,
    pub current_player: u8,
}

/// A move, tagged by `"type"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveRecord {
    Supply { piece: PieceRecord, to: [u8; 2] },
    Relocate {
        piece: PieceRecord,
        from: [u8; 2],
        to: [u8; 2],
    },
}

fn player_from(bits: u8) -> GameResult<Player> {
    Player::from_bits(bits).ok_or(GameError::InvalidPlayer(bits))
}

fn size_from(value: u8) -> GameResult<Size> {
    Size::from_value(value).ok_or(GameError::InvalidSize(value))
}

fn pos_from(coords: [u8; 2]) -> GameResult<Pos> {
    let [row, col] = coords;
    Pos::try_from_row_col(row, col).ok_or(GameError::OffBoard {
        row: row as usize,
        col: col as usize,
    })
}

fn coords(pos: Pos) -> [u8; 2] {
    [pos.row(), pos.col()]
}

impl TryFrom<PieceRecord> for Piece {
    type Error = GameError;

    fn try_from(record: PieceRecord) -> GameResult<Piece> {
        Ok(Piece::new(player_from(record.player)?, size_from(record.size)?, record.id))
    }
}

impl From<Piece> for PieceRecord {
    fn from(piece: Piece) -> Self {
        PieceRecord {
            player: piece.owner as u8,
            size: piece.size.value(),
            id: piece.id,
        }
    }
}

impl From<Move> for MoveRecord {
    fn from(mov: Move) -> Self {
        match mov {
            Move::Supply { piece, to } => MoveRecord::Supply {
                piece: piece.into(),
                to: coords(to),
            },
            Move::Relocate { piece, from, to } => MoveRecord::Relocate {
                piece: piece.into(),
                from: coords(from),
                to: coords(to),
            },
        }
    }
}

impl TryFrom<MoveRecord> for Move {
    type Error = GameError;

    fn try_from(record: MoveRecord) -> GameResult<Move> {
        Ok(match record {
            MoveRecord::Supply { piece, to } => Move::Supply {
                piece: piece.try_into()?,
                to: pos_from(to)?,
            },
            MoveRecord::Relocate { piece, from, to } => Move::Relocate {
                piece: piece.try_into()?,
                from: pos_from(from)?,
                to: pos_from(to)?,
            },
        })
    }
}

fn supply_from(owner: Player, records: &[SupplyPieceRecord]) -> GameResult<Supply> {
    let mut supply = Supply::empty();
    for record in records {
        let piece = Piece::new(player_from(record.player)?, size_from(record.size)?, record.id);
        if piece.owner != owner {
            return Err(GameError::ForeignSupplyPiece {
                owner,
                id: piece.id,
                tagged: piece.owner,
            });
        }
        supply.push(SupplySlot {
            piece,
            used: record.used,
        })?;
    }
    Ok(supply)
}

fn supply_record(supply: &Supply) -> Vec<SupplyPieceRecord> {
    supply
        .iter()
        .map(|slot| SupplyPieceRecord {
            player: slot.piece.owner as u8,
            size: slot.piece.size.value(),
            id: slot.piece.id,
            used: slot.used,
        })
        .collect()
}

impl TryFrom<&StateRecord> for GameState {
    type Error = GameError;

    fn try_from(record: &StateRecord) -> GameResult<GameState> {
        let side = BOARD_SIDE as usize;
        if record.board.len() != side || record.board.iter().any(|cols| cols.len() != side) {
            return Err(GameError::BoardShape);
        }

        let mut cells = [Stack::new(); CELL_COUNT];
        for (row, cols) in record.board.iter().enumerate() {
            for (col, pieces) in cols.iter().enumerate() {
                let pos = Pos::from_row_col(row as u8, col as u8);
                let stack = &mut cells[pos.index()];
                for &piece in pieces {
                    let piece = Piece::try_from(piece)?;
                    if !stack.accepts(piece.size) {
                        return Err(GameError::StackOrder { pos });
                    }
                    stack.push(piece);
                }
            }
        }

        let supply1 = supply_from(Player::One, &record.supply1)?;
        let supply2 = supply_from(Player::Two, &record.supply2)?;
        let current = player_from(record.current_player)?;
        GameState::from_parts(cells, supply1, supply2, current)
    }
}

impl From<&GameState> for StateRecord {
    fn from(state: &GameState) -> Self {
        let side = BOARD_SIDE;
        let board = (0..side)
            .map(|row| {
                (0..side)
                    .map(|col| {
                        state
                            .stack(Pos::from_row_col(row, col))
                            .iter()
                            .map(PieceRecord::from)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        StateRecord {
            board,
            supply1: supply_record(state.supply(Player::One)),
            supply2: supply_record(state.supply(Player::Two)),
            current_player: state.current_player() as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_board() -> Vec<Vec<Vec<PieceRecord>>> {
        vec![vec![vec![]; 4]; 4]
    }

    fn full_supply(player: u8) -> Vec<SupplyPieceRecord> {
        (1..=12)
            .map(|id| SupplyPieceRecord {
                player,
                size: (id - 1) / 3 + 1,
                id,
                used: false,
            })
            .collect()
    }

    #[test]
    fn test_new_game_record() {
        let record = StateRecord::from(&GameState::new());
        assert_eq!(record.board, empty_board());
        assert_eq!(record.supply1, full_supply(1));
        assert_eq!(record.supply2, full_supply(2));
        assert_eq!(record.current_player, 1);
        assert_eq!(GameState::try_from(&record).unwrap(), GameState::new());
    }

    #[test]
    fn test_state_roundtrip_after_moves() {
        let mut state = GameState::new();
        for _ in 0..6 {
            let moves = state.generate_moves();
            // Alternate between biggest placements and relocations when present.
            let mov = moves
                .iter()
                .rev()
                .find(|m| matches!(m, Move::Relocate { .. }))
                .copied()
                .unwrap_or(moves[moves.len() - 1]);
            state = state.apply(mov).unwrap();
        }
        let record = StateRecord::from(&state);
        assert_eq!(GameState::try_from(&record).unwrap(), state);
    }

    #[test]
    fn test_rejects_unordered_stack() {
        let mut record = StateRecord::from(&GameState::new());
        record.supply1[0].used = true; // tiny, id 1
        record.supply1[9].used = true; // large, id 10
        record.board[0][0] = vec![
            PieceRecord {
                player: 1,
                size: 4,
                id: 10,
            },
            PieceRecord {
                player: 1,
                size: 1,
                id: 1,
            },
        ];
        assert_eq!(
            GameState::try_from(&record),
            Err(GameError::StackOrder { pos: Pos(0) })
        );

        record.board[0][0].reverse();
        assert!(GameState::try_from(&record).is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut record = StateRecord::from(&GameState::new());
        record.current_player = 3;
        assert_eq!(GameState::try_from(&record), Err(GameError::InvalidPlayer(3)));

        let mut record = StateRecord::from(&GameState::new());
        record.supply2[0].size = 5;
        assert_eq!(GameState::try_from(&record), Err(GameError::InvalidSize(5)));

        let mut record = StateRecord::from(&GameState::new());
        record.board.pop();
        assert_eq!(GameState::try_from(&record), Err(GameError::BoardShape));

        let mut record = StateRecord::from(&GameState::new());
        record.supply1.push(SupplyPieceRecord {
            player: 1,
            size: 1,
            id: 13,
            used: false,
        });
        assert_eq!(
            GameState::try_from(&record),
            Err(GameError::SupplyOverflow {
                owner: Player::One,
                max: 12,
            })
        );

        let mut record = StateRecord::from(&GameState::new());
        record.supply1[3].player = 2;
        assert!(matches!(
            GameState::try_from(&record),
            Err(GameError::ForeignSupplyPiece { .. })
        ));
    }

    #[test]
    fn test_rejects_conservation_violation() {
        let mut record = StateRecord::from(&GameState::new());
        record.board[2][2] = vec![PieceRecord {
            player: 2,
            size: 3,
            id: 7,
        }];
        assert_eq!(
            GameState::try_from(&record),
            Err(GameError::UnusedPieceOnBoard {
                owner: Player::Two,
                id: 7,
            })
        );
    }

    #[test]
    fn test_move_record_json() {
        let piece = Piece::new(Player::One, Size::Large, 10);
        let mov = Move::Supply {
            piece,
            to: Pos::from_row_col(1, 2),
        };
        let json = serde_json::to_value(MoveRecord::from(mov)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "supply",
                "piece": { "player": 1, "size": 4, "id": 10 },
                "to": [1, 2]
            })
        );

        let slide = Move::Relocate {
            piece,
            from: Pos(0),
            to: Pos(15),
        };
        let json = serde_json::to_string(&MoveRecord::from(slide)).unwrap();
        let back: MoveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(Move::try_from(back).unwrap(), slide);
    }

    #[test]
    fn test_move_record_off_board() {
        let record = MoveRecord::Supply {
            piece: PieceRecord {
                player: 1,
                size: 1,
                id: 1,
            },
            to: [4, 0],
        };
        assert_eq!(Move::try_from(record), Err(GameError::OffBoard { row: 4, col: 0 }));
    }

    #[test]
    fn test_state_record_from_json() {
        let json = r#"{
            "board": [[[{"player": 1, "size": 2, "id": 4}], [], [], []],
                      [[], [], [], []], [[], [], [], []], [[], [], [], []]],
            "supply1": [{"player": 1, "size": 2, "id": 4, "used": true},
                        {"player": 1, "size": 4, "id": 10}],
            "supply2": [{"player": 2, "size": 1, "id": 1}],
            "current_player": 2
        }"#;
        let record: StateRecord = serde_json::from_str(json).unwrap();
        let state = GameState::try_from(&record).unwrap();
        assert_eq!(state.current_player(), Player::Two);
        assert_eq!(state.top(Pos(0)), Some(Piece::new(Player::One, Size::Small, 4)));
        assert_eq!(state.supply(Player::One).iter().count(), 2);
        assert_eq!(state.supply(Player::Two).unused().count(), 1);
    }
}
