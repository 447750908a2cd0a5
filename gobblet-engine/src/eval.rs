//! Static evaluation.
//!
//! Scores are from the point of view of the side to move: positive favors
//! `state.current_player()`. A decided game scores exactly `±WIN`; the
//! heuristic terms stay far below that.

use gobblet_core::{GameState, Player, Pos, CELL_COUNT, LINES};

use crate::config::Weights;

/// Score of a won position.
pub const WIN: i32 = 1_000_000;

/// The four corners and the four central cells.
pub const KEY_SQUARES: [Pos; 8] = [
    Pos(0),
    Pos(3),
    Pos(12),
    Pos(15),
    Pos(5),
    Pos(6),
    Pos(9),
    Pos(10),
];

type Owners = [Option<Player>; CELL_COUNT];

/// Evaluate `state` for the side to move.
///
/// Runs the move generator twice for the mobility term, so this is not free.
pub fn evaluate(state: &GameState, weights: &Weights) -> i32 {
    let me = state.current_player();
    let them = me.opponent();

    match state.winner() {
        Some(winner) if winner == me => return WIN,
        Some(_) => return -WIN,
        None => {}
    }

    let owners = state.top_owners();
    let control = top_control(state, me) - top_control(state, them);
    let mobility =
        state.count_moves() as i32 - state.with_current_player(them).count_moves() as i32;
    let lines = line_potential(&owners, me) - line_potential(&owners, them);
    let keys = key_squares(&owners, me) - key_squares(&owners, them);

    weights.control * control
        + weights.mobility * mobility
        + weights.lines * lines
        + weights.key_squares * keys
}

/// Sum of the sizes of `player`'s visible pieces.
fn top_control(state: &GameState, player: Player) -> i32 {
    Pos::all()
        .filter_map(|pos| state.top(pos))
        .filter(|piece| piece.owner == player)
        .map(|piece| piece.size.value() as i32)
        .sum()
}

/// Per line: `2^count` of `player`'s visible pieces, halved when the
/// opponent also shows a piece on that line.
fn line_potential(owners: &Owners, player: Player) -> i32 {
    LINES
        .iter()
        .map(|line| {
            let mine = line.iter().filter(|pos| owners[pos.index()] == Some(player)).count();
            let contested = line
                .iter()
                .any(|pos| owners[pos.index()] == Some(player.opponent()));
            let potential = 1 << mine;
            if contested {
                potential / 2
            } else {
                potential
            }
        })
        .sum()
}

fn key_squares(owners: &Owners, player: Player) -> i32 {
    KEY_SQUARES
        .iter()
        .filter(|pos| owners[pos.index()] == Some(player))
        .count() as i32
}
