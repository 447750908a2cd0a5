//! Game state: board of stacks, both supplies and the side to move.

use crate::error::{GameError, GameResult};
use crate::{Move, Piece, Player, Pos, Size, CELL_COUNT, LINES, PIECES_PER_SIZE, SUPPLY_SIZE};

/// One board cell. Layers are indexed by size, see the crate docs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Stack {
    layers: [Option<Piece>; 4],
}

impl Stack {
    /// Bits per cell in the state key (4 layers × 2 owner bits).
    const KEY_BITS: u32 = 8;

    #[inline]
    pub const fn new() -> Stack {
        Stack { layers: [None; 4] }
    }

    /// Get the top (visible) piece, or None if the cell is empty.
    #[inline]
    pub fn top(&self) -> Option<Piece> {
        self.layers.iter().rev().find_map(|layer| *layer)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.layers.iter().flatten().count()
    }

    /// Pieces from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = Piece> + '_ {
        self.layers.iter().flatten().copied()
    }

    /// Check if a piece of the given size may be pushed here.
    /// A piece can be placed if the cell is empty or the top piece is smaller.
    #[inline]
    pub fn accepts(&self, size: Size) -> bool {
        match self.top() {
            None => true,
            Some(top) => size.can_gobble(top.size),
        }
    }

    /// Push a piece on top.
    /// Does NOT validate - caller must check [`Stack::accepts`] first.
    #[inline]
    pub fn push(&mut self, piece: Piece) {
        debug_assert!(self.accepts(piece.size));
        self.layers[piece.size.index()] = Some(piece);
    }

    /// Remove and return the top piece.
    pub fn pop(&mut self) -> Option<Piece> {
        let layer = self.layers.iter_mut().rev().find(|layer| layer.is_some())?;
        layer.take()
    }

    fn key_bits(&self) -> u128 {
        self.layers
            .iter()
            .enumerate()
            .fold(0u128, |bits, (layer, piece)| match piece {
                Some(piece) => bits | ((piece.owner as u128) << (layer * 2)),
                None => bits,
            })
    }
}

/// A supply entry: the piece and whether it has left the supply.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SupplySlot {
    pub piece: Piece,
    pub used: bool,
}

/// A player's reserve, in fixed slot order. Used pieces keep their slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Supply {
    slots: [Option<SupplySlot>; SUPPLY_SIZE],
}

impl Supply {
    /// Bits per slot in the state key.
    const KEY_BITS: u32 = 4;

    /// An empty supply (no pieces at all).
    pub fn empty() -> Supply {
        Supply::default()
    }

    /// The full starting supply: three pieces of each size, ids 1-12,
    /// smallest first.
    pub fn full(owner: Player) -> Supply {
        let mut supply = Supply::empty();
        for (idx, slot) in supply.slots.iter_mut().enumerate() {
            let size = Size::ALL[idx / PIECES_PER_SIZE];
            *slot = Some(SupplySlot {
                piece: Piece::new(owner, size, idx as u8 + 1),
                used: false,
            });
        }
        supply
    }

    /// Append a slot, rejecting duplicates and overflow.
    pub fn push(&mut self, slot: SupplySlot) -> GameResult<()> {
        let owner = slot.piece.owner;
        if self.find(slot.piece.id).is_some() {
            return Err(GameError::DuplicatePiece {
                owner,
                id: slot.piece.id,
            });
        }
        let free = self
            .slots
            .iter_mut()
            .find(|s| s.is_none())
            .ok_or(GameError::SupplyOverflow {
                owner,
                max: SUPPLY_SIZE,
            })?;
        *free = Some(slot);
        Ok(())
    }

    /// Iterate over all slots in order.
    pub fn iter(&self) -> impl Iterator<Item = &SupplySlot> + '_ {
        self.slots.iter().flatten()
    }

    /// Pieces still waiting in the supply, in slot order.
    pub fn unused(&self) -> impl Iterator<Item = Piece> + '_ {
        self.iter().filter(|slot| !slot.used).map(|slot| slot.piece)
    }

    /// First unused piece of the given size, if any.
    pub fn first_unused(&self, size: Size) -> Option<Piece> {
        self.unused().find(|piece| piece.size == size)
    }

    /// Look up a piece by id.
    pub fn find(&self, id: u8) -> Option<&SupplySlot> {
        self.iter().find(|slot| slot.piece.id == id)
    }

    fn find_mut(&mut self, id: u8) -> Option<&mut SupplySlot> {
        self.slots.iter_mut().flatten().find(|slot| slot.piece.id == id)
    }

    fn key_bits(&self) -> u128 {
        self.slots
            .iter()
            .enumerate()
            .fold(0u128, |bits, (idx, slot)| {
                let code = match slot {
                    None => 0,
                    Some(slot) => 1 + slot.piece.size.index() as u128 * 2 + slot.used as u128,
                };
                bits | (code << (idx as u32 * Self::KEY_BITS))
            })
    }
}

/// Exact packed encoding of a state, used as the transposition key.
///
/// See the crate docs for the bit layout. Two states with equal keys are
/// game-equivalent; piece ids on the board are not part of the key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct StateKey {
    pub cells: u128,
    pub supplies: u128,
}

/// Complete game state. A small `Copy` value: transitions return a new
/// state and never touch the original.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GameState {
    cells: [Stack; CELL_COUNT],
    supplies: [Supply; 2],
    current: Player,
}

impl GameState {
    /// Bit position of the side-to-move flag in [`StateKey::supplies`].
    const PLAYER_BIT: u32 = 96;

    /// Create the starting position: empty board, full supplies, Player One
    /// to move.
    pub fn new() -> GameState {
        GameState {
            cells: [Stack::new(); CELL_COUNT],
            supplies: [Supply::full(Player::One), Supply::full(Player::Two)],
            current: Player::One,
        }
    }

    /// Assemble a state from parts, checking piece conservation: every board
    /// piece is a used piece of its owner's supply with the same size, and
    /// every used supply piece is on the board exactly once.
    pub fn from_parts(
        cells: [Stack; CELL_COUNT],
        supply1: Supply,
        supply2: Supply,
        current: Player,
    ) -> GameResult<GameState> {
        let supplies = [supply1, supply2];
        for (supply, owner) in supplies.iter().zip([Player::One, Player::Two]) {
            if let Some(slot) = supply.iter().find(|slot| slot.piece.owner != owner) {
                return Err(GameError::ForeignSupplyPiece {
                    owner,
                    id: slot.piece.id,
                    tagged: slot.piece.owner,
                });
            }
        }

        // Occurrence count per (owner, slot).
        let mut seen = [[0u8; SUPPLY_SIZE]; 2];
        for piece in cells.iter().flat_map(Stack::iter) {
            let (owner, id) = (piece.owner, piece.id);
            let supply = &supplies[owner.index()];
            let (idx, slot) = supply
                .iter()
                .enumerate()
                .find(|(_, slot)| slot.piece.id == id)
                .ok_or(GameError::UnknownPiece { owner, id })?;
            if slot.piece.size != piece.size {
                return Err(GameError::SizeMismatch {
                    owner,
                    id,
                    claimed: piece.size.value(),
                    actual: slot.piece.size.value(),
                });
            }
            if !slot.used {
                return Err(GameError::UnusedPieceOnBoard { owner, id });
            }
            seen[owner.index()][idx] += 1;
            if seen[owner.index()][idx] > 1 {
                return Err(GameError::DuplicatePiece { owner, id });
            }
        }

        for (supply, counts) in supplies.iter().zip(seen.iter()) {
            for (slot, &count) in supply.iter().zip(counts.iter()) {
                if slot.used && count == 0 {
                    return Err(GameError::MissingPiece {
                        owner: slot.piece.owner,
                        id: slot.piece.id,
                    });
                }
            }
        }

        Ok(GameState {
            cells,
            supplies,
            current,
        })
    }

    /// Get the current player.
    #[inline]
    pub fn current_player(&self) -> Player {
        self.current
    }

    /// The same position with a different side to move.
    #[inline]
    pub fn with_current_player(&self, player: Player) -> GameState {
        GameState {
            current: player,
            ..*self
        }
    }

    #[inline]
    pub fn stack(&self, pos: Pos) -> &Stack {
        &self.cells[pos.index()]
    }

    /// Get the top (visible) piece at a position.
    #[inline]
    pub fn top(&self, pos: Pos) -> Option<Piece> {
        self.cells[pos.index()].top()
    }

    #[inline]
    pub fn supply(&self, player: Player) -> &Supply {
        &self.supplies[player.index()]
    }

    /// True if no cell holds a piece.
    pub fn is_board_empty(&self) -> bool {
        self.cells.iter().all(Stack::is_empty)
    }

    /// All pieces on the board with their cell, bottom to top per cell.
    pub fn board_pieces(&self) -> impl Iterator<Item = (Pos, Piece)> + '_ {
        Pos::all().flat_map(move |pos| self.stack(pos).iter().map(move |piece| (pos, piece)))
    }

    // ========== Rules ==========

    /// Check if `piece` may land on `to`: the cell is empty or its top piece
    /// is strictly smaller.
    #[inline]
    pub fn legal_destination(&self, piece: Piece, to: Pos) -> bool {
        self.cells
            .get(to.index())
            .is_some_and(|stack| stack.accepts(piece.size))
    }

    /// Owner of the visible piece on each cell.
    pub fn top_owners(&self) -> [Option<Player>; CELL_COUNT] {
        let mut owners = [None; CELL_COUNT];
        for (owner, stack) in owners.iter_mut().zip(self.cells.iter()) {
            *owner = stack.top().map(|piece| piece.owner);
        }
        owners
    }

    /// First complete line (rows, then columns, then diagonals) and its owner.
    pub fn winning_line(&self) -> Option<(Player, [Pos; 4])> {
        let owners = self.top_owners();
        LINES.iter().find_map(|line| {
            let first = owners[line[0].index()]?;
            line.iter()
                .all(|pos| owners[pos.index()] == Some(first))
                .then_some((first, *line))
        })
    }

    /// Check if a player shows four visible pieces in a line.
    /// Returns the winning player, or None if the game is ongoing.
    pub fn winner(&self) -> Option<Player> {
        self.winning_line().map(|(player, _)| player)
    }

    /// True if someone has won or the side to move has no legal move.
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.count_moves() == 0
    }

    // ========== Move Generation ==========

    /// Visit every legal move for the current player: supply placements in
    /// slot order, then relocations by source cell.
    fn for_each_move(&self, mut visit: impl FnMut(Move)) {
        let player = self.current;

        for piece in self.supply(player).unused() {
            for to in Pos::all() {
                if self.legal_destination(piece, to) {
                    visit(Move::Supply { piece, to });
                }
            }
        }

        for from in Pos::all() {
            let Some(piece) = self.top(from) else { continue };
            if piece.owner != player {
                continue;
            }
            for to in Pos::all() {
                if from != to && self.legal_destination(piece, to) {
                    visit(Move::Relocate { piece, from, to });
                }
            }
        }
    }

    /// Generate all legal moves for the current player.
    pub fn generate_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.for_each_move(|mov| moves.push(mov));
        moves
    }

    /// Number of legal moves, without collecting them.
    pub fn count_moves(&self) -> usize {
        let mut count = 0;
        self.for_each_move(|_| count += 1);
        count
    }

    // ========== Transition ==========

    /// Apply a move, returning the resulting state.
    ///
    /// The move is checked against this exact state; a move generated from a
    /// different state is rejected instead of corrupting the result.
    pub fn apply(&self, mov: Move) -> GameResult<GameState> {
        for pos in mov.from_pos().into_iter().chain([mov.to()]) {
            if !pos.is_valid() {
                return Err(GameError::OffBoard {
                    row: pos.row() as usize,
                    col: pos.col() as usize,
                });
            }
        }

        let player = self.current;
        let piece = mov.piece();
        if piece.owner != player {
            return Err(GameError::NotSideToMove {
                id: piece.id,
                owner: piece.owner,
                to_move: player,
            });
        }

        let mut next = *self;
        match mov {
            Move::Supply { piece, to } => {
                let slot = next.supplies[player.index()]
                    .find_mut(piece.id)
                    .ok_or(GameError::PieceNotInSupply {
                        owner: player,
                        id: piece.id,
                    })?;
                if slot.used {
                    return Err(GameError::PieceAlreadyUsed {
                        owner: player,
                        id: piece.id,
                    });
                }
                if slot.piece.size != piece.size {
                    return Err(GameError::SizeMismatch {
                        owner: player,
                        id: piece.id,
                        claimed: piece.size.value(),
                        actual: slot.piece.size.value(),
                    });
                }
                if !self.legal_destination(piece, to) {
                    return Err(GameError::IllegalDestination {
                        size: piece.size.value(),
                        to,
                    });
                }
                slot.used = true;
                next.cells[to.index()].push(piece);
            }
            Move::Relocate { piece, from, to } => {
                if from == to {
                    return Err(GameError::SameCell(from));
                }
                if self.top(from) != Some(piece) {
                    return Err(GameError::NotTopPiece { id: piece.id, from });
                }
                if !self.legal_destination(piece, to) {
                    return Err(GameError::IllegalDestination {
                        size: piece.size.value(),
                        to,
                    });
                }
                next.cells[from.index()].pop();
                next.cells[to.index()].push(piece);
            }
        }

        next.current = player.opponent();
        Ok(next)
    }

    // ========== Transposition Key ==========

    /// Exact key: every stack bottom-to-top, every supply slot's size and
    /// used flag, and the side to move.
    pub fn canonical_key(&self) -> StateKey {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .fold(0u128, |bits, (idx, stack)| {
                bits | (stack.key_bits() << (idx as u32 * Stack::KEY_BITS))
            });

        let slot_bits = SUPPLY_SIZE as u32 * Supply::KEY_BITS;
        let supplies = self.supplies[0].key_bits()
            | (self.supplies[1].key_bits() << slot_bits)
            | ((self.current.index() as u128) << Self::PLAYER_BIT);

        StateKey { cells, supplies }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
