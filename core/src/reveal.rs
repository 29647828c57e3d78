use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Unveils `start` and cascades through connected zero cells.
///
/// Cells with a count above zero (or a mine) are unveiled when reached but do not
/// spread further. Flags do not stop the cascade; a flagged cell reached this way is
/// unveiled and loses its flag. Returns every position that went from hidden to
/// unveiled, which is empty when `start` was already unveiled.
pub fn flood_reveal(board: &mut Board, start: Coord2) -> Result<BTreeSet<Coord2>> {
    let start = board.validate_coords(start)?;
    let mut changed = BTreeSet::new();

    let mut to_visit = VecDeque::from([start]);
    while let Some(coords) = to_visit.pop_front() {
        // the unveiled bit doubles as the visited set
        if !board.unveil(coords) {
            continue;
        }
        changed.insert(coords);

        if board[coords].is_zero() {
            to_visit.extend(
                board
                    .neighbors_of(coords)
                    .filter(|&pos| board[pos].is_hidden()),
            );
        }
    }

    log::trace!("Unveiled {} cells starting at {:?}", changed.len(), start);
    Ok(changed)
}

/// Hidden, unflagged neighbours to open when chording on `coords`.
///
/// Chording only applies to an unveiled number whose neighbouring flag count
/// equals that number; otherwise nothing is returned.
pub fn chord_targets(board: &Board, coords: Coord2) -> Result<Vec<Coord2>> {
    let cell = board.cell_at(coords)?;
    if cell.is_hidden() || cell.has_mine() {
        return Ok(Vec::new());
    }

    let flags = board
        .neighbors_of(coords)
        .filter(|&pos| board[pos].has_flag())
        .count();
    if flags != usize::from(cell.adjacent_mines()) {
        return Ok(Vec::new());
    }

    Ok(board
        .neighbors_of(coords)
        .filter(|&pos| board[pos].is_hidden() && !board[pos].has_flag())
        .collect())
}
