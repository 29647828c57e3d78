use serde::{Deserialize, Serialize};

use crate::Coord2;

/// Full state of one board position, including hidden information.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) position: Coord2,
    pub(crate) has_mine: bool,
    pub(crate) adjacent_mines: u8,
    pub(crate) unveiled: bool,
    pub(crate) flagged: bool,
}

impl Cell {
    pub(crate) const fn new(position: Coord2) -> Self {
        Self {
            position,
            has_mine: false,
            adjacent_mines: 0,
            unveiled: false,
            flagged: false,
        }
    }

    pub const fn position(&self) -> Coord2 {
        self.position
    }

    pub const fn has_mine(&self) -> bool {
        self.has_mine
    }

    /// Number of mines among the up-to-8 neighbours.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn is_unveiled(&self) -> bool {
        self.unveiled
    }

    pub const fn is_hidden(&self) -> bool {
        !self.unveiled
    }

    pub const fn has_flag(&self) -> bool {
        self.flagged
    }

    /// Whether unveiling this cell continues a flood fill.
    pub const fn is_zero(&self) -> bool {
        !self.has_mine && self.adjacent_mines == 0
    }
}

/// What a player is allowed to know about a cell.
///
/// Mine and count information is only disclosed for unveiled cells, or for every
/// cell once the game is over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub has_mine: Option<bool>,
    pub unveiled: bool,
    pub has_flag: bool,
    pub adjacent_mines: Option<u8>,
}

impl CellView {
    pub(crate) fn new(cell: &Cell, disclose: bool) -> Self {
        let disclose = disclose || cell.unveiled;
        Self {
            has_mine: disclose.then_some(cell.has_mine),
            unveiled: cell.unveiled,
            has_flag: cell.flagged,
            adjacent_mines: (disclose && !cell.has_mine).then_some(cell.adjacent_mines),
        }
    }

    /// Single character used by the text rendering of a board.
    pub fn symbol(self) -> char {
        match self {
            Self {
                unveiled: true,
                has_mine: Some(true),
                ..
            } => '*',
            Self { has_flag: true, .. } => 'F',
            Self {
                has_mine: Some(true),
                ..
            } => '*',
            Self {
                unveiled: true,
                adjacent_mines: Some(0),
                ..
            } => '.',
            Self {
                unveiled: true,
                adjacent_mines: Some(count),
                ..
            } => char::from_digit(count.into(), 10).unwrap_or('?'),
            _ => '#',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(has_mine: bool, adjacent_mines: u8, unveiled: bool, flagged: bool) -> Cell {
        Cell {
            position: (0, 0),
            has_mine,
            adjacent_mines,
            unveiled,
            flagged,
        }
    }

    #[test]
    fn hidden_cell_keeps_its_secrets() {
        let view = CellView::new(&cell(true, 3, false, false), false);
        assert_eq!(view.has_mine, None);
        assert_eq!(view.adjacent_mines, None);
        assert_eq!(view.symbol(), '#');
    }

    #[test]
    fn game_over_discloses_hidden_mines() {
        let view = CellView::new(&cell(true, 0, false, false), true);
        assert_eq!(view.has_mine, Some(true));
        assert_eq!(view.adjacent_mines, None);
        assert_eq!(view.symbol(), '*');
    }

    #[test]
    fn flag_wins_over_disclosed_mine() {
        let view = CellView::new(&cell(true, 0, false, true), true);
        assert_eq!(view.symbol(), 'F');
    }

    #[test]
    fn unveiled_cells_show_their_count() {
        assert_eq!(CellView::new(&cell(false, 0, true, false), false).symbol(), '.');
        assert_eq!(CellView::new(&cell(false, 7, true, false), false).symbol(), '7');
    }
}
