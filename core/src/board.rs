use std::collections::BTreeSet;
use std::ops::{Index, IndexMut};

use ndarray::Array2;
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular grid of cells stored as `height × width`, indexed by `(row, col)`.
///
/// Deserialization checks the grid and recomputes the counters from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardRecord")]
pub struct Board {
    grid: Array2<Cell>,
    mine_count: CellCount,
    mines_placed: bool,
    unveiled_count: CellCount,
    flag_count: CellCount,
}

impl Board {
    /// Creates a board without mines. Mines are added once with one of the
    /// placement methods.
    pub fn new(width: Coord, height: Coord) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConfigIssue::EmptyBoard.into());
        }

        let grid = Array2::from_shape_fn((usize::from(height), usize::from(width)), |(row, col)| {
            Cell::new((row as Coord, col as Coord))
        });

        Ok(Self {
            grid,
            mine_count: 0,
            mines_placed: false,
            unveiled_count: 0,
            flag_count: 0,
        })
    }

    pub fn width(&self) -> Coord {
        self.size().1
    }

    pub fn height(&self) -> Coord {
        self.size().0
    }

    /// `(height, width)`, the exclusive upper bound of valid coordinates.
    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.grid.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.height(), self.width())
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn unveiled_count(&self) -> CellCount {
        self.unveiled_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds { coords, size })
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(&self[coords])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter()
    }

    pub fn neighbors_of(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// Counts mined neighbours directly from the grid.
    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        // at most 8 neighbours
        self.neighbors_of(coords)
            .filter(|&pos| self[pos].has_mine)
            .count() as u8
    }

    /// Arms `count` distinct cells chosen uniformly at random, never `excluding`.
    pub fn place_mines<R: Rng + ?Sized>(
        &mut self,
        count: CellCount,
        excluding: Option<Coord2>,
        rng: &mut R,
    ) -> Result<()> {
        let avoid: Vec<Coord2> = excluding.into_iter().collect();
        self.place_mines_avoiding(count, &avoid, rng)
    }

    /// Arms `count` distinct cells chosen uniformly at random outside of `avoid`.
    ///
    /// At least one cell outside of `avoid` has to stay free.
    pub fn place_mines_avoiding<R: Rng + ?Sized>(
        &mut self,
        count: CellCount,
        avoid: &[Coord2],
        rng: &mut R,
    ) -> Result<()> {
        self.check_unplaced()?;
        for &pos in avoid {
            self.validate_coords(pos)?;
        }

        let candidates: Vec<Coord2> = self
            .grid
            .iter()
            .map(Cell::position)
            .filter(|pos| !avoid.contains(pos))
            .collect();
        let available = candidates.len() as CellCount;
        if count >= available {
            return Err(ConfigIssue::TooManyMines {
                mines: count,
                available,
            }
            .into());
        }

        for pick in index::sample(rng, candidates.len(), count.into()) {
            self[candidates[pick]].has_mine = true;
        }
        log::debug!(
            "Placed {} mines on a {:?} board avoiding {:?}",
            count,
            self.size(),
            avoid
        );
        self.finish_placement();
        Ok(())
    }

    /// Arms exactly the given cells. Duplicates collapse into one mine.
    pub fn set_mines(&mut self, mines: &[Coord2]) -> Result<()> {
        self.check_unplaced()?;
        let mines = mines
            .iter()
            .map(|&pos| self.validate_coords(pos))
            .collect::<Result<BTreeSet<_>>>()?;

        let total = self.total_cells();
        if mines.len() >= usize::from(total) {
            return Err(ConfigIssue::TooManyMines {
                mines: mines.len() as CellCount,
                available: total,
            }
            .into());
        }

        for &pos in &mines {
            self[pos].has_mine = true;
        }
        log::debug!("Set {} mines on a {:?} board", mines.len(), self.size());
        self.finish_placement();
        Ok(())
    }

    fn check_unplaced(&self) -> Result<()> {
        if self.mines_placed {
            Err(ConfigIssue::MinesAlreadyPlaced.into())
        } else {
            Ok(())
        }
    }

    fn finish_placement(&mut self) {
        let counts = self.grid.map(|cell| self.count_adjacent_mines(cell.position));
        for (cell, &count) in self.grid.iter_mut().zip(counts.iter()) {
            cell.adjacent_mines = count;
        }
        self.mine_count = self.grid.iter().filter(|cell| cell.has_mine).count() as CellCount;
        self.mines_placed = true;
    }

    /// Unveils a single cell, clearing its flag. Returns whether it was hidden.
    pub(crate) fn unveil(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.grid[coords.to_nd_index()];
        if cell.unveiled {
            return false;
        }

        let had_flag = cell.flagged;
        cell.unveiled = true;
        cell.flagged = false;
        if had_flag {
            self.flag_count -= 1;
        }
        self.unveiled_count += 1;
        true
    }

    /// Flips the flag of a hidden cell. Returns whether anything changed.
    pub(crate) fn toggle_flag(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.grid[coords.to_nd_index()];
        if cell.unveiled {
            return false;
        }

        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flag_count += 1;
        } else {
            self.flag_count -= 1;
        }
        true
    }
}

/// Stored form of a board. Counters are derived, so only the grid is trusted.
#[derive(Deserialize)]
struct BoardRecord {
    grid: Array2<Cell>,
    mines_placed: bool,
}

impl TryFrom<BoardRecord> for Board {
    type Error = GameError;

    fn try_from(record: BoardRecord) -> Result<Self> {
        let BoardRecord { grid, mines_placed } = record;
        let (rows, cols) = grid.dim();
        if rows == 0 || cols == 0 {
            return Err(ConfigIssue::EmptyBoard.into());
        }
        let max = usize::from(Coord::MAX);
        if rows > max || cols > max {
            return Err(ConfigIssue::InconsistentBoard { at: (Coord::MAX, Coord::MAX) }.into());
        }

        let mut board = Self {
            grid,
            mine_count: 0,
            mines_placed,
            unveiled_count: 0,
            flag_count: 0,
        };
        for ((row, col), cell) in board.grid.indexed_iter() {
            let at = (row as Coord, col as Coord);
            let consistent = cell.position == at
                && !(cell.unveiled && cell.flagged)
                && (mines_placed || !cell.has_mine)
                && cell.adjacent_mines == board.count_adjacent_mines(at);
            if !consistent {
                return Err(ConfigIssue::InconsistentBoard { at }.into());
            }
        }

        board.mine_count = board.grid.iter().filter(|cell| cell.has_mine).count() as CellCount;
        board.unveiled_count = board.grid.iter().filter(|cell| cell.unveiled).count() as CellCount;
        board.flag_count = board.grid.iter().filter(|cell| cell.flagged).count() as CellCount;
        Ok(board)
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.grid[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.grid[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn mined(board: &Board) -> Vec<Coord2> {
        board
            .cells()
            .filter(|cell| cell.has_mine())
            .map(Cell::position)
            .collect()
    }

    fn assert_counts_match_neighbors(board: &Board) {
        for cell in board.cells() {
            let (row, col) = cell.position();
            let mut expected = 0;
            for r in row.saturating_sub(1)..=row.saturating_add(1) {
                for c in col.saturating_sub(1)..=col.saturating_add(1) {
                    if (r, c) == (row, col) || r >= board.height() || c >= board.width() {
                        continue;
                    }
                    if board[(r, c)].has_mine() {
                        expected += 1;
                    }
                }
            }
            if !cell.has_mine() {
                assert_eq!(cell.adjacent_mines(), expected, "at {:?}", (row, col));
            }
        }
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(
            Board::new(0, 4).unwrap_err(),
            GameError::InvalidConfiguration(ConfigIssue::EmptyBoard)
        );
        assert!(Board::new(3, 0).is_err());
    }

    #[test]
    fn size_is_height_by_width() {
        let board = Board::new(5, 2).unwrap();
        assert_eq!(board.size(), (2, 5));
        assert_eq!(board.total_cells(), 10);
        assert_eq!(board.cell_at((1, 4)).unwrap().position(), (1, 4));
        assert_eq!(
            board.cell_at((2, 0)).unwrap_err(),
            GameError::OutOfBounds {
                coords: (2, 0),
                size: (2, 5)
            }
        );
    }

    #[test]
    fn places_exact_mine_count() {
        for seed in 0..20 {
            for &(width, height, mines) in &[(9, 9, 10), (30, 16, 99), (4, 3, 11), (1, 2, 0)] {
                let mut board = Board::new(width, height).unwrap();
                let mut rng = SmallRng::seed_from_u64(seed);
                board.place_mines(mines, None, &mut rng).unwrap();
                assert_eq!(mined(&board).len(), usize::from(mines));
                assert_eq!(board.mine_count(), mines);
                assert_counts_match_neighbors(&board);
            }
        }
    }

    #[test]
    fn excluded_cell_never_gets_a_mine() {
        for seed in 0..50 {
            let mut board = Board::new(3, 3).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            board.place_mines(7, Some((1, 1)), &mut rng).unwrap();
            assert!(!board[(1, 1)].has_mine());
            assert_eq!(board.mine_count(), 7);
        }
    }

    #[test]
    fn too_many_mines_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut board = Board::new(3, 3).unwrap();
        assert_eq!(
            board.place_mines(9, None, &mut rng).unwrap_err(),
            GameError::InvalidConfiguration(ConfigIssue::TooManyMines {
                mines: 9,
                available: 9
            })
        );
        assert_eq!(
            board.place_mines(8, Some((0, 0)), &mut rng).unwrap_err(),
            GameError::InvalidConfiguration(ConfigIssue::TooManyMines {
                mines: 8,
                available: 8
            })
        );
        assert!(!board.mines_placed());
        board.place_mines(8, None, &mut rng).unwrap();
    }

    #[test]
    fn placement_happens_once() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut board = Board::new(4, 4).unwrap();
        board.place_mines(3, None, &mut rng).unwrap();
        assert_eq!(
            board.set_mines(&[(0, 0)]).unwrap_err(),
            GameError::InvalidConfiguration(ConfigIssue::MinesAlreadyPlaced)
        );
        assert_eq!(board.mine_count(), 3);
    }

    #[test]
    fn set_mines_validates_before_arming() {
        let mut board = Board::new(3, 3).unwrap();
        assert!(matches!(
            board.set_mines(&[(0, 0), (3, 1)]),
            Err(GameError::OutOfBounds { .. })
        ));
        assert!(mined(&board).is_empty());

        board.set_mines(&[(0, 0), (0, 0), (2, 1)]).unwrap();
        assert_eq!(board.mine_count(), 2);
        assert_eq!(board[(1, 1)].adjacent_mines(), 2);
        assert_eq!(board[(2, 2)].adjacent_mines(), 1);
        assert_eq!(board[(0, 2)].adjacent_mines(), 0);
        assert_counts_match_neighbors(&board);
    }

    #[test]
    fn neighbors_respect_edges() {
        let board = Board::new(4, 3).unwrap();
        assert_eq!(board.neighbors_of((0, 0)).count(), 3);
        assert_eq!(board.neighbors_of((0, 1)).count(), 5);
        assert_eq!(board.neighbors_of((1, 1)).count(), 8);
        assert_eq!(board.neighbors_of((2, 3)).count(), 3);
    }

    fn stored(board: &Board) -> serde_json::Value {
        serde_json::to_value(board).unwrap()
    }

    fn load(value: serde_json::Value) -> serde_json::Result<Board> {
        serde_json::from_value(value)
    }

    fn assert_rejected(value: serde_json::Value) {
        let err = load(value).unwrap_err();
        assert!(err.to_string().contains("contradicts its own cells"), "{err}");
    }

    #[test]
    fn loading_recomputes_counters() {
        let mut board = Board::new(3, 3).unwrap();
        board.set_mines(&[(0, 0)]).unwrap();
        board.unveil((2, 2));

        let mut value = stored(&board);
        value["grid"]["data"][4]["flagged"] = true.into();
        value["unveiled_count"] = 0.into();
        value["flag_count"] = 0.into();
        value["mine_count"] = 7.into();

        let loaded = load(value).unwrap();
        assert_eq!(loaded.flag_count(), 1);
        assert_eq!(loaded.unveiled_count(), 1);
        assert_eq!(loaded.mine_count(), 1);
        assert_eq!(loaded.safe_cell_count(), 8);
    }

    #[test]
    fn loading_rejects_contradicting_cells() {
        let mut board = Board::new(3, 3).unwrap();
        board.set_mines(&[(0, 0)]).unwrap();

        let mut flagged_and_open = stored(&board);
        flagged_and_open["grid"]["data"][4]["flagged"] = true.into();
        flagged_and_open["grid"]["data"][4]["unveiled"] = true.into();
        assert_rejected(flagged_and_open);

        let mut wrong_count = stored(&board);
        wrong_count["grid"]["data"][8]["adjacent_mines"] = 3.into();
        assert_rejected(wrong_count);

        let mut moved = stored(&board);
        moved["grid"]["data"][1]["position"] = serde_json::json!([2, 2]);
        assert_rejected(moved);

        let mut unplaced = stored(&board);
        unplaced["mines_placed"] = false.into();
        assert_rejected(unplaced);

        assert_eq!(load(stored(&board)).unwrap(), board);
    }

    #[test]
    fn flag_and_unveil_bookkeeping() {
        let mut board = Board::new(2, 2).unwrap();
        assert!(board.toggle_flag((0, 0)));
        assert_eq!(board.flag_count(), 1);
        assert!(board.unveil((0, 0)));
        assert!(!board[(0, 0)].has_flag());
        assert_eq!(board.flag_count(), 0);
        assert_eq!(board.unveiled_count(), 1);
        assert!(!board.unveil((0, 0)));
        assert!(!board.toggle_flag((0, 0)));
    }
}
