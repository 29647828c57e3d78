use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Seeded uniform placement that can keep the first revealed cell safe, or make it
/// a zero, but is otherwise purely random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomPlacer {
    seed: u64,
    start_cell: StartCell,
}

impl RandomPlacer {
    pub fn new(seed: u64, start_cell: StartCell) -> Self {
        Self { seed, start_cell }
    }

    /// Downgrades the policy until the board has room for it.
    fn effective_policy(&self, board: &Board, mines: CellCount, start: Coord2) -> StartCell {
        use StartCell::*;

        let total = board.total_cells();
        let zero_zone = 1 + board.neighbors_of(start).count() as CellCount;
        match self.start_cell {
            Random => Random,
            SimpleSafe | AlwaysZero if mines + 1 >= total => {
                log::warn!("Cannot make start cell safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if mines + zero_zone >= total => {
                log::warn!("Cannot make start cell zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        }
    }
}

impl MinePlacer for RandomPlacer {
    fn place(self, board: &mut Board, mines: CellCount, start: Option<Coord2>) -> Result<()> {
        use StartCell::*;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let Some(start) = start.filter(|_| self.start_cell.defers_placement()) else {
            return board.place_mines(mines, None, &mut rng);
        };
        let start = board.validate_coords(start)?;

        match self.effective_policy(board, mines, start) {
            Random => board.place_mines(mines, None, &mut rng),
            SimpleSafe => board.place_mines(mines, Some(start), &mut rng),
            AlwaysZero => {
                let avoid: Vec<Coord2> = core::iter::once(start)
                    .chain(board.neighbors_of(start))
                    .collect();
                board.place_mines_avoiding(mines, &avoid, &mut rng)
            }
        }
    }
}
