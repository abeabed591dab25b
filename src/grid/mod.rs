//! Binary flip-dot grid state and per-tick transitions.

mod threshold;

pub use threshold::{adjusted_luma, ThresholdEngine};

/// Position of a cell; row 0 is the top of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: usize,
    pub col: usize,
}

impl CellKey {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Fixed-size boolean field stored flat as `row * cols + col`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// All-off grid
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn key(&self, index: usize) -> CellKey {
        CellKey::new(index / self.cols, index % self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, on: bool) {
        let index = self.index(row, col);
        self.cells[index] = on;
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    /// Number of lit cells
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&on| on).count()
    }

    /// Cells whose state differs from `previous`, split by direction
    pub fn diff(&self, previous: &Grid) -> Transitions {
        debug_assert_eq!(self.cells.len(), previous.cells.len());
        let mut transitions = Transitions::default();
        for (index, (&now, &before)) in self.cells.iter().zip(&previous.cells).enumerate() {
            match (before, now) {
                (false, true) => transitions.activated.push(self.key(index)),
                (true, false) => transitions.deactivated.push(self.key(index)),
                _ => {}
            }
        }
        transitions
    }
}

/// Cells that flipped during one tick, in index order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
    /// false -> true
    pub activated: Vec<CellKey>,
    /// true -> false
    pub deactivated: Vec<CellKey>,
}

impl Transitions {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.activated.len() + self.deactivated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_layout() {
        let grid = Grid::new(5, 3);
        assert_eq!(grid.len(), 15);
        assert_eq!(grid.index(2, 1), 11);
        assert_eq!(grid.key(11), CellKey::new(2, 1));
    }

    #[test]
    fn test_diff_classifies_transitions() {
        let mut previous = Grid::new(3, 2);
        previous.set(0, 0, true);
        previous.set(1, 2, true);

        let mut current = Grid::new(3, 2);
        current.set(0, 0, true); // unchanged on
        current.set(0, 1, true); // activated

        let transitions = current.diff(&previous);
        assert_eq!(transitions.activated, vec![CellKey::new(0, 1)]);
        assert_eq!(transitions.deactivated, vec![CellKey::new(1, 2)]);
        assert_eq!(transitions.len(), 2);
    }

    #[test]
    fn test_diff_of_identical_grids_is_empty() {
        let mut grid = Grid::new(4, 4);
        grid.set(3, 3, true);
        assert!(grid.diff(&grid.clone()).is_empty());
    }
}
