use super::Cell;

static EMPTY: Cell = Cell::Empty;

/// Rows × columns of raw cells from one results sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self { Self { rows } }

    #[inline] pub fn height(&self) -> usize { self.rows.len() }

    /// Widest row length.
    pub fn width(&self) -> usize { self.rows.iter().map(Vec::len).max().unwrap_or(0) }

    /// Cell at `(row, col)`; anything outside the sheet reads as empty.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    #[inline] pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}
