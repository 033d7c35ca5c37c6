//! Grid model: the fixed rows x columns plane that shapes are placed on.
//!
//! Continuous pointer coordinates are quantized to multiples of the cell
//! size. Ties round half away from zero, the same rule `f64::round` uses,
//! so a coordinate exactly between two grid lines snaps to the line further
//! from the origin.

use crate::config::ConfigError;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default cell size in world units (matches the visual grid).
pub const DEFAULT_CELL_SIZE: f64 = 25.0;

/// Default number of grid rows.
pub const DEFAULT_ROWS: u32 = 24;

/// Default number of grid columns.
pub const DEFAULT_COLS: u32 = 40;

/// Tolerance used when checking whether a coordinate sits on a grid line.
const QUANTIZE_EPSILON: f64 = 1e-6;

/// A grid cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: i64,
    pub row: i64,
}

impl Cell {
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Immutable description of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    cell_size: f64,
    rows: u32,
    cols: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridSpec {
    /// Create a grid, rejecting non-positive dimensions.
    pub fn new(cell_size: f64, rows: u32, cols: u32) -> Result<Self, ConfigError> {
        let grid = Self { cell_size, rows, cols };
        grid.validate()?;
        Ok(grid)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Width of the plane in world units.
    pub fn width(&self) -> f64 {
        self.cols as f64 * self.cell_size
    }

    /// Height of the plane in world units.
    pub fn height(&self) -> f64 {
        self.rows as f64 * self.cell_size
    }

    /// Round a point to the nearest grid intersection.
    pub fn quantize(&self, point: Point) -> Point {
        Point::new(self.quantize_coord(point.x), self.quantize_coord(point.y))
    }

    fn quantize_coord(&self, value: f64) -> f64 {
        // `+ 0.0` turns -0.0 into 0.0
        (value / self.cell_size).round() * self.cell_size + 0.0
    }

    /// Whether a point already lies on a grid intersection.
    pub fn is_quantized(&self, point: Point) -> bool {
        let on_line = |v: f64| {
            let steps = v / self.cell_size;
            (steps - steps.round()).abs() < QUANTIZE_EPSILON
        };
        on_line(point.x) && on_line(point.y)
    }

    /// Convert a quantized point to its cell coordinate.
    ///
    /// Only meaningful for points produced by [`GridSpec::quantize`]; the
    /// division is rounded to absorb floating point error.
    pub fn to_cell(&self, point: Point) -> Cell {
        Cell::new(
            (point.x / self.cell_size).round() as i64,
            (point.y / self.cell_size).round() as i64,
        )
    }

    /// Top-left corner of a cell in world coordinates.
    pub fn cell_corner(&self, cell: Cell) -> Point {
        Point::new(
            cell.col as f64 * self.cell_size,
            cell.row as f64 * self.cell_size,
        )
    }

    /// Check `0 <= col < cols` and `0 <= row < rows`.
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && cell.col < self.cols as i64
            && cell.row < self.rows as i64
    }

    /// Check that `span` columns starting at `cell` fit inside the grid.
    pub fn span_fits(&self, cell: Cell, span: u32) -> bool {
        self.in_bounds(cell) && cell.col + span as i64 <= self.cols as i64
    }

    /// Whether a raw coordinate lies within `threshold` of a grid line.
    pub fn near_border(&self, coord: f64, threshold: f64) -> bool {
        let offset = coord.rem_euclid(self.cell_size);
        offset < threshold || offset > self.cell_size - threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSpec {
        GridSpec::new(25.0, 20, 25).unwrap()
    }

    #[test]
    fn test_quantize_rounds_to_nearest() {
        let g = grid();
        assert_eq!(g.quantize(Point::new(23.0, 47.0)), Point::new(25.0, 50.0));
        assert_eq!(g.quantize(Point::new(12.0, 37.0)), Point::new(0.0, 25.0));
        assert_eq!(g.quantize(Point::new(50.0, 75.0)), Point::new(50.0, 75.0));
    }

    #[test]
    fn test_quantize_has_no_negative_zero() {
        let g = grid();
        let p = g.quantize(Point::new(-3.0, -12.0));
        assert!(p.x.is_sign_positive() && p.y.is_sign_positive());
        assert_eq!(g.to_cell(p), Cell::new(0, 0));
    }

    #[test]
    fn test_quantize_tie_rounds_away_from_zero() {
        let g = grid();
        assert_eq!(g.quantize(Point::new(12.5, 37.5)), Point::new(25.0, 50.0));
        assert_eq!(g.quantize(Point::new(-12.5, 0.0)), Point::new(-25.0, 0.0));
    }

    #[test]
    fn test_quantize_idempotent() {
        let g = grid();
        let mut x = -40.0;
        while x < 700.0 {
            let p = Point::new(x, x * 0.7 + 3.1);
            let once = g.quantize(p);
            assert_eq!(g.quantize(once), once);
            assert!(g.is_quantized(once));
            x += 3.3;
        }
    }

    #[test]
    fn test_to_cell_of_cell_corner() {
        let g = grid();
        for row in 0..g.rows() as i64 {
            for col in 0..g.cols() as i64 {
                let cell = Cell::new(col, row);
                assert!(g.in_bounds(cell));
                assert_eq!(g.to_cell(g.quantize(g.cell_corner(cell))), cell);
            }
        }
    }

    #[test]
    fn test_in_bounds() {
        let g = grid();
        assert!(g.in_bounds(Cell::new(0, 0)));
        assert!(g.in_bounds(Cell::new(24, 19)));
        assert!(!g.in_bounds(Cell::new(25, 0)));
        assert!(!g.in_bounds(Cell::new(0, 20)));
        assert!(!g.in_bounds(Cell::new(-1, 3)));
    }

    #[test]
    fn test_span_fits() {
        let g = grid();
        assert!(g.span_fits(Cell::new(23, 0), 2));
        assert!(!g.span_fits(Cell::new(24, 0), 2));
        assert!(g.span_fits(Cell::new(21, 0), 4));
        assert!(!g.span_fits(Cell::new(22, 0), 4));
    }

    #[test]
    fn test_near_border() {
        let g = grid();
        assert!(g.near_border(50.0, 5.0));
        assert!(g.near_border(54.0, 5.0));
        assert!(g.near_border(71.0, 5.0));
        assert!(!g.near_border(55.0, 5.0));
        assert!(!g.near_border(62.5, 5.0));
        assert!(g.near_border(-1.0, 5.0));
    }

    #[test]
    fn test_invalid_grid() {
        assert!(matches!(
            GridSpec::new(0.0, 10, 10),
            Err(ConfigError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridSpec::new(25.0, 0, 10),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_extent() {
        let g = grid();
        assert!((g.width() - 625.0).abs() < f64::EPSILON);
        assert!((g.height() - 500.0).abs() < f64::EPSILON);
    }
}
