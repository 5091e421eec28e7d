//! Test data generators for creating synthetic satellite-like data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid of packed 16-bit counts with fill values on the diagonal.
///
/// Non-fill cells hold `row * width + col`; cells where `row == col`
/// hold `fill`.
pub fn create_packed_grid(width: usize, height: usize, fill: i16) -> Vec<i16> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            if row == col {
                data.push(fill);
            } else {
                data.push((row * width + col) as i16);
            }
        }
    }
    data
}

/// Evenly spaced coordinate values from `start` with step `step`.
pub fn create_axis(len: usize, start: f32, step: f32) -> Vec<f32> {
    (0..len).map(|i| start + step * i as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_grid_fill_on_diagonal() {
        let grid = create_packed_grid(3, 2, -999);
        assert_eq!(grid, vec![-999, 1, 2, 3, -999, 5]);
    }

    #[test]
    fn test_axis() {
        assert_eq!(create_axis(3, -1.0, 0.5), vec![-1.0, -0.5, 0.0]);
    }
}
