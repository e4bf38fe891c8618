/// Evenly spaced interior points of an `n_cols` x `n_rows` grid, row-major
/// top to bottom, in normalized window coordinates. The grid divides each
/// axis into n+1 gaps so buttons keep the same spacing from each other and
/// from the window edges.
pub fn grid_positions(n_cols: usize, n_rows: usize) -> Vec<(f32, f32)> {
    let mut positions = Vec::with_capacity(n_cols * n_rows);
    for row in 0..n_rows {
        let y = (row + 1) as f32 / (n_rows + 1) as f32;
        for col in 0..n_cols {
            let x = (col + 1) as f32 / (n_cols + 1) as f32;
            positions.push((x, y));
        }
    }
    positions
}

/// Positions for `n_buttons` laid out on the grid. When the count is odd
/// the final button is recentered horizontally on its own row.
pub fn button_layout(n_buttons: usize, n_cols: usize, n_rows: usize) -> Option<Vec<(f32, f32)>> {
    let grid = grid_positions(n_cols, n_rows);
    if n_buttons == 0 || grid.len() < n_buttons {
        return None;
    }
    let mut positions = grid[..n_buttons].to_vec();
    if n_buttons % 2 == 1 {
        let last_y = positions[n_buttons - 1].1;
        positions[n_buttons - 1] = (0.5, last_y);
    }
    Some(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_at_least_as_many_positions_as_buttons() {
        for (cols, rows, n) in [(2, 4, 7), (2, 3, 6), (2, 1, 2)] {
            assert!(grid_positions(cols, rows).len() >= n);
        }
    }

    #[test]
    fn positions_are_interior_and_evenly_spaced() {
        let positions = grid_positions(2, 3);
        assert_eq!(positions.len(), 6);
        // columns at 1/3 and 2/3, rows at 1/4, 2/4, 3/4
        assert_eq!(positions[0], (1.0 / 3.0, 0.25));
        assert_eq!(positions[1], (2.0 / 3.0, 0.25));
        assert_eq!(positions[5], (2.0 / 3.0, 0.75));
        for (x, y) in positions {
            assert!(x > 0.0 && x < 1.0);
            assert!(y > 0.0 && y < 1.0);
        }
    }

    #[test]
    fn odd_count_recenters_the_last_button() {
        let positions = button_layout(7, 2, 4).unwrap();
        assert_eq!(positions.len(), 7);
        let (x, y) = positions[6];
        assert_eq!(x, 0.5);
        // the seventh button sits on the fourth row
        assert_eq!(y, 4.0 / 5.0);
    }

    #[test]
    fn even_count_keeps_grid_positions() {
        let positions = button_layout(6, 2, 3).unwrap();
        assert_eq!(positions, grid_positions(2, 3));
    }

    #[test]
    fn too_small_grid_is_rejected() {
        assert!(button_layout(7, 2, 3).is_none());
        assert!(button_layout(0, 2, 3).is_none());
    }
}
