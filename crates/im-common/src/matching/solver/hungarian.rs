//! Dense minimum-cost assignment for rectangular matrices.
//!
//! Shortest-augmenting-path formulation with row/column potentials
//! (the Jonker-Volgenant family of the Hungarian method), O(n^2 * m)
//! for n rows and m >= n columns. Rectangular inputs with more rows
//! than columns are solved on the transposed matrix.

/// Solve the assignment problem for `costs[row][col]`.
///
/// Returns the matched column per row, `None` for rows left unmatched
/// (possible only when rows outnumber columns). All rows of the
/// smaller dimension are matched; callers filter out sentinel-cost
/// matches themselves.
pub fn solve(costs: &[Vec<f64>]) -> Vec<Option<usize>> {
    let rows = costs.len();
    if rows == 0 {
        return Vec::new();
    }
    let cols = costs[0].len();
    if cols == 0 {
        return vec![None; rows];
    }

    if rows > cols {
        let transposed: Vec<Vec<f64>> = (0..cols)
            .map(|j| (0..rows).map(|i| costs[i][j]).collect())
            .collect();
        let by_col = solve_wide(&transposed);

        let mut by_row = vec![None; rows];
        for (col, row) in by_col.iter().enumerate() {
            if let Some(row) = row {
                by_row[*row] = Some(col);
            }
        }
        return by_row;
    }

    solve_wide(costs)
}

/// Requires rows <= cols. 1-based internals; index 0 is the virtual
/// root used to seed each augmenting search.
fn solve_wide(costs: &[Vec<f64>]) -> Vec<Option<usize>> {
    let n = costs.len();
    let m = costs[0].len();

    let mut row_potential = vec![0.0f64; n + 1];
    let mut col_potential = vec![0.0f64; m + 1];
    // matched[j] = row currently occupying column j (0 = free).
    let mut matched = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        matched[0] = i;
        let mut j0 = 0usize;
        let mut min_reduced = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        // Dijkstra over reduced costs until a free column is reached.
        loop {
            used[j0] = true;
            let i0 = matched[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = costs[i0 - 1][j - 1] - row_potential[i0] - col_potential[j];
                if reduced < min_reduced[j] {
                    min_reduced[j] = reduced;
                    way[j] = j0;
                }
                if min_reduced[j] < delta {
                    delta = min_reduced[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    row_potential[matched[j]] += delta;
                    col_potential[j] -= delta;
                } else {
                    min_reduced[j] -= delta;
                }
            }

            j0 = j1;
            if matched[j0] == 0 {
                break;
            }
        }

        // Unwind the augmenting path.
        loop {
            let j1 = way[j0];
            matched[j0] = matched[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut by_row = vec![None; n];
    for j in 1..=m {
        if matched[j] != 0 {
            by_row[matched[j] - 1] = Some(j - 1);
        }
    }
    by_row
}
