use rand::Rng;
use serde::Serialize;

use super::state::{Direction, Grid, MAX_TILE, Row, SIZE, WIN_TILE};

/// Result of sliding a grid in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub grid: Grid,
    pub score_delta: u64,
    /// True iff at least one row/column changed.
    pub moved: bool,
    /// True iff some merge in this move produced the win tile.
    pub merged_win: bool,
}

/// Slide/merge tiles in the given direction. No randomness, input untouched.
///
/// Every direction is reduced to "compact toward index 0 of each row" by
/// reflecting and/or transposing the grid, then mapped back.
pub fn transition(grid: Grid, direction: Direction) -> Transition {
    let rows = normalize(grid.0, direction);
    let mut out = [[0u32; SIZE]; SIZE];
    let mut score_delta = 0;
    let mut moved = false;
    let mut merged_win = false;
    for (dst, &row) in out.iter_mut().zip(rows.iter()) {
        let merged = merge_line(row);
        moved |= merged.line != row;
        score_delta += merged.score;
        merged_win |= merged.win;
        *dst = merged.line;
    }
    Transition {
        grid: Grid(denormalize(out, direction)),
        score_delta,
        moved,
        merged_win,
    }
}

fn normalize(rows: [Row; SIZE], direction: Direction) -> [Row; SIZE] {
    match direction {
        Direction::Left => rows,
        Direction::Right => reverse_rows(rows),
        Direction::Up => transpose(rows),
        Direction::Down => reverse_rows(transpose(rows)),
    }
}

fn denormalize(rows: [Row; SIZE], direction: Direction) -> [Row; SIZE] {
    match direction {
        Direction::Left => rows,
        Direction::Right => reverse_rows(rows),
        Direction::Up => transpose(rows),
        Direction::Down => transpose(reverse_rows(rows)),
    }
}

pub(crate) fn transpose(rows: [Row; SIZE]) -> [Row; SIZE] {
    let mut out = [[0u32; SIZE]; SIZE];
    for (r, row) in rows.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[c][r] = v;
        }
    }
    out
}

fn reverse_rows(mut rows: [Row; SIZE]) -> [Row; SIZE] {
    for row in rows.iter_mut() {
        row.reverse();
    }
    rows
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MergedLine {
    pub(crate) line: Row,
    pub(crate) score: u64,
    pub(crate) win: bool,
}

/// Compact one line toward index 0 and merge equal neighbours once.
///
/// A tile produced by a merge is never compared again in the same pass, so
/// `[2, 2, 4, 0]` becomes `[4, 4, 0, 0]`, not `[8, 0, 0, 0]`.
pub(crate) fn merge_line(line: Row) -> MergedLine {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut out = [0u32; SIZE];
    let mut score = 0;
    let mut win = false;
    let mut i = 0;
    let mut j = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && mergeable(tiles[i], tiles[i + 1]) {
            let merged = tiles[i] * 2;
            score += merged as u64;
            win |= merged == WIN_TILE;
            out[j] = merged;
            i += 2;
        } else {
            out[j] = tiles[i];
            i += 1;
        }
        j += 1;
    }
    MergedLine {
        line: out,
        score,
        win,
    }
}

/// Equal non-empty tiles merge unless they are already at [`MAX_TILE`].
#[inline]
fn mergeable(a: u32, b: u32) -> bool {
    a != 0 && a == b && a < MAX_TILE
}

/// True iff the grid is full and no cell can merge with its right or down neighbour.
pub fn is_terminal(grid: &Grid) -> bool {
    let rows = &grid.0;
    if rows.iter().flatten().any(|&v| v == 0) {
        return false;
    }
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = rows[r][c];
            if c + 1 < SIZE && mergeable(v, rows[r][c + 1]) {
                return false;
            }
            if r + 1 < SIZE && mergeable(v, rows[r + 1][c]) {
                return false;
            }
        }
    }
    true
}

/// True if sliding in `direction` would change the grid.
pub fn can_move(grid: &Grid, direction: Direction) -> bool {
    transition(*grid, direction).moved
}

/// Which directions change the grid, in `[Up, Down, Left, Right]` order.
pub fn legal_moves(grid: &Grid) -> [bool; 4] {
    Direction::ALL.map(|d| can_move(grid, d))
}

/// Count the number of zero cells.
pub fn count_empty(grid: &Grid) -> usize {
    grid.0.iter().flatten().filter(|&&v| v == 0).count()
}

pub fn highest_tile(grid: &Grid) -> u32 {
    grid.0.iter().flatten().copied().max().unwrap_or(0)
}

pub fn tile_sum(grid: &Grid) -> u64 {
    grid.0.iter().flatten().map(|&v| v as u64).sum()
}

/// Place a 2 (90%) or 4 (10%) in an empty cell chosen uniformly at random.
///
/// Returns `false` and leaves the grid alone when there is no empty cell.
pub fn spawn_tile<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> bool {
    let empty: Vec<(usize, usize)> = (0..SIZE)
        .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
        .filter(|&(r, c)| grid.0[r][c] == 0)
        .collect();
    if empty.is_empty() {
        return false;
    }
    let (r, c) = empty[rng.gen_range(0..empty.len())];
    grid.0[r][c] = generate_random_tile(rng);
    true
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

pub(crate) fn format_val(val: u32) -> String {
    match val {
        0 => String::from("       "),
        x => {
            let mut x = x.to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn row_grid(row: Row) -> Grid {
        Grid::new([row, [0; 4], [0; 4], [0; 4]])
    }

    fn random_grid(rng: &mut StdRng) -> Grid {
        let values = [0, 0, 2, 4, 8, 16];
        let mut rows = [[0u32; SIZE]; SIZE];
        for cell in rows.iter_mut().flatten() {
            *cell = values[rng.gen_range(0..values.len())];
        }
        Grid::new(rows)
    }

    #[test]
    fn it_merge_line() {
        assert_eq!(merge_line([0, 0, 0, 0]).line, [0, 0, 0, 0]);
        assert_eq!(merge_line([2, 4, 2, 4]).line, [2, 4, 2, 4]);
        assert_eq!(merge_line([2, 2, 4, 4]).line, [4, 8, 0, 0]);
        assert_eq!(merge_line([2, 0, 0, 2]).line, [4, 0, 0, 0]);
        assert_eq!(merge_line([2, 2, 4, 0]).line, [4, 4, 0, 0]);
        assert_eq!(merge_line([4, 2, 2, 0]).line, [4, 4, 0, 0]);
        assert_eq!(merge_line([2, 2, 2, 0]).line, [4, 2, 0, 0]);
        assert_eq!(merge_line([1024, 1024, 0, 0]).score, 2048);
        assert!(merge_line([1024, 1024, 0, 0]).win);
        assert!(!merge_line([2048, 0, 0, 0]).win);
    }

    #[test]
    fn row_all_equal_merges_pairwise() {
        let t = transition(row_grid([2, 2, 2, 2]), Direction::Left);
        assert_eq!(t.grid.rows()[0], [4, 4, 0, 0]);
        assert_eq!(t.score_delta, 8);
        assert!(t.moved);
    }

    #[test]
    fn row_trailing_pair_slides_and_merges() {
        let t = transition(row_grid([0, 0, 2, 2]), Direction::Left);
        assert_eq!(t.grid.rows()[0], [4, 0, 0, 0]);
        assert_eq!(t.score_delta, 4);
        assert!(t.moved);
    }

    #[test]
    fn gapped_equal_tiles_merge_after_compaction() {
        let t = transition(row_grid([2, 0, 0, 2]), Direction::Left);
        assert_eq!(t.grid.rows()[0], [4, 0, 0, 0]);
        assert_eq!(t.score_delta, 4);
        assert!(t.moved);
    }

    #[test]
    fn alternating_row_does_not_move() {
        let g = row_grid([2, 4, 2, 4]);
        let t = transition(g, Direction::Left);
        assert_eq!(t.grid, g);
        assert_eq!(t.score_delta, 0);
        assert!(!t.moved);
    }

    #[test]
    fn empty_grid_never_moves() {
        for d in Direction::ALL {
            let t = transition(Grid::EMPTY, d);
            assert_eq!(t.grid, Grid::EMPTY);
            assert_eq!(t.score_delta, 0);
            assert!(!t.moved);
        }
    }

    #[test]
    fn test_move_left() {
        let g = Grid::new([[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        let t = transition(g, Direction::Left);
        assert_eq!(
            t.grid,
            Grid::new([[2, 4, 8, 16], [2, 16, 4, 0], [8, 0, 0, 0], [2, 4, 0, 0]])
        );
        assert_eq!(t.score_delta, 24);
    }

    #[test]
    fn test_move_right() {
        let g = Grid::new([[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        let t = transition(g, Direction::Right);
        assert_eq!(
            t.grid,
            Grid::new([[2, 4, 8, 16], [0, 2, 16, 4], [0, 0, 0, 8], [0, 0, 2, 4]])
        );
        assert_eq!(t.score_delta, 24);
    }

    #[test]
    fn test_move_up() {
        let g = Grid::new([[2, 2, 4, 2], [4, 8, 0, 0], [8, 8, 0, 0], [16, 4, 4, 4]]);
        let t = transition(g, Direction::Up);
        assert_eq!(
            t.grid,
            Grid::new([[2, 2, 8, 2], [4, 16, 0, 4], [8, 4, 0, 0], [16, 0, 0, 0]])
        );
        assert_eq!(t.score_delta, 24);
    }

    #[test]
    fn test_move_down() {
        let g = Grid::new([[2, 2, 4, 2], [4, 8, 0, 0], [8, 8, 0, 0], [16, 4, 4, 4]]);
        let t = transition(g, Direction::Down);
        assert_eq!(
            t.grid,
            Grid::new([[2, 0, 0, 0], [4, 2, 0, 0], [8, 16, 0, 2], [16, 4, 8, 4]])
        );
        assert_eq!(t.score_delta, 24);
    }

    #[test]
    fn transition_does_not_touch_input() {
        let g = row_grid([2, 2, 0, 0]);
        let snapshot = g;
        let _ = transition(g, Direction::Left);
        assert_eq!(g, snapshot);
    }

    #[test]
    fn merge_to_win_tile_sets_flag() {
        let g = Grid::new([[0; 4], [0; 4], [1024, 0, 0, 0], [1024, 0, 0, 0]]);
        let t = transition(g, Direction::Down);
        assert!(t.merged_win);
        assert_eq!(t.grid.get(3, 0), 2048);
        assert_eq!(t.score_delta, 2048);
        assert!(!transition(t.grid, Direction::Left).merged_win);
    }

    #[test]
    fn non_moving_direction_is_stable() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let g = random_grid(&mut rng);
            for d in Direction::ALL {
                let t = transition(g, d);
                if !t.moved {
                    assert_eq!(t.grid, g);
                    let again = transition(t.grid, d);
                    assert!(!again.moved);
                    assert_eq!(again.grid, g);
                }
                // A second pass only merges tiles the first pass left apart.
                let t2 = transition(t.grid, d);
                if t2.moved {
                    assert!(t2.score_delta > 0);
                }
            }
        }
    }

    #[test]
    fn tile_sum_is_conserved_and_score_counts_merges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let g = random_grid(&mut rng);
            for d in Direction::ALL {
                let t = transition(g, d);
                assert_eq!(t.grid.tile_sum(), g.tile_sum());
                // Each merge removes one tile and scores its new value.
                let tiles_before = 16 - g.count_empty();
                let tiles_after = 16 - t.grid.count_empty();
                if t.score_delta == 0 {
                    assert_eq!(tiles_before, tiles_after);
                } else {
                    assert!(tiles_after < tiles_before);
                }
            }
        }
    }

    #[test]
    fn terminal_requires_full_grid() {
        let g = Grid::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
        assert!(!is_terminal(&g));
        assert!(!is_terminal(&Grid::EMPTY));
    }

    #[test]
    fn terminal_false_with_equal_neighbours() {
        let horizontal = Grid::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 8, 8]]);
        assert!(!is_terminal(&horizontal));
        let vertical = Grid::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 8], [4, 2, 4, 8]]);
        assert!(!is_terminal(&vertical));
    }

    #[test]
    fn checkerboard_is_terminal() {
        let g = Grid::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(is_terminal(&g));
        assert_eq!(legal_moves(&g), [false; 4]);
    }

    #[test]
    fn terminal_matches_legal_moves() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let g = random_grid(&mut rng);
            assert_eq!(is_terminal(&g), !legal_moves(&g).iter().any(|&m| m));
        }
    }

    #[test]
    fn legal_moves_order() {
        let g = row_grid([2, 0, 0, 0]);
        // [Up, Down, Left, Right]
        assert_eq!(legal_moves(&g), [false, true, false, true]);
    }

    #[test]
    fn it_spawn_tile_fills_board() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut g = Grid::EMPTY;
        for n in 1..=16 {
            assert!(spawn_tile(&mut g, &mut rng));
            assert_eq!(count_empty(&g), 16 - n);
        }
        assert!(g.cells().all(|v| v == 2 || v == 4));
        let full = g;
        assert!(!spawn_tile(&mut g, &mut rng));
        assert_eq!(g, full);
    }

    #[test]
    fn spawn_tile_is_deterministic_for_a_seed() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut g = Grid::EMPTY;
            for _ in 0..6 {
                spawn_tile(&mut g, &mut rng);
            }
            g
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn spawn_tile_only_uses_empty_cells() {
        let mut rng = StdRng::seed_from_u64(9);
        let base = Grid::new([
            [2, 4, 8, 16],
            [32, 64, 128, 256],
            [2, 4, 8, 16],
            [32, 64, 128, 0],
        ]);
        let mut g = base;
        assert!(spawn_tile(&mut g, &mut rng));
        assert!(g.get(3, 3) == 2 || g.get(3, 3) == 4);
        assert_eq!(
            g.cells().take(15).collect::<Vec<_>>(),
            base.cells().take(15).collect::<Vec<_>>()
        );
    }

    #[test]
    fn spawn_picks_empty_cells_uniformly() {
        let base = Grid::new([[0, 2, 4, 8], [16, 0, 32, 64], [128, 256, 0, 2], [4, 8, 16, 0]]);
        let empties = [(0, 0), (1, 1), (2, 2), (3, 3)];
        let mut rng = StdRng::seed_from_u64(77);
        let mut hits = [0usize; 4];
        for _ in 0..8_000 {
            let mut g = base;
            assert!(spawn_tile(&mut g, &mut rng));
            assert_eq!(count_empty(&g), 3);
            let idx = empties.iter().position(|&(r, c)| g.get(r, c) != 0).unwrap();
            hits[idx] += 1;
        }
        for (cell, &n) in empties.iter().zip(hits.iter()) {
            assert!((1_800..2_200).contains(&n), "cell {cell:?} hit {n} times");
        }
    }

    #[test]
    fn spawn_value_distribution() {
        let mut rng = StdRng::seed_from_u64(1234);
        let fours = (0..10_000)
            .filter(|_| generate_random_tile(&mut rng) == 4)
            .count();
        assert!((700..1300).contains(&fours), "fours = {fours}");
    }

    #[test]
    fn max_tiles_do_not_merge() {
        let g = row_grid([MAX_TILE, MAX_TILE, 0, 0]);
        let t = transition(g, Direction::Left);
        assert!(!t.moved);
        assert_eq!(t.grid, g);
        assert_eq!(t.score_delta, 0);

        let t = transition(g, Direction::Right);
        assert_eq!(t.grid.rows()[0], [0, 0, MAX_TILE, MAX_TILE]);
        assert_eq!(t.score_delta, 0);
        assert!(t.grid.cells().all(|v| v == 0 || v.is_power_of_two()));
    }

    #[test]
    fn max_tile_pair_does_not_keep_game_alive() {
        let g = Grid::new([
            [MAX_TILE, MAX_TILE, 2, 4],
            [2, 4, 8, 16],
            [4, 8, 16, 32],
            [8, 16, 32, 64],
        ]);
        assert!(is_terminal(&g));
        assert_eq!(legal_moves(&g), [false; 4]);
    }

    #[test]
    fn it_count_empty_and_highest() {
        let g = Grid::new([[2, 2, 2, 2], [0; 4], [2, 2, 2, 2], [0, 0, 0, 512]]);
        assert_eq!(count_empty(&g), 7);
        assert_eq!(highest_tile(&g), 512);
        assert_eq!(highest_tile(&Grid::EMPTY), 0);
        assert_eq!(tile_sum(&g), 528);
    }
}
