use kinship_core::spatial_hash::{naive_candidates, SpatialHash};
use kinship_core::DistanceMetric;
use kinship_data::Position;
use proptest::prelude::*;

const CELL: f64 = 10.0;
const CELLS: usize = 10;
const EXTENT: f64 = CELL * CELLS as f64;

fn positions_strategy() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec(
        (0.0..EXTENT, -5.0..5.0f64, 0.0..EXTENT).prop_map(|(x, y, z)| Position::new(x, y, z)),
        1..150,
    )
}

/// Points snapped onto or next to cell edges.
fn edge_positions_strategy() -> impl Strategy<Value = Vec<Position>> {
    let axis = (0..CELLS, prop::sample::select(vec![0.0, 1e-9, CELL - 1e-9]))
        .prop_map(|(cell, offset)| cell as f64 * CELL + offset);
    prop::collection::vec(
        (axis.clone(), axis).prop_map(|(x, z)| Position::planar(x, z)),
        1..80,
    )
}

fn metric_strategy() -> impl Strategy<Value = DistanceMetric> {
    prop::sample::select(vec![DistanceMetric::Planar, DistanceMetric::Full3d])
}

fn grid_candidates(
    grid: &SpatialHash,
    slot: u32,
    positions: &[Position],
    radius_sq: f64,
    metric: DistanceMetric,
) -> Vec<u32> {
    let mut found = Vec::new();
    grid.candidates_into(slot, positions, radius_sq, metric, &mut found);
    found.sort_unstable();
    found
}

proptest! {
    #[test]
    fn test_grid_matches_naive_when_radius_fits_cell(
        positions in positions_strategy(),
        radius in 0.1..=CELL,
        metric in metric_strategy(),
    ) {
        let mut grid = SpatialHash::new(CELL, CELLS, CELLS);
        prop_assert_eq!(grid.build_parallel(&positions), 0);

        let radius_sq = radius * radius;
        for slot in 0..positions.len() as u32 {
            prop_assert_eq!(
                grid_candidates(&grid, slot, &positions, radius_sq, metric),
                naive_candidates(slot, &positions, radius_sq, metric)
            );
        }
    }

    #[test]
    fn test_grid_matches_naive_on_cell_edges(
        positions in edge_positions_strategy(),
        radius in 0.1..=CELL,
    ) {
        let mut grid = SpatialHash::new(CELL, CELLS, CELLS);
        grid.build_parallel(&positions);

        let radius_sq = radius * radius;
        for slot in 0..positions.len() as u32 {
            prop_assert_eq!(
                grid_candidates(&grid, slot, &positions, radius_sq, DistanceMetric::Planar),
                naive_candidates(slot, &positions, radius_sq, DistanceMetric::Planar)
            );
        }
    }

    #[test]
    fn test_grid_never_reports_self(positions in positions_strategy()) {
        let mut grid = SpatialHash::new(CELL, CELLS, CELLS);
        grid.build_parallel(&positions);

        for slot in 0..positions.len() as u32 {
            let found = grid_candidates(&grid, slot, &positions, f64::MAX, DistanceMetric::Planar);
            prop_assert!(!found.contains(&slot));
        }
    }

    #[test]
    fn test_candidates_stay_within_neighbor_block(positions in positions_strategy()) {
        let mut grid = SpatialHash::new(CELL, CELLS, CELLS);
        grid.build_parallel(&positions);

        let from_cell_center = 1.5 * 2f64.sqrt() * CELL + 1e-9;
        let from_source = 2.0 * 2f64.sqrt() * CELL + 1e-9;

        for slot in 0..positions.len() as u32 {
            let origin = positions[slot as usize];
            let (cx, cz) = grid.cell_coords(&origin);
            let center = Position::planar((cx as f64 + 0.5) * CELL, (cz as f64 + 0.5) * CELL);

            for other in grid_candidates(&grid, slot, &positions, f64::MAX, DistanceMetric::Planar) {
                let p = positions[other as usize];
                prop_assert!(center.planar_distance_sq(&p).sqrt() <= from_cell_center);
                prop_assert!(origin.planar_distance_sq(&p).sqrt() <= from_source);
            }
        }
    }

    #[test]
    fn test_every_agent_lands_in_exactly_one_cell(positions in positions_strategy()) {
        let mut grid = SpatialHash::new(CELL, CELLS, CELLS);
        grid.build_parallel(&positions);

        let mut seen = vec![0usize; positions.len()];
        for cell in 0..grid.cell_count() {
            for &slot in grid.query_cell(cell) {
                prop_assert_eq!(grid.cell_index(&positions[slot as usize]), cell);
                seen[slot as usize] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
        prop_assert_eq!(grid.len(), positions.len());
    }
}
