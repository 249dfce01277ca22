//! Shared fixtures: a 19-statement, 7 Q-sort study on a -2..+2 forced
//! distribution (2/4/7/4/2), with reference results for 1 and 2 factors.

#![allow(dead_code)]

use qmethod_core::{DistributionSpec, RankingMatrix};

pub const TOLERANCE: f64 = 1e-2;

pub const STUDY: [[i32; 7]; 19] = [
    [0, -1, 0, 0, 0, 1, 1],
    [-1, 0, 0, 0, 0, 2, 1],
    [0, -1, -1, 1, 1, 0, -1],
    [1, 0, 0, 2, 2, 0, 1],
    [2, 1, 0, 1, 1, 0, -1],
    [2, 1, -2, -1, -2, 1, 1],
    [0, -1, 1, -2, 2, 0, 0],
    [1, 1, -1, 1, -1, 0, 0],
    [0, 1, -1, -1, 0, 0, 0],
    [0, 2, 0, 0, -2, 2, 2],
    [1, 0, 2, 0, -1, -1, -2],
    [-1, 2, 0, 0, -1, -1, 0],
    [0, -1, -2, 0, 0, 0, -1],
    [1, 0, 1, 2, 1, -1, 0],
    [-1, 0, -1, -1, 0, -2, -2],
    [-1, 0, 0, -1, 0, -2, -1],
    [-2, -2, 2, 0, 0, -1, 2],
    [0, 0, 1, 1, 1, 1, 0],
    [-2, -2, 1, -2, -1, 1, 0],
];

pub const EIGENVALUES: [f64; 7] = [1.9812, 1.7123, 1.4146, 0.7837, 0.4869, 0.3532, 0.2681];

pub const ONE_FACTOR_LOADINGS: [f64; 7] =
    [0.7071, 0.7926, -0.5706, 0.3671, -0.3734, 0.4468, 0.2311];

pub const TWO_FACTOR_LOADINGS: [[f64; 2]; 7] = [
    [0.8601, -0.1005],
    [0.7359, 0.3061],
    [-0.5250, -0.2291],
    [0.5807, -0.2984],
    [-0.0470, -0.6942],
    [0.1000, 0.7503],
    [-0.1158, 0.6955],
];

pub const TWO_FACTOR_ZSCORES: [[f64; 19]; 2] = [
    [
        -0.278, -0.572, -0.001, 0.876, 1.574, 1.522, -0.707, 1.127, 0.252, 0.556, 0.321, -0.016,
        -0.027, 0.750, -0.598, -0.724, -1.951, 0.026, -2.129,
    ],
    [
        0.807, 1.259, -0.708, -0.351, -0.708, 1.513, -0.706, 0.353, 0.0, 2.319, -0.809, -0.099,
        -0.355, -0.805, -1.614, -1.259, 0.258, 0.099, 0.805,
    ],
];

pub fn create_test_ranking() -> RankingMatrix {
    let rows: Vec<Vec<i32>> = STUDY.iter().map(|row| row.to_vec()).collect();
    RankingMatrix::from_integer_rows(&rows).unwrap()
}

/// The study with one cell of Q-sort `qsort` changed so its multiset differs
pub fn create_mismatched_ranking(qsort: usize) -> RankingMatrix {
    let mut rows: Vec<Vec<i32>> = STUDY.iter().map(|row| row.to_vec()).collect();
    let statement = rows.iter().position(|row| row[qsort] == 0).unwrap();
    rows[statement][qsort] = 1;
    RankingMatrix::from_integer_rows(&rows).unwrap()
}

pub fn create_test_distribution() -> DistributionSpec {
    DistributionSpec::from_counts(&[(-2, 2), (-1, 4), (0, 7), (1, 4), (2, 2)]).unwrap()
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}
