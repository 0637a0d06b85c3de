//! §8 scenario 6 (PAWN constant output), driven through the `sensitivity`
//! module's public re-exports.

use ndarray::{Array1, Array2};

use reef_mc::sensitivity::{pawn_index, DEFAULT_SLICES};

#[test]
fn test_constant_output_gives_zero_pawn_index_for_every_factor() {
    let x = Array2::from_shape_fn((80, 4), |(i, d)| ((i * (d + 3)) % 17) as f64);
    let y = Array1::from_elem(80, 3.5);

    let summaries = pawn_index(&x, &y, DEFAULT_SLICES);
    assert_eq!(summaries.len(), 4);
    for summary in summaries {
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.median, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.cv, 0.0);
    }
}
