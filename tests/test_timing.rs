//! Tests for EMMA and Fitts' law timing.

use proptest::prelude::*;

use scanpath_rust::simulation::layout::{Element, Surface};
use scanpath_rust::simulation::params::{FITTS_A, FITTS_B};
use scanpath_rust::simulation::search::emma_scanpath;
use scanpath_rust::simulation::timing::{emma_fixation_time, encoding_time, FittsLaw};

#[test]
fn test_fitts_zero_distance_is_constant() {
    let law = FittsLaw::default();
    for width in [1.0, 10.0, 500.0] {
        assert!((law.movement_time(0.0, width) - 0.230).abs() < 1e-12);
    }
}

#[test]
fn test_fitts_path_time_sums_moves() {
    let mut surface = Surface::new(100.0, 100.0);
    let a = surface.add(Element::new("a", 0.0, 0.0, 20.0, 20.0)).unwrap();
    let b = surface.add(Element::new("b", 100.0, 0.0, 20.0, 20.0)).unwrap();
    let law = FittsLaw::default();
    // 100 px to a 20 px target: a + b * log2(6)
    let one_way = FITTS_A + FITTS_B * 6.0_f64.log2();
    assert!((surface.fitts_path_time(&[a, b], &law) - one_way).abs() < 1e-10);
    assert!((surface.fitts_path_time(&[a, b, a], &law) - 2.0 * one_way).abs() < 1e-10);
    assert!(surface.fitts_path_time(&[a], &law).abs() < 1e-12);
}

#[test]
fn test_nearby_target_is_encoded_without_moving() {
    let fixation = emma_fixation_time(0.0, 0.1);
    assert!(!fixation.moved);
    assert!((fixation.time - encoding_time(0.0, 0.1)).abs() < 1e-12);
}

#[test]
fn test_scanpath_does_not_grow_without_a_saccade() {
    let mut surface = Surface::new(100.0, 100.0);
    let a = surface.add(Element::new("a", 0.0, 0.0, 50.0, 50.0)).unwrap();
    let b = surface.add(Element::new("b", 0.0, 0.0, 50.0, 50.0)).unwrap();
    let outcome = emma_scanpath(&surface, &[a, b]);
    assert_eq!(outcome.scanpath, vec![a]);
    assert!((outcome.total_time - encoding_time(0.0, 0.1)).abs() < 1e-12);
}

proptest! {
    #[test]
    fn prop_emma_non_decreasing_in_distance(
        d in 0.0f64..40.0,
        step in 0.0f64..10.0,
        f in 0.01f64..1.0,
    ) {
        let near = emma_fixation_time(d, f).time;
        let far = emma_fixation_time(d + step, f).time;
        prop_assert!(far >= near - 1e-12);
    }

    #[test]
    fn prop_emma_non_increasing_in_frequency(
        d in 0.0f64..40.0,
        f in 0.01f64..0.99,
        step in 0.0f64..0.5,
    ) {
        let rare = emma_fixation_time(d, f).time;
        let common = emma_fixation_time(d, (f + step).min(1.0)).time;
        prop_assert!(common <= rare + 1e-12);
    }

    #[test]
    fn prop_no_move_means_pure_encoding(d in 0.0f64..40.0, f in 0.01f64..1.0) {
        let fixation = emma_fixation_time(d, f);
        if !fixation.moved {
            prop_assert!((fixation.time - encoding_time(d, f)).abs() < 1e-12);
        }
    }
}
