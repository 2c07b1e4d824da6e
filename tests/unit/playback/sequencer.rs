use std::collections::BTreeSet;

use super::*;

fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn sequencer(n: usize, superframe_size: u32) -> SliceSequencer<String> {
    SliceSequencer::new(
        SliceSet::new(superframe_size, ids("f", n)).unwrap(),
        SliceSet::new(superframe_size, ids("b", n)).unwrap(),
    )
    .unwrap()
}

#[test]
fn starts_forward_at_unit_velocity() {
    let s = sequencer(4, 6);
    assert_eq!(s.len(), 4);
    assert!(!s.is_empty());
    assert_eq!(s.direction(), Direction::Forward);
    assert_eq!(s.cursor_index(), 0);
    assert_eq!(s.velocity().numerator(), 6);
    assert_eq!(s.velocity().denominator(), 6);
    assert_eq!(s.velocity().as_f64(), 1.0);
    assert_eq!(s.current_head(), "f0");
    // Backward ring is the backward slice set reversed.
    assert_eq!(s.backward_head(), "b3");
}

#[test]
fn length_mismatch_is_rejected() {
    let err = SliceSequencer::new(
        SliceSet::new(6, ids("f", 40)).unwrap(),
        SliceSet::new(6, ids("b", 42)).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CompressureError::SequencerLengthMismatch {
            forward: 40,
            backward: 42
        }
    ));
}

#[test]
fn empty_slice_sets_are_rejected() {
    let err = SliceSequencer::<String>::new(
        SliceSet::new(6, vec![]).unwrap(),
        SliceSet::new(6, vec![]).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, CompressureError::SequencerEmpty));
}

#[test]
fn mismatched_superframe_sizes_are_rejected() {
    assert!(
        SliceSequencer::new(
            SliceSet::new(6, ids("f", 3)).unwrap(),
            SliceSet::new(12, ids("b", 3)).unwrap(),
        )
        .is_err()
    );
    assert!(SliceSet::<String>::new(0, vec![]).is_err());
}

#[test]
fn accelerate_adds_one_superframe_step() {
    let mut s = sequencer(20, 6);
    let head = s.accelerate(1).clone();
    assert_eq!(s.velocity().numerator(), 7);
    assert_eq!(s.velocity().denominator(), 6);
    assert_eq!(s.cursor_index(), 7);
    assert_eq!(head, "f7");
}

#[test]
fn velocity_step_moves_by_numerator_and_wraps() {
    let mut s = sequencer(5, 2);
    s.set_velocity(1.5);
    assert_eq!(s.velocity().numerator(), 3);
    assert_eq!(s.step(None), "f3");
    assert_eq!(s.step(None), "f1");
    assert_eq!(s.cursor_index(), 6);
}

#[test]
fn set_velocity_truncates_toward_zero() {
    let mut s = sequencer(5, 6);
    s.set_velocity(0.99);
    assert_eq!(s.velocity().numerator(), 5);
    s.set_velocity(-0.99);
    assert_eq!(s.velocity().numerator(), -5);
}

#[test]
fn target_step_lands_exactly_on_target() {
    let mut s = sequencer(7, 6);
    for target in [3, 3, -4, 100, 0, -23, 9] {
        s.step(Some(target));
        assert_eq!(s.cursor_index(), i128::from(target));
    }
}

#[test]
fn target_step_handles_extreme_targets() {
    let mut s = sequencer(5, 6);
    s.step(Some(-1));
    s.step(Some(i64::MAX));
    assert_eq!(s.cursor_index(), i128::from(i64::MAX));
    // i64::MAX = 5 * k + 2
    assert_eq!(s.forward_head(), "f2");
    assert_eq!(s.velocity().numerator(), 6);

    s.step(Some(i64::MIN));
    assert_eq!(s.cursor_index(), i128::from(i64::MIN));
    // i64::MIN = 5 * k + 2
    assert_eq!(s.forward_head(), "f2");
    assert_eq!(s.velocity().numerator(), -6);

    s.step(Some(0));
    assert_eq!(s.cursor_index(), 0);
    assert_eq!(s.forward_head(), "f0");
}

#[test]
fn accelerate_saturates_velocity() {
    let mut s = sequencer(5, 6);
    s.set_velocity_numerator(i64::MAX);
    s.accelerate(1);
    assert_eq!(s.velocity().numerator(), i64::MAX);
    assert_eq!(s.cursor_index(), i128::from(i64::MAX));
}

#[test]
fn target_step_sets_unit_velocity_sign_only() {
    let mut s = sequencer(10, 6);
    s.step(Some(5));
    assert_eq!(s.velocity().numerator(), 6);
    s.step(Some(2));
    assert_eq!(s.velocity().numerator(), -6);
    s.step(Some(2));
    assert_eq!(s.velocity().numerator(), 0);
}

#[test]
fn target_step_uses_raw_delta_not_superframe_scale() {
    let mut s = sequencer(10, 6);
    assert_eq!(s.step(Some(1)), "f1");
    assert_eq!(s.forward_head(), "f1");
}

#[test]
fn direction_lags_velocity_by_one_update() {
    let mut s = sequencer(4, 6);

    // Previous velocity was +1 while forward: still forward.
    s.set_velocity(-1.0);
    assert_eq!(s.direction(), Direction::Forward);
    assert_eq!(s.current_head(), s.backward_head());

    // Previous velocity was -1 while forward: now backward.
    s.set_velocity(-1.0);
    assert_eq!(s.direction(), Direction::Backward);

    // Previous velocity -1 while backward: stays backward even though new velocity is positive.
    s.set_velocity(1.0);
    assert_eq!(s.direction(), Direction::Backward);
    assert_eq!(s.current_head(), s.forward_head());

    s.set_velocity(1.0);
    assert_eq!(s.direction(), Direction::Forward);
}

#[test]
fn zero_velocity_keeps_the_current_ring() {
    let mut fwd = sequencer(4, 6);
    fwd.step(Some(1));
    fwd.set_velocity(0.0);
    assert_eq!(fwd.direction(), Direction::Forward);
    assert_eq!(fwd.current_head(), "f1");

    let mut bwd = sequencer(4, 6);
    bwd.set_velocity(-1.0);
    bwd.set_velocity(-1.0);
    assert_eq!(bwd.direction(), Direction::Backward);
    bwd.set_velocity(0.0);
    assert_eq!(bwd.direction(), Direction::Backward);
    assert_eq!(bwd.current_head(), bwd.backward_head());
    // A second zero update keeps it there: 0 > 0 is false while backward.
    bwd.set_velocity(0.0);
    assert_eq!(bwd.direction(), Direction::Backward);
    assert_eq!(bwd.current_head(), bwd.backward_head());
}

#[test]
fn reversing_target_shows_backward_slices() {
    let mut s = sequencer(6, 6);
    assert_eq!(s.step(Some(3)), "f3");
    // Moving back: velocity now negative while still flagged forward.
    assert_eq!(s.step(Some(1)), "b4");
    assert_eq!(s.direction(), Direction::Forward);
    // Next move back: direction catches up.
    assert_eq!(s.step(Some(0)), "b5");
    assert_eq!(s.direction(), Direction::Backward);
    // Holding still while backward stays on the backward ring.
    assert_eq!(s.step(Some(0)), "b5");
}

#[test]
fn rings_stay_paired_for_any_step_sequence() {
    let shared = ids("s", 9);
    let mut s = SliceSequencer::new(
        SliceSet::new(3, shared.clone()).unwrap(),
        SliceSet::new(3, shared.clone()).unwrap(),
    )
    .unwrap();
    let all = shared.iter().collect::<BTreeSet<_>>();

    let targets = [4_i64, -2, 17, 17, 0, -30, 5];
    for (i, t) in targets.into_iter().enumerate() {
        if i % 2 == 0 {
            s.step(Some(t));
        } else {
            s.accelerate(i as i64 - 3);
        }
        assert_eq!(s.forward_queue().count(), 9);
        assert_eq!(s.backward_queue().count(), 9);
        assert_eq!(s.forward_queue().collect::<BTreeSet<_>>(), all);
        assert_eq!(s.backward_queue().collect::<BTreeSet<_>>(), all);
        assert_eq!(s.forward_queue().next(), Some(s.forward_head()));
        assert_eq!(s.backward_queue().next(), Some(s.backward_head()));
    }
}

#[test]
fn from_record_requires_slice_set_kind() {
    let rec = ArtifactRecord {
        fingerprint: crate::cache::fingerprint::ConfigFingerprint { hi: 1, lo: 2 },
        kind: ArtifactKind::Transcode,
        output_path: PathBuf::from("t.avi"),
        slices: vec![],
        config: serde_json::Value::Null,
    };
    assert!(SliceSet::from_record(&rec, 6).is_err());

    let rec = ArtifactRecord {
        kind: ArtifactKind::SliceSet,
        slices: vec![PathBuf::from("a"), PathBuf::from("b")],
        ..rec
    };
    let set = SliceSet::from_record(&rec, 6).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.superframe_size(), 6);
}
