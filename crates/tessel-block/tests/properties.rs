//! Property tests for block access, slicing and conversion.

use proptest::prelude::*;
use tessel_block::{AnyBlock, Block};
use tessel_core::{BlockError, ElementKind, Scalar};
use tessel_test_utils::fixtures;

fn any_kind() -> impl Strategy<Value = ElementKind> {
    prop::sample::select(ElementKind::ALL.to_vec())
}

/// Reference model of the slicing rule, in wide arithmetic.
fn slice_is_valid(len: usize, start: usize, length: usize, stride: isize) -> bool {
    if stride == 0 {
        return false;
    }
    if length == 0 {
        return start <= len;
    }
    let last = start as i128 + (length as i128 - 1) * stride as i128;
    start < len && last >= 0 && last < len as i128
}

proptest! {
    #[test]
    fn get_succeeds_exactly_in_range(kind in any_kind(), n in 0usize..64, i in -80i64..80) {
        let block = AnyBlock::allocate(kind, n).unwrap();
        let result = block.get(i);
        if i >= 0 && (i as usize) < n {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(BlockError::OutOfRange { index: i, len: n }));
        }
    }

    #[test]
    fn round_trip_f64(xs in prop::collection::vec(any::<f64>().prop_filter("NaN never equals itself", |x| !x.is_nan()), 0..64)) {
        let block = Block::from_values(&xs).unwrap();
        prop_assert_eq!(block.to_vec(), xs.clone());
        let any = AnyBlock::from_values(ElementKind::Float64, &fixtures::scalars(&xs)).unwrap();
        prop_assert_eq!(any.to_f64_vec(), xs);
    }

    #[test]
    fn round_trip_i32(xs in prop::collection::vec(any::<i32>(), 0..64)) {
        let any = AnyBlock::from_values(ElementKind::Int32, &fixtures::scalars(&xs)).unwrap();
        let expected: Vec<Scalar> = xs.iter().copied().map(Scalar::Int32).collect();
        prop_assert_eq!(any.to_scalars(), expected);
    }

    #[test]
    fn round_trip_u8(xs in prop::collection::vec(any::<u8>(), 0..64)) {
        let block = Block::from_values(&xs).unwrap();
        prop_assert_eq!(block.iter().collect::<Vec<_>>(), xs);
    }

    #[test]
    fn slicing_matches_reference_model(
        len in 0usize..32,
        start in 0usize..40,
        length in 0usize..40,
        stride in -6isize..=6,
    ) {
        let block = Block::from_values(&fixtures::ramp_f64(len)).unwrap();
        match block.slice(start, length, stride) {
            Ok(view) => {
                prop_assert!(slice_is_valid(len, start, length, stride));
                let expected: Vec<f64> = (0..length)
                    .map(|i| (start as isize + i as isize * stride) as f64)
                    .collect();
                prop_assert_eq!(view.to_vec(), expected);
            }
            Err(err) => {
                prop_assert!(!slice_is_valid(len, start, length, stride));
                let is_invalid_range = matches!(err, BlockError::InvalidRange { .. });
                prop_assert!(is_invalid_range);
            }
        }
    }

    #[test]
    fn view_writes_alias_parent(len in 1usize..32, seed in any::<u64>(), x in -1e9f64..1e9) {
        let values = fixtures::random_f64s(seed, len);
        let block = Block::from_values(&values).unwrap();
        let start = (seed as usize) % len;
        let view = block.slice(start, 1, 1).unwrap();
        view.set(0, x).unwrap();
        prop_assert_eq!(block.get(start), Ok(x));
    }

    #[test]
    fn float_to_int_truncates_in_range(x in (i32::MIN as f64)..(i32::MAX as f64)) {
        let block = Block::from_values(&[x]).unwrap();
        let cast = block.cast::<i32>().unwrap();
        prop_assert_eq!(cast.get(0), Ok(x.trunc() as i32));
    }
}

#[test]
fn allocate_set_slice_end_to_end() {
    tessel_test_utils::init_tracing();
    let block = AnyBlock::allocate(ElementKind::Float64, 5).unwrap();
    for (i, x) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
        block.set(i as i64, Scalar::Float64(x)).unwrap();
    }
    let view = block.slice(1, 3, 1).unwrap();
    assert_eq!(view.to_f64_vec(), vec![2.0, 3.0, 4.0]);
}

#[test]
fn float_to_int_cast_boundaries() {
    let block = Block::from_values(&[
        3.9,
        -3.9,
        i32::MAX as f64,
        i32::MIN as f64,
        i32::MAX as f64 + 1.0,
        i32::MIN as f64 - 1.0,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NAN,
    ])
    .unwrap();
    assert_eq!(
        block.cast::<i32>().unwrap().to_vec(),
        vec![3, -3, i32::MAX, i32::MIN, i32::MAX, i32::MIN, i32::MAX, i32::MIN, 0]
    );
}

#[test]
fn read_only_wrap_rejects_every_write() {
    let data = [1u8, 2, 3];
    let block = Block::wrap_read_only(&data);
    assert_eq!(block.set(0, 9), Err(BlockError::ImmutableBuffer));
    let view = block.slice(0, 2, 1).unwrap();
    assert_eq!(view.fill(0), Err(BlockError::ImmutableBuffer));
    assert_eq!(view.map_in_place(|x| x + 1), Err(BlockError::ImmutableBuffer));
    assert_eq!(block.to_vec(), vec![1, 2, 3]);
}
