mod support;

use ndarray::{Array3, Axis, s};
use spectslice::loader::{LoadError, StackAxis, load_spectrograms};
use support::npy::{position_matrix, position_stack, write_matrix, write_stack};
use tempfile::tempdir;

#[test]
fn documented_stack_layout_splits_along_leading_axis() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("stack.npy");
    let stack = position_stack(3, 1024, 480);
    write_stack(&path, &stack);

    let spects = load_spectrograms(&[&path], StackAxis::Leading).expect("load stack");
    assert_eq!(spects.len(), 3);
    for (i, spect) in spects.iter().enumerate() {
        assert_eq!(spect.dim(), (1024, 480));
        assert_eq!(spect, &stack.index_axis(Axis(0), i));
    }
}

#[test]
fn files_flatten_in_file_then_stack_order() {
    let dir = tempdir().expect("tempdir");
    let single = dir.path().join("single.npy");
    let stacked = dir.path().join("stacked.npy");
    write_matrix(&single, &position_matrix(6, 5, -1.0));
    write_stack(&stacked, &position_stack(2, 4, 3));

    let spects =
        load_spectrograms(&[single.clone(), stacked.clone()], StackAxis::Leading).expect("load");
    assert_eq!(spects.len(), 3);
    assert_eq!(spects[0], position_matrix(6, 5, -1.0));
    assert_eq!(spects[1][(0, 0)], 0.0);
    assert_eq!(spects[2][(0, 0)], 1.0e6);

    let reversed = load_spectrograms(&[stacked, single], StackAxis::Leading).expect("load");
    assert_eq!(reversed[2].dim(), (6, 5));
}

#[test]
fn trailing_stacks_load_with_inferred_axis() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("trailing.npy");
    let stack = Array3::from_shape_fn((16, 12, 2), |(r, c, i)| (i * 1000 + r * 12 + c) as f32);
    write_stack(&path, &stack);

    let spects = load_spectrograms(&[&path], StackAxis::Infer).expect("load");
    assert_eq!(spects.len(), 2);
    assert_eq!(spects[1].dim(), (16, 12));
    assert_eq!(
        spects[1],
        stack.slice(s![.., .., 1]).mapv(f64::from)
    );
}

#[test]
fn first_bad_file_aborts_the_load() {
    let dir = tempdir().expect("tempdir");
    let good = dir.path().join("good.npy");
    write_matrix(&good, &position_matrix(2, 2, 0.0));
    let missing = dir.path().join("missing.npy");

    let err = load_spectrograms(&[good, missing.clone()], StackAxis::Leading).unwrap_err();
    match err {
        LoadError::Read { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_path_list_loads_nothing() {
    let paths: [&str; 0] = [];
    let spects = load_spectrograms(&paths, StackAxis::Leading).expect("load");
    assert!(spects.is_empty());
}
