use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ndarray::Array2;
use spectslice::{
    Spectrogram,
    export::{ExtractionPolicy, stack_windows},
    slicing::{PoolingWindow, average_pooling, create_windows},
};

const ROWS: usize = 1024;
const COLS: usize = 480;
const STACK_LEN: usize = 8;

fn spectrogram(seed: usize) -> Spectrogram {
    Array2::from_shape_fn((ROWS, COLS), |(r, c)| {
        1.0 + ((r * 31 + c * 17 + seed * 7) % 251) as f64
    })
}

fn bench_create_windows(c: &mut Criterion) {
    let spect = spectrogram(0);
    let policy = ExtractionPolicy::default();
    c.bench_with_input(
        BenchmarkId::new("create_windows", format!("{ROWS}x{COLS}")),
        &spect,
        |b, spect| {
            b.iter(|| {
                create_windows(black_box(spect.view()), policy.window, policy.step)
                    .expect("create_windows")
            });
        },
    );
}

fn bench_pool_and_stack(c: &mut Criterion) {
    let spects: Vec<Spectrogram> = (0..STACK_LEN).map(spectrogram).collect();
    let window = PoolingWindow::default();
    let policy = ExtractionPolicy::default();
    c.bench_with_input(
        BenchmarkId::new("pool_and_stack", STACK_LEN),
        &spects,
        |b, spects| {
            b.iter(|| {
                let pooled: Vec<Spectrogram> = spects
                    .iter()
                    .map(|spect| average_pooling(spect.view(), window).expect("pooling"))
                    .collect();
                stack_windows(black_box(&pooled), &policy).expect("stack_windows")
            });
        },
    );
}

criterion_group!(benches, bench_create_windows, bench_pool_and_stack);
criterion_main!(benches);
