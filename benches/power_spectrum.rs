use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kshell_rs::spectral::{power_grid, power_spectrum, shell_sum};
use kshell_rs::synth::gaussian_random_field;
use ndarray::Array3;

fn bench_power_spectrum(c: &mut Criterion) {
    let field = gaussian_random_field(32, 2.0, 1234);

    c.bench_function("power_grid 32^3", |b| {
        b.iter(|| power_grid::<f64, _, _>(black_box(&field)).expect("valid field"))
    });

    let grid: Array3<f64> = power_grid(&field).expect("valid field");
    c.bench_function("shell_sum 32^3", |b| {
        b.iter(|| shell_sum::<f64, _>(black_box(&grid)))
    });

    c.bench_function("power_spectrum 32^3", |b| {
        b.iter(|| power_spectrum::<f64, _, _>(black_box(&field)).expect("valid field"))
    });
}

criterion_group!(benches, bench_power_spectrum);
criterion_main!(benches);
