use criterion::{Criterion, criterion_group, criterion_main};
use dumpio::snapshots::Snapshots;
use dumpio::source;
use std::hint::black_box;
use std::path::Path;
use std::time::Duration;

fn load_trajectory(path: &Path) -> usize {
    let snapshots = Snapshots::from_dump(path).unwrap();
    let mut dummy = 0;
    for snapshot in &snapshots {
        dummy += snapshot.atoms().unwrap().n_atoms();
    }
    black_box(dummy)
}

fn criterion_benchmark(c: &mut Criterion) {
    let path = Path::new("./src/tests-data/lammpstrj/trajectory.lammpstrj");
    let mut group = c.benchmark_group("my_group");
    group.measurement_time(Duration::from_secs(6));
    group.bench_function("scan dump headers", |b| {
        b.iter(|| black_box(source::scan(path).unwrap().len()))
    });
    group.bench_function("read full dump", |b| b.iter(|| load_trajectory(path)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
