use std::path::Path;

use dumpio::snapshots::Snapshots;

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./src/tests-data/lammpstrj/trajectory.lammpstrj".to_string());
    let snapshots = Snapshots::from_dump(Path::new(&path)).unwrap();
    println!("{}: {} snapshots", path, snapshots.len());
    for snapshot in &snapshots {
        println!(
            "timestep {:>10}  {:>8} atoms  box {:.3} x {:.3} x {:.3}",
            snapshot.timestep,
            snapshot.n_atoms(),
            snapshot.sim_box.lx(),
            snapshot.sim_box.ly(),
            snapshot.sim_box.lz(),
        );
    }
}
