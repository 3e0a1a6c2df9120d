use std::sync::Arc;

use constrained_manifolds::prelude::*;
use ndarray::arr1;
use ndarray_linalg::Norm;

fn main() -> Result<()> {
    println!("=== Nullspace Walk on the Unit Sphere ===\n");

    let sphere = SphereConstraint::unit(3)?.with_tolerance(1e-2)?;
    let space = NullspaceSpace::new(
        RealVectorSpace::new(3),
        Arc::new(sphere),
        TraversalConfig::new().with_delta(0.1),
    )?;

    let from = arr1(&[1.0, 0.0, 0.0]);
    let to = arr1(&[0.0, 1.0, 0.0]);
    println!("From: {:?}", from);
    println!("To:   {:?}\n", to);

    let traversal = space.traverse(&from, &to, true)?;
    println!(
        "{:>4} {:>10} {:>10} {:>10} {:>12} {:>12}",
        "step", "x", "y", "z", "|x| - 1", "dist to"
    );
    println!("{}", "-".repeat(63));
    for (i, state) in traversal.path.iter().enumerate() {
        println!(
            "{:4} {:10.5} {:10.5} {:10.5} {:12.3e} {:12.5}",
            i,
            state[0],
            state[1],
            state[2],
            state.norm_l2() - 1.0,
            space.distance(state, &to)
        );
    }

    println!("\nReached target: {}", traversal.reached);
    println!(
        "Path length {:.5} vs great-circle arc {:.5}",
        space.path_length(&traversal.path),
        std::f64::consts::FRAC_PI_2
    );

    let mid = space.interpolate_on_manifold(&from, &to, 0.5)?;
    println!("Manifold midpoint: {:?}", mid);

    Ok(())
}
