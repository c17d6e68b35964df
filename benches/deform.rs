//! Benchmarks for mesh construction and deformation.

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{Point3, Vector3};
use pliant::prelude::*;

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    // Create triangles
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

/// Anchor the bottom row, drag the top row, deform.
fn drag_scenario(n: usize) -> (HalfEdgeMesh, ConstraintSet) {
    let mut mesh = create_grid_mesh(n);

    let anchors: Vec<usize> = (0..=n).collect();
    let handles: Vec<usize> = (n * (n + 1)..=(n * (n + 1) + n)).collect();

    let mut constraints = ConstraintSet::new();
    constraints
        .set_constraints(&mut mesh, &anchors, &handles)
        .unwrap();
    constraints.translate_handles(Vector3::new(0.0, 0.0, 3.0));

    (mesh, constraints)
}

fn bench_mesh_construction(c: &mut Criterion) {
    c.bench_function("build_grid_20x20", |b| {
        let n = 20;
        let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
        let mut faces = Vec::with_capacity(n * n * 2);

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_one_ring_traversal(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("one_ring_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_ids() {
                count += mesh.one_ring(v).count();
            }
            count
        });
    });
}

fn bench_deform_uniform(c: &mut Criterion) {
    let (mesh, constraints) = drag_scenario(20);

    c.bench_function("deform_grid_20x20_uniform_k0", |b| {
        let options = DeformOptions::default().with_iterations(0);
        b.iter(|| {
            let mut mesh = mesh.clone();
            deform(&mut mesh, &constraints, &options).unwrap();
            mesh
        });
    });

    c.bench_function("deform_grid_20x20_uniform_k5", |b| {
        let options = DeformOptions::default().with_iterations(5);
        b.iter(|| {
            let mut mesh = mesh.clone();
            deform(&mut mesh, &constraints, &options).unwrap();
            mesh
        });
    });
}

fn bench_deform_cotangent(c: &mut Criterion) {
    let (mesh, constraints) = drag_scenario(20);

    c.bench_function("deform_grid_20x20_cotangent_k5", |b| {
        let options = DeformOptions::default()
            .with_scheme(WeightScheme::Cotangent)
            .with_iterations(5);
        b.iter(|| {
            let mut mesh = mesh.clone();
            deform(&mut mesh, &constraints, &options).unwrap();
            mesh
        });
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_one_ring_traversal,
    bench_deform_uniform,
    bench_deform_cotangent
);
criterion_main!(benches);
