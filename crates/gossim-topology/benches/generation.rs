//! Benchmarks for topology generation and neighbor resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gossim_topology::{
    resolve_neighbors, GeneratorConfig, LatencyRange, ModelParams, NodeName, TopologyGenerator,
};

fn generator(params: ModelParams, nodes: usize) -> TopologyGenerator {
    let latency = LatencyRange::new(1, 50).unwrap();
    TopologyGenerator::new(GeneratorConfig::new(nodes, params, latency)).unwrap()
}

fn benchmark_ba(c: &mut Criterion) {
    let generator = generator(
        ModelParams::BarabasiAlbert {
            parameter: 3,
            adjustment: 0,
        },
        200,
    );
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("generate_ba_200_m3", |b| {
        b.iter(|| {
            let _ = generator.generate(black_box(&mut rng));
        });
    });
}

fn benchmark_er(c: &mut Criterion) {
    let generator = generator(ModelParams::ErdosRenyi { probability: 0.05 }, 200);
    let mut rng = StdRng::seed_from_u64(2);

    c.bench_function("generate_er_200_p005", |b| {
        b.iter(|| {
            let _ = generator.generate(black_box(&mut rng));
        });
    });
}

fn benchmark_resolve(c: &mut Criterion) {
    let generator = generator(
        ModelParams::BarabasiAlbert {
            parameter: 3,
            adjustment: 0,
        },
        500,
    );
    let topology = generator.generate(&mut StdRng::seed_from_u64(3)).unwrap();
    let hub = NodeName::indexed(gossim_topology::DEFAULT_NODE_PREFIX, 0);

    c.bench_function("resolve_neighbors_500", |b| {
        b.iter(|| resolve_neighbors(black_box(&hub), &topology));
    });
}

criterion_group!(benches, benchmark_ba, benchmark_er, benchmark_resolve);
criterion_main!(benches);
