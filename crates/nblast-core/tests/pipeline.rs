//! End-to-end pipeline properties: determinism across worker-pool sizes,
//! mean-symmetry transposition, and totality of the accumulated histogram.

use nblast_core::engine::NblastEngine;
use nblast_core::job::{CancelToken, JobStatus};
use nblast_core::registry::Registry;
use nblast_core::types::{ConfigTuning, ErrorMode, ObjectRef, Point3, PointSet, Symmetry};

fn helix(id: u64, n: usize) -> Vec<Point3> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.4 + id as f64;
            Point3::new(t.sin() * 8.0, t.cos() * 8.0, t * 1.5)
        })
        .collect()
}

fn build_registry() -> Registry {
    let registry = Registry::new();
    for id in 0..8u64 {
        registry.insert_pointcloud(id, helix(id, 30));
    }
    // One skeleton: a bent polyline resampled by the adapter.
    let nodes: Vec<Point3> = (0..12).map(|i| Point3::new(i as f64 * 2.0, (i % 4) as f64, 0.0)).collect();
    let edges: Vec<(usize, usize)> = (0..11).map(|i| (i, i + 1)).collect();
    registry.insert_skeleton(100, nodes, edges);
    // One point set entity.
    let flat: Vec<f64> = (0..30).flat_map(|i| [i as f64, 0.5 * i as f64, 1.0]).collect();
    registry.insert_point_set(200, PointSet::new("flat", flat).unwrap());
    registry
}

fn tuning() -> ConfigTuning {
    ConfigTuning { tangent_neighbors: 5, resample_step: 1.0, ..Default::default() }
}

fn distance_breaks() -> Vec<f64> {
    vec![0.0, 2.0, 4.0, 8.0, 16.0]
}

fn dot_breaks() -> Vec<f64> {
    vec![0.0, 0.25, 0.5, 0.75, 1.0]
}

struct Fixture {
    engine: NblastEngine<Registry>,
    config: nblast_core::types::Config,
}

fn build_fixture() -> Fixture {
    let engine = NblastEngine::new(build_registry());
    let cancel = CancelToken::new();

    let matched_pairs: Vec<_> = (0..8)
        .map(|i| (ObjectRef::pointcloud(i), ObjectRef::pointcloud(i)))
        .collect();
    let random_pairs: Vec<_> = (0..8)
        .map(|i| (ObjectRef::pointcloud(i), ObjectRef::pointcloud((i + 5) % 8)))
        .collect();

    let matched = engine
        .build_sample(Some("matched".into()), &matched_pairs, &distance_breaks(), &dot_breaks(), tuning(), &cancel)
        .unwrap();
    let random = engine
        .build_sample(Some("random".into()), &random_pairs, &distance_breaks(), &dot_breaks(), tuning(), &cancel)
        .unwrap();
    assert_eq!(matched.job.status, JobStatus::Complete);
    assert_eq!(random.job.status, JobStatus::Complete);

    let config = engine
        .build_config("pipeline", distance_breaks(), dot_breaks(), tuning(), &matched, &random, &cancel)
        .unwrap();
    assert_eq!(config.job.status, JobStatus::Complete);
    Fixture { engine, config }
}

#[test]
fn histogram_totals_count_every_query_point() {
    let engine = NblastEngine::new(build_registry());
    let pairs = vec![
        (ObjectRef::pointcloud(0), ObjectRef::pointcloud(1)),
        (ObjectRef::skeleton(100), ObjectRef::pointcloud(2)),
        (ObjectRef::pointset(200), ObjectRef::pointcloud(3)),
    ];
    let sample = engine
        .build_sample(None, &pairs, &distance_breaks(), &dot_breaks(), tuning(), &CancelToken::new())
        .unwrap();
    assert_eq!(sample.job.status, JobStatus::Complete);

    // Recompute the expected point counts through the public geometry path.
    use nblast_core::geometry::build_dotprops;
    let t = tuning();
    let expected: usize = [ObjectRef::pointcloud(0), ObjectRef::skeleton(100), ObjectRef::pointset(200)]
        .iter()
        .map(|r| {
            use nblast_core::geometry::ObjectResolver;
            let resolved = engine.resolver().resolve(r).unwrap();
            build_dotprops(resolved, &t).unwrap().len()
        })
        .sum();
    assert_eq!(sample.histogram.unwrap().total() as usize, expected);
}

#[test]
fn similarity_is_bit_identical_across_pool_sizes() {
    let fixture = build_fixture();
    let queries: Vec<ObjectRef> = (0..4).map(ObjectRef::pointcloud).collect();
    let targets: Vec<ObjectRef> = (4..8).map(ObjectRef::pointcloud).collect();

    let run = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
        pool.install(|| {
            fixture
                .engine
                .compute_similarity(
                    "det",
                    &fixture.config,
                    queries.clone(),
                    targets.clone(),
                    ErrorMode::FailFast,
                    Symmetry::OneDirectional,
                    &CancelToken::new(),
                )
                .unwrap()
        })
    };

    let reference = run(1);
    let reference_scores = reference.scoring.unwrap();
    for threads in [2, 4, 7] {
        let result = run(threads);
        assert_eq!(
            result.scoring.unwrap().as_slice(),
            reference_scores.as_slice(),
            "{} threads diverged",
            threads
        );
    }
}

#[test]
fn mean_symmetry_produces_transposed_matrices() {
    let fixture = build_fixture();
    let a: Vec<ObjectRef> = (0..3).map(ObjectRef::pointcloud).collect();
    let b: Vec<ObjectRef> = (3..8).map(ObjectRef::pointcloud).collect();

    let ab = fixture
        .engine
        .compute_similarity(
            "ab",
            &fixture.config,
            a.clone(),
            b.clone(),
            ErrorMode::FailFast,
            Symmetry::Mean,
            &CancelToken::new(),
        )
        .unwrap()
        .scoring
        .unwrap();
    let ba = fixture
        .engine
        .compute_similarity(
            "ba",
            &fixture.config,
            b,
            a,
            ErrorMode::FailFast,
            Symmetry::Mean,
            &CancelToken::new(),
        )
        .unwrap()
        .scoring
        .unwrap();

    assert_eq!(ab.shape(), (3, 5));
    assert_eq!(ba.shape(), (5, 3));
    for i in 0..3 {
        for j in 0..5 {
            assert!(
                (ab.get(i, j) - ba.get(j, i)).abs() < 1e-9,
                "entry ({}, {}): {} vs {}",
                i,
                j,
                ab.get(i, j),
                ba.get(j, i)
            );
        }
    }
}

#[test]
fn empty_query_and_target_lists_complete_with_zero_dimension() {
    let fixture = build_fixture();
    for (queries, targets, shape) in [
        (vec![], vec![ObjectRef::pointcloud(0)], (0, 1)),
        (vec![ObjectRef::pointcloud(0)], vec![], (1, 0)),
        (vec![], vec![], (0, 0)),
    ] {
        let similarity = fixture
            .engine
            .compute_similarity(
                "empty",
                &fixture.config,
                queries,
                targets,
                ErrorMode::FailFast,
                Symmetry::Mean,
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(similarity.job.status, JobStatus::Complete);
        assert_eq!(similarity.scoring.unwrap().shape(), shape);
    }
}

#[test]
fn serialized_entities_round_trip() {
    let fixture = build_fixture();
    let json = serde_json::to_string(&fixture.config).unwrap();
    let back: nblast_core::types::Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fixture.config);
}
