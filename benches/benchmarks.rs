//! Performance benchmarks for retype

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use retype::test_utils::{LEGACY_GROUPED, TestTree, UNRELATED};
use retype::walker::collect_candidates;
use retype::{DriverConfig, Mapping, RewriteOptions, Rewriter, WalkerConfig, run};

// A handler-sized file with many selectors spread over a long body
fn large_legacy_source(functions: usize) -> String {
    let mut source = String::from(
        "package handlers\n\nimport (\n\t\"fmt\"\n\t\"sfDBTools/internal/types\"\n)\n\n",
    );
    for i in 0..functions {
        source.push_str(&format!(
            "// handle{i} does something with types.DBInfo\nfunc handle{i}(info types.DBInfo, opts types.ScanOptions) string {{\n\treturn fmt.Sprintf(\"%v %v\", info, opts)\n}}\n\n"
        ));
    }
    source
}

fn rewriter() -> Rewriter {
    Rewriter::new(Mapping::builtin().unwrap(), RewriteOptions::default())
}

fn bench_rewrite(c: &mut Criterion) {
    let rewriter = rewriter();
    let large = large_legacy_source(200);

    let mut group = c.benchmark_group("rewrite");

    group.bench_function("unrelated", |b| {
        b.iter(|| rewriter.rewrite(black_box(UNRELATED)))
    });

    group.bench_function("legacy_grouped", |b| {
        b.iter(|| rewriter.rewrite(black_box(LEGACY_GROUPED)))
    });

    group.bench_function("legacy_large", |b| {
        b.iter(|| rewriter.rewrite(black_box(&large)))
    });

    group.finish();
}

fn bench_mapping_build(c: &mut Criterion) {
    c.bench_function("mapping_builtin", |b| b.iter(Mapping::builtin));
}

fn bench_collect_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_candidates");

    for count in [100, 1000] {
        let tree = TestTree::new();
        tree.populate(count, 5);
        let config = WalkerConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| collect_candidates(black_box(tree.path()), &config))
        });
    }

    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let rewriter = rewriter();
    let tree = TestTree::new();
    tree.populate(500, 3);

    let mut group = c.benchmark_group("dry_run");

    for workers in [1, 0] {
        let config = DriverConfig {
            parallel_workers: workers,
            ..Default::default()
        };
        let label = if workers == 1 { "sequential" } else { "parallel" };
        group.bench_function(label, |b| {
            b.iter(|| run(black_box(tree.path()), &rewriter, &config))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rewrite,
    bench_mapping_build,
    bench_collect_candidates,
    bench_run
);

criterion_main!(benches);
