use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use variant_matrix::config::parse_matrix;
use variant_matrix::core::matrix::{expand, select};
use variant_matrix::core::models::{DbBackend, Variant};
use variant_matrix::core::runner::{CommandRunner, Runner};
use variant_matrix::infra::command::SystemExecutor;

const RUNTIMES: [&str; 4] = ["3.6", "3.7", "3.8", "3.9"];
const FRAMEWORKS: [&str; 4] = ["2.2", "3.0", "3.1", "3.2"];
const BACKENDS: [&str; 2] = ["postgres", "sqlite"];

/// Builds a config text declaring every combination `repeat` times.
fn large_matrix(repeat: usize) -> String {
    let mut text = String::from(
        "[axes]\nruntime = [\"3.6\", \"3.7\", \"3.8\", \"3.9\"]\nframework = [\"2.2\", \"3.0\", \"3.1\", \"3.2\"]\n\n[runner]\ncommand = \"tox\"\n",
    );
    for _ in 0..repeat {
        for runtime in RUNTIMES {
            for framework in FRAMEWORKS {
                for backend in BACKENDS {
                    text.push_str(&format!(
                        "\n[[variants]]\nruntime_version = \"{runtime}\"\nframework_version = \"{framework}\"\ndb_backend = \"{backend}\"\n"
                    ));
                }
            }
        }
    }
    text
}

fn bench_expansion(c: &mut Criterion) {
    let text = large_matrix(32);
    let config = parse_matrix(&text).expect("benchmark matrix parses");
    let installed = |_: &str| true;

    c.bench_function("parse_matrix_1024", |b| {
        b.iter(|| parse_matrix(black_box(&text)).expect("parses"))
    });

    c.bench_function("expand_1024", |b| {
        b.iter(|| expand(black_box(&config), &installed).expect("expands"))
    });

    let variants = expand(&config, &installed).expect("expands");
    let filters = vec!["py3.9-dj3.2-sqlite".to_string(), "17".to_string()];
    c.bench_function("select_1024", |b| {
        b.iter(|| select(black_box(variants.clone()), black_box(&filters)).expect("selects"))
    });
}

fn bench_run_variant(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let config = parse_matrix("[runner]\ncommand = \"true\"\n").expect("parses");
    let variant = Variant::new(1, "3.7", "2.2", DbBackend::Sqlite);
    let mut runner = CommandRunner::new(SystemExecutor, config.runner, PathBuf::from("."));

    c.bench_function("run_true_command", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = runner.run(&variant).await;
            })
        });
    });
}

criterion_group!(benches, bench_expansion, bench_run_variant);
criterion_main!(benches);
