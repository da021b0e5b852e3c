use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use repo_finder::core::{collect_git_repos, CrawlOptions};
use std::fs;
use std::hint::black_box;
use tempfile::TempDir;

fn setup_many_repos(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for i in 0..count {
        let repo_path = root.join(format!("group-{}", i % 10)).join(format!("repo-{}", i));
        fs::create_dir_all(repo_path.join(".git")).unwrap();
        fs::create_dir_all(repo_path.join("src")).unwrap();
    }

    temp_dir
}

fn bench_discovery(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let count = 100;
    let temp_dir = setup_many_repos(count);
    let path = temp_dir.path().to_path_buf();

    let mut group = c.benchmark_group("discovery_100_repos");
    for concurrency in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(concurrency), &concurrency, |b, &concurrency| {
            b.to_async(&runtime).iter(|| async {
                let options = CrawlOptions::new().with_concurrency(concurrency);
                let repos = collect_git_repos(&path, options).await.unwrap();
                black_box(repos)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_discovery);
criterion_main!(benches);
