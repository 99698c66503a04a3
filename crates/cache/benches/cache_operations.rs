use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use disklru_cache::{CacheConfigBuilder, CleanupMode, DiskLruCache};
use tempfile::TempDir;

fn open(dir: &TempDir, max_size: u64) -> DiskLruCache {
    let config = CacheConfigBuilder::new()
        .with_directory(dir.path())
        .with_value_count(1)
        .with_max_size(max_size)
        .with_cleanup_mode(CleanupMode::Background)
        .build()
        .unwrap();
    DiskLruCache::open_with_config(config).unwrap()
}

fn put(cache: &DiskLruCache, key: &str, value: &[u8]) {
    let mut editor = cache.edit(key).unwrap();
    editor.set(0, value).unwrap();
    editor.commit().unwrap();
}

fn benchmark_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for size in [64_usize, 4096, 65536] {
        let temp_dir = TempDir::new().unwrap();
        let cache = open(&temp_dir, u64::MAX);
        let value = vec![0xAB_u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            let mut i = 0_u64;
            b.iter(|| {
                put(&cache, &format!("key-{}", i % 256), value);
                i += 1;
            });
        });

        cache.close().unwrap();
    }

    group.finish();
}

fn benchmark_get(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir, u64::MAX);
    for i in 0..256 {
        put(&cache, &format!("key-{i}"), &[0x11; 1024]);
    }

    c.bench_function("get_hit_1k", |b| {
        let mut i = 0_u64;
        b.iter(|| {
            let mut snapshot = cache.get(&format!("key-{}", i % 256)).unwrap().unwrap();
            i += 1;
            black_box(snapshot.read_to_end(0).unwrap())
        });
    });

    c.bench_function("get_miss", |b| {
        b.iter(|| black_box(cache.get("absent").unwrap().is_none()));
    });

    cache.close().unwrap();
}

fn benchmark_eviction(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    // Room for about 64 values, so steady-state commits evict.
    let cache = open(&temp_dir, 64 * 1024);
    let value = vec![0x22_u8; 1024];

    c.bench_function("commit_with_eviction", |b| {
        let mut i = 0_u64;
        b.iter(|| {
            put(&cache, &format!("key-{i}"), &value);
            i += 1;
        });
    });

    cache.close().unwrap();
}

fn benchmark_reopen(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir, u64::MAX);
    for i in 0..1000 {
        put(&cache, &format!("key-{i}"), b"value");
    }
    cache.close().unwrap();

    c.bench_function("reopen_1000_entries", |b| {
        b.iter(|| {
            let cache = open(&temp_dir, u64::MAX);
            black_box(cache.len());
            cache.close().unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_commit,
    benchmark_get,
    benchmark_eviction,
    benchmark_reopen
);
criterion_main!(benches);
