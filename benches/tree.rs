extern crate avlg;

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

fn shuffled(n: usize) -> Vec<usize> {
    let mut keys: Vec<usize> = (0..n).collect();
    keys.shuffle(&mut ChaCha8Rng::seed_from_u64(47));
    keys
}

fn insert(c: &mut Criterion) {
    let keys = shuffled(1000);
    let mut group = c.benchmark_group("insert");
    for g in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("avlg", g), &g, |b, &g| {
            b.iter(|| {
                let mut tree = avlg::AvlgTree::new(g).unwrap();
                for k in keys.iter() {
                    tree.insert(*k);
                }
                black_box(tree.height())
            })
        });
    }
    group.bench_function("rbtree", |b| {
        b.iter(|| {
            let mut tree = rbtree::RBTree::<usize, ()>::new();
            for k in keys.iter() {
                tree.insert(*k, ());
            }
            black_box(tree.len())
        })
    });
    group.finish();
}

fn search(c: &mut Criterion) {
    let keys = shuffled(1000);
    let mut group = c.benchmark_group("search");
    for g in [1, 2, 4, 8] {
        let tree: avlg::AvlgTree<usize> = {
            let mut tree = avlg::AvlgTree::new(g).unwrap();
            tree.extend(keys.iter().copied());
            tree
        };
        group.bench_with_input(BenchmarkId::new("avlg", g), &tree, |b, tree| {
            b.iter(|| {
                for k in keys.iter() {
                    black_box(tree.contains(k));
                }
            })
        });
    }
    group.finish();
}

fn delete(c: &mut Criterion) {
    let keys = shuffled(1000);
    let mut group = c.benchmark_group("delete");
    for g in [1, 2, 4, 8] {
        let mut full = avlg::AvlgTree::new(g).unwrap();
        full.extend(keys.iter().copied());
        group.bench_with_input(BenchmarkId::new("avlg", g), &full, |b, full| {
            b.iter(|| {
                let mut tree = full.clone();
                for k in keys.iter() {
                    let _ = black_box(tree.delete(k));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, insert, search, delete);
criterion_main!(benches);
