// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_transition::{Cx, ElementId, FrameClock, KeyedChild, MemoryHost, NoHooks, TransitionOptions};
use understory_transition_group::{TransitionGroup, reconcile};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

fn shuffled(n: usize, seed: u64) -> Vec<u32> {
    let mut keys: Vec<u32> = (0..n as u32).collect();
    let mut rng = Rng::new(seed);
    for i in (1..keys.len()).rev() {
        keys.swap(i, rng.below(i + 1));
    }
    keys
}

/// Drop every `stride`th key and append as many fresh ones.
fn churned(n: usize, stride: usize) -> Vec<u32> {
    let mut keys: Vec<u32> = (0..n as u32).filter(|k| *k as usize % stride != 0).collect();
    let fresh = n - keys.len();
    keys.extend((n as u32)..(n + fresh) as u32);
    keys
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for &n in &[16usize, 64, 256] {
        let old: Vec<u32> = (0..n as u32).collect();
        let reversed: Vec<u32> = old.iter().rev().copied().collect();
        let mixed = shuffled(n, 0x9e37_79b9);
        let churned = churned(n, 4);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("unchanged_n{}", n), |b| {
            b.iter(|| black_box(reconcile(&old, &old)))
        });
        group.bench_function(format!("reversed_n{}", n), |b| {
            b.iter(|| black_box(reconcile(&old, &reversed)))
        });
        group.bench_function(format!("shuffled_n{}", n), |b| {
            b.iter(|| black_box(reconcile(&old, &mixed)))
        });
        group.bench_function(format!("churned_n{}", n), |b| {
            b.iter(|| black_box(reconcile(&old, &churned)))
        });
    }
    group.finish();
}

type Group = TransitionGroup<u32, ElementId, ElementId>;

fn mounted_group(n: usize) -> (MemoryHost, FrameClock, Group, Vec<KeyedChild<u32, ElementId>>) {
    let mut dom = MemoryHost::new();
    let mut clock = FrameClock::new();
    let children: Vec<_> = (0..n as u32)
        .map(|k| KeyedChild::new(k, dom.create_element("li")))
        .collect();
    let options = TransitionOptions::default().with_duration(100);
    let mut group = Group::new(options, NoHooks, children.clone());
    group.committed(&mut Cx::new(&mut dom, &mut clock), |_, el| vec![*el]);
    (dom, clock, group, children)
}

fn bench_group_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_update_commit");
    for &n in &[16usize, 64, 256] {
        let order = shuffled(n, 0x5eed);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("shuffle_n{}", n), |b| {
            b.iter_batched(
                || mounted_group(n),
                |(mut dom, mut clock, mut list, children)| {
                    let next: Vec<_> = order.iter().map(|&k| children[k as usize].clone()).collect();
                    list.update(next, &mut Cx::new(&mut dom, &mut clock));
                    let removed = list.committed(&mut Cx::new(&mut dom, &mut clock), |_, el| vec![*el]);
                    black_box((removed, clock.pending_len()));
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("remove_half_n{}", n), |b| {
            b.iter_batched(
                || mounted_group(n),
                |(mut dom, mut clock, mut list, children)| {
                    let next: Vec<_> = children.iter().step_by(2).cloned().collect();
                    list.update(next, &mut Cx::new(&mut dom, &mut clock));
                    let removed = list.committed(&mut Cx::new(&mut dom, &mut clock), |_, el| vec![*el]);
                    black_box((removed, list.len()));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_group_update);
criterion_main!(benches);
