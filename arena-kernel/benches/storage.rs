// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks for dense component storage
//!
//! These benchmarks measure:
//! - Insert/remove/get performance of the sparse set
//! - Bulk iteration throughput over the packed array
//! - Two-component query iteration through the store

use arena_kernel::ecs::components::{Position, Rotation, RotationSpeed};
use arena_kernel::ecs::{ComponentStorage, ComponentStore, DenseStorage, Entity};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

fn filled(count: usize) -> DenseStorage<Position> {
    let mut storage = DenseStorage::with_capacity(count);
    for i in 0..count {
        let entity = Entity::new(i as u32, 0);
        storage.insert(entity, Position::new(i as f64, i as f64 * 2.0, i as f64 * 3.0));
    }
    storage
}

/// Benchmark: Insert N entities into storage
fn bench_storage_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage_insert");

    for entity_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entity_count), entity_count, |b, &count| {
            b.iter(|| black_box(filled(count)));
        });
    }

    group.finish();
}

/// Benchmark: Random access (get) performance
fn bench_storage_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage_random_access");

    for entity_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        let storage = filled(*entity_count);

        group.bench_with_input(BenchmarkId::from_parameter(entity_count), entity_count, |b, &count| {
            b.iter(|| {
                let mut sum = 0.0;
                // Stride through slots to defeat the prefetcher
                for i in 0..count {
                    let entity = Entity::new(((i * 7919) % count) as u32, 0);
                    if let Some(position) = storage.get(entity) {
                        sum += position.x();
                    }
                }
                black_box(sum);
            });
        });
    }

    group.finish();
}

/// Benchmark: Sequential iteration over the packed array
fn bench_storage_sequential_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage_sequential_iteration");

    for entity_count in [1000, 10000, 100000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        let storage = filled(*entity_count);

        group.bench_with_input(BenchmarkId::from_parameter(entity_count), entity_count, |b, _| {
            b.iter(|| {
                let sum: f64 = storage.components().iter().map(|p| p.x() + p.y() + p.z()).sum();
                black_box(sum);
            });
        });
    }

    group.finish();
}

/// Benchmark: Remove every other entity (swap-remove path)
fn bench_storage_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage_remove");

    for entity_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64 / 2));
        group.bench_with_input(BenchmarkId::from_parameter(entity_count), entity_count, |b, &count| {
            b.iter_batched(
                || filled(count),
                |mut storage| {
                    for i in (0..count).step_by(2) {
                        storage.remove(Entity::new(i as u32, 0));
                    }
                    storage
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark: Query iteration over (Rotation, RotationSpeed) with half coverage
fn bench_store_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_query");

    for entity_count in [1000, 10000, 100000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        let mut store = ComponentStore::new();
        for i in 0..*entity_count {
            let entity = Entity::new(i as u32, 0);
            store.set(entity, Rotation::from_yaw_degrees(i as f64));
            if i % 2 == 0 {
                store.set(entity, RotationSpeed::new(45.0));
            }
        }

        group.bench_with_input(BenchmarkId::from_parameter(entity_count), entity_count, |b, _| {
            b.iter(|| {
                let sum: f64 = store
                    .iter::<(Rotation, RotationSpeed)>()
                    .map(|(_, (rotation, speed))| rotation.yaw_degrees() * speed.degrees_per_second())
                    .sum();
                black_box(sum);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_storage_insert,
    bench_storage_random_access,
    bench_storage_sequential_iteration,
    bench_storage_remove,
    bench_store_query
);
criterion_main!(benches);
