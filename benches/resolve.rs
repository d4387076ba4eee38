#![allow(unused)]
extern crate evalscope;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use evalscope::prelude::*;
use std::hint::black_box;

const MVID: ModuleId = ModuleId::from_bytes([0x5A; 16]);
const TYPES: u32 = 500;

/// A module with `TYPES` classes, each holding three methods and an iterator state machine
/// whose `MoveNext` is the last method of the type.
fn wide_image() -> MetadataImage {
    let mut builder = MetadataImageBuilder::new("Bench.dll", MVID);
    builder.assembly("Bench");

    for index in 0..TYPES {
        let name = format!("Type{index}");
        let ty = builder.add_type("Bench", name.as_str(), TypeAttributes::PUBLIC);
        builder.add_method(".ctor", 0x1886).unwrap();
        builder.add_method("Run", 0x0086).unwrap();
        let items = builder.add_method("Items", 0x0096).unwrap();

        builder
            .add_nested_type(ty, "<Items>d__2", TypeAttributes::NESTED_PRIVATE)
            .unwrap();
        builder.add_method("MoveNext", 0x01E1).unwrap();
        builder
            .add_string_attribute(
                items,
                "System.Runtime.CompilerServices",
                "IteratorStateMachineAttribute",
                Some(&format!("Bench.{name}+<Items>d__2")),
            )
            .unwrap();
    }

    builder.build()
}

fn move_next(index: u32) -> Token {
    Token::new(0x0600_0000 | (index * 4 + 4))
}

/// Cold resolution: a fresh context per iteration, as at every debugger stop
fn bench_cold(c: &mut Criterion) {
    let image = wide_image();

    c.bench_function("resolve_source_method_cold", |b| {
        b.iter_batched(
            || EvaluationContext::from_blocks(&[image.clone().into()]).unwrap(),
            |context| {
                let method = context
                    .get_source_method(MVID, black_box(move_next(TYPES / 2)))
                    .unwrap();
                black_box(method)
            },
            BatchSize::SmallInput,
        );
    });
}

/// Warm resolution: every token already decoded once
fn bench_warm(c: &mut Criterion) {
    let context = EvaluationContext::from_blocks(&[wide_image().into()]).unwrap();
    for index in 0..TYPES {
        context.get_source_method(MVID, move_next(index)).unwrap();
    }

    let mut group = c.benchmark_group("resolve_warm");
    group.bench_function("get_method", |b| {
        b.iter(|| black_box(context.get_method(MVID, black_box(move_next(7))).unwrap()));
    });
    group.bench_function("get_source_method", |b| {
        b.iter(|| black_box(context.get_source_method(MVID, black_box(move_next(7))).unwrap()));
    });
    group.finish();
}

/// Context assembly from many small modules
fn bench_assemble(c: &mut Criterion) {
    let blocks: Vec<MetadataBlock> = (0..200_u8)
        .map(|index| {
            let mut bytes = [0_u8; 16];
            bytes[0] = index;
            let mut builder =
                MetadataImageBuilder::new(format!("M{index}.dll"), ModuleId::from_bytes(bytes));
            builder.assembly(format!("M{index}"));
            builder.add_type("M", "Program", TypeAttributes::PUBLIC);
            builder.build().into()
        })
        .collect();

    c.bench_function("from_blocks_200", |b| {
        b.iter(|| black_box(EvaluationContext::from_blocks(black_box(&blocks)).unwrap()));
    });
}

criterion_group!(benches, bench_cold, bench_warm, bench_assemble);
criterion_main!(benches);
