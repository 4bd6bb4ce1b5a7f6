//! Criterion benchmarks for sticsmith critical paths
//!
//! - Catalog: decoding a full 256-card source
//! - Timeline: tick resolution on long timelines
//! - Composite: resolving all eight layers
//! - Figure: rendering a full screen with sprites

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};
use sticsmith::card::BitCard;
use sticsmith::catalog::CardCatalog;
use sticsmith::composite::{Compositor, EndBehavior, LayerBinding};
use sticsmith::figure::{render, DisplayFigure, Sprite, SpriteSize, Tile, COLUMNS, ROWS};
use sticsmith::lookup::{CardStore, GramCard, GramSlots};
use sticsmith::registry::TimelineRegistry;
use sticsmith::timeline::{Frame, Timeline};

// =============================================================================
// Test Data Generators
// =============================================================================

/// A catalog source with every card defined, alternating row notations
fn make_catalog_source() -> Value {
    let mut entries = Map::new();
    for i in 0..256usize {
        let rows: Vec<Value> = (0..8)
            .map(|r| {
                let byte = ((i * 7 + r * 13) % 256) as u8;
                match i % 3 {
                    0 => json!(byte),
                    1 => json!(format!("0x{:02X}", byte)),
                    _ => json!(format!("{:08b}", byte).replace('0', ".").replace('1', "#")),
                }
            })
            .collect();
        entries.insert(i.to_string(), json!({ "label": format!("card{}", i), "data": rows }));
    }
    Value::Object(entries)
}

fn make_timeline(name: &str, frames: usize) -> Timeline {
    Timeline::new(name)
        .with_looping(true)
        .with_frames((0..frames).map(|i| Frame::with_card(256 + (i % 64) as u16, 1 + (i % 5) as u32)))
}

fn make_gram() -> GramSlots {
    let mut gram = GramSlots::new();
    for slot in 0..64 {
        let rows = [slot as u8, 0xFF, 0x81, 0xA5, 0x5A, 0x81, 0xFF, !(slot as u8)];
        let _ = gram.set(slot, GramCard::new(BitCard::from_rows(rows)).with_color((slot % 16) as u8));
    }
    gram
}

fn make_figure() -> DisplayFigure {
    let mut figure = DisplayFigure::new("bench");
    for row in 0..ROWS {
        for col in 0..COLUMNS {
            let tile = Tile::new(((row * COLUMNS + col) % 320) as u16, ((row + col) % 16) as u8)
                .with_advance(col % 4 == 0);
            let _ = figure.set_tile(row, col, tile);
        }
    }
    for i in 0..8 {
        let sprite = Sprite::new(256 + i as u16, 20 * i as i32, 10 * i as i32)
            .with_size(SpriteSize::Size16x16)
            .with_flip(i % 2 == 0, i % 3 == 0);
        let _ = figure.set_sprite(i, sprite);
    }
    figure
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_catalog(c: &mut Criterion) {
    let source = make_catalog_source();
    let mut group = c.benchmark_group("catalog");
    group.throughput(Throughput::Elements(256));
    group.bench_function("decode_full", |b| b.iter(|| CardCatalog::from_value(black_box(&source))));
    group.finish();
}

fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_resolve");
    for frames in [8usize, 256, 4096] {
        let timeline = make_timeline("t", frames);
        let total = timeline.total_duration();
        group.bench_with_input(BenchmarkId::from_parameter(frames), &timeline, |b, t| {
            b.iter(|| t.resolve(black_box(total * 3 + 1), None).len())
        });
    }
    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let registry: TimelineRegistry = (0..8).map(|i| make_timeline(&format!("t{}", i), 64 * (i + 1))).collect();
    let mut composite = Compositor::new("bench");
    let behaviors = [EndBehavior::Loop, EndBehavior::Hold, EndBehavior::Hide];
    for i in 0..8 {
        composite.add_layer(LayerBinding::new(format!("t{}", i)).with_end_behavior(behaviors[i % 3]));
    }
    let catalog = CardCatalog::new();
    let gram = make_gram();
    let store = CardStore::new(&catalog, &gram);

    c.bench_function("composite_resolve", |b| {
        b.iter(|| composite.resolve(black_box(1000), &registry, &store))
    });
}

fn bench_render(c: &mut Criterion) {
    let catalog = CardCatalog::from_value(&make_catalog_source()).catalog;
    let gram = make_gram();
    let store = CardStore::new(&catalog, &gram);
    let figure = make_figure();

    c.bench_function("figure_render", |b| b.iter(|| render(black_box(&figure), &store)));
}

criterion_group!(benches, bench_catalog, bench_timeline, bench_composite, bench_render);
criterion_main!(benches);
