//! Criterion benchmarks for the key translation hot path.
//!
//! Run with: `cargo bench -p input`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use input::{
    BindingSet, Key, KeyEvent, KeyTranslator, KeycodeTable, Mods, OptionAsAlt, UsLayout,
};

fn binding_set(size: usize) -> BindingSet {
    let mut set = BindingSet::new();
    let keys = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m"];
    let mods = ["ctrl", "alt", "super", "ctrl+shift", "super+shift"];
    for (i, (key, modifier)) in keys
        .iter()
        .flat_map(|k| mods.iter().map(move |m| (k, m)))
        .take(size)
        .enumerate()
    {
        let line = format!("{modifier}+{key}=goto_tab:{}", i + 1);
        if set.parse_and_put(&line).is_err() {
            panic!("bad bench binding {line}");
        }
    }
    set
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    for size in [4usize, 16, 64] {
        let set = binding_set(size);
        let translator = KeyTranslator::new(&UsLayout, KeycodeTable::W3c, OptionAsAlt::False, &set);

        group.bench_with_input(BenchmarkId::new("hit", size), &size, |b, _| {
            let event = KeyEvent::press(Key::KeyA.to_raw()).with_mods(Mods::CTRL);
            b.iter(|| translator.translate(black_box(event.clone())))
        });

        group.bench_with_input(BenchmarkId::new("miss", size), &size, |b, _| {
            let event = KeyEvent::press(Key::KeyZ.to_raw());
            b.iter(|| translator.translate(black_box(event.clone())))
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_binding", |b| {
        b.iter(|| input::parse_binding(black_box("global:ctrl+shift+arrow_up=goto_split:up")))
    });
}

criterion_group!(benches, bench_translate, bench_parse);
criterion_main!(benches);
