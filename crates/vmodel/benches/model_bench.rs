use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use vmodel::reactive::Effect;
use vmodel::{ComponentDecl, Instance, ModelOptions, RawProps, Value, use_model};

fn mount(raw: RawProps) -> Instance {
    Instance::mount(ComponentDecl::new("Bench").model("modelValue"), raw)
}

fn bench_get(c: &mut Criterion) {
    let child = mount(RawProps::new().with_value("modelValue", 1));
    let model = child.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
    c.bench_function("model_get", |b| b.iter(|| black_box(model.get())));
}

fn bench_local_set(c: &mut Criterion) {
    let child = mount(RawProps::new().with_value("modelValue", 0));
    let model = child.setup(|p| use_model(p, "modelValue", ModelOptions::new()));
    let m = model.clone();
    let _reader = Effect::new(move || {
        black_box(m.get());
    });
    let mut n = 0;
    c.bench_function("model_set_local_with_reader", |b| {
        b.iter(|| {
            n += 1;
            model.set(Value::from(f64::from(n)));
        });
    });
}

fn bench_wired_set(c: &mut Criterion) {
    let raw = RawProps::new()
        .with_value("modelValue", 0)
        .with_listener("update:modelValue", |v| {
            black_box(v);
        });
    let child = mount(raw);
    let model = child.setup(|p| {
        use_model(
            p,
            "modelValue",
            ModelOptions::new().set(|v| Value::from(v.as_number().unwrap_or(0.0).round())),
        )
    });
    c.bench_function("model_set_wired_emit", |b| b.iter(|| model.set(black_box(1.5))));
}

criterion_group!(benches, bench_get, bench_local_set, bench_wired_set);
criterion_main!(benches);
