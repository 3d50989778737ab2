#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vmodel::{ComponentDecl, Instance, ModelOptions, RawProps, Value, use_model};

#[derive(Arbitrary, Debug)]
enum Op {
    Set(i8),
    OwnerUpdate(i8),
    ToggleWiring,
}

fuzz_target!(|ops: Vec<Op>| {
    let raw = |v: i8, wired: bool| {
        let raw = RawProps::new().with_value("modelValue", i32::from(v));
        if wired {
            raw.with_listener("update:modelValue", |_| {})
        } else {
            raw
        }
    };
    let mut wired = false;
    let mut owner = 0i8;
    let child = Instance::mount(ComponentDecl::new("Fuzz").model("modelValue"), raw(owner, wired));
    let model = child.setup(|p| {
        use_model(
            p,
            "modelValue",
            ModelOptions::new().set(|v| Value::from(v.as_number().unwrap_or(0.0) % 10.0)),
        )
    });

    for op in ops {
        match op {
            Op::Set(v) => {
                let before = model.get();
                model.set(i32::from(v));
                if wired {
                    assert_eq!(model.get(), before);
                } else {
                    assert_eq!(model.get(), Value::from(i32::from(v)));
                }
            }
            Op::OwnerUpdate(v) => {
                let changed = v != owner;
                owner = v;
                let before = model.get();
                child.update_raw(raw(owner, wired));
                if changed {
                    assert_eq!(model.get(), Value::from(i32::from(v)));
                } else {
                    assert_eq!(model.get(), before);
                }
            }
            Op::ToggleWiring => {
                wired = !wired;
                child.update_raw(raw(owner, wired));
            }
        }
    }
});
