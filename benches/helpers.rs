use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use postbridge::address::EmailAddress;
use postbridge::i18n::{Catalog, Lang};
use postbridge::payload::{resolve_map_with, update_deep, Map, Value};

fn bench_parse_address(c: &mut Criterion) {
    c.bench_function("parse_address_list", |b| {
        b.iter(|| {
            EmailAddress::parse_list(
                "\"Last, First\" <a@b.com>, User Two <c@d.com>, plain@addr.com",
            )
            .unwrap()
        })
    });
}

fn bench_update_deep(c: &mut Criterion) {
    let base = Map::from([
        (
            "message".to_string(),
            Value::Object(Map::from([
                ("subject".to_string(), Value::from("Hi")),
                ("headers".to_string(), Value::Object(Map::new())),
            ])),
        ),
        ("track_opens".to_string(), Value::Bool(false)),
    ]);
    let overrides = Map::from([(
        "message".to_string(),
        Value::Object(Map::from([(
            "headers".to_string(),
            Value::Object(Map::from([(
                "X-Campaign".to_string(),
                Value::from("signup"),
            )])),
        )])),
    )]);

    c.bench_function("update_deep_nested", |b| {
        b.iter(|| {
            let mut target = base.clone();
            update_deep(&mut target, overrides.clone());
            target
        })
    });
}

fn bench_resolve_map(c: &mut Criterion) {
    let mut catalog = Catalog::new();
    catalog.insert(Lang::En, "subject", "Welcome!");
    catalog.insert(Lang::En, "body", "Thanks for signing up.");
    let catalog = Arc::new(catalog);

    let map = Map::from([
        ("subject".to_string(), Value::Text(catalog.text("subject"))),
        (
            "content".to_string(),
            Value::Object(Map::from([(
                "body".to_string(),
                Value::Text(catalog.text("body")),
            )])),
        ),
    ]);

    c.bench_function("resolve_map_deferred", |b| {
        b.iter(|| resolve_map_with(map.clone(), Lang::En))
    });
}

criterion_group!(benches, bench_parse_address, bench_update_deep, bench_resolve_map);
criterion_main!(benches);
