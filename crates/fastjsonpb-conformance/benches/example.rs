//! Benchmark – generated codecs on the `example.Example` document
#![allow(missing_docs)]

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use fastjsonpb::{BufferPool, Codec, ParserOptions, marshal, unmarshal_with_options};
use fastjsonpb_conformance::example::{
    Example, ExampleNestedMsg, ExampleNestedTyp, ExampleTestOneof, Msg, Pools, Typ,
};

fn document() -> Example {
    let msg = Msg {
        bol: true,
        str: "st\"ring".into(),
        in32: 32,
        in64: 64,
        uin32: 32,
        uin64: 64,
        flt32: 32.123,
        flt64: 64.124,
        byts: Some(b"bytes".to_vec()),
        ..Default::default()
    };
    Example {
        bol: true,
        str: "s\"tring".into(),
        in32: 32,
        in64: 64,
        uin32: 32,
        uin64: 64,
        flt32: 32.123,
        flt64: 64.124,
        byts: Some(b"bytes".to_vec()),
        typ: Typ::Typc,
        nested_typ: ExampleNestedTyp::NestedTypc,
        msg: Some(Box::new(msg.clone())),
        nested_msg: Some(Box::new(ExampleNestedMsg { str: "string".into() })),
        str_arr: Some(vec!["string".into()]),
        typ_arr: Some(vec![Typ::Typb, Typ::Typc]),
        msg_arr: Some(vec![Box::new(msg); 8]),
        test_oneof: Some(ExampleTestOneof::OneofBol(false)),
        ..Default::default()
    }
}

fn bench(c: &mut Criterion) {
    let e = document();
    let buffers = BufferPool::new();
    let pools = Pools::default();
    let json = marshal(&e, &buffers);

    let mut group = c.benchmark_group("example");
    group.throughput(Throughput::Bytes(json.len() as u64));
    group.bench_function("marshal", |b| {
        b.iter(|| black_box(marshal(black_box(&e), &buffers)));
    });
    group.bench_function("unmarshal_pooled", |b| {
        b.iter(|| {
            let mut decoded = Example::new_in(&pools);
            unmarshal_with_options(black_box(&json), &mut *decoded, &pools, ParserOptions::default()).unwrap();
            decoded.destruct(&pools);
        });
    });
    group.bench_function("unmarshal_fresh", |b| {
        let fresh = Pools::default();
        b.iter(|| {
            let mut decoded = Example::default();
            unmarshal_with_options(black_box(&json), &mut decoded, &fresh, ParserOptions::default()).unwrap();
            black_box(decoded)
        });
    });
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
