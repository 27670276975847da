#![expect(missing_docs)]

use std::collections::HashMap;

use fastjsonpb::{Buffer, Codec, Parser, ParserOptions, Value, unmarshal_with_options};
use fastjsonpb_conformance::example::{Example, ExampleNestedMsg, ExampleNestedTyp, ExampleTestOneof, Msg, Pools, Typ};
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

const DECODE_ALL: ParserOptions = ParserOptions {
    decode_escapes: true,
    decode_base64_bytes: true,
};

#[cfg(not(miri))]
const TESTS: u64 = 300;
#[cfg(miri)]
const TESTS: u64 = 5;

fn finite32(g: &mut Gen) -> f32 {
    let mut value = f32::arbitrary(g);
    while !value.is_finite() {
        value = f32::arbitrary(g);
    }
    value
}

fn finite64(g: &mut Gen) -> f64 {
    let mut value = f64::arbitrary(g);
    while !value.is_finite() {
        value = f64::arbitrary(g);
    }
    value
}

fn msg(g: &mut Gen) -> Msg {
    Msg {
        bol: bool::arbitrary(g),
        str: String::arbitrary(g),
        in32: i32::arbitrary(g),
        in64: i64::arbitrary(g),
        uin32: u32::arbitrary(g),
        uin64: u64::arbitrary(g),
        flt32: finite32(g),
        flt64: finite64(g),
        byts: Option::arbitrary(g),
        r#type: String::arbitrary(g),
    }
}

fn typ(g: &mut Gen) -> Typ {
    match u8::arbitrary(g) % 3 {
        0 => Typ::Typa,
        1 => Typ::Typb,
        _ => Typ::Typc,
    }
}

fn boxed_msgs(g: &mut Gen) -> Vec<Box<Msg>> {
    (0..usize::arbitrary(g) % 4).map(|_| Box::new(msg(g))).collect()
}

#[derive(Clone, Debug)]
struct AnyExample(Example);

impl Arbitrary for AnyExample {
    fn arbitrary(g: &mut Gen) -> Self {
        let nested_typ = match u8::arbitrary(g) % 3 {
            0 => ExampleNestedTyp::NestedTypa,
            1 => ExampleNestedTyp::NestedTypb,
            _ => ExampleNestedTyp::NestedTypc,
        };
        let test_oneof = match u8::arbitrary(g) % 4 {
            0 => None,
            1 => Some(ExampleTestOneof::OneofBol(bool::arbitrary(g))),
            2 => Some(ExampleTestOneof::OneofMsg(Box::new(msg(g)))),
            _ => Some(ExampleTestOneof::OneofStr(String::arbitrary(g))),
        };
        Self(Example {
            bol: bool::arbitrary(g),
            str: String::arbitrary(g),
            in32: i32::arbitrary(g),
            in64: i64::arbitrary(g),
            uin32: u32::arbitrary(g),
            uin64: u64::arbitrary(g),
            flt32: finite32(g),
            flt64: finite64(g),
            byts: Option::arbitrary(g),
            typ: typ(g),
            nested_typ,
            msg: bool::arbitrary(g).then(|| Box::new(msg(g))),
            nested_msg: bool::arbitrary(g).then(|| {
                Box::new(ExampleNestedMsg {
                    str: String::arbitrary(g),
                })
            }),
            str_arr: Option::arbitrary(g),
            typ_arr: bool::arbitrary(g).then(|| (0..usize::arbitrary(g) % 4).map(|_| typ(g)).collect()),
            msg_arr: bool::arbitrary(g).then(|| boxed_msgs(g)),
            string_map: Option::arbitrary(g),
            msg_map: bool::arbitrary(g).then(|| {
                let keys = Vec::<i32>::arbitrary(g);
                keys.into_iter().map(|k| (k, Box::new(msg(g)))).collect::<HashMap<_, _>>()
            }),
            s64: i64::arbitrary(g),
            sf32: i32::arbitrary(g),
            fix64: u64::arbitrary(g),
            note: String::arbitrary(g),
            test_oneof,
        })
    }
}

fn encode(e: &Example) -> Vec<u8> {
    let mut buf = Buffer::new();
    e.marshal_json(&mut buf);
    buf.into_vec()
}

/// Property: decoding an encoded message reproduces it field for field.
#[test]
fn marshal_then_unmarshal_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(e: AnyExample) -> bool {
        let pools = Pools::default();
        let json = encode(&e.0);
        let mut decoded = Example::new_in(&pools);
        unmarshal_with_options(&json, &mut *decoded, &pools, DECODE_ALL).is_ok() && *decoded == e.0
    }

    QuickCheck::new()
        .tests(TESTS)
        .quickcheck(prop as fn(AnyExample) -> bool);
}

/// Property: a field appears in the output exactly when it is not empty.
#[test]
fn omitted_iff_empty_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(e: AnyExample) -> TestResult {
        let e = e.0;
        let encoded = encode(&e);
        let mut p = Parser::new(&encoded);
        let json = p.parse();
        if !matches!(json, Value::Object(_)) || p.offset() != encoded.len() {
            return TestResult::error(format!(
                "output does not read back as one object: {}",
                String::from_utf8_lossy(&encoded)
            ));
        }
        let present = |key: &str| json.get(key).is_some();
        TestResult::from_bool(
            present("bol") != e.is_empty_bol()
                && present("str") != e.is_empty_str()
                && present("in64") != e.is_empty_in64()
                && present("flt32") != e.is_empty_flt32()
                && present("byts") != e.is_empty_byts()
                && present("typ") != e.is_empty_typ()
                && present("nestedTyp") != e.is_empty_nested_typ()
                && present("msg") != e.is_empty_msg()
                && present("typArr") != e.is_empty_typ_arr()
                && present("msgMap") != e.is_empty_msg_map()
                && present("sf32") != e.is_empty_sf32()
                && present("note") != e.is_empty_note(),
        )
    }

    QuickCheck::new()
        .tests(TESTS)
        .quickcheck(prop as fn(AnyExample) -> TestResult);
}

#[test]
fn extreme_floats_are_written_in_full() {
    let e = Example {
        flt32: f32::MIN,
        flt64: f64::MAX,
        ..Default::default()
    };
    let encoded = encode(&e);
    assert!(!encoded.contains(&b'e'));
    let json = Parser::new(&encoded).parse();
    assert_eq!(json.get("flt64").and_then(Value::as_f64), Some(f64::MAX));
    #[allow(clippy::cast_possible_truncation)]
    let flt32 = json.get("flt32").and_then(Value::as_f64).map(|v| v as f32);
    assert_eq!(flt32, Some(f32::MIN));
}

/// Property: the destructor leaves a zeroed instance in the pool.
#[test]
fn destruct_zeroes_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(e: AnyExample) -> bool {
        let pools = Pools::default();
        let nested = usize::from(e.0.msg.is_some());
        Box::new(e.0).destruct(&pools);
        pools.example.len() == 1
            && pools.msg.len() >= nested
            && *pools.example.acquire() == Example::default()
    }

    QuickCheck::new()
        .tests(TESTS)
        .quickcheck(prop as fn(AnyExample) -> bool);
}
