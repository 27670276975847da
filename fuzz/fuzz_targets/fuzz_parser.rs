#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use fastjsonpb::{Buffer, Parser, ParserOptions, Value, unmarshal_with_options};
use fastjsonpb_conformance::example::{Example, Pools};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::Map;

const HEADER: usize = 1; // option flags

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Usually a well-formed document with an `Example` field or two spliced in,
/// so the structured paths get exercised as well as the error paths.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size <= HEADER {
        return fuzzer_mutate(data, size, max_size);
    }
    if size <= HEADER || seed % 4 == 0 {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x03);
        let value = loop {
            let len = with_rng(|rng| rng.random_range(0..max_size.max(2)));
            let bytes: Vec<u8> = with_rng(|rng| (0..len).map(|_| rng.random::<u8>()).collect());
            if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
                break value;
            }
        };
        let mut object = Map::new();
        object.insert("in32".into(), serde_json::json!(with_rng(|rng| rng.random::<i32>())));
        object.insert("unknown".into(), value.0);
        object.insert("strArr".into(), serde_json::json!(["a\n", "\u{2028}"]));
        let serialized = serde_json::to_vec(&object).unwrap_or_default();
        let len = serialized.len().min(max_size - HEADER).min(data.len() - HEADER);
        data[HEADER..HEADER + len].copy_from_slice(&serialized[..len]);
        HEADER + len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(serde_json::Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => serde_json::Value::Null,
            1 => serde_json::Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                serde_json::Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => serde_json::Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                serde_json::Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                serde_json::Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

fn finite(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_finite(),
        Value::Array(items) => items.iter().all(finite),
        Value::Object(map) => map.values().all(finite),
        _ => true,
    }
}

fn run(data: &[u8]) {
    let Some((&flags, data)) = data.split_first() else {
        return;
    };
    let options = ParserOptions {
        decode_escapes: flags & 1 != 0,
        decode_base64_bytes: flags & 2 != 0,
    };

    // The fallback parser never fails, and what it returns renders as JSON.
    let value = Parser::with_options(data, options).parse();
    if finite(&value) {
        let rendered = value.to_string();
        if let Err(err) = serde_json::from_str::<serde_json::Value>(&rendered) {
            panic!("rendered {rendered:?} is not JSON: {err}");
        }
    }

    // Arbitrary bytes always escape to a valid JSON string.
    let mut buf = Buffer::new();
    buf.write_byte(b'"');
    buf.write_string_bytes(data);
    buf.write_byte(b'"');
    if let Err(err) = serde_json::from_slice::<String>(buf.as_bytes()) {
        panic!("escaped {:?} is not a JSON string: {err}", buf.as_bytes());
    }

    // Generated code reports errors instead of panicking.
    let pools = Pools::default();
    let mut example = Example::new_in(&pools);
    let _ = unmarshal_with_options(data, &mut *example, &pools, options);
}

fuzz_target!(|data: &[u8]| run(data));
