//! Rust source for a resolved [`Schema`].
//!
//! The output is meant to be `include!`d into a module of a crate that
//! depends on the runtime. It holds, in order:
//!
//! - a pool set with one [`Pool`](fastjsonpb::Pool) per message type,
//! - every enum with its `Enumeration` impl,
//! - every message struct, its oneof enums, emptiness predicates,
//!   `new_in` constructor and `Codec` impl.
//!
//! Marshalers write a `,` after every member and retract the last one with
//! `fix_symbol`. Unmarshalers call `assert_symbol(b',')` after every member
//! and let the parser decide whether the separator was needed.

mod enums;
mod messages;

use core::fmt::Write as _;

use fastjsonpb::Buffer;

use crate::{
    GeneratorOptions,
    ir::{Cardinality, Field, Kind, Schema},
    naming,
};

/// Renders `schema` as Rust source.
#[must_use]
pub fn generate(schema: &Schema, options: &GeneratorOptions) -> String {
    let cx = Context {
        schema,
        rt: &options.runtime_path,
        pools: &options.pools_name,
    };
    let mut out = Printer::default();

    out.line("// Code generated by fastjsonpb-gen. DO NOT EDIT.");
    for source in &schema.sources {
        out.line(format!("// source: {source}"));
    }
    out.blank();

    cx.pools_struct(&mut out);
    for e in &schema.enums {
        log::debug!("emitting enum {}", e.full_name);
        cx.enumeration(&mut out, e);
    }
    for m in &schema.messages {
        log::debug!("emitting message {}", m.full_name);
        cx.message(&mut out, m);
    }
    out.finish()
}

/// Indenting line writer.
#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Writes `text` and indents what follows.
    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    /// Dedents and writes `text`.
    fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

struct Context<'a> {
    schema: &'a Schema,
    rt: &'a str,
    pools: &'a str,
}

impl Context<'_> {
    fn pools_struct(&self, out: &mut Printer) {
        out.line("/// One instance pool per message type.");
        out.line("#[derive(Debug, Default)]");
        if self.schema.messages.is_empty() {
            out.line(format!("pub struct {};", self.pools));
            out.blank();
            return;
        }
        out.open(format!("pub struct {} {{", self.pools));
        for m in &self.schema.messages {
            out.line(format!("pub {}: {}::Pool<{}>,", naming::pool_field(&m.rust_name), self.rt, m.rust_name));
        }
        out.close("}");
        out.blank();
    }

    /// The type of a value of `kind` on its own.
    fn scalar_type(&self, kind: Kind) -> String {
        match kind {
            Kind::Bool => "bool".into(),
            Kind::I32 => "i32".into(),
            Kind::I64 => "i64".into(),
            Kind::U32 => "u32".into(),
            Kind::U64 => "u64".into(),
            Kind::F32 => "f32".into(),
            Kind::F64 => "f64".into(),
            Kind::String => "::std::string::String".into(),
            Kind::Bytes => "::std::vec::Vec<u8>".into(),
            Kind::Enum(i) => self.schema.enums[i].rust_name.clone(),
            Kind::Message(i) => self.schema.messages[i].rust_name.clone(),
        }
    }

    /// The type of a list element, map value or oneof payload.
    fn element_type(&self, kind: Kind) -> String {
        match kind {
            Kind::Message(_) => format!("::std::boxed::Box<{}>", self.scalar_type(kind)),
            _ => self.scalar_type(kind),
        }
    }

    fn field_type(&self, field: &Field) -> String {
        match field.cardinality {
            Cardinality::Singular => match field.kind {
                Kind::Bytes | Kind::Message(_) => {
                    format!("::core::option::Option<{}>", self.element_type(field.kind))
                }
                _ => self.scalar_type(field.kind),
            },
            Cardinality::List => format!(
                "::core::option::Option<::std::vec::Vec<{}>>",
                self.element_type(field.kind)
            ),
            Cardinality::Map { key } => format!(
                "::core::option::Option<::std::collections::HashMap<{}, {}>>",
                self.scalar_type(key),
                self.element_type(field.kind)
            ),
        }
    }

    /// A statement writing the value of `kind` found at `place` to `buf`.
    /// `place` is a reference when `by_ref` holds and a field access
    /// otherwise.
    fn write_value(&self, kind: Kind, place: &str, by_ref: bool) -> String {
        let value = if by_ref { format!("*{place}") } else { place.to_owned() };
        let reference = if by_ref { place.to_owned() } else { format!("&{place}") };
        match kind {
            Kind::Bool => format!("buf.write_bool({value});"),
            Kind::I32 => format!("buf.write_int32({value});"),
            Kind::I64 => format!("buf.write_int64({value});"),
            Kind::U32 => format!("buf.write_uint32({value});"),
            Kind::U64 => format!("buf.write_uint64({value});"),
            Kind::F32 => format!("buf.write_float32({value});"),
            Kind::F64 => format!("buf.write_float64({value});"),
            Kind::String => format!("buf.write_string_quoted({reference});"),
            Kind::Bytes => format!("buf.write_bytes({reference});"),
            Kind::Enum(_) => format!(
                "buf.write_string_quoted({}::Enumeration::as_str_name({reference}));",
                self.rt
            ),
            Kind::Message(_) => format!(
                "<{} as {}::Codec>::marshal_json({reference}, buf);",
                self.scalar_type(kind),
                self.rt
            ),
        }
    }

    /// An expression reading an owned value of `kind` from `p`.
    fn read_value(&self, kind: Kind) -> String {
        match kind {
            Kind::Bool => "p.bool()?".into(),
            Kind::I32 => "p.int32()?".into(),
            Kind::I64 => "p.int64()?".into(),
            Kind::U32 => "p.uint32()?".into(),
            Kind::U64 => "p.uint64()?".into(),
            Kind::F32 => "p.float32()?".into(),
            Kind::F64 => "p.float64()?".into(),
            Kind::String => "p.str()?.into_owned()".into(),
            Kind::Bytes => "p.bytes()?.into_owned()".into(),
            Kind::Enum(_) => format!("p.enumeration::<{}>()?", self.scalar_type(kind)),
            Kind::Message(_) => {
                let ty = self.scalar_type(kind);
                format!(
                    "{{ let mut m = {ty}::new_in(pools); <{ty} as {}::Codec>::unmarshal_json(&mut m, p, pools)?; m }}",
                    self.rt
                )
            }
        }
    }

    /// A statement returning the boxed message `value` to its pool.
    fn destruct_value(&self, kind: Kind, value: &str) -> String {
        format!(
            "<{} as {}::Codec>::destruct({value}, pools);",
            self.scalar_type(kind),
            self.rt
        )
    }
}

/// A byte string literal holding `"json_name":` followed by `suffix`.
fn key_literal(json_name: &str, suffix: &str) -> String {
    let mut key = Buffer::new();
    key.write_string_quoted(json_name);
    key.write_byte(b':');
    key.write_raw(suffix);
    byte_literal(key.as_bytes())
}

fn byte_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b\"");
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('"');
    out
}
