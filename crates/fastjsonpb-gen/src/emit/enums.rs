use super::{Context, Printer};
use crate::ir::{Enum, EnumValue};

impl Context<'_> {
    pub(super) fn enumeration(&self, out: &mut Printer, e: &Enum) {
        let variants = variants(e);
        let Some(default) = variants
            .iter()
            .find(|v| v.number == 0)
            .or_else(|| variants.first())
            .copied()
        else {
            return;
        };

        out.line(format!("/// `{}`", e.full_name));
        out.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]");
        out.line("#[repr(i32)]");
        out.open(format!("pub enum {} {{", e.rust_name));
        for v in &variants {
            if v.number == default.number {
                out.line("#[default]");
            }
            out.line(format!("{} = {},", v.rust_name, v.number));
        }
        out.close("}");
        out.blank();

        out.open(format!("impl {}::Enumeration for {} {{", self.rt, e.rust_name));
        out.line(format!("const NAME: &'static str = {:?};", e.full_name));
        out.blank();

        out.open("fn from_i32(value: i32) -> ::core::option::Option<Self> {");
        out.open("match value {");
        for v in &variants {
            out.line(format!("{} => Some(Self::{}),", v.number, v.rust_name));
        }
        out.line("_ => None,");
        out.close("}");
        out.close("}");
        out.blank();

        out.open("fn from_str_name(name: &str) -> ::core::option::Option<Self> {");
        out.open("match name {");
        for v in &e.values {
            let variant = variants
                .iter()
                .find(|first| first.number == v.number)
                .copied()
                .unwrap_or(default);
            out.line(format!("{:?} => Some(Self::{}),", v.name, variant.rust_name));
        }
        out.line("_ => None,");
        out.close("}");
        out.close("}");
        out.blank();

        out.open("fn as_str_name(&self) -> &'static str {");
        out.open("match self {");
        for v in &variants {
            out.line(format!("Self::{} => {:?},", v.rust_name, v.name));
        }
        out.close("}");
        out.close("}");
        out.close("}");
        out.blank();
    }
}

/// The first value declared for each number; later ones are aliases.
fn variants(e: &Enum) -> Vec<&EnumValue> {
    let mut seen = Vec::new();
    e.values
        .iter()
        .filter(|v| {
            let first = !seen.contains(&v.number);
            seen.push(v.number);
            first
        })
        .collect()
}
