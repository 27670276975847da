use super::{Context, Printer, key_literal};
use crate::{
    ir::{Cardinality, Field, Kind, Message, Oneof},
    naming,
};

fn field_ident(field: &Field) -> String {
    naming::ident(&naming::snake(&field.name))
}

fn oneof_ident(oneof: &Oneof) -> String {
    naming::ident(&naming::snake(&oneof.name))
}

fn variant_name(field: &Field) -> String {
    naming::ident(&naming::upper_camel(&field.name))
}

impl Context<'_> {
    pub(super) fn message(&self, out: &mut Printer, m: &Message) {
        self.message_struct(out, m);
        for (index, oneof) in m.oneofs.iter().enumerate() {
            self.oneof_enum(out, m, index, oneof);
        }
        self.inherent_impl(out, m);

        out.open(format!("impl {}::Codec for {} {{", self.rt, m.rust_name));
        out.line(format!("type Pools = {};", self.pools));
        out.blank();
        self.marshal(out, m);
        out.blank();
        self.unmarshal(out, m);
        out.blank();
        self.destruct(out, m);
        out.close("}");
        out.blank();
    }

    fn message_struct(&self, out: &mut Printer, m: &Message) {
        out.line(format!("/// `{}`", m.full_name));
        out.line("#[derive(Debug, Clone, Default, PartialEq)]");
        if m.fields.is_empty() {
            out.line(format!("pub struct {};", m.rust_name));
            out.blank();
            return;
        }
        out.open(format!("pub struct {} {{", m.rust_name));
        for field in m.fields.iter().filter(|f| f.oneof.is_none()) {
            out.line(format!("pub {}: {},", field_ident(field), self.field_type(field)));
        }
        for oneof in &m.oneofs {
            out.line(format!(
                "pub {}: ::core::option::Option<{}>,",
                oneof_ident(oneof),
                oneof.rust_name
            ));
        }
        out.close("}");
        out.blank();
    }

    fn oneof_enum(&self, out: &mut Printer, m: &Message, index: usize, oneof: &Oneof) {
        out.line(format!("/// `{}.{}`", m.full_name, oneof.name));
        out.line("#[derive(Debug, Clone, PartialEq)]");
        out.open(format!("pub enum {} {{", oneof.rust_name));
        for field in m.oneof_fields(index) {
            out.line(format!("{}({}),", variant_name(field), self.element_type(field.kind)));
        }
        out.close("}");
        out.blank();

        let members: Vec<_> = m.oneof_fields(index).collect();
        let messages: Vec<_> = members.iter().filter(|f| matches!(f.kind, Kind::Message(_))).collect();

        out.open(format!("impl {} {{", oneof.rust_name));
        out.line("/// Returns a message payload to its pool.");
        if messages.is_empty() {
            out.line(format!("pub fn destruct(self, _pools: &{}) {{}}", self.pools));
        } else {
            out.open(format!("pub fn destruct(self, pools: &{}) {{", self.pools));
            if messages.len() == 1 && members.len() > 1 {
                let field = messages[0];
                out.open(format!("if let Self::{}(v) = self {{", variant_name(field)));
                out.line(self.destruct_value(field.kind, "v"));
                out.close("}");
            } else {
                out.open("match self {");
                for field in &messages {
                    out.line(format!(
                        "Self::{}(v) => {}",
                        variant_name(field),
                        self.destruct_value(field.kind, "v").trim_end_matches(';')
                    ) + ",");
                }
                if messages.len() < members.len() {
                    out.line("_ => {}");
                }
                out.close("}");
            }
            out.close("}");
        }
        out.close("}");
        out.blank();
    }

    fn inherent_impl(&self, out: &mut Printer, m: &Message) {
        out.open(format!("impl {} {{", m.rust_name));
        out.line("/// Takes an idle instance from `pools`, or allocates one.");
        out.line("#[must_use]");
        out.open(format!(
            "pub fn new_in(pools: &{}) -> ::std::boxed::Box<Self> {{",
            self.pools
        ));
        out.line(format!("pools.{}.acquire()", naming::pool_field(&m.rust_name)));
        out.close("}");

        for field in m.fields.iter().filter(|f| f.oneof.is_none()) {
            let ident = field_ident(field);
            let test = match (field.cardinality, field.kind) {
                (Cardinality::Singular, Kind::Bool) => format!("!self.{ident}"),
                (Cardinality::Singular, Kind::I32 | Kind::I64 | Kind::U32 | Kind::U64) => {
                    format!("self.{ident} == 0")
                }
                (Cardinality::Singular, Kind::F32 | Kind::F64) => format!("self.{ident} == 0.0"),
                (Cardinality::Singular, Kind::String) => format!("self.{ident}.is_empty()"),
                (Cardinality::Singular, Kind::Enum(_)) => format!("self.{ident} as i32 == 0"),
                _ => format!("self.{ident}.is_none()"),
            };
            out.blank();
            if matches!(field.kind, Kind::F32 | Kind::F64) && field.cardinality == Cardinality::Singular {
                out.line("#[allow(clippy::float_cmp)]");
            }
            out.line("#[must_use]");
            out.open(format!("pub fn is_empty_{}(&self) -> bool {{", naming::snake(&field.name)));
            out.line(test);
            out.close("}");
        }
        out.close("}");
        out.blank();
    }

    fn marshal(&self, out: &mut Printer, m: &Message) {
        out.open(format!("fn marshal_json(&self, buf: &mut {}::Buffer) {{", self.rt));
        out.line("buf.write_byte(b'{');");
        for field in m.fields.iter().filter(|f| f.oneof.is_none()) {
            let ident = field_ident(field);
            match field.cardinality {
                Cardinality::Singular if matches!(field.kind, Kind::Bytes | Kind::Message(_)) => {
                    out.open(format!("if let Some(v) = &self.{ident} {{"));
                    out.line(format!("buf.write({});", key_literal(&field.json_name, "")));
                    out.line(self.write_value(field.kind, "v", true));
                }
                Cardinality::Singular => {
                    out.open(format!("if !self.is_empty_{}() {{", naming::snake(&field.name)));
                    out.line(format!("buf.write({});", key_literal(&field.json_name, "")));
                    out.line(self.write_value(field.kind, &format!("self.{ident}"), false));
                }
                Cardinality::List => {
                    out.open(format!("if let Some(list) = &self.{ident} {{"));
                    out.line(format!("buf.write({});", key_literal(&field.json_name, "[")));
                    out.open("for v in list {");
                    out.line(self.write_value(field.kind, "v", true));
                    out.line("buf.write_byte(b',');");
                    out.close("}");
                    out.line("buf.fix_symbol();");
                    out.line("buf.write_byte(b']');");
                }
                Cardinality::Map { .. } => {
                    out.open(format!("if let Some(map) = &self.{ident} {{"));
                    out.line(format!("buf.write({});", key_literal(&field.json_name, "{")));
                    out.open("for (k, v) in map {");
                    out.line("buf.write_map_key(k);");
                    out.line(self.write_value(field.kind, "v", true));
                    out.line("buf.write_byte(b',');");
                    out.close("}");
                    out.line("buf.fix_symbol();");
                    out.line("buf.write_byte(b'}');");
                }
            }
            out.line("buf.write_byte(b',');");
            out.close("}");
        }
        for (index, oneof) in m.oneofs.iter().enumerate() {
            out.open(format!("if let Some(oneof) = &self.{} {{", oneof_ident(oneof)));
            out.open("match oneof {");
            for field in m.oneof_fields(index) {
                out.open(format!("{}::{}(v) => {{", oneof.rust_name, variant_name(field)));
                out.line(format!("buf.write({});", key_literal(&field.json_name, "")));
                out.line(self.write_value(field.kind, "v", true));
                out.close("}");
            }
            out.close("}");
            out.line("buf.write_byte(b',');");
            out.close("}");
        }
        out.line("buf.fix_symbol();");
        out.line("buf.write_byte(b'}');");
        out.close("}");
    }

    fn unmarshal(&self, out: &mut Printer, m: &Message) {
        let pools = if m.has_message_fields() || !m.oneofs.is_empty() {
            "pools"
        } else {
            "_pools"
        };
        out.open("fn unmarshal_json(");
        out.line("&mut self,");
        out.line(format!("p: &mut {}::Parser<'_>,", self.rt));
        out.line(format!("{pools}: &{},", self.pools));
        out.close(format!(") -> ::core::result::Result<(), {}::Error> {{", self.rt));
        out.indent += 1;
        out.line("p.symbol(b'{')?;");
        out.open("while !p.is_symbol(b'}') {");
        if m.fields.is_empty() {
            out.line("let _key = p.str()?;");
            out.line("p.assert_symbol(b':');");
            out.line("p.skip_value();");
        } else {
            out.line("let key = p.str()?;");
            out.line("p.assert_symbol(b':');");
            out.open("match &*key {");
            for field in &m.fields {
                self.unmarshal_arm(out, m, field);
            }
            out.line("_ => p.skip_value(),");
            out.close("}");
        }
        out.line("p.assert_symbol(b',');");
        out.close("}");
        out.line("p.assert_symbol(b',');");
        out.line("p.symbol(b'}')?;");
        out.line("Ok(())");
        out.close("}");
    }

    fn unmarshal_arm(&self, out: &mut Printer, m: &Message, field: &Field) {
        let key = format!("{:?}", field.json_name);
        let ident = field_ident(field);
        let is_message = matches!(field.kind, Kind::Message(_));

        if let Some(index) = field.oneof {
            let oneof = &m.oneofs[index];
            out.open(format!("{key} => {{"));
            out.line(format!(
                "let value = {}::{}({});",
                oneof.rust_name,
                variant_name(field),
                self.read_value(field.kind)
            ));
            out.open(format!("if let Some(old) = self.{}.replace(value) {{", oneof_ident(oneof)));
            out.line("old.destruct(pools);");
            out.close("}");
            out.close("}");
            return;
        }

        match field.cardinality {
            Cardinality::Singular if is_message => {
                out.open(format!("{key} => {{"));
                out.line(format!("let value = {};", self.read_value(field.kind)));
                out.open(format!("if let Some(old) = self.{ident}.replace(value) {{"));
                out.line(self.destruct_value(field.kind, "old"));
                out.close("}");
                out.close("}");
            }
            Cardinality::Singular if field.kind == Kind::Bytes => {
                out.line(format!("{key} => self.{ident} = Some({}),", self.read_value(field.kind)));
            }
            Cardinality::Singular => {
                out.line(format!("{key} => self.{ident} = {},", self.read_value(field.kind)));
            }
            Cardinality::List => {
                out.open(format!("{key} => {{"));
                out.line("let mut list = ::std::vec::Vec::new();");
                out.line("p.symbol(b'[')?;");
                out.open("while !p.is_symbol(b']') {");
                out.line(format!("list.push({});", self.read_value(field.kind)));
                out.line("p.assert_symbol(b',');");
                out.close("}");
                out.line("p.assert_symbol(b',');");
                out.line("p.symbol(b']')?;");
                if is_message {
                    out.open(format!("for v in self.{ident}.replace(list).into_iter().flatten() {{"));
                    out.line(self.destruct_value(field.kind, "v"));
                    out.close("}");
                } else {
                    out.line(format!("self.{ident} = Some(list);"));
                }
                out.close("}");
            }
            Cardinality::Map { key: key_kind } => {
                out.open(format!("{key} => {{"));
                out.line("let mut map = ::std::collections::HashMap::new();");
                out.line("p.symbol(b'{')?;");
                out.open("while !p.is_symbol(b'}') {");
                out.line(format!("let k = p.map_key::<{}>()?;", self.scalar_type(key_kind)));
                out.line("p.assert_symbol(b':');");
                out.line(format!("let v = {};", self.read_value(field.kind)));
                if is_message {
                    out.open("if let Some(old) = map.insert(k, v) {");
                    out.line(self.destruct_value(field.kind, "old"));
                    out.close("}");
                } else {
                    out.line("map.insert(k, v);");
                }
                out.line("p.assert_symbol(b',');");
                out.close("}");
                out.line("p.assert_symbol(b',');");
                out.line("p.symbol(b'}')?;");
                if is_message {
                    out.open(format!(
                        "for v in self.{ident}.replace(map).into_iter().flat_map(::std::collections::HashMap::into_values) {{"
                    ));
                    out.line(self.destruct_value(field.kind, "v"));
                    out.close("}");
                } else {
                    out.line(format!("self.{ident} = Some(map);"));
                }
                out.close("}");
            }
        }
    }

    fn destruct(&self, out: &mut Printer, m: &Message) {
        let receiver = if m.fields.is_empty() { "self" } else { "mut self" };
        out.open(format!(
            "fn destruct({receiver}: ::std::boxed::Box<Self>, pools: &{}) {{",
            self.pools
        ));
        for field in m.fields.iter().filter(|f| f.oneof.is_none()) {
            let ident = field_ident(field);
            let is_message = matches!(field.kind, Kind::Message(_));
            match field.cardinality {
                Cardinality::Singular => match field.kind {
                    Kind::Bool => out.line(format!("self.{ident} = false;")),
                    Kind::I32 | Kind::I64 | Kind::U32 | Kind::U64 => out.line(format!("self.{ident} = 0;")),
                    Kind::F32 | Kind::F64 => out.line(format!("self.{ident} = 0.0;")),
                    Kind::String => out.line(format!("self.{ident}.clear();")),
                    Kind::Enum(_) => out.line(format!(
                        "self.{ident} = {}::default();",
                        self.scalar_type(field.kind)
                    )),
                    Kind::Bytes => out.line(format!("self.{ident} = None;")),
                    Kind::Message(_) => {
                        out.open(format!("if let Some(v) = self.{ident}.take() {{"));
                        out.line(self.destruct_value(field.kind, "v"));
                        out.close("}");
                    }
                },
                Cardinality::List if is_message => {
                    out.open(format!("for v in self.{ident}.take().into_iter().flatten() {{"));
                    out.line(self.destruct_value(field.kind, "v"));
                    out.close("}");
                }
                Cardinality::Map { .. } if is_message => {
                    out.open(format!(
                        "for v in self.{ident}.take().into_iter().flat_map(::std::collections::HashMap::into_values) {{"
                    ));
                    out.line(self.destruct_value(field.kind, "v"));
                    out.close("}");
                }
                Cardinality::List | Cardinality::Map { .. } => out.line(format!("self.{ident} = None;")),
            }
        }
        for oneof in &m.oneofs {
            out.open(format!("if let Some(v) = self.{}.take() {{", oneof_ident(oneof)));
            out.line("v.destruct(pools);");
            out.close("}");
        }
        out.line(format!("pools.{}.release(self);", naming::pool_field(&m.rust_name)));
        out.close("}");
    }
}
