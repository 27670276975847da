//! Resolved schema.
//!
//! [`Schema::from_files`] is the first stage of generation: it flattens the
//! descriptor tree, resolves type references to indices, folds map-entry
//! types into their fields and rejects shapes the codecs cannot express.
//! Emission works from the result alone.

use std::collections::{HashMap, hash_map::Entry};

use crate::{
    GenError,
    descriptor::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FieldType, FileDescriptorProto, Label},
    naming,
};

/// Every type of a set of descriptor files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Names of the files the types come from.
    pub sources: Vec<String>,
    /// Enums, parents before nested ones.
    pub enums: Vec<Enum>,
    /// Messages without map entries, parents before nested ones.
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Enum {
    /// `pkg.Outer.Name`, without a leading dot.
    pub full_name: String,
    pub rust_name: String,
    /// In declaration order, aliases included.
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
    pub rust_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Message {
    pub full_name: String,
    pub rust_name: String,
    /// In declaration order, oneof members included.
    pub fields: Vec<Field>,
    pub oneofs: Vec<Oneof>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Field {
    /// Name as declared.
    pub name: String,
    pub json_name: String,
    /// Element kind for lists, value kind for maps.
    pub kind: Kind,
    pub cardinality: Cardinality,
    /// Index into [`Message::oneofs`].
    pub oneof: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Oneof {
    pub name: String,
    /// Name of the generated enum.
    pub rust_name: String,
}

/// Value kinds, with wire-only distinctions collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Kind {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    /// Index into [`Schema::enums`].
    Enum(usize),
    /// Index into [`Schema::messages`].
    Message(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Cardinality {
    Singular,
    List,
    Map { key: Kind },
}

impl Message {
    /// Fields that belong to oneof `index`.
    pub fn oneof_fields(&self, index: usize) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.oneof == Some(index))
    }

    /// Whether any field (or oneof member) holds a message.
    #[must_use]
    pub fn has_message_fields(&self) -> bool {
        self.fields.iter().any(|f| matches!(f.kind, Kind::Message(_)))
    }
}

/// Where a declaration lives.
struct Scope<'a> {
    /// Dot-prefixed fully qualified name.
    full_name: String,
    /// Names below the package.
    path: Vec<&'a str>,
}

impl<'a> Scope<'a> {
    fn child(&self, name: &'a str) -> Self {
        let mut path = self.path.clone();
        path.push(name);
        Self {
            full_name: format!("{}.{name}", self.full_name),
            path,
        }
    }
}

#[derive(Default)]
struct Collector<'a> {
    messages: Vec<(Scope<'a>, &'a DescriptorProto)>,
    enums: Vec<(Scope<'a>, &'a EnumDescriptorProto)>,
    map_entries: HashMap<String, &'a DescriptorProto>,
}

impl<'a> Collector<'a> {
    fn message(&mut self, scope: Scope<'a>, message: &'a DescriptorProto) {
        if message.is_map_entry() {
            self.map_entries.insert(scope.full_name, message);
            return;
        }
        for nested in &message.enum_type {
            self.enums.push((scope.child(&nested.name), nested));
        }
        let children: Vec<_> = message.nested_type.iter().map(|n| (scope.child(&n.name), n)).collect();
        self.messages.push((scope, message));
        for (child, nested) in children {
            self.message(child, nested);
        }
    }
}

struct Resolver<'a> {
    messages: HashMap<&'a str, usize>,
    enums: HashMap<&'a str, usize>,
    map_entries: &'a HashMap<String, &'a DescriptorProto>,
}

impl Resolver<'_> {
    fn lookup(&self, type_name: &str) -> (Option<usize>, Option<usize>, Option<&DescriptorProto>) {
        let qualified;
        let name: &str = if type_name.starts_with('.') {
            type_name
        } else {
            qualified = format!(".{type_name}");
            &qualified
        };
        (
            self.messages.get(name).copied(),
            self.enums.get(name).copied(),
            self.map_entries.get(name).copied(),
        )
    }

    fn scalar(r#type: FieldType, context: &str) -> Result<Option<Kind>, GenError> {
        Ok(Some(match r#type {
            FieldType::Bool => Kind::Bool,
            FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => Kind::I32,
            FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => Kind::I64,
            FieldType::Uint32 | FieldType::Fixed32 => Kind::U32,
            FieldType::Uint64 | FieldType::Fixed64 => Kind::U64,
            FieldType::Float => Kind::F32,
            FieldType::Double => Kind::F64,
            FieldType::String => Kind::String,
            FieldType::Bytes => Kind::Bytes,
            FieldType::Group => {
                return Err(GenError::UnsupportedSchemaShape {
                    context: context.into(),
                    reason: "group fields are not supported",
                });
            }
            FieldType::Message | FieldType::Enum => return Ok(None),
        }))
    }

    fn kind(&self, field: &FieldDescriptorProto, context: &str) -> Result<Kind, GenError> {
        let r#type = field.r#type.ok_or_else(|| GenError::UnsupportedSchemaShape {
            context: context.into(),
            reason: "field has no type",
        })?;
        if let Some(kind) = Self::scalar(r#type, context)? {
            return Ok(kind);
        }
        let type_name = field.type_name.as_deref().unwrap_or_default();
        let unresolved = || GenError::UnresolvedType {
            type_name: type_name.into(),
            context: context.into(),
        };
        match (r#type, self.lookup(type_name)) {
            (FieldType::Message, (Some(index), _, _)) => Ok(Kind::Message(index)),
            (FieldType::Enum, (_, Some(index), _)) => Ok(Kind::Enum(index)),
            (FieldType::Message, (_, _, Some(_))) => Err(GenError::UnsupportedSchemaShape {
                context: context.into(),
                reason: "map entry used outside a map field",
            }),
            _ => Err(unresolved()),
        }
    }

    fn map_entry(&self, field: &FieldDescriptorProto) -> Option<&DescriptorProto> {
        if field.label != Some(Label::Repeated) || field.r#type != Some(FieldType::Message) {
            return None;
        }
        self.lookup(field.type_name.as_deref()?).2
    }

    fn field(
        &self,
        field: &FieldDescriptorProto,
        context: &str,
        oneof: Option<usize>,
    ) -> Result<Field, GenError> {
        let (kind, cardinality) = if let Some(entry) = self.map_entry(field) {
            let part = |number| {
                entry.field.iter().find(|f| f.number == number).ok_or_else(|| {
                    GenError::UnsupportedSchemaShape {
                        context: context.into(),
                        reason: "map entry lacks a key or value field",
                    }
                })
            };
            let key = self.kind(part(1)?, context)?;
            if matches!(key, Kind::F32 | Kind::F64 | Kind::Bytes | Kind::Enum(_) | Kind::Message(_)) {
                return Err(GenError::UnsupportedSchemaShape {
                    context: context.into(),
                    reason: "map keys must be integral, bool or string",
                });
            }
            (self.kind(part(2)?, context)?, Cardinality::Map { key })
        } else if field.label == Some(Label::Repeated) {
            (self.kind(field, context)?, Cardinality::List)
        } else {
            (self.kind(field, context)?, Cardinality::Singular)
        };

        if oneof.is_some() && cardinality != Cardinality::Singular {
            return Err(GenError::UnsupportedSchemaShape {
                context: context.into(),
                reason: "oneof members cannot be lists or maps",
            });
        }

        Ok(Field {
            name: field.name.clone(),
            json_name: field.json_name.clone().unwrap_or_else(|| naming::json_name(&field.name)),
            kind,
            cardinality,
            oneof,
        })
    }

    fn message(&self, scope: &Scope<'_>, message: &DescriptorProto) -> Result<Message, GenError> {
        let full_name = &scope.full_name[1..];
        let rust_name = naming::ident(&naming::type_name(&scope.path));

        // proto3 `optional` fields sit alone in a synthetic oneof; they are
        // plain singular fields here.
        let mut remap = vec![None; message.oneof_decl.len()];
        let mut oneofs = Vec::new();
        for (index, decl) in message.oneof_decl.iter().enumerate() {
            let real = message.field.iter().any(|f| {
                f.oneof_index.and_then(|i| usize::try_from(i).ok()) == Some(index) && !f.proto3_optional
            });
            if real {
                remap[index] = Some(oneofs.len());
                oneofs.push(Oneof {
                    name: decl.name.clone(),
                    rust_name: naming::ident(&format!("{rust_name}{}", naming::upper_camel(&decl.name))),
                });
            }
        }

        let fields = message
            .field
            .iter()
            .map(|field| {
                let context = format!("{full_name}.{}", field.name);
                let oneof = if field.proto3_optional {
                    None
                } else {
                    field
                        .oneof_index
                        .and_then(|i| usize::try_from(i).ok())
                        .and_then(|i| remap.get(i).copied().flatten())
                };
                self.field(field, &context, oneof)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut idents = HashMap::new();
        let mut keys = HashMap::new();
        for field in &fields {
            let ident = naming::snake(&field.name);
            let clash = idents
                .insert(ident.clone(), &field.name)
                .map(|first| (ident, first))
                .or_else(|| keys.insert(field.json_name.as_str(), &field.name).map(|first| (field.json_name.clone(), first)));
            if let Some((name, first)) = clash {
                return Err(GenError::DuplicateName {
                    name,
                    first: format!("{full_name}.{first}"),
                    second: format!("{full_name}.{}", field.name),
                });
            }
        }

        // Oneofs share the struct's namespace with the plain fields.
        let mut members: HashMap<String, String> = fields
            .iter()
            .filter(|f| f.oneof.is_none())
            .map(|f| (naming::snake(&f.name), format!("{full_name}.{}", f.name)))
            .collect();
        for oneof in &oneofs {
            let second = format!("oneof {full_name}.{}", oneof.name);
            if let Some(first) = members.insert(naming::snake(&oneof.name), second.clone()) {
                return Err(GenError::DuplicateName {
                    name: naming::snake(&oneof.name),
                    first,
                    second,
                });
            }
        }

        Ok(Message {
            full_name: full_name.into(),
            rust_name,
            fields,
            oneofs,
        })
    }
}

fn enumeration(scope: &Scope<'_>, decl: &EnumDescriptorProto) -> Result<Enum, GenError> {
    let full_name = scope.full_name[1..].to_owned();
    if decl.value.is_empty() {
        return Err(GenError::UnsupportedSchemaShape {
            context: full_name,
            reason: "enums need at least one value",
        });
    }
    let values = decl
        .value
        .iter()
        .map(|v| EnumValue {
            name: v.name.clone(),
            number: v.number,
            rust_name: naming::ident(&naming::upper_camel(&v.name)),
        })
        .collect::<Vec<_>>();

    let mut variants: HashMap<&str, &str> = HashMap::new();
    let mut numbers = Vec::new();
    for value in &values {
        // Aliases share a variant with the first value of their number.
        if numbers.contains(&value.number) {
            continue;
        }
        numbers.push(value.number);
        if let Some(first) = variants.insert(&value.rust_name, &value.name) {
            return Err(GenError::DuplicateName {
                name: value.rust_name.clone(),
                first: format!("{full_name}.{first}"),
                second: format!("{full_name}.{}", value.name),
            });
        }
    }

    Ok(Enum {
        rust_name: naming::ident(&naming::type_name(&scope.path)),
        full_name,
        values,
    })
}

impl Schema {
    /// Resolves every type declared in `files`.
    ///
    /// # Errors
    ///
    /// [`GenError::UnsupportedSchemaShape`], [`GenError::UnresolvedType`] or
    /// [`GenError::DuplicateName`] when the files cannot be generated.
    pub fn from_files(files: &[FileDescriptorProto]) -> Result<Self, GenError> {
        let mut collector = Collector::default();
        for file in files {
            let root = Scope {
                full_name: file
                    .package
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|p| format!(".{p}"))
                    .unwrap_or_default(),
                path: Vec::new(),
            };
            for decl in &file.enum_type {
                collector.enums.push((root.child(&decl.name), decl));
            }
            for decl in &file.message_type {
                collector.message(root.child(&decl.name), decl);
            }
        }

        let resolver = Resolver {
            messages: collector
                .messages
                .iter()
                .enumerate()
                .map(|(i, (scope, _))| (scope.full_name.as_str(), i))
                .collect(),
            enums: collector
                .enums
                .iter()
                .enumerate()
                .map(|(i, (scope, _))| (scope.full_name.as_str(), i))
                .collect(),
            map_entries: &collector.map_entries,
        };

        let enums = collector
            .enums
            .iter()
            .map(|(scope, decl)| enumeration(scope, decl))
            .collect::<Result<Vec<_>, _>>()?;
        let messages = collector
            .messages
            .iter()
            .map(|(scope, decl)| resolver.message(scope, decl))
            .collect::<Result<Vec<_>, _>>()?;

        let schema = Self {
            sources: files.iter().map(|f| f.name.clone()).collect(),
            enums,
            messages,
        };
        schema.check_type_names()?;
        log::debug!(
            "resolved {} messages and {} enums from {} files",
            schema.messages.len(),
            schema.enums.len(),
            schema.sources.len()
        );
        Ok(schema)
    }

    fn check_type_names(&self) -> Result<(), GenError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        let names = self
            .enums
            .iter()
            .map(|e| (e.rust_name.as_str(), e.full_name.as_str()))
            .chain(self.messages.iter().flat_map(|m| {
                core::iter::once((m.rust_name.as_str(), m.full_name.as_str()))
                    .chain(m.oneofs.iter().map(move |o| (o.rust_name.as_str(), m.full_name.as_str())))
            }));
        for (name, full_name) in names {
            match seen.entry(name) {
                Entry::Occupied(first) => {
                    return Err(GenError::DuplicateName {
                        name: name.into(),
                        first: (*first.get()).into(),
                        second: full_name.into(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(full_name);
                }
            }
        }

        let mut pools: HashMap<String, &str> = HashMap::new();
        for m in &self.messages {
            let field = naming::pool_field(&m.rust_name);
            if let Some(first) = pools.insert(field.clone(), &m.full_name) {
                return Err(GenError::DuplicateName {
                    name: field,
                    first: first.into(),
                    second: m.full_name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn resolve(messages: &str) -> Result<Schema, GenError> {
        let file: FileDescriptorProto = serde_json::from_str(&format!(
            r#"{{"name": "t.proto", "package": "t", "messageType": {messages}}}"#
        ))
        .unwrap();
        Schema::from_files(&[file])
    }

    #[test]
    fn folds_map_entries() {
        let schema = resolve(
            r#"[{"name": "M", "field": [
                {"name": "counts", "number": 1, "label": "LABEL_REPEATED", "type": "TYPE_MESSAGE", "typeName": ".t.M.CountsEntry"}
            ], "nestedType": [{"name": "CountsEntry", "options": {"mapEntry": true}, "field": [
                {"name": "key", "number": 1, "type": "TYPE_UINT64"},
                {"name": "value", "number": 2, "type": "TYPE_SFIXED64"}
            ]}]}]"#,
        )
        .unwrap();
        assert_eq!(schema.messages.len(), 1);
        let field = &schema.messages[0].fields[0];
        assert_eq!(field.cardinality, Cardinality::Map { key: Kind::U64 });
        assert_eq!(field.kind, Kind::I64);
        assert_eq!(field.json_name, "counts");
    }

    #[test]
    fn proto3_optional_is_a_plain_field() {
        let schema = resolve(
            r#"[{"name": "M", "field": [
                {"name": "a", "number": 1, "type": "TYPE_INT32", "oneofIndex": 1},
                {"name": "maybe_b", "number": 2, "type": "TYPE_STRING", "oneofIndex": 0, "proto3Optional": true},
                {"name": "c", "number": 3, "type": "TYPE_BOOL", "oneofIndex": 1}
            ], "oneofDecl": [{"name": "_maybe_b"}, {"name": "choice"}]}]"#,
        )
        .unwrap();
        let m = &schema.messages[0];
        assert_eq!(
            m.oneofs,
            [Oneof {
                name: "choice".into(),
                rust_name: "MChoice".into()
            }]
        );
        assert_eq!(m.fields[0].oneof, Some(0));
        assert_eq!(m.fields[1].oneof, None);
        assert_eq!(m.fields[1].json_name, "maybeB");
        assert_eq!(m.oneof_fields(0).map(|f| f.name.as_str()).collect::<Vec<_>>(), ["a", "c"]);
        assert!(!m.has_message_fields());
    }

    #[test]
    fn nested_types_resolve_by_full_name() {
        let schema = resolve(
            r#"[{"name": "Outer", "field": [
                {"name": "inner", "number": 1, "type": "TYPE_MESSAGE", "typeName": ".t.Outer.Inner"},
                {"name": "mood", "number": 2, "type": "TYPE_ENUM", "typeName": "t.Outer.Mood", "jsonName": "MOOD"}
            ], "nestedType": [{"name": "Inner"}],
               "enumType": [{"name": "Mood", "value": [{"name": "MOOD_OK", "number": 0}]}]}]"#,
        )
        .unwrap();
        assert_eq!(schema.messages[1].rust_name, "OuterInner");
        assert_eq!(schema.messages[1].full_name, "t.Outer.Inner");
        assert_eq!(schema.enums[0].rust_name, "OuterMood");
        assert_eq!(schema.enums[0].values[0].rust_name, "MoodOk");
        let fields = &schema.messages[0].fields;
        assert_eq!(fields[0].kind, Kind::Message(1));
        assert_eq!(fields[1].kind, Kind::Enum(0));
        assert_eq!(fields[1].json_name, "MOOD");
        assert!(schema.messages[0].has_message_fields());
    }

    #[rstest]
    #[case::group(r#"[{"name": "M", "field": [{"name": "g", "number": 1, "type": "TYPE_GROUP"}]}]"#)]
    #[case::float_key(r#"[{"name": "M", "field": [
        {"name": "m", "number": 1, "label": "LABEL_REPEATED", "type": "TYPE_MESSAGE", "typeName": ".t.M.MEntry"}
    ], "nestedType": [{"name": "MEntry", "options": {"mapEntry": true}, "field": [
        {"name": "key", "number": 1, "type": "TYPE_DOUBLE"},
        {"name": "value", "number": 2, "type": "TYPE_INT32"}
    ]}]}]"#)]
    #[case::untyped(r#"[{"name": "M", "field": [{"name": "x", "number": 1}]}]"#)]
    fn unsupported_shapes(#[case] messages: &str) {
        let err = resolve(messages).unwrap_err();
        assert!(matches!(err, GenError::UnsupportedSchemaShape { .. }), "{err:?}");
    }

    #[test]
    fn unresolved_and_duplicate_names() {
        let err = resolve(
            r#"[{"name": "M", "field": [{"name": "x", "number": 1, "type": "TYPE_MESSAGE", "typeName": ".t.Missing"}]}]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "unresolved type .t.Missing referenced by t.M.x");

        let err = resolve(r#"[{"name": "A", "nestedType": [{"name": "B"}]}, {"name": "A_B"}]"#).unwrap_err();
        assert_eq!(err.to_string(), "AB would be generated for both t.A.B and t.A_B");

        let err = resolve(
            r#"[{"name": "M", "field": [
                {"name": "x", "number": 1, "type": "TYPE_INT32", "jsonName": "k"},
                {"name": "y", "number": 2, "type": "TYPE_INT32", "jsonName": "k"}
            ]}]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "k would be generated for both t.M.x and t.M.y");
    }

    #[test]
    fn pool_fields_must_be_distinct() {
        let err = resolve(r#"[{"name": "A_b"}, {"name": "Ab"}]"#).unwrap_err();
        assert_eq!(err.to_string(), "ab would be generated for both t.A_b and t.Ab");
    }

    #[test]
    fn oneofs_and_fields_share_a_namespace() {
        let err = resolve(
            r#"[{"name": "M", "field": [
                {"name": "kind", "number": 1, "type": "TYPE_INT32"},
                {"name": "a", "number": 2, "type": "TYPE_INT32", "oneofIndex": 0},
                {"name": "b", "number": 3, "type": "TYPE_STRING", "oneofIndex": 0}
            ], "oneofDecl": [{"name": "kind"}]}]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "kind would be generated for both t.M.kind and oneof t.M.kind");

        let schema = resolve(
            r#"[{"name": "M", "field": [
                {"name": "kind", "number": 1, "type": "TYPE_INT32", "oneofIndex": 0}
            ], "oneofDecl": [{"name": "kind"}]}]"#,
        )
        .unwrap();
        assert_eq!(schema.messages[0].oneofs.len(), 1);
    }

    #[test]
    fn enums_need_values_and_distinct_variants() {
        let file: FileDescriptorProto =
            serde_json::from_str(r#"{"name": "e.proto", "enumType": [{"name": "E"}]}"#).unwrap();
        let err = Schema::from_files(&[file]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported schema shape in E: enums need at least one value"
        );

        let file: FileDescriptorProto = serde_json::from_str(
            r#"{"name": "e.proto", "enumType": [{"name": "E", "value": [
                {"name": "FOO_BAR", "number": 0},
                {"name": "FOO_BAR_ALIAS", "number": 0},
                {"name": "FooBar", "number": 1}
            ]}]}"#,
        )
        .unwrap();
        let err = Schema::from_files(&[file]).unwrap_err();
        assert_eq!(err.to_string(), "FooBar would be generated for both E.FOO_BAR and E.FooBar");
    }
}
