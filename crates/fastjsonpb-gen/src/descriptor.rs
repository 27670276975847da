//! Protobuf descriptors in their JSON encoding.
//!
//! Only the parts the generator reads are modelled; unknown keys are
//! ignored. Enum-typed fields such as `label` and `type` accept either the
//! value name (`"TYPE_INT32"`) or its number (`5`).

use serde::{Deserialize, Serialize};

/// What the schema compiler hands to a plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeGeneratorRequest {
    /// Files named on the command line, in order.
    pub file_to_generate: Vec<String>,
    /// The plugin parameter, see [`GeneratorOptions`](crate::GeneratorOptions).
    pub parameter: Option<String>,
    /// Every file in the import closure, dependencies first.
    pub proto_file: Vec<FileDescriptorProto>,
}

/// What a plugin hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGeneratorResponse {
    /// Set when generation failed; `file` is then empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Generated files.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub file: Vec<GeneratedFile>,
}

/// One generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct FileDescriptorProto {
    pub name: String,
    pub package: Option<String>,
    pub message_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct DescriptorProto {
    pub name: String,
    pub field: Vec<FieldDescriptorProto>,
    pub nested_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub oneof_decl: Vec<OneofDescriptorProto>,
    pub options: Option<MessageOptions>,
}

impl DescriptorProto {
    /// Whether this is the synthetic entry type behind a `map<K, V>` field.
    #[must_use]
    pub fn is_map_entry(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.map_entry)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct MessageOptions {
    pub map_entry: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct FieldDescriptorProto {
    pub name: String,
    pub number: i32,
    pub label: Option<Label>,
    #[serde(rename = "type")]
    pub r#type: Option<FieldType>,
    /// Fully qualified (`.pkg.Outer.Inner`) for message and enum fields.
    pub type_name: Option<String>,
    pub json_name: Option<String>,
    pub oneof_index: Option<i32>,
    pub proto3_optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct OneofDescriptorProto {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EnumDescriptorProto {
    pub name: String,
    pub value: Vec<EnumValueDescriptorProto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EnumValueDescriptorProto {
    pub name: String,
    pub number: i32,
}

macro_rules! descriptor_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $number:literal => $text:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
        #[serde(try_from = "serde_json::Value")]
        #[allow(missing_docs)]
        pub enum $name {
            $($variant,)*
        }

        impl TryFrom<serde_json::Value> for $name {
            type Error = String;

            fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
                match (value.as_str(), value.as_i64()) {
                    $((Some($text), _) | (_, Some($number)) => Ok(Self::$variant),)*
                    _ => Err(format!("unknown {} {value}", stringify!($name))),
                }
            }
        }
    };
}

descriptor_enum! {
    /// Field cardinality.
    Label {
        Optional = 1 => "LABEL_OPTIONAL",
        Required = 2 => "LABEL_REQUIRED",
        Repeated = 3 => "LABEL_REPEATED",
    }
}

descriptor_enum! {
    /// Declared field type.
    FieldType {
        Double = 1 => "TYPE_DOUBLE",
        Float = 2 => "TYPE_FLOAT",
        Int64 = 3 => "TYPE_INT64",
        Uint64 = 4 => "TYPE_UINT64",
        Int32 = 5 => "TYPE_INT32",
        Fixed64 = 6 => "TYPE_FIXED64",
        Fixed32 = 7 => "TYPE_FIXED32",
        Bool = 8 => "TYPE_BOOL",
        String = 9 => "TYPE_STRING",
        Group = 10 => "TYPE_GROUP",
        Message = 11 => "TYPE_MESSAGE",
        Bytes = 12 => "TYPE_BYTES",
        Uint32 = 13 => "TYPE_UINT32",
        Enum = 14 => "TYPE_ENUM",
        Sfixed32 = 15 => "TYPE_SFIXED32",
        Sfixed64 = 16 => "TYPE_SFIXED64",
        Sint32 = 17 => "TYPE_SINT32",
        Sint64 = 18 => "TYPE_SINT64",
    }
}
