//! Generates `fastjsonpb` codecs from protobuf schemas.
//!
//! Generation runs in two stages. [`Schema::from_files`] resolves the
//! descriptors handed over by the schema compiler and rejects shapes the
//! codecs cannot express; [`generate`] then renders the resolved schema as
//! Rust source without further checks.
//!
//! ```
//! use fastjsonpb_gen::{GeneratorOptions, Schema, descriptor::FileDescriptorProto};
//!
//! let file: FileDescriptorProto = serde_json::from_str(r#"{
//!     "name": "greeting.proto",
//!     "messageType": [{"name": "Greeting", "field": [
//!         {"name": "text", "number": 1, "label": "LABEL_OPTIONAL", "type": "TYPE_STRING"}
//!     ]}]
//! }"#).unwrap();
//!
//! let schema = Schema::from_files(&[file]).unwrap();
//! let source = fastjsonpb_gen::generate(&schema, &GeneratorOptions::default());
//! assert!(source.starts_with("// Code generated by fastjsonpb-gen. DO NOT EDIT."));
//! assert!(source.contains(r#""text" => self.text = p.str()?.into_owned(),"#));
//! ```

pub mod descriptor;
mod emit;
mod error;
pub mod ir;
mod naming;
mod options;
mod request;

pub use emit::generate;
pub use error::GenError;
pub use ir::Schema;
pub use options::GeneratorOptions;
pub use request::{generate_files, handle_request};
