#![expect(missing_docs)]

use fastjsonpb_gen::{GenError, handle_request};

fn error_of(request: &str) -> String {
    let response = handle_request(request.as_bytes()).unwrap();
    assert!(response.file.is_empty());
    response.error.unwrap()
}

#[test]
fn names_output_after_first_file() {
    let response = handle_request(
        br#"{
            "fileToGenerate": ["a/b.proto", "a/c.proto"],
            "protoFile": [
                {"name": "a/b.proto", "package": "a", "messageType": [{"name": "B"}]},
                {"name": "a/c.proto", "package": "a", "messageType": [{"name": "C", "field": [
                    {"name": "b", "number": 1, "label": "LABEL_OPTIONAL", "type": "TYPE_MESSAGE", "typeName": ".a.B"}
                ]}]}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(response.error, None);
    assert_eq!(response.file.len(), 1);
    let file = &response.file[0];
    assert_eq!(file.name, "a/b.fastjsonpb.rs");
    assert!(file.content.contains("// source: a/b.proto\n// source: a/c.proto\n"));
    assert!(file.content.contains("pub struct B;"));
    assert!(file.content.contains("    pub b: ::core::option::Option<::std::boxed::Box<B>>,"));
}

#[test]
fn snapshot_generation_errors() {
    insta::assert_snapshot!(
        error_of(r#"{"parameter": "paths=source_relative", "protoFile": []}"#),
        @r#"invalid parameter "paths=source_relative""#
    );
    insta::assert_snapshot!(
        error_of(r#"{"protoFile": [{"name": "x.proto", "messageType": [{"name": "M", "field": [
            {"name": "g", "number": 1, "type": "TYPE_GROUP"}
        ]}]}]}"#),
        @"unsupported schema shape in M.g: group fields are not supported"
    );
    insta::assert_snapshot!(
        error_of(r#"{"protoFile": [{"name": "x.proto", "package": "p", "messageType": [{"name": "M", "field": [
            {"name": "e", "number": 1, "type": "TYPE_ENUM", "typeName": ".p.Nope"}
        ]}]}]}"#),
        @"unresolved type .p.Nope referenced by p.M.e"
    );
}

#[test]
fn undecodable_request_is_an_error() {
    let err = handle_request(b"\x0a\x07example").unwrap_err();
    assert!(matches!(err, GenError::Json(_)), "{err:?}");
    assert!(handle_request(br#"{"protoFile": [{"messageType": [{"field": [{"type": "TYPE_UUID"}]}]}]}"#).is_err());
}

#[test]
fn empty_request_generates_pools_only() {
    let response = handle_request(b"{}").unwrap();
    let file = &response.file[0];
    assert_eq!(file.name, "schema.fastjsonpb.rs");
    assert!(file.content.contains("pub struct Pools;"));
}
