use crate::{
    GenError, GeneratorOptions,
    descriptor::{CodeGeneratorRequest, CodeGeneratorResponse, GeneratedFile},
    emit,
    ir::Schema,
};

/// Generates the codec file for a decoded request.
///
/// # Errors
///
/// Any [`GenError`] from option parsing, resolution or emission.
pub fn generate_files(request: &CodeGeneratorRequest) -> Result<Vec<GeneratedFile>, GenError> {
    let options: GeneratorOptions = request.parameter.as_deref().unwrap_or_default().parse()?;
    let schema = Schema::from_files(&request.proto_file)?;
    let content = emit::generate(&schema, &options);

    let first = request
        .file_to_generate
        .first()
        .or_else(|| request.proto_file.first().map(|f| &f.name))
        .map_or("schema", String::as_str);
    let name = format!("{}.fastjsonpb.rs", stem(first));
    log::info!(
        "generated {name} ({} bytes) for {} messages and {} enums",
        content.len(),
        schema.messages.len(),
        schema.enums.len()
    );
    Ok(vec![GeneratedFile { name, content }])
}

/// Answers a JSON-encoded request.
///
/// Generation failures are reported through
/// [`CodeGeneratorResponse::error`]; only a request that is not valid JSON
/// is an `Err`.
///
/// # Errors
///
/// [`GenError::Json`] if `request` cannot be decoded.
///
/// # Examples
///
/// ```
/// let response = fastjsonpb_gen::handle_request(br#"{
///     "fileToGenerate": ["shapes/v1/point.proto"],
///     "protoFile": [{
///         "name": "shapes/v1/point.proto",
///         "package": "shapes.v1",
///         "messageType": [{"name": "Point", "field": [
///             {"name": "x", "number": 1, "label": "LABEL_OPTIONAL", "type": "TYPE_SINT32"}
///         ]}]
///     }]
/// }"#).unwrap();
///
/// assert_eq!(response.error, None);
/// assert_eq!(response.file[0].name, "shapes/v1/point.fastjsonpb.rs");
/// assert!(response.file[0].content.contains("pub struct Point {"));
/// ```
pub fn handle_request(request: &[u8]) -> Result<CodeGeneratorResponse, GenError> {
    let request: CodeGeneratorRequest = serde_json::from_slice(request)?;
    Ok(match generate_files(&request) {
        Ok(file) => CodeGeneratorResponse { error: None, file },
        Err(err) => {
            log::error!("generation failed: {err}");
            CodeGeneratorResponse {
                error: Some(err.to_string()),
                file: Vec::new(),
            }
        }
    })
}

fn stem(path: &str) -> &str {
    path.strip_suffix(".proto").unwrap_or(path)
}
