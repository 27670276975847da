//! Generates codecs for `schema/example.json` into `OUT_DIR`.

use std::{env, error::Error, fs, path::PathBuf};

const SCHEMA: &str = "schema/example.json";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo::rerun-if-changed={SCHEMA}");
    let request = fs::read(SCHEMA)?;
    let response = fastjsonpb_gen::handle_request(&request)?;
    if let Some(err) = response.error {
        return Err(err.into());
    }
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    for file in response.file {
        fs::write(out_dir.join(&file.name), file.content)?;
    }
    Ok(())
}
