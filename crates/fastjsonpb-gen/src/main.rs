//! Schema compiler plugin: reads a JSON `CodeGeneratorRequest` on stdin and
//! writes the JSON `CodeGeneratorResponse` to stdout.

use std::{
    io::{self, Read, Write},
    process::ExitCode,
};

use fastjsonpb_gen::GenError;

fn run() -> Result<(), GenError> {
    let mut request = Vec::new();
    io::stdin().lock().read_to_end(&mut request)?;
    let response = fastjsonpb_gen::handle_request(&request)?;
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &response)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
