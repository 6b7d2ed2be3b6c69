//! Host-side helper: `cargo run` builds the wasm package into `static/pkg`
//! and serves `static/` on http://127.0.0.1:8000.

use std::process::{Command, ExitCode, Stdio};

fn main() -> ExitCode {
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args([
            "build",
            "--release",
            "--target",
            "web",
            "--out-dir",
            "static/pkg",
        ])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the page may load a stale package.");
        }
    }

    println!("Launching local server at http://127.0.0.1:8000 …");
    let server = Command::new("python3")
        .args(["-m", "http.server", "8000", "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn();

    match server.and_then(|mut child| child.wait()) {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(status) => {
            eprintln!("http server exited with {}", status);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("failed to start http server: {}", err);
            ExitCode::FAILURE
        }
    }
}
