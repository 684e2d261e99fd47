//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`
//! and serves `static/` on a local HTTP server.

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::process::{Command, ExitCode, Stdio};

    use clap::Parser;

    #[derive(Parser, Debug)]
    #[command(about = "Build and serve the Helium scene locally")]
    pub struct Args {
        /// Port for the static file server.
        #[arg(long, default_value_t = 8000)]
        pub port: u16,

        /// Serve whatever is already in static/pkg.
        #[arg(long)]
        pub skip_build: bool,
    }

    fn build_wasm() -> bool {
        println!("Building WASM pkg …");
        match Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .status()
        {
            Ok(st) if st.success() => true,
            Ok(_) => {
                eprintln!("wasm-pack finished with errors");
                false
            }
            Err(_) => {
                eprintln!(
                    "wasm-pack not found in PATH. Install it (https://rustwasm.github.io/wasm-pack/) or pass --skip-build."
                );
                false
            }
        }
    }

    pub fn run(args: Args) -> ExitCode {
        if !args.skip_build && !build_wasm() {
            return ExitCode::FAILURE;
        }

        let port = args.port.to_string();
        println!("Serving static/ at http://127.0.0.1:{port} …");
        let server = Command::new("python3")
            .args(["-m", "http.server", &port, "--directory", "static"])
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status();

        match server {
            Ok(st) if st.success() => ExitCode::SUCCESS,
            Ok(st) => {
                eprintln!("http server exited: {st}");
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("failed to start http server: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;
    host::run(host::Args::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
