//! `resalloc` binary
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = resalloc_cli::command().get_matches();
    match resalloc_cli::run(&matches) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
