//! trimbg command-line tool
//!
//! Removes uniform backgrounds from images using corner color statistics.

#[cfg(feature = "cli")]
use trimbg::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
