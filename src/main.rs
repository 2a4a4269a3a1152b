//! latex-workflow CLI binary
//!
//! All logic is in the library; main.rs only invokes cli::run().

fn main() {
    // cli::run() prints its own errors; main only maps to the process exit
    if let Err(code) = latex_workflow::cli::run() {
        std::process::exit(code.as_i32());
    }
}
