#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = webterm_cli::run_from_env() {
        eprintln!("webterm: {error}");
        std::process::exit(error.exit_code());
    }
}
