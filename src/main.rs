use std::process::ExitCode;

fn main() -> ExitCode {
    guest_threads::cli::run_cli()
}
