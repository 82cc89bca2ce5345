use std::process::ExitCode;

fn main() -> ExitCode {
    lavka_cli::run()
}
