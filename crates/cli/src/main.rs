use std::process::ExitCode;

fn main() -> ExitCode {
    expertise_cli::run()
}
