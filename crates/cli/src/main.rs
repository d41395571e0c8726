use std::process::ExitCode;

fn main() -> ExitCode {
    skillrank_cli::run()
}
