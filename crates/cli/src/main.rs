use std::process::ExitCode;

fn main() -> ExitCode {
    bomcheck_cli::run()
}
