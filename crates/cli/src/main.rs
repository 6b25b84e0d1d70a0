use std::process::ExitCode;

fn main() -> ExitCode {
    shopgauge_cli::run()
}
