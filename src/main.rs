use std::process::ExitCode;

fn main() -> ExitCode {
    dealscope_lib::run()
}
