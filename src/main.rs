use std::process::ExitCode;

fn main() -> ExitCode {
    component_graph::cli::run()
}
