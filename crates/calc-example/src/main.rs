use std::process::ExitCode;

use stanza::{exit_code, ErrorKind, RunError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut app = match calc_example::app() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = calc_example::help_path(&args) {
        return match app.help(&path) {
            Some(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("error: no help for `{}`", path.join(" "));
                ExitCode::from(2)
            }
        };
    }

    let result = app.run_from(args);
    if let Err(RunError::Diagnosed(ErrorKind::MissingCommandNameToExecute)) = &result {
        if let Some(help) = app.help(&[]) {
            eprint!("\n{}", help);
        }
    }
    ExitCode::from(exit_code(&result) as u8)
}
