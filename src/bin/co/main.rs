//! The `co` binary: combines lexer, parser, semantic analyser and C backend
//! into a single command (spec.md §6's CLI surface).

mod cli;

use cli::Cli;

use std::{fs, process::ExitCode, rc::Rc};

use log::{error, info};

use co::{
    backend,
    diagnostics::{self, Locale, Severity},
    parser, sema, Diagnostics,
};

fn main() -> ExitCode {
    let args = Cli::init();
    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let file: Rc<str> = Rc::from(args.file.to_string_lossy().as_ref());
    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(err) => {
            error!("could not read '{}': {err}", args.file.display());
            return ExitCode::from(2);
        }
    };

    let locale = Locale::from_process_environment();
    let diagnostics = Diagnostics::new(locale);

    let (program, mut issues) = parser::parse_source(file.clone(), &source, diagnostics);

    if args.dump_parsed {
        match serde_json::to_string_pretty(&program) {
            Ok(json) => info!("Parsed tree:\n{json}"),
            Err(err) => error!("could not serialise parsed tree: {err}"),
        }
    }

    let analysis = sema::analyse(&program, file, diagnostics);
    issues.extend(analysis.issues.clone());

    if args.dump_issues {
        match serde_json::to_string_pretty(&issues) {
            Ok(json) => info!("Issues:\n{json}"),
            Err(err) => error!("could not serialise issues: {err}"),
        }
    }
    for issue in &issues {
        eprint!("{issue}");
    }

    if diagnostics::worst_severity(&issues) == Some(Severity::Error) {
        return ExitCode::from(1);
    }

    match backend::process(&analysis) {
        Ok(c_source) => {
            if let Err(err) = fs::write(&args.output, c_source) {
                error!("could not write '{}': {err}", args.output.display());
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(2)
        }
    }
}
