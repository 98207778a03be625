use std::fs::File;

use clap::Parser;
use dofview::report::{Report, TextReport};
use dofview::settings::{Args, Settings};
use dofview::{app, compute_dof, Error};

/// Sets up logging. The interactive view owns the terminal, so it only logs
/// when a log file is given or `RUST_LOG` asks for it.
fn init_logging(args: &Args) -> Result<(), Error> {
    let default_filter = match (&args.log_file, args.print) {
        (Some(_), _) => "info",
        (None, true) => "warn",
        (None, false) => "off",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = &args.log_file {
        let file = File::create(path).map_err(|source| Error::LogFile {
            path: path.clone(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Main function
fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(&args)?;

    let settings = Settings::from_args(&args)?;
    log::debug!("Resolved settings: {:?}", settings);

    if !args.print {
        return app::run(settings);
    }

    let lens = settings.lens_state();
    let result = compute_dof(&lens);
    if args.json {
        println!("{}", Report::new(&lens, &result).to_json()?);
    } else {
        print!(
            "{}",
            TextReport {
                lens: &lens,
                result: &result,
            }
        );
    }
    Ok(())
}
