use super::bemt_help::{BEMT_ENG_HELPER, USAGE, create_template};
use crate::Airfoils::airfoil_loader::AirfoilLibrary;
use crate::BEMT::bemt_error::BemtError;
use crate::BEMT::solver::Solver;
use crate::BEMT::sweep::SweepParameter;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run,
    Sweep {
        parameter: SweepParameter,
        n: usize,
        low: f64,
        high: f64,
    },
    Optimize,
    Template,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: Command,
    /// case file, or the output file of `template`
    pub path: Option<PathBuf>,
    pub airfoils: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub verbose: bool,
}

fn usage(msg: impl Into<String>) -> BemtError {
    BemtError::Usage(msg.into())
}

fn number<T: std::str::FromStr>(name: &str, value: Option<&String>) -> Result<T, BemtError> {
    let value = value.ok_or_else(|| usage(format!("missing <{}>", name)))?;
    value
        .parse()
        .map_err(|_| usage(format!("<{}>: cannot parse `{}`", name, value)))
}

/// Parses the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<CliArgs, BemtError> {
    let mut positional = Vec::new();
    let mut airfoils = None;
    let mut csv = None;
    let mut verbose = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--airfoils" => {
                let dir = iter.next().ok_or_else(|| usage("--airfoils needs a directory"))?;
                airfoils = Some(PathBuf::from(dir));
            }
            "--csv" => {
                let file = iter.next().ok_or_else(|| usage("--csv needs a file name"))?;
                csv = Some(PathBuf::from(file));
            }
            flag if flag.starts_with("--") => {
                return Err(usage(format!("unknown option {}", flag)));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let command_name = positional.first().map(String::as_str).unwrap_or("help");
    let path = positional.get(1).map(PathBuf::from);
    let command = match command_name {
        "run" => Command::Run,
        "optimize" => Command::Optimize,
        "template" => Command::Template,
        "help" | "-h" => Command::Help,
        "sweep" => {
            let parameter = positional
                .get(2)
                .ok_or_else(|| usage("missing <parameter>"))?
                .parse()?;
            Command::Sweep {
                parameter,
                n: number("n", positional.get(3))?,
                low: number("low", positional.get(4))?,
                high: number("high", positional.get(5))?,
            }
        }
        other => return Err(usage(format!("unknown command `{}`", other))),
    };
    if command != Command::Help && path.is_none() {
        return Err(usage(format!("`{}` needs a file argument", command_name)));
    }
    Ok(CliArgs {
        command,
        path,
        airfoils,
        csv,
        verbose,
    })
}

/// Airfoil directory: `--airfoils` if given, otherwise `airfoils/` next to the case file.
pub fn airfoil_dir(config: &Path, airfoils: Option<&Path>) -> PathBuf {
    match airfoils {
        Some(dir) => dir.to_path_buf(),
        None => config
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("airfoils"),
    }
}

fn load_solver(args: &CliArgs, config: &Path) -> Result<Solver, BemtError> {
    let mut library = AirfoilLibrary::new(airfoil_dir(config, args.airfoils.as_deref()));
    let solver = Solver::from_file(config, &mut library)?;
    info!(
        "{} airfoil(s) loaded from {}",
        library.len(),
        library.directory.display()
    );
    Ok(solver)
}

fn write_csv(path: &Path, content: &str) -> Result<(), BemtError> {
    fs::write(path, content)?;
    info!("table written to {}", path.display());
    Ok(())
}

pub fn run_command(args: &CliArgs) -> Result<(), BemtError> {
    let path = match (&args.command, &args.path) {
        (Command::Help, _) => {
            println!("{}", USAGE);
            println!("{}", BEMT_ENG_HELPER);
            return Ok(());
        }
        (_, Some(path)) => path.as_path(),
        (_, None) => return Err(usage("missing file argument")),
    };
    match &args.command {
        Command::Template => {
            create_template(path)?;
            println!("Template written to {}", path.display());
        }
        Command::Run => {
            let mut solver = load_solver(args, path)?;
            let result = solver.run();
            result.pretty_print();
            if let Some(csv) = &args.csv {
                write_csv(csv, &result.primary.sections.to_csv())?;
            }
        }
        Command::Sweep {
            parameter,
            n,
            low,
            high,
        } => {
            let mut solver = load_solver(args, path)?;
            let result = solver.sweep(*parameter, *n, *low, *high)?;
            result.pretty_print();
            if let Some(csv) = &args.csv {
                write_csv(csv, &result.table.to_csv())?;
            }
        }
        Command::Optimize => {
            let mut solver = load_solver(args, path)?;
            let result = solver.optimize_pitch();
            result.pretty_print();
        }
        Command::Help => {}
    }
    Ok(())
}
