//! Conversion entry point.
//!
//! # Responsibility
//! - Parse command-line options and drive the converters in dependency
//!   order: CTF store first, then tilt series with the CTF mapping, then
//!   tomograms with an optional particle source.
//! - Render converted entities to YAML when an output directory is given,
//!   or print a summary otherwise.

mod mrc;
mod output;

use cetsbridge_core::{
    init_logging, ConvertOptions, CtfBySeries, CtfConverter, MatrixPolicy, ParticleSource,
    TiltSeriesConverter, TomogramConverter,
};
use mrc::MrcImageMeta;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: cetsbridge [OPTIONS]

Converts Scipion tomography metadata stores into CETS YAML.

Options:
      --tilt-series <FILE>    tilt-series store (tiltseries.sqlite)
      --ctf <FILE>            CTF store attached to the tilt series
      --tomograms <FILE>      tomogram store
      --coordinates <FILE>    3D coordinate store linked to the tomograms
      --subtomograms <FILE>   subtomogram store linked to the tomograms
      --out <DIR>             write one YAML file per converted entity
      --skip-bad-matrices     drop records with malformed matrices
      --log-dir <DIR>         enable file logging into DIR
      --log-level <LEVEL>     trace|debug|info|warn|error (default: info)
  -h, --help                  print this help
";

#[derive(Debug, Default)]
struct CliOptions {
    tilt_series: Option<PathBuf>,
    ctf: Option<PathBuf>,
    tomograms: Option<PathBuf>,
    coordinates: Option<PathBuf>,
    subtomograms: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    log_dir: Option<String>,
    log_level: Option<String>,
    skip_bad_matrices: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("run `cetsbridge --help` for usage");
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn value_of<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    name: &str,
) -> Result<&'a String, String> {
    iter.next().ok_or_else(|| format!("{name} requires a value"))
}

fn parse_args(args: &[String]) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--tilt-series" => {
                options.tilt_series = Some(value_of(&mut iter, "--tilt-series")?.into())
            }
            "--ctf" => options.ctf = Some(value_of(&mut iter, "--ctf")?.into()),
            "--tomograms" => options.tomograms = Some(value_of(&mut iter, "--tomograms")?.into()),
            "--coordinates" => {
                options.coordinates = Some(value_of(&mut iter, "--coordinates")?.into())
            }
            "--subtomograms" => {
                options.subtomograms = Some(value_of(&mut iter, "--subtomograms")?.into())
            }
            "--out" => options.out_dir = Some(value_of(&mut iter, "--out")?.into()),
            "--skip-bad-matrices" => options.skip_bad_matrices = true,
            "--log-dir" => options.log_dir = Some(value_of(&mut iter, "--log-dir")?.clone()),
            "--log-level" => options.log_level = Some(value_of(&mut iter, "--log-level")?.clone()),
            other => return Err(format!("unknown option `{other}`")),
        }
    }

    if options.tilt_series.is_none() && options.tomograms.is_none() {
        return Err("nothing to convert; pass --tilt-series and/or --tomograms".to_string());
    }
    if options.ctf.is_some() && options.tilt_series.is_none() {
        return Err("--ctf requires --tilt-series".to_string());
    }
    if options.coordinates.is_some() && options.subtomograms.is_some() {
        return Err("--coordinates and --subtomograms are mutually exclusive".to_string());
    }
    if (options.coordinates.is_some() || options.subtomograms.is_some())
        && options.tomograms.is_none()
    {
        return Err("particle stores require --tomograms".to_string());
    }

    Ok(Some(options))
}

fn run(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &options.log_dir {
        let level = options.log_level.as_deref().unwrap_or("info");
        init_logging(level, log_dir)?;
    }

    let convert_options = ConvertOptions {
        matrix_policy: if options.skip_bad_matrices {
            MatrixPolicy::SkipRecord
        } else {
            MatrixPolicy::Abort
        },
    };
    let image_meta = MrcImageMeta;

    let ctf_map: Option<CtfBySeries> = match &options.ctf {
        Some(path) => Some(CtfConverter::new(path)?.convert()?),
        None => None,
    };

    if let Some(path) = &options.tilt_series {
        let series_list = TiltSeriesConverter::new(path, &image_meta)?
            .with_options(convert_options)
            .convert(ctf_map.as_ref())?;
        match &options.out_dir {
            Some(out_dir) => output::write_tilt_series(out_dir, &series_list)?,
            None => {
                for series in &series_list {
                    println!(
                        "tilt series {}: {} images, ctf={}",
                        series.ts_id,
                        series.images.len(),
                        series.images.iter().filter(|i| i.ctf.is_some()).count()
                    );
                }
            }
        }
    }

    if let Some(path) = &options.tomograms {
        let particle_source = options
            .coordinates
            .as_ref()
            .map(|p| ParticleSource::Coordinates(p.clone()))
            .or_else(|| {
                options
                    .subtomograms
                    .as_ref()
                    .map(|p| ParticleSource::Subtomograms(p.clone()))
            });

        let tomograms = TomogramConverter::new(path, &image_meta)?
            .with_options(convert_options)
            .convert(particle_source.as_ref())?;
        match &options.out_dir {
            Some(out_dir) => output::write_tomograms(out_dir, &tomograms)?,
            None => {
                for tomogram in &tomograms {
                    let particles = tomogram.particles.as_ref().map_or(0, |set| match set {
                        cetsbridge_core::ParticleSet::Coordinates(items) => items.len(),
                        cetsbridge_core::ParticleSet::Subtomograms(items) => items.len(),
                    });
                    println!(
                        "tomogram {}: particles={particles}",
                        tomogram.tomo_id.as_deref().unwrap_or("<unnamed>")
                    );
                }
            }
        }
    }

    Ok(())
}
