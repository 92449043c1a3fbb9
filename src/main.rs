use clap::{Arg, ArgAction, Command};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use polygon_combiner::{
    input, process_files, AreaType, CombineOptions, Combined, Combiner, InputFormat,
    ProcessError,
};

fn main() {
    let matches = Command::new("Polygon Combiner")
        .version("1.0")
        .author("Jesper Fjellin")
        .about("Unions polygon and multipolygon WKT shapes into a single shape")
        .arg(
            Arg::new("files")
                .short('f')
                .long("files")
                .num_args(1..)
                .help("Input files with shapes to combine (reads stdin when omitted)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .num_args(1)
                .default_value("wkt")
                .value_parser(["wkt", "geojson"])
                .help("Output format of the combined shape"),
        )
        .arg(
            Arg::new("input-format")
                .long("input-format")
                .num_args(1)
                .default_value("auto")
                .value_parser(["auto", "lines", "json", "geojson"])
                .help("Layout of the input: WKT per line, JSON array of WKT, or GeoJSON"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .num_args(1)
                .value_parser(clap::value_parser!(u64))
                .help("Give up on the union after this many milliseconds"),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .action(ArgAction::SetTrue)
                .help("Merge on a single thread"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Fail on the first shape that cannot be parsed"),
        )
        .arg(
            Arg::new("no-validate")
                .long("no-validate")
                .action(ArgAction::SetTrue)
                .help("Skip ring validation before the union"),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Both values are restricted by their value parsers
    let format: AreaType = matches
        .get_one::<String>("format")
        .and_then(|f| f.parse().ok())
        .unwrap_or_default();
    let input_format: InputFormat = matches
        .get_one::<String>("input-format")
        .and_then(|f| f.parse().ok())
        .unwrap_or_default();

    let options = CombineOptions {
        strict: matches.get_flag("strict"),
        validate: !matches.get_flag("no-validate"),
        parallel: !matches.get_flag("sequential"),
        deadline: matches
            .get_one::<u64>("timeout-ms")
            .map(|ms| Duration::from_millis(*ms)),
    };

    let result = match matches.get_many::<String>("files") {
        Some(files) => {
            let files: Vec<PathBuf> = files.map(PathBuf::from).collect();
            for file in &files {
                if !file.exists() {
                    log::error!("File not found: {}", file.display());
                    std::process::exit(1);
                }
            }
            process_files(&files, input_format, format, options)
        }
        None => combine_stdin(input_format, format, options),
    };

    match result {
        Ok(combined) => {
            for diagnostic in &combined.diagnostics {
                log::warn!("Skipped {}", diagnostic);
            }
            match combined.kind {
                Some(kind) => log::info!("Combined into a {}", kind),
                None => log::info!("No polygonal input to combine"),
            }
            if !combined.output.is_empty() {
                println!("{}", combined.output);
            }
        }
        Err(e) => {
            log::error!("Error combining shapes: {}", e);
            if matches!(e, ProcessError::Pipeline(polygon_combiner::PipelineError::Topology(_))) {
                log::error!("Check the reported input for self-intersecting or degenerate rings.");
            }
            std::process::exit(1);
        }
    }
}

fn combine_stdin(
    input_format: InputFormat,
    format: AreaType,
    options: CombineOptions,
) -> Result<Combined, ProcessError> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(polygon_combiner::InputError::from)?;
    let items = input::read_batch(&text, input_format)?;
    Ok(Combiner::new(options).combine_decoded(items, format)?)
}
