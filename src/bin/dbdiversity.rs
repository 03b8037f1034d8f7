use dbdiversity::{analyze_directory, AnalysisConfig, FailurePolicy, OnFailure};
use std::path::Path;
use std::process;

extern crate clap;
extern crate env_logger;

use clap::{App, Arg, ArgMatches};
use env_logger::Env;

fn number(matches: &ArgMatches, name: &str) -> Result<Option<f64>, String> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| format!("--{} expects a number, got '{}'", name, v)),
    }
}

fn configure(matches: &ArgMatches) -> Result<AnalysisConfig, failure::Error> {
    let mut config = match matches.value_of("config") {
        Some(path) => AnalysisConfig::from_yaml_file(Path::new(path))?,
        None => AnalysisConfig::default(),
    };
    let err = failure::err_msg;
    if let Some(precision) = number(matches, "precision").map_err(err)? {
        config.fill_rate.precision = precision;
    }
    if let Some(radius) = number(matches, "radius").map_err(err)? {
        config.fill_rate.marker_radius = radius;
    }
    if let Some(xlim) = number(matches, "xlim").map_err(err)? {
        config.plot.xlim = xlim;
    }
    if let Some(ylim) = number(matches, "ylim").map_err(err)? {
        config.plot.ylim = ylim;
    }
    if matches.is_present("keep-going") {
        config.policy = FailurePolicy::lenient();
    }
    if matches.is_present("skip-invalid-images") {
        config.policy.invalid_image = OnFailure::Skip;
    }
    if matches.is_present("cache") {
        config.cache_features = true;
    }
    config.check().map_err(err)?;
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let config = configure(matches)?;
    // Required, with a default.
    let parent = Path::new(matches.value_of("parent").unwrap_or_default());
    let output = matches.value_of("output").map(Path::new);

    let report = analyze_directory(parent, output, config)?;
    for failure in &report.failures {
        eprintln!("skipped: {}", failure);
    }
    println!(
        "Max SI: {:.4}, Max CF: {:.4}\n",
        report.basis.max_si(),
        report.basis.max_cf()
    );
    print!("{}", report.table);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().filter_or("LOGGING_LEVEL", "warn")).init();

    let matches = App::new("dbdiversity")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Visual diversity metrics for a directory of image databases")
        .arg(
            Arg::with_name("parent")
                .help("Directory whose subdirectories are the databases")
                .env("DB_SRC")
                .default_value("./example_dataset/")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Directory for plots and results.json; nothing is written without it")
                .short("o")
                .long("output")
                .env("OUTPUT")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("config")
                .help("YAML file with run configuration")
                .short("c")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("precision")
                .help("Fill-rate canvas precision, in dots per inch [default: 600]")
                .long("precision")
                .env("FILL_RATE_PRECISION")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("radius")
                .help("Fill-rate marker radius, in points [default: 60]")
                .long("radius")
                .env("FILL_RATE_RADIUS")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("xlim")
                .help("Colorfulness axis limit of the plots [default: 165]")
                .long("xlim")
                .env("PLOT_XLIM")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ylim")
                .help("Spatial information axis limit of the plots [default: 170]")
                .long("ylim")
                .env("PLOT_YLIM")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("keep-going")
                .help("Skip failing databases instead of aborting the run")
                .short("k")
                .long("keep-going"),
        )
        .arg(
            Arg::with_name("skip-invalid-images")
                .help("Leave out images that cannot be decoded")
                .long("skip-invalid-images"),
        )
        .arg(
            Arg::with_name("cache")
                .help("Reuse the features measured while finding the basis")
                .long("cache"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("dbdiversity: {}", e);
        process::exit(1);
    }
}
