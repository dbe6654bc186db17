use clap::{Arg, Command, ValueHint};
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::time::Instant;

use fnn::prelude::*;

// Times `forward` over every sample of a data file, either with a freshly
// initialized network or with one loaded from disk.
fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Info)
        .parse_env(env_logger::Env::default().filter_or("FNN_LOG", "info"))
        .init();

    let matches = Command::new("forward_benchmark")
        .version(clap::crate_version!())
        .about("Measure forward pass throughput")
        .arg(
            Arg::new("data")
                .help("Digit records to run through the network")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .help("Saved network; a random [784, 30, 10] network when absent")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("repeat")
                .short('r')
                .long("repeat")
                .value_parser(clap::value_parser!(usize))
                .default_value("1"),
        )
        .get_matches();

    let data = load_mnist(matches.get_one::<PathBuf>("data").expect("required argument"))?;
    let net = match matches.get_one::<PathBuf>("model") {
        Some(path) => NeuralNetwork::load(path, Random::new(0))?,
        None => NeuralNetwork::new(
            &[fnn::dataset::IMAGE_SIZE, 30, fnn::dataset::DIGITS],
            Random::new(0),
        )?,
    };
    net.check_dataset(&data, "benchmark")?;
    let repeat = *matches.get_one::<usize>("repeat").unwrap_or(&1);

    let start = Instant::now();
    let mut successes = 0;
    for _ in 0..repeat {
        successes = data
            .iter()
            .filter(|(x, y)| same_digit(&net.forward(x), y))
            .count();
    }
    let elapsed = start.elapsed();

    let passes = repeat * data.len();
    info!(
        "{} forward passes in {} ms ({:.3} us per pass)",
        passes,
        elapsed.as_millis(),
        elapsed.as_secs_f64() * 1e6 / passes.max(1) as f64
    );
    println!("{} / {} correct", successes, data.len());

    Ok(())
}
