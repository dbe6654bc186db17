use clap::{Arg, ArgAction, Command, ValueHint};
use log::{info, LevelFilter};
use std::path::PathBuf;

use fnn::prelude::*;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Info)
        .parse_env(env_logger::Env::default().filter_or("FNN_LOG", "info"))
        .init();

    let matches = Command::new("mnist")
        .version(clap::crate_version!())
        .about("Train a sigmoid feedforward network on fixed-record digit images")
        .arg(
            Arg::new("train")
                .help("Training data: records of one label byte and 784 pixel bytes")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("test")
                .help("Test data in the same format")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("hidden")
                .long("hidden")
                .help("Hidden layer sizes, comma separated")
                .value_delimiter(',')
                .value_parser(clap::value_parser!(usize))
                .default_value("30"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("JSON training configuration; command line options override it")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("epochs")
                .short('e')
                .long("epochs")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("batch_size")
                .short('b')
                .long("batch-size")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("eta")
                .long("eta")
                .help("Learning rate")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Seed for initialization and shuffling; wall clock when absent")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Compute per-example gradients on all cores")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .help("Write per-epoch results to this CSV file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("plot")
                .long("plot")
                .help("Render accuracy and cost curves to this PNG file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("save")
                .long("save")
                .help("Write the trained network to this file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .get_matches();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => TrainConfig::from_json_file(path)?,
        None => TrainConfig::default(),
    };
    if let Some(&epochs) = matches.get_one::<usize>("epochs") {
        config.epochs = epochs;
    }
    if let Some(&batch_size) = matches.get_one::<usize>("batch_size") {
        config.batch_size = batch_size;
    }
    if let Some(&eta) = matches.get_one::<f64>("eta") {
        config.learning_rate = eta;
    }
    if matches.get_flag("parallel") {
        config.parallel = true;
    }
    config.validate()?;

    let train_path = matches.get_one::<PathBuf>("train").expect("required argument");
    let test_path = matches.get_one::<PathBuf>("test").expect("required argument");
    let mut train = load_mnist(train_path)?;
    let test = load_mnist(test_path)?;
    info!("{} training samples, {} test samples", train.len(), test.len());

    let mut sizes = vec![fnn::dataset::IMAGE_SIZE];
    sizes.extend(matches.get_many::<usize>("hidden").into_iter().flatten().copied());
    sizes.push(fnn::dataset::DIGITS);

    let rand = match matches.get_one::<u64>("seed") {
        Some(&seed) => Random::new(seed),
        None => Random::from_time(),
    };
    let mut net = NeuralNetwork::new(&sizes, rand)?;
    println!("{}", net.summary());

    let history = net.train(&config, &mut train, &test, same_digit)?;
    if let Some(eval) = history.final_evaluation() {
        println!("Final: {} in {} ms", eval, history.total_duration().as_millis());
    }

    if let Some(path) = matches.get_one::<PathBuf>("history") {
        write_history_csv(&history, path)?;
        info!("History written to {}", path.display());
    }
    if let Some(path) = matches.get_one::<PathBuf>("plot") {
        plot_history(&history, path).map_err(|e| MlError::PlotError(e.to_string()))?;
    }
    if let Some(path) = matches.get_one::<PathBuf>("save") {
        net.save(path)?;
        info!("Network saved to {}", path.display());
    }

    Ok(())
}
