use gym_stats::*;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Convert legacy csv e-graphs to the serialized json format, writing each next to its input
#[derive(Parser, Debug, Serialize)]
#[clap(name = "convert")]
pub struct Args {
    /// legacy e-graph files, ie data/foo.csv becomes data/foo.json
    #[clap(parse(from_os_str), required = true)]
    pub files: Vec<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    for file in args.files.iter() {
        println!("converting {}", file.display());
        if let Err(e) = convert_file(file) {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
