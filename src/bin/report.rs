use gym_stats::*;
use clap::Parser;
use colorful::Colorful;
use std::io::IsTerminal;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cfg = ReportConfig::parse();
    if let Ok(args) = serde_json::to_string(&cfg) {
        log::debug!("args: {}", args);
    }

    let text = match run(&cfg) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // only highlight mismatches when a person is reading
    let color = std::io::stdout().is_terminal();
    for line in text.lines() {
        if color && line.starts_with(MISMATCH_PREFIX) {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
}
