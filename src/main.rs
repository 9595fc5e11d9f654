// RustPixel
// copyright zipxing@hotmail.com 2022～2025

use log::{error, info};
use pixel_text::{log::parse_level, TextConfig};

fn main() {
    let config = match TextConfig::load(".") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("pixel_text: {}", e);
            std::process::exit(1);
        }
    };

    let level = parse_level(&config.log.level).unwrap_or(log::LevelFilter::Info);
    let logging = match pixel_text::log::init_log(level, &config.log.file) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("pixel_text: log init failed: {}", e);
            false
        }
    };
    info!("{}", TextConfig::describe_source("."));
    info!("pixel_text starting, font {:?}", config.font.path);

    if let Err(e) = pixel_text::run(config) {
        if logging {
            error!("{}", e);
        } else {
            eprintln!("pixel_text: {}", e);
        }
        std::process::exit(1);
    }
}
