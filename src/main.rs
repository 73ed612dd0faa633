//! holdlabel entry point: summarizes the labels of an image folder.
//!
//! Usage: `holdlabel [IMAGES_DIR] [LABELS_DIR]`
use std::path::PathBuf;

use holdlabel::{AppConfig, ClassType, Session, SessionOptions};

fn main() {
    let config = AppConfig::load_from_default_path().unwrap_or_default();
    let prefs = config.preferences;

    env_logger::Builder::new()
        .filter_level(prefs.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let images_dir = args.next().map(PathBuf::from).unwrap_or_else(|| prefs.images_dir.clone());
    let labels_dir = args.next().map(PathBuf::from).unwrap_or_else(|| prefs.labels_dir.clone());

    let mut session = match Session::open(&images_dir, &labels_dir, SessionOptions::from(&prefs)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to open {:?}: {}", images_dir, e);
            std::process::exit(1);
        }
    };

    if session.is_empty() {
        println!("No images found in {:?}", images_dir);
        return;
    }

    loop {
        if let Some(current) = session.current() {
            println!(
                "{:>4}/{} {:<32} holds: {:>3}  volumes: {:>3}  skipped lines: {}",
                session.index() + 1,
                session.len(),
                current.image_key(),
                current.set.count_of(ClassType::Hold),
                current.set.count_of(ClassType::Volume),
                current.skipped.len()
            );
        }

        match session.next() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("Failed to load image {}: {}", session.index() + 2, e);
                std::process::exit(1);
            }
        }
    }
}
