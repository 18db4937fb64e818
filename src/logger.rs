use core::fmt::Arguments;
use std::path::Path;

use log::{LevelFilter, Record};

/// Routes log records to `path`; the terminal is left to the UI.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(file_format)
        .level(LevelFilter::Warn.min(level))
        .level_for("pokedeck", level)
        .chain(fern::log_file(path)?)
        .apply()?;

    Ok(())
}

fn file_format(callback: fern::FormatCallback, message: &Arguments, record: &Record) {
    callback.finish(format_args!(
        "{} {:<5} [{}] {}",
        chrono::Local::now().format("%F %T%.3f"),
        record.level(),
        record.target(),
        message
    ))
}
