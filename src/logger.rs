use chrono::Local;
use env_logger::fmt::{Color, Style, StyledValue};
use env_logger::{Builder, Logger};
use log::{Level, LevelFilter, Log};

const CRATE_TARGET: &str = "streamdl";

pub fn default_logger(debug: bool) -> Logger {
    formatted_local_time_builder("%H:%M:%S.%3f")
        .filter_level(if debug { LevelFilter::Trace } else { LevelFilter::Info })
        .parse_default_env()
        .build()
}

/// Installs the logger globally. Messages go to stderr so `--json` output
/// on stdout stays parseable.
pub fn init(debug: bool) -> Result<(), log::SetLoggerError> {
    let logger = default_logger(debug);
    let max_level = logger.filter();

    log::set_boxed_logger(Box::new(logger) as Box<dyn Log>)?;
    log::set_max_level(max_level);

    Ok(())
}

fn is_crate_target(target: &str) -> bool {
    target == CRATE_TARGET || target.starts_with(&format!("{CRATE_TARGET}::"))
}

fn formatted_local_time_builder(fmt: &'static str) -> Builder {
    let mut builder = Builder::new();

    builder.format(|f, record| {
        use std::io::Write;

        if !is_crate_target(record.target()) {
            return Ok(());
        }

        let mut style = f.style();
        let level = colored_level(&mut style, record.level());

        let time = Local::now().format(fmt);

        writeln!(f, "{} {} > {}", time, level, record.args())
    });

    builder
}

fn colored_level(style: &'_ mut Style, level: Level) -> StyledValue<'_, &'static str> {
    match level {
        Level::Trace => style.set_color(Color::Magenta).value("TRACE"),
        Level::Debug => style.set_color(Color::Blue).value("DEBUG"),
        Level::Info => style.set_color(Color::Green).value("INFO "),
        Level::Warn => style.set_color(Color::Yellow).value("WARN "),
        Level::Error => style.set_color(Color::Red).value("ERROR"),
    }
}
