use std::{fs::File, io::Write, path::PathBuf};

use clap::ValueEnum;
use env_logger::{Builder, Target, fmt::Formatter};
use log::{Level, LevelFilter};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub level: LogLevel,
    pub format: LogFormat,
    pub timestamp: bool,
    pub output: Option<PathBuf>,
}

pub fn init_logger(options: &LogOptions) -> Result<()> {
    let log_format = options.format;
    let log_timestamp = options.timestamp;

    let mut builder = Builder::new();
    builder
        .filter_level(options.level.to_filter())
        .write_style(env_logger::WriteStyle::Never)
        .format(move |buf: &mut Formatter, record| {
            if log_timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }

            match log_format {
                LogFormat::Compact => {
                    writeln!(buf, "{} {}", level_tag(record.level()), record.args())
                }
                LogFormat::Pretty => {
                    writeln!(
                        buf,
                        "{} [{}] {}",
                        level_tag(record.level()),
                        record.target(),
                        record.args()
                    )
                }
            }
        });

    if let Some(log_path) = &options.output {
        let log_file = File::create(log_path).map_err(|e| {
            crate::Error::other(format!(
                "failed to create log output file {}: {e}",
                log_path.display()
            ))
        })?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| crate::Error::other(format!("logger init failed: {e}")))
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_onto_filters() {
        assert_eq!(LogLevel::default().to_filter(), LevelFilter::Info);
        assert_eq!(LogLevel::Off.to_filter(), LevelFilter::Off);
        assert_eq!(LogLevel::Trace.to_filter(), LevelFilter::Trace);
    }

    #[test]
    fn tags_are_upper_case() {
        assert_eq!(level_tag(Level::Warn), "WARN");
        assert_eq!(level_tag(Level::Debug), "DEBUG");
    }
}
