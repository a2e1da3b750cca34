// src/system/logging.rs

//! Logger setup for the binary.

use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use crate::core::paths::DataPaths;

/// Writes every log line to the log file and, when asked, mirrors it to stderr.
struct LogSink {
    file: Option<File>,
    mirror_stderr: bool,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        if self.mirror_stderr || self.file.is_none() {
            io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        io::stderr().flush()
    }
}

/// Initializes the global logger.
///
/// Records are appended to `app.log` in the data directory. `RUST_LOG` overrides
/// `default_level`. With `verbose`, records are also printed to stderr; if the log
/// file cannot be opened they always are.
pub fn init(paths: &DataPaths, default_level: &str, verbose: bool) {
    let file = std::fs::create_dir_all(paths.root())
        .and_then(|_| OpenOptions::new().create(true).append(true).open(paths.log_file()))
        .ok();

    let sink = LogSink {
        file,
        mirror_stderr: verbose,
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(sink)));

    // A second initialization (e.g. from tests) is harmless.
    let _ = builder.try_init();
}
