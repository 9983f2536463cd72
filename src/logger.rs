use std::fs::File;
use std::io::Write;

/// Verbosity levels, low to high. A logger configured at level `Info` emits
/// `Error`, `Warn`, and `Info` lines but not `Debug`/`Trace`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// A simple leveled logger, generalized from a plain verbosity counter: logs
/// to stderr and optionally appends to a log file.
#[derive(Debug)]
pub struct Logger {
    level: Level,
    log_file: Option<File>,
}

impl Logger {
    pub fn new(level: Level, log_file: Option<File>) -> Self
    {
        Self { level, log_file }
    }

    /// Maps `-v`/`-vv`/`-vvv` occurrence counts onto a `Level`.
    pub fn from_verbosity(count: u32, log_file: Option<File>) -> Self
    {
        let level = match count {
            0 => Level::Warn,
            1 => Level::Info,
            2 => Level::Debug,
            _ => Level::Trace,
        };
        Self::new(level, log_file)
    }

    /// Logs a message, with a specified level. Logs also into the log
    /// file, if present.
    pub fn log(&mut self, level: Level, msg: &str)
    {
        if level > self.level {
            return;
        }
        eprintln!("{}", msg);

        if let Some(log_file) = &mut self.log_file {
            writeln!(log_file, "{}", msg).unwrap_or_else(|_| {
                eprintln!("error: couldn't write into the log file")
            });
        }
    }

    pub fn trace(&mut self, msg: &str)
    {
        self.log(Level::Trace, msg);
    }

    pub fn debug(&mut self, msg: &str)
    {
        self.log(Level::Debug, msg);
    }
}
