use std::{borrow::Borrow, fmt::Display, path::Path};

use logger::Logger;
use swc_common::{SourceMap, Span};

/// A logger that can point at a location in the file being processed.
pub trait SrcFileLogger: Logger {
    /// Renders `location` as `file:line:col`.
    fn describe_span(&self, location: &Span) -> String;

    fn src_warn(&self, location: &Span, message: impl Display) {
        self.warn(format!("{} :: {}", self.describe_span(location), message));
    }
    fn src_error(&self, location: &Span, message: impl Display) {
        self.error(format!("{} :: {}", self.describe_span(location), message));
    }
}

impl<T: SrcFileLogger> SrcFileLogger for &T {
    fn describe_span(&self, location: &Span) -> String {
        (*self).describe_span(location)
    }
}

pub trait HasSourceMap {
    fn source_map(&self) -> &SourceMap;
}

/// Wraps a logger with the source map of a parsed file, so spans can be
/// reported as line/column positions.
#[derive(Clone)]
pub struct WrapFileLogger<TSrcMap, TLogger> {
    source_map: TSrcMap,
    inner_logger: TLogger,
}
impl<TSourceMap: Borrow<SourceMap>, TLogger: Logger>
    WrapFileLogger<TSourceMap, TLogger>
{
    pub fn new(source_map: TSourceMap, inner_logger: TLogger) -> Self {
        Self {
            source_map,
            inner_logger,
        }
    }
}
impl<TSourceMap: Borrow<SourceMap>, TLogger: Logger> Logger
    for WrapFileLogger<TSourceMap, TLogger>
{
    fn log(&self, message: impl Display) {
        self.inner_logger.log(message);
    }
    fn error(&self, message: impl Display) {
        self.inner_logger.error(message);
    }
    fn warn(&self, message: impl Display) {
        self.inner_logger.warn(message);
    }
}
impl<TSourceMap: Borrow<SourceMap>, TLogger: Logger> HasSourceMap
    for WrapFileLogger<TSourceMap, TLogger>
{
    fn source_map(&self) -> &SourceMap {
        self.source_map.borrow()
    }
}
impl<TSourceMap: Borrow<SourceMap>, TLogger: Logger> SrcFileLogger
    for WrapFileLogger<TSourceMap, TLogger>
{
    fn describe_span(&self, location: &Span) -> String {
        let loc = self.source_map().lookup_char_pos(location.lo);
        format!("{}:{}:{}", loc.file.name, loc.line, loc.col_display)
    }
}

/// Fallback for when no source map is at hand: only the file path is reported.
#[derive(Clone)]
pub struct SimpleSourceFileLogger<'a, TLogger: Logger> {
    source_file_path: &'a Path,
    inner_logger: TLogger,
}
impl<'a, TLogger: Logger> SimpleSourceFileLogger<'a, TLogger> {
    pub fn new(source_file_path: &'a Path, inner_logger: TLogger) -> Self {
        Self {
            source_file_path,
            inner_logger,
        }
    }
}
impl<TLogger: Logger> Logger for SimpleSourceFileLogger<'_, TLogger> {
    fn log(&self, message: impl Display) {
        self.inner_logger.log(message);
    }
    fn error(&self, message: impl Display) {
        self.inner_logger.error(message);
    }
    fn warn(&self, message: impl Display) {
        self.inner_logger.warn(message);
    }
}
impl<TLogger: Logger> SrcFileLogger for SimpleSourceFileLogger<'_, TLogger> {
    fn describe_span(&self, _location: &Span) -> String {
        self.source_file_path.display().to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use logger::VecLogger;
    use swc_common::DUMMY_SP;

    #[test]
    fn simple_logger_names_the_file() {
        let logs = VecLogger::new();
        let file_logger = SimpleSourceFileLogger::new(Path::new("/src/a.js"), &logs);
        file_logger.src_warn(&DUMMY_SP, "odd statement");
        (&file_logger).src_error(&DUMMY_SP, "bad statement");
        assert_eq!(
            logs.get_logs().unwrap(),
            vec![
                "WARN: /src/a.js :: odd statement",
                "ERROR: /src/a.js :: bad statement"
            ]
        );
    }
}
