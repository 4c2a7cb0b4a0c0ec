use log::LevelFilter;

/// Initializes the logging system from `log4rs.yaml` in the working directory.
/// Prefer `configure_logging` for programmatic control.
///
/// # Errors
/// Returns an error if the file is missing or invalid, or a logger is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    init_path(std::path::Path::new("log4rs.yaml"))
}

/// Initializes the logging system from a specific config file path.
///
/// # Errors
/// Returns an error if the file cannot be read or the logger is already initialized.
pub fn init_path(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

/// Parse a textual level (error|warn|info|debug|trace|off). Unknown values fall back to `Info`.
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.map(str::to_ascii_lowercase).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") | Some("warning") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Configure console logging (stderr) for the process.
///
/// Generated schemas go to stdout, so log lines never interleave with them.
/// If log4rs is already initialized the call is a no-op.
pub fn configure_logging(level: Option<&str>) {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config, Logger, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let level = parse_level(level);
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .logger(Logger::builder().build("docquery_schema", level))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn));
    match config {
        Ok(cfg) => {
            let _ = log4rs::init_config(cfg);
        }
        Err(e) => eprintln!("logging disabled: {e}"),
    }
}
