//! env_logger setup with secret redaction
//!
//! Every record is formatted through the process-wide [`Redactor`], which is
//! installed once the provider has resolved its API key.

use reconcile::Redactor;
use std::borrow::Cow;
use std::io::Write;
use std::sync::OnceLock;

static REDACTOR: OnceLock<Redactor> = OnceLock::new();

/// Initialize logging based on `-v` count and `--quiet`
pub fn init(verbose: u8, quiet: bool) {
    env_logger::Builder::new()
        .filter_level(level(verbose, quiet))
        .format_timestamp(None)
        .format(|buf, record| {
            let message = record.args().to_string();
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                redact(&message)
            )
        })
        .init();
}

/// Install the redactor for all later log records
///
/// Only the first call has an effect.
pub fn set_redactor(redactor: Redactor) {
    if REDACTOR.set(redactor).is_err() {
        log::debug!("Log redactor already installed");
    }
}

fn level(verbose: u8, quiet: bool) -> log::LevelFilter {
    if quiet {
        return log::LevelFilter::Error;
    }
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn redact(message: &str) -> Cow<'_, str> {
    match REDACTOR.get() {
        Some(redactor) => redactor.redact(message),
        None => Cow::Borrowed(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level(0, false), log::LevelFilter::Warn);
        assert_eq!(level(1, false), log::LevelFilter::Info);
        assert_eq!(level(2, false), log::LevelFilter::Debug);
        assert_eq!(level(5, false), log::LevelFilter::Trace);
        assert_eq!(level(3, true), log::LevelFilter::Error);
    }

    #[test]
    fn test_redact_passthrough_without_secrets() {
        assert_eq!(redact("nothing secret"), "nothing secret");
    }
}
