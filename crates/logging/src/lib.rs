//! helpers for logging.
//!
//! The datastore logs every statement it issues at debug, and every engine failure at error.  Nothing in the
//! workspace installs a logger on its own; binaries and tests call one of the functions here.

/// Filter used when `RUST_LOG` isn't set.
const DEFAULT_FILTER: &str = "info";

fn build(is_test: bool) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));

    builder.is_test(is_test).format(|buf, record| {
        use std::io::Write;

        let now = time::OffsetDateTime::now_utc();

        writeln!(
            buf,
            "{} {} time={} target={}",
            record.level(),
            record.args(),
            now,
            record.target()
        )
    });

    builder
}

/// Log to stderr.
///
/// If called multiple times in the same process, only applies once.
pub fn log_to_stderr() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        build(false).init();
    });
}

/// Log through the test harness, so that output is captured per test.
///
/// Safe to call from every test: only the first call in a process installs the logger.
pub fn log_for_tests() {
    // Another test may have won the race; that's fine.
    let _ = build(true).try_init();
}
