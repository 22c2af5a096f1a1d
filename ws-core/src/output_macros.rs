//! Output macros for user-facing text.
//!
//! Reports go to stdout, diagnostics that happen before logging is set up go
//! to stderr. Everything else is emitted through `tracing`.

#[macro_export]
macro_rules! ws_print {
    ($($arg:tt)*) => {
        print!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! ws_error {
    ($($arg:tt)*) => {
        eprintln!("ERROR: {}", format!($($arg)*));
    }
}
