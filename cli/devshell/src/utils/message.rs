use std::fmt::Display;

/// Write a message to stderr.
///
/// This is a wrapper around `eprintln!` so that stdout stays reserved
/// for the rendered shell.
fn print_message(v: impl Display) {
    eprintln!("{v}");
}

pub(crate) fn error(v: impl Display) {
    print_message(std::format_args!("ERROR: {v}"));
}
pub(crate) fn warning(v: impl Display) {
    print_message(std::format_args!("WARNING: {v}"));
}
