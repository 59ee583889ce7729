use std::fmt::Display;

pub trait ResultExt<T> {
    /// Log the error and turn the result into an `Option`.
    fn log_ok(self, msg: &str) -> Option<T>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn log_ok(self, msg: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                log::error!("{msg}: {e:#}");
                None
            }
        }
    }
}
