use anyhow::Error;
use std::fmt::Display;

/// Exit status of a failed import.
pub const FAILURE: i32 = 1;

/// Adds methods for failing without panic. Like `expect` but without panic.
pub trait NiceError<T> {
    /// Fail exiting with `1` if the value is an error, printing the whole chain of causes.
    /// Otherwise return the content.
    fn nice_unwrap(self) -> T;

    /// Like [`NiceError::nice_unwrap`], but prefixing the error with `mex`.
    fn nice_expect<S: Display + Send + Sync + 'static>(self, mex: S) -> T;
}

fn print_error(error: Error) {
    debug!("{:?}", error);
    let mut fail: &dyn std::error::Error = error.as_ref();
    eprintln!("Error: {fail}");
    while let Some(cause) = fail.source() {
        eprintln!("\nCaused by:\n    {cause}");
        fail = cause;
    }
}

impl<T> NiceError<T> for Result<T, Error> {
    fn nice_unwrap(self) -> T {
        match self {
            Ok(x) => x,
            Err(e) => {
                print_error(e);
                std::process::exit(FAILURE);
            }
        }
    }

    fn nice_expect<S: Display + Send + Sync + 'static>(self, mex: S) -> T {
        match self {
            Ok(x) => x,
            Err(e) => {
                print_error(e.context(mex));
                std::process::exit(FAILURE);
            }
        }
    }
}
