//! Error handling foundation for palaver.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error types in their own
//! error modules; outer layers wrap them in a `Report` so context can be
//! attached as errors propagate up the stack.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    fn explode() -> std::result::Result<(), Boom> {
        Err(Boom)
    }

    fn fails() -> Result<(), Boom> {
        explode()?;
        Ok(())
    }

    #[test]
    fn result_type_works() {
        let ok: Result<i32, Boom> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }

    #[test]
    fn question_mark_wraps_context_in_report() {
        let err = fails().expect_err("should fail");
        assert!(err.to_string().contains("boom"));
    }
}
