mod panic_hook;

pub use panic_hook::tracing_panic_hook;

use std::error::Error;
use std::fmt::Write as _;

/// Render an error followed by all of its sources, separated by `: `.
///
/// SDK errors hide the interesting part several levels deep, the top-level
/// `Display` is usually just "service error".
#[must_use]
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        let _ = write!(out, ": {err}");
        source = err.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::error_chain;

    #[derive(Debug)]
    struct Wrapper(std::io::Error);

    impl std::fmt::Display for Wrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("cannot publish")
        }
    }

    impl std::error::Error for Wrapper {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn chain_includes_sources() {
        let err = Wrapper(std::io::Error::other("connection reset"));
        assert_eq!("cannot publish: connection reset", error_chain(&err));
    }
}
