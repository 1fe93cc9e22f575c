//! Parser seam for scraped upstream pages.
//!
//! The HTML/JSON parsers for the university systems live in a separate
//! library and are consumed as black boxes: one pure function per page type,
//! raw text in, typed DTO or [`ParseError`] out. This module defines the
//! trait each client uses to hold its parser set, so tests can substitute
//! stub parsers without touching the network code.

use crate::error::ParseError;

/// A pure parser for one upstream page type.
///
/// Implemented for free by any `Fn(&str) -> Result<T, ParseError>`, which is
/// how the real parser-library functions are plugged in.
pub trait PageParser<T>: Send + Sync {
    /// Parses the raw response body into a typed DTO.
    fn parse(&self, raw: &str) -> Result<T, ParseError>;
}

impl<T, F> PageParser<T> for F
where
    F: Fn(&str) -> Result<T, ParseError> + Send + Sync,
{
    fn parse(&self, raw: &str) -> Result<T, ParseError> {
        self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_parser() {
        let parser = |raw: &str| {
            if raw.is_empty() {
                Err(ParseError::new("empty body"))
            } else {
                Ok(raw.len())
            }
        };

        assert_eq!(parser.parse("abc").unwrap(), 3);
        assert!(parser.parse("").is_err());
    }
}
