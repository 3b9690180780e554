//! Value helpers for the special BSON types used inside filters and updates.
//!
//! Identifiers, regular expressions, binary payloads, dates and code values all
//! have a dedicated BSON representation. The helpers in this module build them
//! from ordinary Rust values, reporting malformed input as
//! [`MongaError::InvalidArgument`].
//!
//! ```ignore
//! use monga::value;
//!
//! let id = value::id("4af9f23d8ead0e1d32000000")?;
//! let pattern = value::regex("/^john/i")?;
//! let created = value::now();
//! ```

use bson::{
    Binary, Bson, DateTime, Document, JavaScriptCodeWithScope, oid::ObjectId, raw::CString,
    spec::BinarySubtype,
};
use chrono::Utc;

use crate::error::{MongaError, MongaResult};

/// Parses a 24 character hex string into an [`ObjectId`].
pub fn id(hex: &str) -> MongaResult<ObjectId> {
    ObjectId::parse_str(hex)
        .map_err(|e| MongaError::InvalidArgument(format!("invalid identifier \"{hex}\": {e}")))
}

/// Generates a fresh [`ObjectId`].
pub fn new_id() -> ObjectId {
    ObjectId::new()
}

/// Parses a delimited regex literal such as `/^john/i`.
pub fn regex(literal: &str) -> MongaResult<Regex> {
    Regex::parse(literal)
}

/// Wraps raw bytes into a generic binary value.
pub fn data(bytes: impl Into<Vec<u8>>) -> Binary {
    data_with_subtype(bytes, BinarySubtype::Generic)
}

/// Wraps raw bytes into a binary value with an explicit subtype.
pub fn data_with_subtype(bytes: impl Into<Vec<u8>>, subtype: BinarySubtype) -> Binary {
    Binary { subtype, bytes: bytes.into() }
}

/// Converts a chrono timestamp into a BSON date.
pub fn date(at: chrono::DateTime<Utc>) -> DateTime {
    DateTime::from_chrono(at)
}

/// The current time as a BSON date.
pub fn now() -> DateTime {
    DateTime::now()
}

/// A JavaScript code value.
pub fn code(source: impl Into<String>) -> Bson {
    Bson::JavaScriptCode(source.into())
}

/// A JavaScript code value carrying its own variable scope.
pub fn code_with_scope(source: impl Into<String>, scope: Document) -> Bson {
    Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
        code: source.into(),
        scope,
    })
}

/// Stores a UUID as a binary value of the UUID subtype.
pub fn uuid(value: uuid::Uuid) -> Bson {
    Bson::Binary(data_with_subtype(value.as_bytes().to_vec(), BinarySubtype::Uuid))
}

/// A regular expression matched by the database.
///
/// Emitted as a BSON regex value, so it is valid anywhere a value is: directly
/// under a field, inside `$in`/`$nin`/`$all` lists, or as an update operand.
/// Flags are kept in the alphabetical order the BSON format requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    inner: bson::Regex,
}

impl Regex {
    /// Creates a regex from a bare pattern and its flags.
    ///
    /// Fails when either part contains a nul byte, which a BSON cstring cannot
    /// carry.
    pub fn new(pattern: impl Into<String>, flags: impl AsRef<str>) -> MongaResult<Self> {
        let mut sorted = flags.as_ref().chars().collect::<Vec<_>>();
        sorted.sort_unstable();

        let pattern = CString::try_from(pattern.into())
            .map_err(|e| MongaError::InvalidArgument(format!("invalid regex pattern: {e}")))?;
        let options = CString::try_from(sorted.into_iter().collect::<String>())
            .map_err(|e| MongaError::InvalidArgument(format!("invalid regex flags: {e}")))?;

        Ok(Regex {
            inner: bson::Regex { pattern, options },
        })
    }

    /// Parses a `/pattern/flags` literal.
    ///
    /// The pattern is everything between the first and the last slash, so
    /// slashes inside the pattern do not need escaping.
    pub fn parse(literal: &str) -> MongaResult<Self> {
        let malformed = || MongaError::InvalidArgument(format!("invalid regex literal \"{literal}\""));

        let body = literal.strip_prefix('/').ok_or_else(malformed)?;
        let end = body.rfind('/').ok_or_else(malformed)?;
        let (pattern, flags) = (&body[..end], &body[end + 1..]);

        if !flags.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(malformed());
        }

        Regex::new(pattern, flags)
    }

    pub fn pattern(&self) -> &str {
        self.inner.pattern.as_str()
    }

    pub fn flags(&self) -> &str {
        self.inner.options.as_str()
    }
}

impl From<Regex> for Bson {
    fn from(regex: Regex) -> Self {
        Bson::RegularExpression(regex.inner)
    }
}

/// Values that can be coerced into a document identifier.
///
/// Bare strings are parsed as hex encoded object ids, so `where_id("...")`
/// and `where_id(ObjectId)` build the same predicate.
pub trait IntoIdentifier {
    fn into_identifier(self) -> MongaResult<ObjectId>;
}

impl IntoIdentifier for ObjectId {
    fn into_identifier(self) -> MongaResult<ObjectId> {
        Ok(self)
    }
}

impl IntoIdentifier for &str {
    fn into_identifier(self) -> MongaResult<ObjectId> {
        id(self)
    }
}

impl IntoIdentifier for String {
    fn into_identifier(self) -> MongaResult<ObjectId> {
        id(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;

    #[test]
    fn test_id_parses_hex() {
        let parsed = id("4af9f23d8ead0e1d32000000").unwrap();
        assert_eq!(parsed.to_hex(), "4af9f23d8ead0e1d32000000");
    }

    #[test]
    fn test_id_rejects_garbage() {
        let err = id("not-an-id").unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_regex_literal() {
        let parsed = regex("/^jo/hn$/mi").unwrap();
        assert_eq!(parsed.pattern(), "^jo/hn$");
        assert_eq!(parsed.flags(), "im");
    }

    #[test]
    fn test_regex_literal_requires_delimiters() {
        assert!(regex("^john$").is_err());
        assert!(regex("/unterminated").is_err());
        assert!(regex("/john/i-").is_err());
    }

    #[test]
    fn test_regex_rejects_nul_bytes() {
        assert!(Regex::new("a\0b", "i").unwrap_err().is_argument_error());
        assert!(Regex::new("ab", "i\0").unwrap_err().is_argument_error());
    }

    #[test]
    fn test_regex_emits_regex_value() {
        match Bson::from(Regex::new("^a", "si").unwrap()) {
            Bson::RegularExpression(regex) => {
                assert_eq!(regex.pattern.as_str(), "^a");
                assert_eq!(regex.options.as_str(), "is");
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_regex_inside_value_lists() {
        let values = Bson::Array(vec![regex("/^jo/i").unwrap().into(), "john".into()]);
        match values {
            Bson::Array(items) => assert!(matches!(items[0], Bson::RegularExpression(_))),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_binary_and_uuid() {
        let binary = data(vec![1u8, 2, 3]);
        assert_eq!(binary.subtype, BinarySubtype::Generic);
        assert_eq!(binary.bytes, vec![1, 2, 3]);

        let value = uuid::Uuid::nil();
        match uuid(value) {
            Bson::Binary(binary) => {
                assert_eq!(binary.subtype, BinarySubtype::Uuid);
                assert_eq!(binary.bytes.len(), 16);
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_date_from_chrono() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(date(at).timestamp_millis(), 1_577_836_800_000);
    }

    #[test]
    fn test_code_with_scope() {
        match code_with_scope("return x;", doc! { "x": 1 }) {
            Bson::JavaScriptCodeWithScope(code) => {
                assert_eq!(code.code, "return x;");
                assert_eq!(code.scope, doc! { "x": 1 });
            }
            other => panic!("unexpected value {other:?}"),
        }
    }
}
