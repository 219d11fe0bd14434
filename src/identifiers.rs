//! Strongly-typed code newtypes shared by several resources.
//!
//! All types implement `From<&str>`, `From<String>`, and `Into<String>` and
//! serialize/deserialize as plain strings.
//!
//! ```ignore
//! use bizdesk::{CountryCode, CurrencyCode};
//!
//! let currency: CurrencyCode = "eur".into();
//! assert_eq!(currency.as_str(), "EUR");
//! let country: CountryCode = "fr".into();
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a string wrapper newtype.
///
/// Each generated type trims whitespace from input values (optionally
/// upper- or lower-casing it), implements the string conversions and
/// `Display`, and serializes as a plain string.
macro_rules! string_code_type {
    ($name:ident, $normalize:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                let normalize: fn(&str) -> String = $normalize;
                Self(normalize(value.into().trim()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

string_code_type!(
    CurrencyCode,
    |s| s.to_ascii_uppercase(),
    "ISO 4217 currency code (e.g. \"EUR\", \"USD\")."
);

string_code_type!(
    CountryCode,
    |s| s.to_ascii_uppercase(),
    "ISO 3166-1 alpha-2 country code (e.g. \"FR\", \"BE\")."
);

string_code_type!(
    LocaleCode,
    |s| s.to_ascii_lowercase(),
    "Document/interface language (e.g. \"fr\", \"en\")."
);
