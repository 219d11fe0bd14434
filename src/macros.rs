//! Declarative helpers for the resource modules.

/// Declares a string enumeration exchanged on the wire as its lowercase value.
///
/// The generated type parses case-insensitively and rejects anything outside
/// the declared set with a [`ValidationError`](crate::ValidationError), both
/// through `FromStr` and during deserialization.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every declared value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => {
                        let expected = $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        Err($crate::ValidationError::new(format!(
                            "invalid {} value `{}` (expected one of: {})",
                            stringify!($name),
                            value,
                            expected
                        )))
                    }
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Implements [`Model`](crate::Model) with a name and the wire names of the
/// required fields.
macro_rules! impl_model {
    ($name:ty, $label:literal) => {
        impl_model!($name, $label, []);
    };
    ($name:ty, $label:literal, [$($field:literal),* $(,)?]) => {
        impl $crate::model::Model for $name {
            const NAME: &'static str = $label;

            fn required_fields() -> &'static [&'static str] {
                &[$($field),*]
            }
        }
    };
}

/// Declares a resource client handle sharing the SDK's transport.
macro_rules! resource_client {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            inner: std::sync::Arc<$crate::client::ClientInner>,
            options: $crate::http::RequestOptions,
        }

        impl $name {
            pub(crate) fn new(inner: std::sync::Arc<$crate::client::ClientInner>) -> Self {
                Self {
                    inner,
                    options: $crate::http::RequestOptions::default(),
                }
            }

            /// Applies `options` (request id, headers, timeout, retry policy) to
            /// every call made through this handle.
            pub fn with_options(mut self, options: $crate::http::RequestOptions) -> Self {
                self.options = options;
                self
            }
        }
    };
}

#[cfg(test)]
mod tests {
    string_enum! {
        /// Test-only enumeration.
        pub enum Weather {
            Sunny => "sunny",
            PartlyCloudy => "partly_cloudy",
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("SUNNY".parse::<Weather>().unwrap(), Weather::Sunny);
        assert_eq!(" partly_cloudy ".parse::<Weather>().unwrap(), Weather::PartlyCloudy);
    }

    #[test]
    fn rejects_undeclared_values() {
        let err = "rainy".parse::<Weather>().unwrap_err();
        assert_eq!(
            err.message,
            "invalid Weather value `rainy` (expected one of: sunny, partly_cloudy)"
        );
    }

    #[test]
    fn serializes_as_wire_string() {
        assert_eq!(
            serde_json::to_string(&Weather::PartlyCloudy).unwrap(),
            "\"partly_cloudy\""
        );
        let parsed: Weather = serde_json::from_str("\"sunny\"").unwrap();
        assert_eq!(parsed, Weather::Sunny);
        assert!(serde_json::from_str::<Weather>("\"rainy\"").is_err());
        assert_eq!(Weather::ALL.len(), 2);
    }
}
