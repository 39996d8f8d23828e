//! Enumerated field choices.
//!
//! Columns that only accept a fixed set of values are modelled as Rust enums
//! so an invalid choice cannot be constructed. Two flavours exist, matching
//! how the value is stored:
//!
//! - `int_choices!` stores a small integer code (`impact_level = 3`)
//! - `text_choices!` stores a short text code (`status = 'ACTIVE'`)
//!
//! Both generate `code()`, `label()`, `from_code()`, `ALL`, `Display`
//! (the label), `FromStr` and the rusqlite `ToSql`/`FromSql` conversions.
//! Integer choices parse from their code or their label; text choices parse
//! from their code. Reading an unknown code back from the database is a
//! conversion error, never a silent default.

macro_rules! int_choices {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $code:tt => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            /// Accepts the numeric code or the label, ignoring case.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let by_code = s.trim().parse::<i64>().ok().and_then($name::from_code);
                by_code
                    .or_else(|| $name::ALL.iter().copied().find(|choice| choice.label().eq_ignore_ascii_case(s.trim())))
                    .ok_or_else(|| format!("'{}' is not a valid {}", s, stringify!($name)))
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.code()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let code = value.as_i64()?;
                $name::from_code(code).ok_or(rusqlite::types::FromSqlError::OutOfRange(code))
            }
        }
    };
}

macro_rules! text_choices {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $code:tt => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $code)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.code().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("'{}' is not a valid {}", s, stringify!($name)))
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.code()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let code = value.as_str()?;
                $name::from_code(code)
                    .ok_or_else(|| rusqlite::types::FromSqlError::Other(format!("unknown {} code '{}'", stringify!($name), code).into()))
            }
        }
    };
}

pub(crate) use int_choices;
pub(crate) use text_choices;
