//! Declarative macros for score type boilerplate.
//!
//! All score types are structs of named levels, so arithmetic, ordering and
//! parsing are generated field by field.

/// Generates `Ord`, `PartialOrd`, `Add`, `Sub`, and `Neg` for a score type.
///
/// Fields are compared in the order they are listed, which must be
/// highest priority first.
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    $( .then_with(|| self.$field.cmp(&other.$field)) )+
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor( $(self.$field + other.$field),+ )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor( $(self.$field - other.$field),+ )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor( $(-self.$field),+ )
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(<$type as Default>::default(), |acc, s| acc + s)
            }
        }
    };
}

/// Generates `multiply`, `abs` and `to_level_numbers` for integer levels.
///
/// Intended to be used *inside* an `impl Score for Type { ... }` block.
macro_rules! impl_int_score_scale {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        fn multiply(&self, multiplier: i64) -> Self {
            $type::$ctor( $( self.$field * multiplier ),+ )
        }

        fn abs(&self) -> Self {
            $type::$ctor( $( self.$field.abs() ),+ )
        }

        fn to_level_numbers(&self) -> Vec<f64> {
            vec![ $( self.$field as f64 ),+ ]
        }
    };
}

/// Generates `multiply`, `abs` and `to_level_numbers` for decimal levels.
macro_rules! impl_decimal_score_scale {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        fn multiply(&self, multiplier: i64) -> Self {
            let multiplier = rust_decimal::Decimal::from(multiplier);
            $type::$ctor( $( self.$field * multiplier ),+ )
        }

        fn abs(&self) -> Self {
            $type::$ctor( $( self.$field.abs() ),+ )
        }

        fn to_level_numbers(&self) -> Vec<f64> {
            use rust_decimal::prelude::ToPrimitive;
            vec![ $( self.$field.to_f64().unwrap_or_default() ),+ ]
        }
    };
}

/// Generates `ParseableScore` for scores using the `"Xsuffix/Ysuffix"` form.
///
/// Each field maps to a suffix label and is parsed as `$num`.
macro_rules! impl_score_parse {
    ($type:ident { $($field:ident => $suffix:literal),+ } as $num:ty => $ctor:ident) => {
        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                let s = s.trim();
                let parts: Vec<&str> = s.split('/').collect();
                let suffixes: &[&str] = &[ $($suffix),+ ];

                if parts.len() != suffixes.len() {
                    return Err($crate::score::traits::ScoreParseError {
                        message: format!(
                            "invalid {} format '{}': expected {} parts separated by '/'",
                            stringify!($type), s, suffixes.len()
                        ),
                    });
                }

                let mut parts = parts.into_iter();
                $(
                    let $field = {
                        let part = parts.next().unwrap_or_default().trim();
                        let num_str = part.strip_suffix($suffix).ok_or_else(|| {
                            $crate::score::traits::ScoreParseError {
                                message: format!("part '{}' must end with '{}'", part, $suffix),
                            }
                        })?;
                        num_str.parse::<$num>().map_err(|e| {
                            $crate::score::traits::ScoreParseError {
                                message: format!("invalid {} level '{}': {}", $suffix, num_str, e),
                            }
                        })?
                    };
                )+

                Ok($type::$ctor( $($field),+ ))
            }

            fn to_string_repr(&self) -> String {
                let parts: Vec<String> = vec![ $( format!("{}{}", self.$field, $suffix) ),+ ];
                parts.join("/")
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use $crate::score::traits::ParseableScore;
                f.write_str(&self.to_string_repr())
            }
        }

        impl std::str::FromStr for $type {
            type Err = $crate::score::traits::ScoreParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$type as $crate::score::traits::ParseableScore>::parse(s)
            }
        }
    };
}
