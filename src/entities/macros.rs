//! Macros for reducing boilerplate when defining entities
//!
//! Every CRM entity stores an integer `id` and exposes its fields through a
//! static schema. These macros generate the parts of the trait
//! implementations that only differ by name.

/// Generate the identity methods of an `Entity` impl
///
/// Expands to `resource_name`, `resource_name_singular`, `id` and `set_id`
/// for a struct with an `id: u64` field.
///
/// # Example
/// ```rust,ignore
/// impl Entity for Contact {
///     entity_identity!("contacts", "contact");
///
///     fn created_at(&self) -> Option<DateTime<Utc>> {
///         self.created_at
///     }
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! entity_identity {
    ($plural:literal, $singular:literal) => {
        fn resource_name() -> &'static str {
            $plural
        }

        fn resource_name_singular() -> &'static str {
            $singular
        }

        fn id(&self) -> u64 {
            self.id
        }

        fn set_id(&mut self, id: u64) {
            self.id = id;
        }
    };
}

/// Implement `Record` by reading fields through the type's `Data::schema()`
///
/// Field names outside the schema read as absent.
#[macro_export]
macro_rules! impl_schema_record {
    ($type:ty) => {
        impl $crate::core::record::Record for $type {
            fn field(&self, name: &str) -> Option<$crate::core::field::FieldValue> {
                <$type as $crate::core::entity::Data>::schema().value(self, name)
            }
        }
    };
}

/// Implement `as_str`, `Display` and `FromStr` for a unit-only enum
///
/// The string forms must match the enum's serde names.
#[macro_export]
macro_rules! string_enum {
    ($type:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $type {
            /// Every variant, in declaration order
            pub const ALL: &'static [$type] = &[$($type::$variant),+];

            /// Wire names of every variant, in declaration order
            pub const NAMES: &'static [&'static str] = &[$($name),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($type::$variant => $name),+
                }
            }
        }

        impl ::std::fmt::Display for $type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $type {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($name => Ok($type::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        stringify!($type),
                        other,
                        $type::NAMES.join(", ")
                    )),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    // A one-argument alias in scope must not leak into the generated impls
    #[allow(dead_code)]
    type Result<T> = std::result::Result<T, ()>;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Priority {
        Low,
        High,
    }

    crate::string_enum!(Priority {
        Low => "low",
        High => "high",
    });

    #[test]
    fn test_string_enum_with_local_result_alias() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(Priority::Low.to_string(), "low");
        assert_eq!(Priority::NAMES, &["low", "high"]);

        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(err.contains("low, high"));
    }
}
