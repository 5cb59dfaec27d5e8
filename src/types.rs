/// Shared types used across the codebase

/// Declare a string-backed enum stored in a Postgres TEXT column.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr`, serde (snake_case) and the
/// sqlx `Type`/`Encode`/`Decode` impls so the enum can be bound and fetched
/// directly.
#[macro_export]
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(format!("invalid {}: '{}'", stringify!($name), other)),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$name>()?)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Coarse access level carried on every user and in the JWT.
    pub enum Access {
        Deny => "deny",
        Read => "read",
        Edit => "edit",
        Full => "full",
        Root => "root",
    }
}

impl Access {
    fn rank(&self) -> u8 {
        match self {
            Access::Deny => 0,
            Access::Read => 1,
            Access::Edit => 2,
            Access::Full => 3,
            Access::Root => 4,
        }
    }

    /// True when this level grants at least `required`.
    pub fn allows(&self, required: Access) -> bool {
        self.rank() >= required.rank()
    }
}

/// Role permission names checked on writes by `edit` users.
pub mod permissions {
    pub const ASSETS_MANAGE: &str = "assets.manage";
    pub const ASSETS_ASSIGN: &str = "assets.assign";
    pub const ASSETS_RETURN: &str = "assets.return";
    pub const ASSETS_MAINTAIN: &str = "assets.maintain";

    pub const ALL: &[&str] = &[ASSETS_MANAGE, ASSETS_ASSIGN, ASSETS_RETURN, ASSETS_MAINTAIN];
}

/// Page window for list endpoints.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    /// Clamp the requested window to `[1, max]` rows starting at offset >= 0.
    pub fn window(&self, max: i64) -> (i64, i64) {
        let limit = self.limit.unwrap_or(max).clamp(1, max);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_levels_are_ordered() {
        assert!(Access::Root.allows(Access::Full));
        assert!(Access::Edit.allows(Access::Read));
        assert!(!Access::Read.allows(Access::Edit));
        assert!(!Access::Deny.allows(Access::Read));
    }

    #[test]
    fn access_round_trips_through_text() {
        assert_eq!("full".parse::<Access>().unwrap(), Access::Full);
        assert_eq!(Access::Edit.to_string(), "edit");
        assert!("admin".parse::<Access>().is_err());
    }

    #[test]
    fn page_window_is_clamped() {
        let page = Page { limit: Some(5000), offset: Some(-3) };
        assert_eq!(page.window(100), (100, 0));
        let page = Page { limit: None, offset: Some(20) };
        assert_eq!(page.window(50), (50, 20));
    }
}
