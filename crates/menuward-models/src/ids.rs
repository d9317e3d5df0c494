//! Strongly-typed ID newtypes for domain entities.
//!
//! Every entity uses a numeric (`BIGINT`) surrogate key. The newtypes keep a
//! `RoleId` from being passed where a `PermissionId` is expected, and encode
//! the "unset" convention: any id `<= 0` means "missing".
//!
//! # Example
//!
//! ```ignore
//! use menuward_models::ids::{RoleId, UserId};
//!
//! fn assign(user: UserId, role: RoleId) { /* ... */ }
//!
//! assign(UserId::new(7), RoleId::new(2));    // OK
//! // assign(RoleId::new(2), UserId::new(7)); // Compile error! Type mismatch.
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;

/// Defines a strongly-typed `i64` id with the database, serde and display
/// plumbing every entity id needs.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[inline]
            pub const fn new(v: i64) -> Self {
                Self(v)
            }

            #[inline]
            pub const fn into_inner(self) -> i64 {
                self.0
            }

            /// Whether this id can reference a stored row (`> 0`).
            #[inline]
            pub const fn is_set(&self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(v: i64) -> Self {
                Self(v)
            }
        }

        impl From<$name> for i64 {
            #[inline]
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <i64 as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <i64 as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i64 as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <i64 as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <i64 as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(
    /// Opaque identifier of an already-authenticated user.
    UserId
);

define_id!(
    /// Strongly-typed ID for Role entities.
    RoleId
);

define_id!(
    /// Strongly-typed ID for Permission entities.
    PermissionId
);

define_id!(
    /// Strongly-typed ID for Menu entities.
    MenuId
);

define_id!(
    /// Strongly-typed ID for Action entities.
    ActionId
);

/// Collects ids into the plain `i64` array Postgres binds as `BIGINT[]`.
pub fn raw_ids<I, T>(ids: I) -> Vec<i64>
where
    I: IntoIterator<Item = T>,
    T: Into<i64>,
{
    ids.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_set() {
        assert!(UserId::new(1).is_set());
        assert!(!UserId::new(0).is_set());
        assert!(!RoleId::new(-4).is_set());
    }

    #[test]
    fn test_id_debug_and_display() {
        let id = MenuId::new(42);
        assert_eq!(format!("{:?}", id), "MenuId(42)");
        assert_eq!(format!("{}", id), "42");
    }

    #[test]
    fn test_id_from_str() {
        let id: PermissionId = " 17 ".parse().unwrap();
        assert_eq!(id, PermissionId::new(17));
        assert!("seventeen".parse::<PermissionId>().is_err());
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let json = serde_json::to_string(&ActionId::new(9)).unwrap();
        assert_eq!(json, "9");
        let id: RoleId = serde_json::from_str("12").unwrap();
        assert_eq!(id.into_inner(), 12);
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids = vec![RoleId::new(3), RoleId::new(1), RoleId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![RoleId::new(1), RoleId::new(2), RoleId::new(3)]);
    }

    #[test]
    fn test_raw_ids() {
        assert_eq!(raw_ids([MenuId::new(1), MenuId::new(5)]), vec![1, 5]);
    }
}
