//! Field type taxonomy.
//!
//! Three closed enumerations classify a field: its physical [`BaseType`], its
//! semantic [`SpecialType`] and its [`VisibilityType`]. A small restriction
//! table pins some special types to a subset of base types; see [`is_valid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Physical storage kind of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseType {
    BigIntegerField,
    BooleanField,
    CharField,
    DateField,
    DateTimeField,
    DecimalField,
    DictionaryField,
    FloatField,
    IntegerField,
    TextField,
    TimeField,
    #[serde(rename = "UUIDField")]
    UuidField,
    ArrayField,
    UnknownField,
}

impl BaseType {
    pub const ALL: [BaseType; 14] = [
        BaseType::BigIntegerField,
        BaseType::BooleanField,
        BaseType::CharField,
        BaseType::DateField,
        BaseType::DateTimeField,
        BaseType::DecimalField,
        BaseType::DictionaryField,
        BaseType::FloatField,
        BaseType::IntegerField,
        BaseType::TextField,
        BaseType::TimeField,
        BaseType::UuidField,
        BaseType::ArrayField,
        BaseType::UnknownField,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::BigIntegerField => "BigIntegerField",
            BaseType::BooleanField => "BooleanField",
            BaseType::CharField => "CharField",
            BaseType::DateField => "DateField",
            BaseType::DateTimeField => "DateTimeField",
            BaseType::DecimalField => "DecimalField",
            BaseType::DictionaryField => "DictionaryField",
            BaseType::FloatField => "FloatField",
            BaseType::IntegerField => "IntegerField",
            BaseType::TextField => "TextField",
            BaseType::TimeField => "TimeField",
            BaseType::UuidField => "UUIDField",
            BaseType::ArrayField => "ArrayField",
            BaseType::UnknownField => "UnknownField",
        }
    }

    /// Integer, float and decimal kinds.
    pub fn is_numeric(&self) -> bool {
        NUMERIC_BASE_TYPES.contains(self)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| CatalogError::validation(format!("Unknown base type: {s}")))
    }
}

/// Semantic role assigned to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialType {
    Id,
    Fk,
    Category,
    Name,
    City,
    Country,
    State,
    ZipCode,
    Latitude,
    Longitude,
    Url,
    Image,
    Avatar,
    Json,
    Number,
    TimestampSeconds,
    TimestampMilliseconds,
    #[serde(alias = "desc")]
    Description,
}

impl SpecialType {
    pub const ALL: [SpecialType; 18] = [
        SpecialType::Id,
        SpecialType::Fk,
        SpecialType::Category,
        SpecialType::Name,
        SpecialType::City,
        SpecialType::Country,
        SpecialType::State,
        SpecialType::ZipCode,
        SpecialType::Latitude,
        SpecialType::Longitude,
        SpecialType::Url,
        SpecialType::Image,
        SpecialType::Avatar,
        SpecialType::Json,
        SpecialType::Number,
        SpecialType::TimestampSeconds,
        SpecialType::TimestampMilliseconds,
        SpecialType::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialType::Id => "id",
            SpecialType::Fk => "fk",
            SpecialType::Category => "category",
            SpecialType::Name => "name",
            SpecialType::City => "city",
            SpecialType::Country => "country",
            SpecialType::State => "state",
            SpecialType::ZipCode => "zip_code",
            SpecialType::Latitude => "latitude",
            SpecialType::Longitude => "longitude",
            SpecialType::Url => "url",
            SpecialType::Image => "image",
            SpecialType::Avatar => "avatar",
            SpecialType::Json => "json",
            SpecialType::Number => "number",
            SpecialType::TimestampSeconds => "timestamp_seconds",
            SpecialType::TimestampMilliseconds => "timestamp_milliseconds",
            SpecialType::Description => "description",
        }
    }

    /// Membership check against the fixed taxonomy.
    pub fn is_member(&self) -> bool {
        SpecialType::ALL.contains(self)
    }
}

impl fmt::Display for SpecialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecialType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "desc" {
            return Ok(SpecialType::Description);
        }
        SpecialType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| CatalogError::validation(format!("Unknown special type: {s}")))
    }
}

/// Display and query-access policy for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityType {
    /// Full access
    #[default]
    Normal,
    /// Hidden from summary views, still queryable
    DetailsOnly,
    /// Excluded from most pickers, still queryable
    Hidden,
    /// Listed in the schema only; queries referencing it must fail
    Sensitive,
    /// No longer backed by a physical column. Set by sync only.
    Retired,
}

impl VisibilityType {
    pub const ALL: [VisibilityType; 5] = [
        VisibilityType::Normal,
        VisibilityType::DetailsOnly,
        VisibilityType::Hidden,
        VisibilityType::Sensitive,
        VisibilityType::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityType::Normal => "normal",
            VisibilityType::DetailsOnly => "details-only",
            VisibilityType::Hidden => "hidden",
            VisibilityType::Sensitive => "sensitive",
            VisibilityType::Retired => "retired",
        }
    }

    /// Whether queries may reference a field with this visibility.
    pub fn is_queryable(&self) -> bool {
        !matches!(self, VisibilityType::Sensitive | VisibilityType::Retired)
    }

    /// Whether a user edit may set this visibility.
    pub fn is_user_settable(&self) -> bool {
        !matches!(self, VisibilityType::Retired)
    }
}

impl fmt::Display for VisibilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisibilityType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisibilityType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| CatalogError::validation(format!("Unknown visibility type: {s}")))
    }
}

const NUMERIC_BASE_TYPES: &[BaseType] = &[
    BaseType::BigIntegerField,
    BaseType::DecimalField,
    BaseType::FloatField,
    BaseType::IntegerField,
];

/// Special types that only make sense for a subset of base types.
const RESTRICTIONS: &[(SpecialType, &[BaseType])] = &[
    (SpecialType::TimestampSeconds, NUMERIC_BASE_TYPES),
    (SpecialType::TimestampMilliseconds, NUMERIC_BASE_TYPES),
];

/// Returns the base types a special type is restricted to, or `None` when it
/// is compatible with every base type.
pub fn valid_base_types(special_type: SpecialType) -> Option<&'static [BaseType]> {
    RESTRICTIONS
        .iter()
        .find(|(st, _)| *st == special_type)
        .map(|(_, base_types)| *base_types)
}

/// True if `special_type` has no restriction entry, or `base_type` is in its
/// restriction set.
pub fn is_valid(special_type: SpecialType, base_type: BaseType) -> bool {
    valid_base_types(special_type).map_or(true, |allowed| allowed.contains(&base_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_special_types_accept_every_base_type() {
        for special_type in SpecialType::ALL {
            if valid_base_types(special_type).is_some() {
                continue;
            }
            for base_type in BaseType::ALL {
                assert!(is_valid(special_type, base_type), "{special_type} / {base_type}");
            }
        }
    }

    #[test]
    fn test_timestamp_types_require_numeric_base() {
        assert!(is_valid(SpecialType::TimestampSeconds, BaseType::IntegerField));
        assert!(is_valid(SpecialType::TimestampMilliseconds, BaseType::BigIntegerField));
        assert!(is_valid(SpecialType::TimestampSeconds, BaseType::FloatField));
        assert!(!is_valid(SpecialType::TimestampSeconds, BaseType::CharField));
        assert!(!is_valid(SpecialType::TimestampMilliseconds, BaseType::DateTimeField));
    }

    #[test]
    fn test_string_forms_round_trip_through_from_str() {
        for base_type in BaseType::ALL {
            assert_eq!(base_type.as_str().parse::<BaseType>().unwrap(), base_type);
        }
        for special_type in SpecialType::ALL {
            assert_eq!(special_type.as_str().parse::<SpecialType>().unwrap(), special_type);
        }
        for visibility in VisibilityType::ALL {
            assert_eq!(visibility.as_str().parse::<VisibilityType>().unwrap(), visibility);
        }
        assert!("VarcharField".parse::<BaseType>().is_err());
        assert_eq!("desc".parse::<SpecialType>().unwrap(), SpecialType::Description);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&BaseType::UuidField).unwrap(), "\"UUIDField\"");
        assert_eq!(serde_json::to_string(&SpecialType::ZipCode).unwrap(), "\"zip_code\"");
        assert_eq!(
            serde_json::to_string(&VisibilityType::DetailsOnly).unwrap(),
            "\"details-only\""
        );
        let desc: SpecialType = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(desc, SpecialType::Description);
    }

    #[test]
    fn test_visibility_policies() {
        assert_eq!(VisibilityType::default(), VisibilityType::Normal);
        assert!(VisibilityType::Hidden.is_queryable());
        assert!(!VisibilityType::Sensitive.is_queryable());
        assert!(!VisibilityType::Retired.is_queryable());
        assert!(VisibilityType::Sensitive.is_user_settable());
        assert!(!VisibilityType::Retired.is_user_settable());
    }
}
