//! Division catalog value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a division record.
///
/// The resolver special-cases the five well-known subtypes; anything else
/// the dataset carries is preserved as [`Subtype::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subtype {
    Country,
    Region,
    County,
    Locality,
    LocalAdmin,
    Other(String),
}

impl Subtype {
    pub fn as_str(&self) -> &str {
        match self {
            Subtype::Country => "country",
            Subtype::Region => "region",
            Subtype::County => "county",
            Subtype::Locality => "locality",
            Subtype::LocalAdmin => "localadmin",
            Subtype::Other(value) => value,
        }
    }

    /// Subtypes a three-segment path can match.
    pub fn locality_levels() -> &'static [Subtype] {
        &[Subtype::County, Subtype::Locality, Subtype::LocalAdmin]
    }

    /// Subtypes returned by the cities listing.
    pub fn city_levels() -> &'static [Subtype] {
        &[Subtype::Locality, Subtype::LocalAdmin]
    }
}

impl From<String> for Subtype {
    fn from(value: String) -> Self {
        match value.as_str() {
            "country" => Subtype::Country,
            "region" => Subtype::Region,
            "county" => Subtype::County,
            "locality" => Subtype::Locality,
            "localadmin" => Subtype::LocalAdmin,
            _ => Subtype::Other(value),
        }
    }
}

impl From<Subtype> for String {
    fn from(value: Subtype) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the division catalog.
///
/// Geometry is not stored here; it lives in the much larger geometry store,
/// keyed by `id`. `(country, region, subtype, name)` is not unique - several
/// localities can share a name within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionRecord {
    /// Opaque stable identifier, primary key into the geometry store.
    pub id: String,

    /// ISO 3166-1 alpha-2 code, uppercase.
    pub country: String,

    /// Composite `<COUNTRY>-<SEGMENT>` code, uppercase. Absent on country rows.
    #[serde(default)]
    pub region: Option<String>,

    pub subtype: Subtype,

    /// Display name, not unique within a region.
    pub name: String,

    /// Secondary opaque identifier for cross-referencing.
    pub division_id: String,
}
