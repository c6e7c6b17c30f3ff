//! Entity models and their positional projections
//!
//! The backend returns rows as ordered arrays. Each [`EntityKind`] owns the
//! list of field names in backend column order; that order is part of the
//! wire contract and changes only together with the backend.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The four record types managed by the inventory system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Supplier,
    Category,
    Image,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Product,
        EntityKind::Supplier,
        EntityKind::Category,
        EntityKind::Image,
    ];

    /// Singular name, also the JSON key of a shaped read response
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Supplier => "supplier",
            EntityKind::Category => "category",
            EntityKind::Image => "image",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Supplier => "suppliers",
            EntityKind::Category => "categories",
            EntityKind::Image => "images",
        }
    }

    /// Name of the identifier field (`p_id`, `s_id`, `c_id`, `i_id`)
    pub fn id_field(&self) -> &'static str {
        self.projection()[0]
    }

    /// Field names by backend column position
    pub fn projection(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Product => &["p_id", "name", "description", "quantity", "price"],
            EntityKind::Supplier => &["s_id", "name", "contact"],
            EntityKind::Category => &["c_id", "name", "description"],
            EntityKind::Image => &["i_id", "p_id", "url"],
        }
    }

    /// Fields supplied by the user on create/update (everything but the id)
    pub fn input_fields(&self) -> &'static [&'static str] {
        &self.projection()[1..]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" | "products" => Ok(EntityKind::Product),
            "supplier" | "suppliers" => Ok(EntityKind::Supplier),
            "category" | "categories" => Ok(EntityKind::Category),
            "image" | "images" => Ok(EntityKind::Image),
            other => Err(format!(
                "Unknown entity: {}. Use product, supplier, category or image",
                other
            )),
        }
    }
}

/// Many-to-many link owners. Products are associated with suppliers and
/// with categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Association {
    Supplier,
    Category,
}

impl Association {
    /// The owning entity of the link
    pub fn owner(&self) -> EntityKind {
        match self {
            Association::Supplier => EntityKind::Supplier,
            Association::Category => EntityKind::Category,
        }
    }

    /// Method name prefix, e.g. `supplierProducts`
    pub fn prefix(&self) -> &'static str {
        match self {
            Association::Supplier => "supplierProducts",
            Association::Category => "categoryProducts",
        }
    }
}

impl FromStr for Association {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supplier" | "suppliers" => Ok(Association::Supplier),
            "category" | "categories" => Ok(Association::Category),
            other => Err(format!(
                "Unknown association: {}. Use supplier or category",
                other
            )),
        }
    }
}

/// A loosely typed field value.
///
/// Depending on the backend revision, ids are integers or UUID strings and
/// numeric columns may arrive stringified, so record fields accept any
/// JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Null => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Null => f.write_str("-"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

/// A record type that can be read back from a shaped gateway response
pub trait EntityRecord: Serialize + DeserializeOwned + Send {
    const KIND: EntityKind;

    /// The record's identifier
    fn id(&self) -> &Scalar;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub p_id: Scalar,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Scalar,
    pub price: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub s_id: Scalar,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub c_id: Scalar,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub i_id: Scalar,
    pub p_id: Scalar,
    pub url: String,
}

impl EntityRecord for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &Scalar {
        &self.p_id
    }
}

impl EntityRecord for Supplier {
    const KIND: EntityKind = EntityKind::Supplier;

    fn id(&self) -> &Scalar {
        &self.s_id
    }
}

impl EntityRecord for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn id(&self) -> &Scalar {
        &self.c_id
    }
}

impl EntityRecord for Image {
    const KIND: EntityKind = EntityKind::Image;

    fn id(&self) -> &Scalar {
        &self.i_id
    }
}
