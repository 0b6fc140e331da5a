//! Semantic data types assigned to compiled fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::field::Field;

// ============================================================================
// Data Type Tags
// ============================================================================

/// The flat tag of a [`DataType`], as it appears on the wire (`"dataType"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeValue {
    #[serde(rename = "stringType")]
    String,
    #[serde(rename = "dateType")]
    Date,
    #[serde(rename = "dateTimeType")]
    DateTime,
    #[serde(rename = "rangedUUIDType")]
    RangedUuid,
    #[serde(rename = "openUUIDType")]
    OpenUuid,
    #[serde(rename = "stringUUIDType")]
    StringUuid,
    #[serde(rename = "booleanType")]
    Boolean,
    #[serde(rename = "integerType")]
    Integer,
    #[serde(rename = "numberType")]
    Number,
    #[serde(rename = "enumType")]
    Enum,
    #[serde(rename = "objectType")]
    Object,
    #[serde(rename = "arrayType")]
    Array,
    #[serde(rename = "jsonbArrayType")]
    JsonbArray,
}

impl DataTypeValue {
    pub const ALL: [DataTypeValue; 13] = [
        DataTypeValue::String,
        DataTypeValue::Date,
        DataTypeValue::DateTime,
        DataTypeValue::RangedUuid,
        DataTypeValue::OpenUuid,
        DataTypeValue::StringUuid,
        DataTypeValue::Boolean,
        DataTypeValue::Integer,
        DataTypeValue::Number,
        DataTypeValue::Enum,
        DataTypeValue::Object,
        DataTypeValue::Array,
        DataTypeValue::JsonbArray,
    ];

    /// Wire name of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataTypeValue::String => "stringType",
            DataTypeValue::Date => "dateType",
            DataTypeValue::DateTime => "dateTimeType",
            DataTypeValue::RangedUuid => "rangedUUIDType",
            DataTypeValue::OpenUuid => "openUUIDType",
            DataTypeValue::StringUuid => "stringUUIDType",
            DataTypeValue::Boolean => "booleanType",
            DataTypeValue::Integer => "integerType",
            DataTypeValue::Number => "numberType",
            DataTypeValue::Enum => "enumType",
            DataTypeValue::Object => "objectType",
            DataTypeValue::Array => "arrayType",
            DataTypeValue::JsonbArray => "jsonbArrayType",
        }
    }

    /// Build the leaf type for this tag, or `None` for nesting tags.
    pub fn leaf(self) -> Option<DataType> {
        Some(match self {
            DataTypeValue::String => DataType::String,
            DataTypeValue::Date => DataType::Date,
            DataTypeValue::DateTime => DataType::DateTime,
            DataTypeValue::RangedUuid => DataType::RangedUuid,
            DataTypeValue::OpenUuid => DataType::OpenUuid,
            DataTypeValue::StringUuid => DataType::StringUuid,
            DataTypeValue::Boolean => DataType::Boolean,
            DataTypeValue::Integer => DataType::Integer,
            DataTypeValue::Number => DataType::Number,
            DataTypeValue::Enum => DataType::Enum,
            DataTypeValue::Object | DataTypeValue::Array | DataTypeValue::JsonbArray => {
                return None
            }
        })
    }
}

impl fmt::Display for DataTypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataTypeValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataTypeValue::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// ============================================================================
// Data Type
// ============================================================================

/// A semantic data type.
///
/// Only [`DataType::Object`], [`DataType::Array`] and [`DataType::JsonbArray`]
/// nest. Object properties are full [`Field`]s so they carry their own getters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DataTypeRepr", into = "DataTypeRepr")]
pub enum DataType {
    String,
    Date,
    DateTime,
    RangedUuid,
    OpenUuid,
    StringUuid,
    Boolean,
    Integer,
    Number,
    Enum,
    Object(Vec<Field>),
    Array(Box<DataType>),
    JsonbArray(Box<DataType>),
}

impl DataType {
    pub fn value(&self) -> DataTypeValue {
        match self {
            DataType::String => DataTypeValue::String,
            DataType::Date => DataTypeValue::Date,
            DataType::DateTime => DataTypeValue::DateTime,
            DataType::RangedUuid => DataTypeValue::RangedUuid,
            DataType::OpenUuid => DataTypeValue::OpenUuid,
            DataType::StringUuid => DataTypeValue::StringUuid,
            DataType::Boolean => DataTypeValue::Boolean,
            DataType::Integer => DataTypeValue::Integer,
            DataType::Number => DataTypeValue::Number,
            DataType::Enum => DataTypeValue::Enum,
            DataType::Object(_) => DataTypeValue::Object,
            DataType::Array(_) => DataTypeValue::Array,
            DataType::JsonbArray(_) => DataTypeValue::JsonbArray,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DataType::Object(_))
    }

    /// Item type of either array flavour.
    pub fn item(&self) -> Option<&DataType> {
        match self {
            DataType::Array(item) | DataType::JsonbArray(item) => Some(item),
            _ => None,
        }
    }

    /// True for either array flavour whose item type is an object.
    pub fn is_array_of_objects(&self) -> bool {
        self.item().is_some_and(DataType::is_object)
    }

    pub fn properties(&self) -> Option<&[Field]> {
        match self {
            DataType::Object(properties) => Some(properties),
            _ => None,
        }
    }

    /// Wrap an item type in the array flavour named by `kind`.
    ///
    /// Any tag other than [`DataTypeValue::Array`] yields a jsonb array.
    pub fn array_of(kind: DataTypeValue, item: DataType) -> DataType {
        match kind {
            DataTypeValue::Array => DataType::Array(Box::new(item)),
            _ => DataType::JsonbArray(Box::new(item)),
        }
    }
}

// ============================================================================
// Wire Representation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DataTypeRepr {
    data_type: DataTypeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_data_type: Option<Box<DataTypeRepr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<Field>>,
}

impl From<DataType> for DataTypeRepr {
    fn from(data_type: DataType) -> Self {
        let tag = data_type.value();
        match data_type {
            DataType::Object(properties) => DataTypeRepr {
                data_type: tag,
                item_data_type: None,
                properties: Some(properties),
            },
            DataType::Array(item) | DataType::JsonbArray(item) => DataTypeRepr {
                data_type: tag,
                item_data_type: Some(Box::new(DataTypeRepr::from(*item))),
                properties: None,
            },
            _ => DataTypeRepr {
                data_type: tag,
                item_data_type: None,
                properties: None,
            },
        }
    }
}

impl TryFrom<DataTypeRepr> for DataType {
    type Error = String;

    fn try_from(repr: DataTypeRepr) -> Result<Self, Self::Error> {
        match repr.data_type {
            DataTypeValue::Object => Ok(DataType::Object(repr.properties.unwrap_or_default())),
            kind @ (DataTypeValue::Array | DataTypeValue::JsonbArray) => {
                let item = match repr.item_data_type {
                    Some(item) => DataType::try_from(*item)?,
                    None => DataType::String,
                };
                Ok(DataType::array_of(kind, item))
            }
            leaf => {
                if repr.item_data_type.is_some() || repr.properties.is_some() {
                    return Err(format!("{} cannot carry nested types", leaf));
                }
                leaf.leaf().ok_or_else(|| leaf.to_string())
            }
        }
    }
}
