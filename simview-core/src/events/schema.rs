//! Column layouts of the event log.
//!
//! ```text
//! basic:    tick,fileId,size,numReq,deltaT,action
//! extended: tick,action,cacheSize,cacheCapacity,fileId,size,numReq,deltaT
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReplayError;

/// A concrete row layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Schema {
    Basic,
    Extended,
}

impl Schema {
    pub const fn columns(self) -> usize {
        match self {
            Schema::Basic => 6,
            Schema::Extended => 8,
        }
    }

    pub fn from_columns(columns: usize) -> Option<Self> {
        match columns {
            6 => Some(Schema::Basic),
            8 => Some(Schema::Extended),
            _ => None,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Basic => f.write_str("basic"),
            Schema::Extended => f.write_str("extended"),
        }
    }
}

/// Configured layout. `Auto` picks one from the header's column count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaChoice {
    #[default]
    Auto,
    Basic,
    Extended,
}

impl SchemaChoice {
    /// Settles the layout once the header's column count is known.
    pub fn resolve(self, header_columns: usize) -> Result<Schema, ReplayError> {
        let expected = match self {
            SchemaChoice::Auto => {
                return Schema::from_columns(header_columns)
                    .ok_or(ReplayError::UnknownSchema(header_columns))
            }
            SchemaChoice::Basic => Schema::Basic,
            SchemaChoice::Extended => Schema::Extended,
        };

        if expected.columns() == header_columns {
            Ok(expected)
        } else {
            Err(ReplayError::SchemaMismatch {
                expected,
                found: header_columns,
            })
        }
    }
}

impl From<Schema> for SchemaChoice {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::Basic => SchemaChoice::Basic,
            Schema::Extended => SchemaChoice::Extended,
        }
    }
}
