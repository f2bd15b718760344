use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vrsync_serde::{BitReader, BitWrite, Serde, SerdeErr};

/// Opaque handle the instantiator understands, such as an asset path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefabRef(pub String);

impl PrefabRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A named prefab with an owner variant and an optional lighter variant for
/// peers that do not own the spawned entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreElement {
    pub name: String,
    pub owner_variant: PrefabRef,
    #[serde(default)]
    pub distributed_variant: Option<PrefabRef>,
}

impl StoreElement {
    pub fn variant_for(&self, is_local_owner: bool) -> &PrefabRef {
        if is_local_owner {
            return &self.owner_variant;
        }
        self.distributed_variant
            .as_ref()
            .unwrap_or(&self.owner_variant)
    }
}

/// How a spawn request names its store element
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Index(u16),
    Name(String),
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Index(index) => write!(f, "#{}", index),
            ElementRef::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

impl Serde for ElementRef {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            ElementRef::Index(index) => {
                writer.write_bit(true);
                index.ser(writer);
            }
            ElementRef::Name(name) => {
                writer.write_bit(false);
                name.ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(ElementRef::Index(u16::de(reader)?))
        } else {
            Ok(ElementRef::Name(String::de(reader)?))
        }
    }

    fn bit_length(&self) -> u32 {
        1 + match self {
            ElementRef::Index(index) => index.bit_length(),
            ElementRef::Name(name) => name.bit_length(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store element name {name} appears more than once")]
    DuplicateName { name: String },

    #[error("Store holds {count} elements, more than an element index can address")]
    TooManyElements { count: usize },

    #[error("Store catalog is not valid JSON: {reason}")]
    Parse { reason: String },
}

/// The catalog of spawnable elements, addressable by name or position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Store {
    elements: Vec<StoreElement>,
}

impl Store {
    pub fn new(elements: Vec<StoreElement>) -> Result<Self, StoreError> {
        if elements.len() > usize::from(u16::MAX) + 1 {
            return Err(StoreError::TooManyElements {
                count: elements.len(),
            });
        }
        let mut names = HashSet::new();
        for element in &elements {
            if !names.insert(element.name.as_str()) {
                return Err(StoreError::DuplicateName {
                    name: element.name.clone(),
                });
            }
        }
        Ok(Self { elements })
    }

    /// Parses a JSON array of elements
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let elements: Vec<StoreElement> =
            serde_json::from_str(json).map_err(|error| StoreError::Parse {
                reason: error.to_string(),
            })?;
        Self::new(elements)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.elements).map_err(|error| StoreError::Parse {
            reason: error.to_string(),
        })
    }

    pub fn resolve(&self, element: &ElementRef) -> Option<&StoreElement> {
        match element {
            ElementRef::Index(index) => self.get(*index),
            ElementRef::Name(name) => self.elements.iter().find(|element| &element.name == name),
        }
    }

    pub fn get(&self, index: u16) -> Option<&StoreElement> {
        self.elements.get(usize::from(index))
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.elements
            .iter()
            .position(|element| element.name == name)
            .and_then(|index| u16::try_from(index).ok())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StoreElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
