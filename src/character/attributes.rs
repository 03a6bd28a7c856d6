use crate::core::constants::{NEW_GAME_ATTRIBUTE_VALUE, NUM_ATTRIBUTES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Str,
    Vit,
    Agi,
    Int,
    Dex,
    Luk,
}

impl AttributeType {
    pub fn all() -> [AttributeType; NUM_ATTRIBUTES] {
        [
            AttributeType::Str,
            AttributeType::Vit,
            AttributeType::Agi,
            AttributeType::Int,
            AttributeType::Dex,
            AttributeType::Luk,
        ]
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            AttributeType::Str => "STR",
            AttributeType::Vit => "VIT",
            AttributeType::Agi => "AGI",
            AttributeType::Int => "INT",
            AttributeType::Dex => "DEX",
            AttributeType::Luk => "LUK",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attribute '{0}'")]
pub struct UnknownAttribute(pub String);

impl FromStr for AttributeType {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeType::all()
            .into_iter()
            .find(|attr| attr.abbrev().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// The six allocatable base attributes.
///
/// Field names match the persisted save document (`{"str": 5, ...}`). A
/// field absent from a stored object deserializes to 0, while a brand new
/// character starts every attribute at [`NEW_GAME_ATTRIBUTE_VALUE`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attributes {
    #[serde(default)]
    pub str: u32,
    #[serde(default)]
    pub vit: u32,
    #[serde(default)]
    pub agi: u32,
    #[serde(default)]
    pub int: u32,
    #[serde(default)]
    pub dex: u32,
    #[serde(default)]
    pub luk: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new()
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::uniform(NEW_GAME_ATTRIBUTE_VALUE)
    }

    pub fn uniform(value: u32) -> Self {
        Self {
            str: value,
            vit: value,
            agi: value,
            int: value,
            dex: value,
            luk: value,
        }
    }

    pub fn get(&self, attr: AttributeType) -> u32 {
        match attr {
            AttributeType::Str => self.str,
            AttributeType::Vit => self.vit,
            AttributeType::Agi => self.agi,
            AttributeType::Int => self.int,
            AttributeType::Dex => self.dex,
            AttributeType::Luk => self.luk,
        }
    }

    pub fn set(&mut self, attr: AttributeType, value: u32) {
        match attr {
            AttributeType::Str => self.str = value,
            AttributeType::Vit => self.vit = value,
            AttributeType::Agi => self.agi = value,
            AttributeType::Int => self.int = value,
            AttributeType::Dex => self.dex = value,
            AttributeType::Luk => self.luk = value,
        }
    }

    pub fn increment(&mut self, attr: AttributeType) {
        self.set(attr, self.get(attr).saturating_add(1));
    }

    pub fn total(&self) -> u64 {
        AttributeType::all()
            .iter()
            .map(|&attr| self.get(attr) as u64)
            .sum()
    }
}
