//! Runtime value model.
//!
//! [`DataValue`] is the single tagged union carried through parameters,
//! variables, and resolved arguments. Every conversion is checked once here;
//! handlers never inspect concrete types themselves.

mod argument;

pub use argument::{Argument, RawArgument, ResolvedArgs, extract_all};

use std::fmt;
use std::str::FromStr;

use crate::error::ResolutionError;

/// Opaque identifier of a player known to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player:{}", self.0)
    }
}

/// A point in a named world.
///
/// Parses from `"x,y,z"` or `"world:x,y,z"` with whitespace trimming around
/// every component. Malformed coordinates yield `None`, never a panic.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub world: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            world: None,
            x,
            y,
            z,
        }
    }

    /// Attaches a world name (builder pattern).
    #[must_use]
    pub fn in_world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(world.into());
        self
    }

    /// Parses the textual encodings `"x,y,z"` and `"world:x,y,z"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (world, coords) = match raw.split_once(':') {
            Some((world, rest)) => {
                let world = world.trim();
                if world.is_empty() {
                    return None;
                }
                (Some(world.to_string()), rest)
            }
            None => (None, raw),
        };

        let mut parts = coords.split(',');
        let x = f64::from_str(parts.next()?.trim()).ok()?;
        let y = f64::from_str(parts.next()?.trim()).ok()?;
        let z = f64::from_str(parts.next()?.trim()).ok()?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self { world, x, y, z })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(world) = &self.world {
            write!(f, "{}:", world)?;
        }
        write!(
            f,
            "{},{},{}",
            format_number(self.x),
            format_number(self.y),
            format_number(self.z)
        )
    }
}

/// A stack of items of one material.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub material: String,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
        }
    }

    /// Parses `"material"` or `"material*amount"`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.split_once('*') {
            Some((material, amount)) => {
                let material = material.trim();
                let amount = amount.trim().parse().ok()?;
                if material.is_empty() || amount == 0 {
                    return None;
                }
                Some(Self::new(material, amount))
            }
            None => {
                let material = raw.trim();
                if material.is_empty() {
                    return None;
                }
                Some(Self::new(material, 1))
            }
        }
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount == 1 {
            write!(f, "{}", self.material)
        } else {
            write!(f, "{}*{}", self.material, self.amount)
        }
    }
}

/// Semantic type of a [`DataValue`].
///
/// `Any` only appears in argument declarations, never on a concrete value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ValueType {
    Text,
    Number,
    Boolean,
    Location,
    Item,
    Player,
    Any,
}

/// A typed runtime value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Location(Location),
    Item(ItemStack),
    Player(PlayerId),
}

impl DataValue {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    pub fn kind(&self) -> ValueType {
        match self {
            Self::Text(_) => ValueType::Text,
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Location(_) => ValueType::Location,
            Self::Item(_) => ValueType::Item,
            Self::Player(_) => ValueType::Player,
        }
    }

    /// Display form; infallible for every kind.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Location(l) => l.to_string(),
            Self::Item(i) => i.to_string(),
            Self::Player(p) => p.to_string(),
        }
    }

    /// Numeric form: numbers pass through, booleans map to 0/1, text is
    /// parsed. Everything else is a type mismatch.
    pub fn as_number(&self) -> Result<f64, ResolutionError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Text(s) => {
                f64::from_str(s.trim()).map_err(|_| ResolutionError::MalformedNumber {
                    raw: s.clone(),
                })
            }
            other => Err(ResolutionError::TypeMismatch {
                expected: ValueType::Number,
                actual: other.kind(),
            }),
        }
    }

    /// Boolean form: recognizes case-insensitive `true`/`false` plus the
    /// synonyms `yes`/`no`/`on`/`off` in text.
    pub fn as_boolean(&self) -> Result<bool, ResolutionError> {
        match self {
            Self::Boolean(b) => Ok(*b),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(ResolutionError::TypeMismatch {
                    expected: ValueType::Boolean,
                    actual: ValueType::Text,
                }),
            },
            other => Err(ResolutionError::TypeMismatch {
                expected: ValueType::Boolean,
                actual: other.kind(),
            }),
        }
    }

    pub fn as_location(&self) -> Result<Location, ResolutionError> {
        match self {
            Self::Location(l) => Ok(l.clone()),
            Self::Text(s) => Location::parse(s).ok_or_else(|| ResolutionError::MalformedLocation {
                raw: s.clone(),
            }),
            other => Err(ResolutionError::TypeMismatch {
                expected: ValueType::Location,
                actual: other.kind(),
            }),
        }
    }

    pub fn as_item(&self) -> Result<ItemStack, ResolutionError> {
        match self {
            Self::Item(i) => Ok(i.clone()),
            Self::Text(s) => ItemStack::parse(s).ok_or(ResolutionError::TypeMismatch {
                expected: ValueType::Item,
                actual: ValueType::Text,
            }),
            other => Err(ResolutionError::TypeMismatch {
                expected: ValueType::Item,
                actual: other.kind(),
            }),
        }
    }

    pub fn as_player(&self) -> Result<PlayerId, ResolutionError> {
        match self {
            Self::Player(p) => Ok(*p),
            other => Err(ResolutionError::TypeMismatch {
                expected: ValueType::Player,
                actual: other.kind(),
            }),
        }
    }
}

/// Format a number for display, avoiding unnecessary decimals.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parses_bare_and_world_qualified() {
        let bare = Location::parse("1, 2.5 ,3").unwrap();
        assert_eq!(bare.world, None);
        assert_eq!((bare.x, bare.y, bare.z), (1.0, 2.5, 3.0));

        let qualified = Location::parse("hub: 0,64,0").unwrap();
        assert_eq!(qualified.world.as_deref(), Some("hub"));
        assert_eq!(qualified.y, 64.0);
    }

    #[test]
    fn malformed_location_is_none_not_a_panic() {
        assert_eq!(Location::parse("1,2"), None);
        assert_eq!(Location::parse("1,2,3,4"), None);
        assert_eq!(Location::parse("a,b,c"), None);
        assert_eq!(Location::parse(":1,2,3"), None);
    }

    #[test]
    fn number_conversion() {
        assert_eq!(DataValue::Number(4.0).as_number().unwrap(), 4.0);
        assert_eq!(DataValue::text(" 3.5 ").as_number().unwrap(), 3.5);
        assert_eq!(DataValue::Boolean(true).as_number().unwrap(), 1.0);
        assert!(matches!(
            DataValue::text("many").as_number(),
            Err(ResolutionError::MalformedNumber { .. })
        ));
        assert!(matches!(
            DataValue::Player(PlayerId(1)).as_number(),
            Err(ResolutionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn boolean_synonyms() {
        assert!(DataValue::text("TRUE").as_boolean().unwrap());
        assert!(DataValue::text("yes").as_boolean().unwrap());
        assert!(!DataValue::text("off").as_boolean().unwrap());
        assert!(DataValue::text("maybe").as_boolean().is_err());
    }

    #[test]
    fn text_form_drops_trailing_zero() {
        assert_eq!(DataValue::Number(3.0).as_text(), "3");
        assert_eq!(DataValue::Number(3.25).as_text(), "3.25");
    }

    #[test]
    fn item_stack_parsing() {
        assert_eq!(
            ItemStack::parse("stone*3"),
            Some(ItemStack::new("stone", 3))
        );
        assert_eq!(ItemStack::parse("torch"), Some(ItemStack::new("torch", 1)));
        assert_eq!(ItemStack::parse("stone*0"), None);
        assert_eq!(ItemStack::parse(""), None);
    }
}
