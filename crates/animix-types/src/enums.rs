//! Enumeration types for the Animix game model.

use serde::{Deserialize, Serialize};

/// Elemental class of a pet.
///
/// The three playable classes form an advantage cycle used by PvP team
/// selection. Any class string the client does not know decodes as
/// [`PetClass::Unknown`] and never satisfies a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PetClass {
    /// Earth class.
    Earth,
    /// Water class.
    Water,
    /// Wind class.
    Wind,
    /// A class this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl PetClass {
    /// The three classes that take part in the advantage cycle.
    pub const PLAYABLE: [Self; 3] = [Self::Earth, Self::Water, Self::Wind];

    /// Whether this is one of the known playable classes.
    pub const fn is_playable(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl core::fmt::Display for PetClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Earth => "Earth",
            Self::Water => "Water",
            Self::Wind => "Wind",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_class_strings_decode_as_unknown() {
        let class: Result<PetClass, _> = serde_json::from_str("\"Fire\"");
        assert_eq!(class.ok(), Some(PetClass::Unknown));
        assert!(!PetClass::Unknown.is_playable());
    }

    #[test]
    fn known_class_strings_decode() {
        let class: Result<PetClass, _> = serde_json::from_str("\"Water\"");
        assert_eq!(class.ok(), Some(PetClass::Water));
        assert!(PetClass::PLAYABLE.iter().all(|c| c.is_playable()));
    }
}
