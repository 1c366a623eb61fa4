//! Selectable pets. The set is closed; the rendering layer maps each one to its
//! sprite and label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PetTapError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    #[default]
    Dog,
    Cat,
    Beagle,
    Husky,
}

impl Character {
    /// Display order used by the menu marquee and the selection grid.
    pub const ALL: [Character; 4] = [
        Character::Dog,
        Character::Cat,
        Character::Beagle,
        Character::Husky,
    ];

    /// Stable lowercase key (also the serde representation).
    pub fn key(self) -> &'static str {
        match self {
            Character::Dog => "dog",
            Character::Cat => "cat",
            Character::Beagle => "beagle",
            Character::Husky => "husky",
        }
    }

    /// Label shown under the sprite. The dog is drawn as a poodle.
    pub fn display_name(self) -> &'static str {
        match self {
            Character::Dog => "Poodle",
            Character::Cat => "Cat",
            Character::Beagle => "Beagle",
            Character::Husky => "Husky",
        }
    }

    pub fn image_path(self) -> &'static str {
        match self {
            Character::Dog => "/images/Dog.png",
            Character::Cat => "/images/Cat.png",
            Character::Beagle => "/images/Beagle.png",
            Character::Husky => "/images/Husky.png",
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Character {
    type Err = PetTapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Character::ALL
            .iter()
            .copied()
            .find(|c| c.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PetTapError::UnknownCharacter(s.to_string()))
    }
}
