pub mod errors;

pub use errors::{
    DynTaxError, DynTaxErrorCategory, DynTaxErrorKind, DynTaxResult, ExtractResult,
    SynthesisResult,
};

use std::fmt::{Display, Formatter};

/// Spin multiplicity of an electronic state as printed by Q-Chem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinMultiplicity {
    Singlet,
    Doublet,
    Triplet,
    Quartet,
    Quintet,
}

impl SpinMultiplicity {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "singlet" => Some(Self::Singlet),
            "doublet" => Some(Self::Doublet),
            "triplet" => Some(Self::Triplet),
            "quartet" => Some(Self::Quartet),
            "quintet" => Some(Self::Quintet),
            _ => None,
        }
    }

    pub const fn from_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(Self::Singlet),
            2 => Some(Self::Doublet),
            3 => Some(Self::Triplet),
            4 => Some(Self::Quartet),
            5 => Some(Self::Quintet),
            _ => None,
        }
    }

    pub const fn count(self) -> u8 {
        match self {
            Self::Singlet => 1,
            Self::Doublet => 2,
            Self::Triplet => 3,
            Self::Quartet => 4,
            Self::Quintet => 5,
        }
    }

    /// Letter used in state labels such as `S2` or `T1`.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Singlet => "S",
            Self::Doublet => "D",
            Self::Triplet => "T",
            Self::Quartet => "Q",
            Self::Quintet => "P",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Singlet => "Singlet",
            Self::Doublet => "Doublet",
            Self::Triplet => "Triplet",
            Self::Quartet => "Quartet",
            Self::Quintet => "Quintet",
        }
    }
}

impl Display for SpinMultiplicity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
