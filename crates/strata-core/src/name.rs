//! Invertible naming conventions.
//!
//! A convention maps a word sequence to a single identifier string and
//! back. Backends use a [`NamePair`] to derive a field's backend-side name
//! from its declared attribute name when none is given explicitly.

/// An identifier convention: encode joins words into one identifier,
/// decode splits an identifier back into lowercase words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// Underscore-joined lowercase words: `solar_system_name`.
    Snake,

    /// camelCase, optionally with the first word capitalized:
    /// `solarSystemName` / `SolarSystemName`.
    Camel { capitalize_first: bool },
}

impl NamingConvention {
    pub const fn camel() -> Self {
        Self::Camel {
            capitalize_first: false,
        }
    }

    pub const fn upper_camel() -> Self {
        Self::Camel {
            capitalize_first: true,
        }
    }

    pub fn encode(&self, words: &[String]) -> String {
        match self {
            Self::Snake => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            Self::Camel { capitalize_first } => {
                let mut out = String::new();
                for (i, word) in words.iter().enumerate() {
                    if i == 0 && !capitalize_first {
                        out.push_str(&word.to_lowercase());
                    } else {
                        out.push_str(&capitalize(word));
                    }
                }
                out
            }
        }
    }

    pub fn decode(&self, identifier: &str) -> Vec<String> {
        match self {
            Self::Snake => identifier
                .split('_')
                .map(|w| w.to_lowercase())
                .collect(),
            Self::Camel { .. } => {
                let mut words = vec![];
                let mut word = String::new();
                for c in identifier.chars() {
                    if c.is_uppercase() && !word.is_empty() {
                        words.push(word.to_lowercase());
                        word = String::new();
                    }
                    word.push(c);
                }
                if !word.is_empty() {
                    words.push(word.to_lowercase());
                }
                words
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// The pair of conventions a backend reports: how the model side names
/// attributes and how the backend side names keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamePair {
    pub model: NamingConvention,
    pub backend: NamingConvention,
}

impl NamePair {
    pub const fn new(model: NamingConvention, backend: NamingConvention) -> Self {
        Self { model, backend }
    }

    /// Derive a backend key name from a model attribute name: decode with
    /// the model convention, re-encode with the backend convention.
    pub fn translate(&self, attribute: &str) -> String {
        self.backend.encode(&self.model.decode(attribute))
    }
}

impl Default for NamePair {
    fn default() -> Self {
        Self::new(NamingConvention::Snake, NamingConvention::Snake)
    }
}
