//! Target languages supported by the in-process generators.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::language::Language;
//!
//! let language: Language = "C#".parse().unwrap();
//! assert_eq!(language, Language::CSharp);
//! assert_eq!(language.as_str(), "csharp");
//! assert_eq!(Language::Dart.to_string(), "dart");
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Languages with an in-process code generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python 3
    Python,
    /// TypeScript
    Typescript,
    /// Kotlin (JVM)
    Kotlin,
    /// C#
    CSharp,
    /// Swift
    Swift,
    /// Dart
    Dart,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "typescript" | "ts" => Ok(Language::Typescript),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "csharp" | "c#" | "cs" => Ok(Language::CSharp),
            "swift" => Ok(Language::Swift),
            "dart" => Ok(Language::Dart),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

impl Language {
    /// Returns the language identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Typescript => "typescript",
            Self::Kotlin => "kotlin",
            Self::CSharp => "csharp",
            Self::Swift => "swift",
            Self::Dart => "dart",
        }
    }

    /// Returns an iterator over all languages
    pub fn all() -> impl Iterator<Item = Self> {
        use Language::*;
        [Python, Typescript, Kotlin, CSharp, Swift, Dart]
            .iter()
            .copied()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_str() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("TYPESCRIPT".parse::<Language>().unwrap(), Language::Typescript);
        assert_eq!("c#".parse::<Language>().unwrap(), Language::CSharp);
        assert_eq!("CSharp".parse::<Language>().unwrap(), Language::CSharp);
        assert_eq!("dart".parse::<Language>().unwrap(), Language::Dart);

        assert!("go".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_display_matches_as_str() {
        for language in Language::all() {
            assert_eq!(language.to_string(), language.as_str());
            assert_eq!(language.as_str().parse::<Language>().unwrap(), language);
        }
    }

    #[test]
    fn test_all() {
        let unique: HashSet<_> = Language::all().collect();
        assert_eq!(unique.len(), 6);
    }
}
