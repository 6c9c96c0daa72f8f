//! Language catalog: the immutable list of languages a user can pick from.
//!
//! The process-wide catalog is built once on first access through a
//! `OnceLock` and never changes afterwards.

use std::sync::OnceLock;

/// Languages offered by default, in no particular order.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "Python",
    "JavaScript",
    "Java",
    "C++",
    "C#",
    "C",
    "TypeScript",
    "PHP",
    "Swift",
    "Kotlin",
    "Go",
    "Rust",
    "Ruby",
    "R",
    "Dart",
    "Scala",
    "Perl",
    "Objective-C",
    "MATLAB",
    "SQL",
    "Shell",
    "Lua",
    "Haskell",
    "Elixir",
    "Clojure",
    "HTML",
    "CSS",
    "Fortran",
    "Assembly",
];

/// An alphabetically sorted, immutable sequence of language names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    names: Vec<String>,
}

static CATALOG: OnceLock<LanguageCatalog> = OnceLock::new();

impl LanguageCatalog {
    /// Build a catalog from arbitrary names. Names are sorted and duplicates dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// The global catalog of [`DEFAULT_LANGUAGES`].
    pub fn get() -> &'static LanguageCatalog {
        CATALOG.get_or_init(|| LanguageCatalog::new(DEFAULT_LANGUAGES.iter().copied()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries containing `query` as a case-insensitive substring, in catalog order.
    ///
    /// An empty query yields the whole catalog.
    pub fn filter(&self, query: &str) -> Vec<&str> {
        if query.is_empty() {
            return self.names.iter().map(String::as_str).collect();
        }

        let needle = query.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// The catalog entry equal to `name` ignoring case, if any.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.names
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}
