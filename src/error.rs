//! Registry errors shared by the asset, constraint and engine registries

use thiserror::Error;

/// Which registry an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Asset,
    Constraint,
    Engine,
    Model,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RegistryKind::Asset => "asset",
            RegistryKind::Constraint => "constraint",
            RegistryKind::Engine => "engine",
            RegistryKind::Model => "model",
        };
        f.write_str(name)
    }
}

/// Misuse of a name-keyed registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// A name was registered twice
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: RegistryKind, name: String },

    /// A name was referenced before registration
    #[error("{kind} '{name}' not found{}", format_suggestions(.suggestions))]
    NotFound {
        kind: RegistryKind,
        name: String,
        suggestions: Vec<String>,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

impl RegistryError {
    pub fn duplicate(kind: RegistryKind, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Not-found error carrying up to three close matches from `known`
    pub fn not_found<'a>(
        kind: RegistryKind,
        name: impl Into<String>,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let name = name.into();
        let suggestions = find_similar(known, &name, 2);
        Self::NotFound {
            kind,
            name,
            suggestions,
        }
    }

    /// The offending name
    pub fn name(&self) -> &str {
        match self {
            Self::DuplicateName { name, .. } | Self::NotFound { name, .. } => name,
        }
    }
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut row = vec![0usize; n + 1];
    for (i, ca) in a_chars.iter().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[n]
}

fn find_similar<'a>(
    known: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = known
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((name, dist))
        })
        .collect();

    candidates.sort_by(|(a, da), (b, db)| da.cmp(db).then(a.cmp(b)));
    candidates
        .into_iter()
        .take(3)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("workspace", "workspace"), 0);
        assert_eq!(levenshtein_distance("tangent", "tangnet"), 2);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_duplicate_display() {
        let err = RegistryError::duplicate(RegistryKind::Constraint, "room_workspace");
        insta::assert_snapshot!(err.to_string(), @"constraint 'room_workspace' is already registered");
    }

    #[test]
    fn test_not_found_with_suggestion() {
        let err = RegistryError::not_found(RegistryKind::Asset, "cilinder", ["box", "cylinder"]);
        insta::assert_snapshot!(err.to_string(), @"asset 'cilinder' not found (did you mean cylinder?)");
        assert_eq!(err.name(), "cilinder");
    }

    #[test]
    fn test_not_found_without_suggestion() {
        let err = RegistryError::not_found(RegistryKind::Engine, "walls", ["objects"]);
        insta::assert_snapshot!(err.to_string(), @"engine 'walls' not found");
    }
}
