use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Document identifier derived from a source file name.
///
/// Ids are heterogeneous: files whose names carry digits get numeric ids,
/// anything else keeps the file name. Sorted output is required, so the
/// total order is pinned: numbers order numerically and sort before names,
/// names order lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DocId {
    Number(u64),
    Name(String),
}

impl DocId {
    /// Derive an id from a file name: strip every non-digit character and
    /// parse the remainder. An empty or unparseable remainder falls back to
    /// the original name.
    pub fn from_file_name(name: &str) -> Self {
        let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Self::Name(name.to_owned());
        }
        match digits.parse::<u64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Name(name.to_owned()),
        }
    }
}

impl Ord for DocId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Name(a), Self::Name(b)) => a.cmp(b),
            (Self::Number(_), Self::Name(_)) => Ordering::Less,
            (Self::Name(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for DocId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_extracted_from_file_names() {
        assert_eq!(DocId::from_file_name("Document_42.txt"), DocId::Number(42));
        assert_eq!(DocId::from_file_name("007.txt"), DocId::Number(7));
    }

    #[test]
    fn digitless_names_stay_names() {
        assert_eq!(
            DocId::from_file_name("readme.md"),
            DocId::Name("readme.md".into())
        );
    }

    #[test]
    fn overflowing_digit_runs_fall_back_to_the_name() {
        let name = "99999999999999999999999999.txt";
        assert_eq!(DocId::from_file_name(name), DocId::Name(name.into()));
    }

    #[test]
    fn numbers_sort_before_names() {
        let mut ids = vec![
            DocId::Name("b.txt".into()),
            DocId::Number(10),
            DocId::Name("a.txt".into()),
            DocId::Number(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                DocId::Number(2),
                DocId::Number(10),
                DocId::Name("a.txt".into()),
                DocId::Name("b.txt".into()),
            ]
        );
    }
}
