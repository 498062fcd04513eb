//! Upstream recipe API endpoints.

/// One of the five read-only upstream endpoints, with its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Search meals by name.
    Search { name: String },
    /// Look up one meal by id.
    Lookup { id: String },
    /// List all categories.
    Categories,
    /// List meals in a category.
    FilterByCategory { category: String },
    /// One random meal.
    Random,
}

impl Endpoint {
    /// Path segment appended after `{base}/{api_key}/`.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Search { .. } => "search.php",
            Endpoint::Lookup { .. } => "lookup.php",
            Endpoint::Categories => "categories.php",
            Endpoint::FilterByCategory { .. } => "filter.php",
            Endpoint::Random => "random.php",
        }
    }

    /// Query parameters in upstream naming.
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        match self {
            Endpoint::Search { name } => vec![("s", name.as_str())],
            Endpoint::Lookup { id } => vec![("i", id.as_str())],
            Endpoint::FilterByCategory { category } => vec![("c", category.as_str())],
            Endpoint::Categories | Endpoint::Random => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Endpoint::Search { name: "x".into() }.path(), "search.php");
        assert_eq!(Endpoint::Lookup { id: "1".into() }.path(), "lookup.php");
        assert_eq!(Endpoint::Categories.path(), "categories.php");
        assert_eq!(Endpoint::FilterByCategory { category: "Beef".into() }.path(), "filter.php");
        assert_eq!(Endpoint::Random.path(), "random.php");
    }

    #[test]
    fn test_query_params() {
        assert_eq!(Endpoint::Search { name: "arrabiata".into() }.query(), vec![("s", "arrabiata")]);
        assert_eq!(Endpoint::FilterByCategory { category: "Seafood".into() }.query(), vec![("c", "Seafood")]);
        assert!(Endpoint::Categories.query().is_empty());
    }
}
