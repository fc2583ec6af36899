//! Path variable storage.

/// Path variables matched by the external router.
///
/// Variables are stored as (name, value) pairs in match order. A missing
/// set of variables behaves exactly like an empty one.
///
/// # Example
///
/// ```rust
/// use tr1d1um_extract::PathVars;
///
/// let mut vars = PathVars::new();
/// vars.push("deviceid", "mac:112233445566");
/// vars.push("service", "config");
///
/// assert_eq!(vars.get("service"), Some("config"));
/// assert_eq!(vars.get("parameter"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathVars {
    inner: Vec<(String, String)>,
}

impl PathVars {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable. A later duplicate never shadows an earlier one.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vars_new() {
        let vars = PathVars::new();
        assert!(vars.is_empty());
        assert_eq!(vars.len(), 0);
        assert_eq!(vars.get("deviceid"), None);
    }

    #[test]
    fn test_first_value_wins() {
        let mut vars = PathVars::new();
        vars.push("service", "config");
        vars.push("service", "iot");

        assert_eq!(vars.get("service"), Some("config"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_empty_value_is_present() {
        let vars: PathVars = [("parameter", "")].into_iter().collect();
        assert_eq!(vars.get("parameter"), Some(""));
    }

    #[test]
    fn test_iter_preserves_order() {
        let vars: PathVars = [("deviceid", "mac:1"), ("service", "config")]
            .into_iter()
            .collect();
        let names: Vec<_> = vars.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["deviceid", "service"]);
    }
}
