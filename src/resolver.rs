use std::collections::BTreeMap;

/// Scope the table's variables are looked up in.
pub const SERVER_SCOPE: &str = "server";

/// Looks up the configured value of a server variable.
///
/// `None` means the variable is unknown or unset in `scope`.
pub trait PathResolver: Send + Sync {
    fn get_variable(&self, scope: &str, name: &str) -> Option<String>;
}

/// Resolver over a fixed name → value map, usually built from
/// [`DisksizeConfig`](crate::config::DisksizeConfig).
#[derive(Clone, Debug, Default)]
pub struct ConfigResolver {
    variables: BTreeMap<String, String>,
}

impl ConfigResolver {
    pub fn new(variables: BTreeMap<String, String>) -> Self {
        Self { variables }
    }
}

impl PathResolver for ConfigResolver {
    fn get_variable(&self, scope: &str, name: &str) -> Option<String> {
        if scope != SERVER_SCOPE {
            return None;
        }
        self.variables.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
