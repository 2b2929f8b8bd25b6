/// Environment variable that switches object keys to the legacy timestamp layout.
pub const LEGACY_OBJECT_KEYS: &str = "LEGACY_OBJECT_KEYS";

/// `Settings` are the function-wide options read once at cold start.
/// Per-invocation options travel in the request instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    /// Reproduce the add-one date components of historical object keys
    pub legacy_object_keys: bool,
}

impl Settings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Settings {
        Settings::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let legacy_object_keys = lookup(LEGACY_OBJECT_KEYS)
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        Settings { legacy_object_keys }
    }
}
