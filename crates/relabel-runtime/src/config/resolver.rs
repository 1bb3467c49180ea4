//! Final override layer.
//!
//! ```text
//! ConfigLoader.load()  →  RelabelConfig (files + env)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()    e.g. CLI flags
//!                              │
//!                              ▼
//!                     RelabelConfig (final)
//! ```

use super::RelabelConfig;

/// Applies overrides on top of a loaded configuration.
///
/// Implementations should only touch fields they were explicitly given,
/// leaving everything else as loaded.
pub trait ConfigResolver {
    /// Applies overrides to `config`.
    fn apply(&self, config: &mut RelabelConfig);
}

/// Resolver that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut RelabelConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_resolver_does_nothing() {
        let mut config = RelabelConfig::default();
        let original = config.clone();
        NoOpResolver.apply(&mut config);
        assert_eq!(config, original);
    }

    #[test]
    fn custom_resolver_overrides_given_fields() {
        struct UrlOverride(Option<String>);

        impl ConfigResolver for UrlOverride {
            fn apply(&self, config: &mut RelabelConfig) {
                if let Some(url) = &self.0 {
                    config.api.base_url = url.clone();
                }
            }
        }

        let mut config = RelabelConfig::default();
        UrlOverride(None).apply(&mut config);
        assert_eq!(config, RelabelConfig::default());

        UrlOverride(Some("http://10.0.0.2:5000".into())).apply(&mut config);
        assert_eq!(config.api.base_url, "http://10.0.0.2:5000");
    }
}
