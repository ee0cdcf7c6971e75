//! Configuration access port trait.

/// Section/key lookup. `get_double` falls back to `default` when the key is
/// absent or unparsable.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}
