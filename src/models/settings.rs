//! Per-driver settings schema, loaded from `[drivers.<name>]` in
//! `optlint.toml|yaml`.
//!
//! Every field is optional; unset fields keep the built-in driver defaults.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
/// Overrides for one built-in driver.
pub struct DriverSettings {
    /// Executable name or path of the underlying lint tool.
    pub tool: Option<String>,
    /// Tool config file, relative to the repository root.
    pub rc: Option<String>,
    /// Enable or disable the result cache for this driver.
    pub cache: Option<bool>,
    /// Replace the extension list used to match candidates.
    pub extensions: Option<Vec<String>>,
    /// Extra arguments passed to every invocation, before directive options.
    #[serde(default)]
    pub args: Vec<String>,
}
