//! General utility function for module.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::errors::NetworkConfigError;
use crate::registry::EnvironmentRegistry;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Expands `${VAR}` placeholders in `raw` using `lookup`.
///
/// Keeps API keys out of versioned config files, e.g.:
///
/// ```text
/// https://ropsten.infura.io/v3/${INFURA_PROJECT_ID}
/// ```
///
/// Fails with the first variable `lookup` has no value for.
pub fn expand_placeholders<F>(raw: &str, lookup: F) -> Result<String, NetworkConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Option<String> = None;
    let expanded = placeholder_re().replace_all(raw, |caps: &Captures| {
        let var = &caps[1];
        lookup(var).unwrap_or_else(|| {
            missing.get_or_insert_with(|| var.to_string());
            String::new()
        })
    });

    match missing {
        Some(var) => Err(NetworkConfigError::MissingVariable(var)),
        None => Ok(expanded.into_owned()),
    }
}

/// Expands `${VAR}` placeholders from the process environment.
pub fn expand_env_placeholders(raw: &str) -> Result<String, NetworkConfigError> {
    expand_placeholders(raw, |var| std::env::var(var).ok())
}

/// Log registered environment names.
pub fn log_environments<H>(registry: &EnvironmentRegistry<H>) {
    info!(count = registry.len(), "Indexed networks");
    registry.list().for_each(|name| {
        debug!("+ {}", name);
    });
}
