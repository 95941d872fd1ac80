//! Target selection from a loaded configuration.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, TargetConfig};
use std::collections::BTreeMap;

/// Resolves the set of targets to build.
///
/// With `selected = None` every configured target is returned, in name
/// order. With `selected = Some(name)` only that target is returned;
/// an unknown name is an error.
pub fn resolve_targets<'a>(
    config: &'a ProjectConfig,
    selected: Option<&str>,
) -> Result<BTreeMap<&'a str, &'a TargetConfig>, ConfigError> {
    match selected {
        Some(name) => match config.targets.get_key_value(name) {
            Some((key, target)) => Ok(BTreeMap::from([(key.as_str(), target)])),
            None => Err(ConfigError::UnknownTarget(name.to_string())),
        },
        None => Ok(config
            .targets
            .iter()
            .map(|(name, target)| (name.as_str(), target))
            .collect()),
    }
}
