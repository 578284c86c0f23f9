use cname_finalizer_domain::{CliOverrides, Config};

/// Load and validate the configuration. Any problem here aborts startup.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    Ok(config)
}
