use kestrel_dns_domain::{CliOverrides, Config};

/// Load and validate the configuration; called before the tracing
/// subscriber exists, so reporting happens in `main`.
pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}
