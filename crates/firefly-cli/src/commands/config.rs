//! Config command

use anyhow::{Context, Result};
use firefly_runtime::SceneConfig;

pub fn run(layout: bool) -> Result<()> {
    let output = if layout {
        toml::to_string_pretty(&super::simulate::demo_layout()).context("Failed to serialize layout")?
    } else {
        SceneConfig::default()
            .to_toml_string()
            .context("Failed to serialize default config")?
    };
    println!("{}", output);
    Ok(())
}
