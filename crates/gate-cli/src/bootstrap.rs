use anyhow::Context;

pub fn load_config() -> anyhow::Result<gate_config::GatehouseConfig> {
    load_dotenv()?;
    gate_config::GatehouseConfig::load().context("failed to load gatehouse configuration")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}
