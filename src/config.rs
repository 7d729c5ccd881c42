use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BlockdexConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("blockdex.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".blockdex").join("index.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BlockdexConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BlockdexConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BlockdexConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Database path precedence: explicit flag, then config file, then the default under `base`
pub fn resolve_database_path(
    flag: Option<PathBuf>,
    config: Option<&BlockdexConfig>,
    base: &Path,
) -> PathBuf {
    flag.or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| default_database_path_in(base))
}

/// Load the config at `config_path` and resolve the database path against the working directory
pub fn database_path_for(flag: Option<PathBuf>, config_path: &Path) -> anyhow::Result<PathBuf> {
    let loaded = load_config(Some(config_path))?;
    let base = std::env::current_dir()?;
    Ok(resolve_database_path(flag, loaded.as_ref(), &base))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
