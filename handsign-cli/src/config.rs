use handsign_core::GameConfig;
use handsign_lottery::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub theme: Theme,
    /// Overrides the built-in game settings when present
    #[serde(default)]
    pub game: Option<GameConfig>,
}

impl CliConfig {
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("handsign")
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Missing file means defaults; a corrupt one is an error
    pub async fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub async fn save(&self, data_dir: &Path) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(data_dir).await?;
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(Self::path(data_dir), content).await?;
        Ok(())
    }

    pub fn game_config(&self) -> GameConfig {
        self.game.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.theme, Theme::Light);
        assert!(config.game.is_none());
        assert_eq!(config.game_config().total_rounds, 5);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("nested");

        let mut game = GameConfig::default();
        game.total_rounds = 3;
        let config = CliConfig {
            theme: Theme::Dark,
            game: Some(game),
        };
        config.save(&data_dir).await.unwrap();

        let loaded = CliConfig::load(&data_dir).await.unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.game_config().total_rounds, 3);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(CliConfig::path(dir.path()), "{ not json").unwrap();
        assert!(CliConfig::load(dir.path()).await.is_err());
    }
}
