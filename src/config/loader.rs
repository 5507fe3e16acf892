use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序（后者覆盖前者）：
    /// 1. 开发环境默认值
    /// 2. ./config.toml
    /// 3. BROCA__ 前缀环境变量（例如 BROCA__LLM__API_KEY）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::figment(PathBuf::from("config.toml")).extract()
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        Self::figment(path).extract()
    }

    fn figment(path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::development()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BROCA__").split("__").global())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = ConfigLoader::load_from(PathBuf::from("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.memory.max_messages, 10);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[memory]\nmax_messages = 4\n"
        )
        .unwrap();

        let config = ConfigLoader::load_from(file.path().to_path_buf()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.memory.max_messages, 4);
        // untouched sections keep their defaults
        assert_eq!(config.llm.timeout, 30);
    }
}
