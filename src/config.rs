use crate::error::{AppResult, ConfigError, FileError, OcaError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 优先级：命令行 > 环境变量 > 配置文件 > 默认值
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 请求的并发页数（实际取 min(threads, 页数, CPU核数)）
    pub threads: usize,
    /// 输出根目录，每条记录写入 `<output_dir>/<record_id>/`
    pub output_dir: String,
    /// 图书馆预设名称
    pub library: String,
    /// 显式指定的 METS URL 或模板（可含 `{record_id}`）
    pub mets_url: Option<String>,
    /// 单个 HTTP 请求的超时时间（秒）
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// 是否在页面图像上叠加热力图
    pub overlay: bool,
    /// 忽略本地缓存，重新下载
    pub refresh: bool,
    // --- 报告样式 ---
    pub bootstrap_css_url: String,
    pub bootstrap_js_url: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 4,
            output_dir: ".".to_string(),
            library: "hamburg".to_string(),
            mets_url: None,
            request_timeout_secs: 60,
            user_agent: concat!("oca/", env!("CARGO_PKG_VERSION")).to_string(),
            overlay: false,
            refresh: false,
            bootstrap_css_url:
                "https://cdn.jsdelivr.net/npm/bootstrap@5.2.0/dist/css/bootstrap.min.css".to_string(),
            bootstrap_js_url:
                "https://cdn.jsdelivr.net/npm/bootstrap@5.2.0/dist/js/bootstrap.bundle.min.js"
                    .to_string(),
            verbose_logging: false,
        }
    }
}

/// 命令行覆盖项，`None` 表示未指定
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub threads: Option<usize>,
    pub output_dir: Option<String>,
    pub library: Option<String>,
    pub mets_url: Option<String>,
    pub overlay: bool,
    pub refresh: bool,
    pub verbose: bool,
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().apply_env()
    }

    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn load_from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OcaError::file_read_failed(path.display().to_string(), e))?;

        toml::from_str(&content).map_err(|e| {
            FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            }
            .into()
        })
    }

    /// 用 `OCA_*` 环境变量覆盖当前配置
    pub fn apply_env(mut self) -> AppResult<Self> {
        if let Some(v) = env_parse::<usize>("OCA_THREADS")? {
            self.threads = v;
        }
        if let Ok(v) = std::env::var("OCA_OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Ok(v) = std::env::var("OCA_LIBRARY") {
            self.library = v;
        }
        if let Ok(v) = std::env::var("OCA_METS_URL") {
            self.mets_url = Some(v);
        }
        if let Some(v) = env_parse::<u64>("OCA_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("OCA_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = env_parse::<bool>("OCA_OVERLAY")? {
            self.overlay = v;
        }
        if let Some(v) = env_parse::<bool>("OCA_REFRESH")? {
            self.refresh = v;
        }
        if let Some(v) = env_parse::<bool>("OCA_VERBOSE_LOGGING")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 合并命令行参数（命令行优先）
    pub fn merge_cli(mut self, cli: &CliOverrides) -> Self {
        if let Some(threads) = cli.threads {
            self.threads = threads;
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(library) = &cli.library {
            self.library = library.clone();
        }
        if let Some(mets) = &cli.mets_url {
            self.mets_url = Some(mets.clone());
        }
        self.overlay |= cli.overlay;
        self.refresh |= cli.refresh;
        self.verbose_logging |= cli.verbose;
        self
    }
}

fn env_parse<T: std::str::FromStr>(var_name: &str) -> AppResult<Option<T>> {
    let Ok(value) = std::env::var(var_name) else {
        return Ok(None);
    };
    value.trim().parse::<T>().map(Some).map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: std::any::type_name::<T>().to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oca.toml");
        std::fs::write(&path, "threads = 8\noverlay = true\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();

        assert_eq!(config.threads, 8);
        assert!(config.overlay);
        assert_eq!(config.library, "hamburg");
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oca.toml");
        std::fs::write(&path, "threads = \"many\"\n").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, OcaError::File(FileError::TomlParseFailed { .. })));
    }

    #[test]
    fn test_refresh_from_env() {
        std::env::set_var("OCA_REFRESH", "true");
        let config = Config::from_env();
        std::env::remove_var("OCA_REFRESH");

        assert!(config.unwrap().refresh);
    }

    #[test]
    fn test_cli_overrides_win() {
        let cli = CliOverrides {
            threads: Some(2),
            mets_url: Some("https://example.org/mets/{record_id}".to_string()),
            refresh: true,
            ..Default::default()
        };

        let config = Config::default().merge_cli(&cli);

        assert_eq!(config.threads, 2);
        assert_eq!(
            config.mets_url.as_deref(),
            Some("https://example.org/mets/{record_id}")
        );
        assert!(config.refresh);
        assert!(!config.overlay);
        assert_eq!(config.output_dir, ".");
    }
}
