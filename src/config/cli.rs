use super::ServiceConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "course-forge")]
#[command(about = "Course generation service: outline, videos, storage")]
pub struct CliArgs {
    #[arg(long, help = "TOML config file; environment variables are used when omitted")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override server.bind_address, e.g. 0.0.0.0:8000")]
    pub bind: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,
}

impl CliArgs {
    /// 設定檔優先，否則讀環境變數；`--bind` 最後覆寫
    pub fn load_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📄 Loading configuration from {}", path.display());
                ServiceConfig::from_file(path)?
            }
            None => {
                tracing::info!("📄 Loading configuration from environment");
                ServiceConfig::from_env()?
            }
        };

        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        Ok(config)
    }
}
