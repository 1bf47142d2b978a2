//! 命令行参数

use crate::config::CliOverrides;
use clap::Parser;
use std::path::PathBuf;

/// OCR 置信度分析：下载 METS/ALTO，统计单词置信度并生成报告
#[derive(Debug, Parser)]
#[command(name = "oca", version, about)]
pub struct Cli {
    /// 记录ID，例如 PPN86268370X
    pub record_id: String,

    /// METS 的 URL 或模板（可含 {record_id}）
    #[arg(long = "mets", value_name = "URL")]
    pub mets: Option<String>,

    /// 并发处理的页数（上限为页数和CPU核数）
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// 图书馆预设
    #[arg(long = "library", value_name = "NAME")]
    pub library: Option<String>,

    /// 输出根目录
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<String>,

    /// TOML 配置文件
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 在页面图像上叠加热力图
    #[arg(long)]
    pub overlay: bool,

    /// 忽略本地副本，重新下载
    #[arg(long)]
    pub refresh: bool,

    /// 详细日志（可重复）
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            threads: self.threads,
            output_dir: self.output.clone(),
            library: self.library.clone(),
            mets_url: self.mets.clone(),
            overlay: self.overlay,
            refresh: self.refresh,
            verbose: self.verbose > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["oca", "PPN86268370X"]).unwrap();

        assert_eq!(cli.record_id, "PPN86268370X");
        assert!(cli.mets.is_none());
        assert!(cli.threads.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "oca",
            "PPN1",
            "--mets",
            "file:///tmp/mets.xml",
            "--threads",
            "8",
            "--overlay",
            "-vv",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.threads, Some(8));
        assert_eq!(overrides.mets_url.as_deref(), Some("file:///tmp/mets.xml"));
        assert!(overrides.overlay);
        assert!(overrides.verbose);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_record_id_required() {
        assert!(Cli::try_parse_from(["oca"]).is_err());
    }
}
