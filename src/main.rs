// ==========================================
// 钢结构车间产能预测 - 命令行入口
// ==========================================
// 用法:
//   shop-forecast [db_path] [--weeks N] [--shift X] [--start YYYY-MM-DD]
//                 [--threshold T] [--compare X,Y,..]
//                 [--import FILE --kind committed|pending]
//                 [--set-config KEY=VALUE]...
//
// db_path 缺省取 SHOP_FORECAST_DB_PATH 或用户数据目录。
// 预测结果以 JSON 输出到 stdout, 日志输出到 stderr。
// ==========================================

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde_json::json;
use shop_capacity_forecast::api::{ForecastApi, ForecastRequest};
use shop_capacity_forecast::db::get_default_db_path;
use shop_capacity_forecast::domain::DemandKind;
use shop_capacity_forecast::{logging, APP_NAME, VERSION};
use std::path::PathBuf;
use tracing::info;

/// 钢结构车间产能预测
#[derive(Debug, Parser)]
#[command(name = "shop-forecast", version, allow_negative_numbers = true)]
struct CliArgs {
    /// 数据库路径
    db_path: Option<String>,

    /// 预测周数 (缺省取公司配置)
    #[arg(long)]
    weeks: Option<i32>,

    /// 班次倍率
    #[arg(long = "shift")]
    shift_multiplier: Option<f64>,

    /// 起始日期 YYYY-MM-DD (对齐到周一)
    #[arg(long = "start")]
    start_date: Option<NaiveDate>,

    /// 低利用率阈值覆写
    #[arg(long)]
    threshold: Option<f64>,

    /// 多情景对比的班次倍率列表, 逗号分隔
    #[arg(long, value_delimiter = ',')]
    compare: Vec<f64>,

    /// 导入项目清单 (.csv / .xlsx)
    #[arg(long, requires = "kind")]
    import: Option<PathBuf>,

    /// 导入文件的项目类别: committed | pending
    #[arg(long, requires = "import")]
    kind: Option<DemandKind>,

    /// 写入公司配置, 可重复
    #[arg(long = "set-config", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    set_config: Vec<(String, String)>,
}

impl CliArgs {
    fn request(&self) -> ForecastRequest {
        ForecastRequest {
            shift_multiplier: self.shift_multiplier,
            weeks: self.weeks,
            start_date: self.start_date,
            threshold: self.threshold,
        }
    }

    fn import(&self) -> Option<(PathBuf, DemandKind)> {
        self.import.clone().zip(self.kind)
    }
}

fn parse_key_value(pair: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("期望 KEY=VALUE, 实际 {}", pair))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = CliArgs::parse();
    let db_path = cli.db_path.clone().unwrap_or_else(get_default_db_path);

    info!("{} v{}", APP_NAME, VERSION);
    info!(db_path = %db_path, "使用数据库");

    let (api, config_manager) =
        ForecastApi::open(&db_path).with_context(|| format!("无法打开数据库: {}", db_path))?;

    for (key, value) in &cli.set_config {
        config_manager
            .set_config(key, value)
            .map_err(|e| anyhow!("写入配置 {} 失败: {}", key, e))?;
        info!(key = %key, value = %value, "配置已更新");
    }

    let import_report = match &cli.import() {
        Some((file, kind)) => Some(
            api.import_projects(file, *kind)
                .with_context(|| format!("导入失败: {}", file.display()))?,
        ),
        None => None,
    };

    let config_snapshot = config_manager
        .get_config_snapshot()
        .map_err(|e| anyhow!("读取配置快照失败: {}", e))?;
    let config: serde_json::Value = serde_json::from_str(&config_snapshot)?;

    let request = cli.request();
    let output = if cli.compare.is_empty() {
        let forecast = api.build_forecast(&request).await?;
        json!({ "config": config, "import": import_report, "forecast": forecast })
    } else {
        let scenarios = api.compare_scenarios(&request, &cli.compare).await?;
        json!({ "config": config, "import": import_report, "scenarios": scenarios })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
