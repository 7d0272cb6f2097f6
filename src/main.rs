// ==========================================
// 线索工具 - 命令行入口
// ==========================================
// 子命令: process / scrape / analyze / urls / history / managers / theme
// 配置: --config 指定配置文件，默认位于系统配置目录
// 日志: --log-format text|json，--log-level 覆盖 RUST_LOG
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lead_instrument::api::{AnalyticsApi, LeadApi, ProcessingReport};
use lead_instrument::config::ConfigManager;
use lead_instrument::importer::format_phone_for_display;
use lead_instrument::scraping::{MapUrlGenerator, WebbeeClient};
use lead_instrument::logging::{self, LogFormat};
use lead_instrument::{APP_NAME, VERSION};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lead-instrument", version, about = "Scraped lead cleaning, CRM export and conversion analytics")]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true, env = "LEAD_INSTRUMENT_CONFIG")]
    config: Option<PathBuf>,

    /// 日志格式（text / json）
    #[arg(long, global = true, env = "LEAD_INSTRUMENT_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// 日志级别指令，覆盖 RUST_LOG（如 debug、lead_instrument::importer=trace）
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 处理源文件并导出 CRM 导入文件
    Process {
        /// 源文件（CSV / Excel）
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 导出文件路径（默认: <paths.output>/crm_import_<时间>.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 预览行数（默认取配置）
        #[arg(long)]
        preview: Option<usize>,
    },

    /// 运行采集任务并处理结果
    Scrape {
        /// 机器人（avito / yandex_maps / html / 2gis）
        #[arg(long, default_value = "yandex_maps")]
        robot: String,

        /// 采集链接
        #[arg(required = true)]
        urls: Vec<String>,

        #[arg(long, env = "WEBBEE_API_TOKEN", hide_env_values = true)]
        token: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 轮询间隔（秒）
        #[arg(long, default_value_t = 10)]
        interval: u64,

        /// 最长等待（秒）
        #[arg(long, default_value_t = 3600)]
        max_wait: u64,
    },

    /// CRM 转化分析
    Analyze {
        #[arg(long)]
        leads: PathBuf,

        #[arg(long)]
        deals: PathBuf,

        /// 同时保存报告到 paths.reports
        #[arg(long)]
        save: bool,
    },

    /// 生成地图搜索链接
    Urls {
        #[arg(long)]
        segment: String,

        /// 城市（可多次指定；缺省为热门城市）
        #[arg(long)]
        city: Vec<String>,

        /// 大城市按区拆分
        #[arg(long)]
        districts: bool,
    },

    /// 最近的处理记录
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// 查看或设置负责人名册
    Managers {
        #[command(subcommand)]
        action: Option<ManagersAction>,
    },

    /// 切换界面主题
    Theme,
}

#[derive(Subcommand)]
enum ManagersAction {
    /// 替换名册
    Set { names: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with(cli.log_format, cli.log_level.as_deref());

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigManager::default_path()?,
    };
    let config = ConfigManager::load(&config_path);
    tracing::info!(path = %config_path.display(), "配置已加载");

    match cli.command {
        Command::Process { files, output, preview } => {
            let mut api = LeadApi::open(config)?;
            let output = prepare_output(output, &api)?;
            let report = api.process_files(&files, &output)?;
            print_report(&report);

            if let Some(table) = api.preview(preview) {
                println!();
                println!("{}", table.columns().join(" | "));
                for row in table.rows() {
                    let cells: Vec<String> = table
                        .columns()
                        .iter()
                        .map(|c| match row.get(c) {
                            Some(v) if c.starts_with("phone_") => format_phone_for_display(v),
                            Some(v) => v.to_string(),
                            None => String::new(),
                        })
                        .collect();
                    println!("{}", cells.join(" | "));
                }
            }
        }

        Command::Scrape {
            robot,
            urls,
            token,
            output,
            interval,
            max_wait,
        } => {
            let mut api = LeadApi::open(config)?;
            let output = prepare_output(output, &api)?;
            let client = WebbeeClient::new(token);
            let report = api
                .scrape_and_process(
                    &client,
                    &robot,
                    &urls,
                    &output,
                    Duration::from_secs(interval),
                    Duration::from_secs(max_wait),
                )
                .await?;
            match report {
                Some(report) => print_report(&report),
                None => println!("Task did not finish within {}s", max_wait),
            }
        }

        Command::Analyze { leads, deals, save } => {
            let api = AnalyticsApi::new(&config.config().paths.reports);
            let report = api.analyze(&leads, &deals);
            println!("{}", report.summary);
            if save {
                let path = api.save_report(&report)?;
                println!("Report saved: {}", path.display());
            }
        }

        Command::Urls {
            segment,
            city,
            districts,
        } => {
            let generator = MapUrlGenerator::new();
            let cities = if city.is_empty() {
                generator.popular_cities().iter().map(|c| c.to_string()).collect()
            } else {
                city
            };
            for url in generator.generate_urls_batch(&cities, &segment, districts) {
                println!("{}", url.url);
            }
        }

        Command::History { limit } => {
            let api = LeadApi::open(config)?;
            for run in api.history(limit)? {
                println!(
                    "{}  {:<8} files={} valid={} dup={} invalid={} {}ms  {}",
                    run.processed_at.format("%Y-%m-%d %H:%M:%S"),
                    run.status,
                    run.stats.files_processed,
                    run.stats.valid_rows,
                    run.stats.duplicates_removed,
                    run.stats.invalid_phones,
                    run.duration_ms,
                    run.output_file.as_deref().unwrap_or("-"),
                );
            }
        }

        Command::Managers { action } => {
            let mut api = LeadApi::open(config)?;
            if let Some(ManagersAction::Set { names }) = action {
                let saved = api.set_managers(names).context("failed to save roster")?;
                println!("Saved {} managers", saved);
            }
            for name in api.managers() {
                println!("{}", name);
            }
        }

        Command::Theme => {
            let mut config = config;
            let theme = config.toggle_theme()?;
            println!("Theme: {:?}", theme);
        }
    }

    Ok(())
}

/// 未指定导出路径时使用 <paths.output>/crm_import_<时间>.csv，并确保目录存在
fn prepare_output(output: Option<PathBuf>, api: &LeadApi) -> Result<PathBuf> {
    let output = output.unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(&api.config().config().paths.output).join(format!("crm_import_{}.csv", stamp))
    });
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    Ok(output)
}

fn print_report(report: &ProcessingReport) {
    println!("Run:                {}", report.run_id);
    println!("Status:             {}", report.status);
    println!("Files processed:    {}", report.stats.files_processed);
    println!("Total rows:         {}", report.stats.total_rows);
    println!("Invalid phones:     {}", report.stats.invalid_phones);
    println!("Duplicates removed: {}", report.stats.duplicates_removed);
    println!("Valid rows:         {}", report.stats.valid_rows);
    println!("Exported rows:      {}", report.exported_rows);
    if let Some(output) = &report.output_file {
        println!("Output:             {}", output);
    }
    println!("Duration:           {} ms", report.duration_ms);
}
