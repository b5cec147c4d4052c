use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use compute_scheduler_core::SchedulerConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod shutdown;

use app::{Application, Command};
use shutdown::ShutdownManager;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let config = SchedulerConfig::load(config_path).context("加载配置失败")?;

    let log_level = matches
        .get_one::<String>("log-level")
        .unwrap_or(&config.observability.log_level);
    let log_format = matches
        .get_one::<String>("log-format")
        .unwrap_or(&config.observability.log_format);
    init_logging(log_level, log_format)?;

    if config.observability.metrics_enabled {
        init_metrics(&config.observability.metrics_bind_address)?;
    }

    let command = parse_command(&matches)?;
    info!("Running command: {command:?}");

    let snapshot_path = matches.get_one::<String>("snapshot").map(PathBuf::from);
    let status_file = matches
        .get_one::<String>("status-file")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("status.json"));

    let app = Application::new(config, snapshot_path, status_file).await?;
    let shutdown_manager = ShutdownManager::new();
    let output = app.execute(command, &shutdown_manager).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cli() -> ClapCommand {
    let service_arg = || {
        Arg::new("service")
            .value_name("SERVICE_ID")
            .help("服务ID")
            .required(true)
    };
    let task_arg = || {
        Arg::new("task")
            .value_name("TASK_ID")
            .help("任务ID")
            .required(true)
    };

    ClapCommand::new("compute-scheduler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("去中心化计算任务的自适应调度与生命周期监控")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("配置文件路径"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .global(true)
                .help("日志格式")
                .value_parser(["json", "pretty"]),
        )
        .arg(
            Arg::new("snapshot")
                .short('s')
                .long("snapshot")
                .value_name("FILE")
                .global(true)
                .help("任务、历史与信誉数据快照 (JSON)"),
        )
        .arg(
            Arg::new("status-file")
                .long("status-file")
                .value_name("FILE")
                .global(true)
                .help("网络任务状态文件 (JSON)"),
        )
        .subcommand(
            ClapCommand::new("predict")
                .about("预测服务的任务完成时间")
                .arg(service_arg()),
        )
        .subcommand(
            ClapCommand::new("resources")
                .about("预测服务的资源需求")
                .arg(service_arg()),
        )
        .subcommand(
            ClapCommand::new("priority")
                .about("计算任务优先级")
                .arg(task_arg()),
        )
        .subcommand(ClapCommand::new("strategy").about("基于最近一小时负载的调度策略"))
        .subcommand(
            ClapCommand::new("compare")
                .about("加权预测与简单平均的对比")
                .arg(service_arg()),
        )
        .subcommand(ClapCommand::new("stats").about("任务监控统计"))
        .subcommand(
            ClapCommand::new("trigger")
                .about("立即检查单个运行中的任务")
                .arg(task_arg()),
        )
        .subcommand(
            ClapCommand::new("monitor")
                .about("周期性巡检运行中的任务")
                .arg(
                    Arg::new("once")
                        .long("once")
                        .action(ArgAction::SetTrue)
                        .help("只执行一次巡检"),
                ),
        )
}

fn parse_command(matches: &ArgMatches) -> Result<Command> {
    let required = |sub: &ArgMatches, name: &str| -> Result<String> {
        sub.get_one::<String>(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("缺少参数: {name}"))
    };

    match matches.subcommand() {
        Some(("predict", sub)) => Ok(Command::Predict {
            service_id: required(sub, "service")?,
        }),
        Some(("resources", sub)) => Ok(Command::Resources {
            service_id: required(sub, "service")?,
        }),
        Some(("priority", sub)) => Ok(Command::Priority {
            task_id: required(sub, "task")?,
        }),
        Some(("strategy", _)) => Ok(Command::Strategy),
        Some(("compare", sub)) => Ok(Command::Compare {
            service_id: required(sub, "service")?,
        }),
        Some(("stats", _)) => Ok(Command::Stats),
        Some(("trigger", sub)) => Ok(Command::Trigger {
            task_id: required(sub, "task")?,
        }),
        Some(("monitor", sub)) => Ok(Command::Monitor {
            once: sub.get_flag("once"),
        }),
        Some((other, _)) => Err(anyhow::anyhow!("不支持的命令: {other}")),
        None => Err(anyhow::anyhow!("未指定命令")),
    }
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .context("初始化JSON日志格式失败")?,
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
            .context("初始化Pretty日志格式失败")?,
        _ => return Err(anyhow::anyhow!("不支持的日志格式: {log_format}")),
    }

    Ok(())
}

/// 启动 Prometheus 指标导出
fn init_metrics(bind_address: &str) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("无效的指标监听地址: {bind_address}"))?;
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Prometheus 指标导出器启动失败")?;
    info!("Prometheus metrics exporter listening on {addr}");
    Ok(())
}
