//! # Fleetlink CLI
//!
//! 多品牌机器人队列通信的命令行工具。
//!
//! ```bash
//! # 内置六品牌模拟队列演示
//! fleetlink-cli demo
//!
//! # 基于队列配置文件操作
//! fleetlink-cli status --config fleet.toml
//! fleetlink-cli send --config fleet.toml --name kuka-cell-1 --command "PTP X,Y,Z"
//! fleetlink-cli broadcast --config fleet.toml --command "STATUS?" --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleetlink_sdk::prelude::*;
use serde_json::json;
use tracing::warn;

mod config;

use config::FleetFile;

/// Fleetlink CLI - 机器人队列命令行工具
#[derive(Parser, Debug)]
#[command(name = "fleetlink-cli")]
#[command(about = "Command-line interface for multi-brand robot fleet communication", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行内置六品牌模拟队列演示
    Demo,

    /// 列出配置文件中的队列成员
    Status {
        /// 队列配置文件（TOML）
        #[arg(short, long)]
        config: PathBuf,
    },

    /// 向单台机器人发送命令
    Send {
        #[arg(short, long)]
        config: PathBuf,

        /// 目标成员名
        #[arg(short, long)]
        name: String,

        /// 命令文本（不透明字符串）
        #[arg(short = 'C', long)]
        command: String,
    },

    /// 向全队广播命令
    Broadcast {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short = 'C', long)]
        command: String,

        /// 以 JSON 输出报表
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    fleetlink_sdk::logging::init_with_filter("fleetlink=info,fleetlink_cli=info");

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo => run_demo(),
        Commands::Status { config } => run_status(&config),
        Commands::Send {
            config,
            name,
            command,
        } => run_send(&config, &name, &command),
        Commands::Broadcast {
            config,
            command,
            json,
        } => run_broadcast(&config, &command, json),
    }
}

/// 内置演示队列：六个品牌各一台模拟设备
fn build_demo_fleet() -> Result<FleetRegistry> {
    let registry = FleetRegistry::new();
    let members = [
        ("kuka-cell", Brand::Kuka, "192.168.1.10", 7000u16),
        ("abb-cell", Brand::Abb, "192.168.1.20", 9000),
        ("fanuc-cell", Brand::Fanuc, "192.168.1.30", 8000),
        ("cnc-lathe", Brand::Cnc, "192.168.1.40", 6000),
        ("robodk-sim", Brand::RoboDk, "192.168.1.50", 5000),
        ("dobot-bench", Brand::Dobot, "192.168.1.60", 5500),
    ];
    for (name, brand, host, port) in members {
        let conn = Connection::builder(host, port)
            .brand(brand)
            .label(name)
            .driver(SimDriver::new(brand).with_latency(Duration::from_millis(30)))
            .sink(Arc::new(TraceSink))
            .build()
            .with_context(|| format!("building demo member {name:?}"))?;
        registry.add(name, conn);
    }
    Ok(registry)
}

fn run_demo() -> Result<()> {
    let registry = Arc::new(build_demo_fleet()?);

    // Ctrl-C 时尽力断开再退出
    let teardown = registry.clone();
    ctrlc::set_handler(move || {
        teardown.disconnect_all();
        std::process::exit(130);
    })
    .context("installing Ctrl-C handler")?;

    connect_all(&registry);

    // 每个品牌一条典型命令
    let demo_commands = [
        ("kuka-cell", "PTP X,Y,Z"),
        ("abb-cell", "MoveJ A,B,C"),
        ("fanuc-cell", "J P[1]"),
        ("cnc-lathe", "G01 X10 Y10"),
        ("robodk-sim", "RunProgram Main"),
        ("dobot-bench", "MoveTo 100,200,300"),
    ];
    for (name, command) in demo_commands {
        match registry.send_command(name, command) {
            Ok(response) => println!("{name}: {response}"),
            Err(err) => eprintln!("{name}: {err}"),
        }
    }

    let report = registry.broadcast("STATUS?");
    print!("{report}");

    registry.disconnect_all();
    Ok(())
}

fn run_status(config: &PathBuf) -> Result<()> {
    let registry = FleetFile::load(config)?.build_registry()?;
    for (name, state) in registry.states() {
        let conn = registry.get(&name)?;
        println!(
            "{name}: {brand} {host}:{port} [{state}]",
            brand = conn.brand(),
            host = conn.host(),
            port = conn.port(),
        );
    }
    Ok(())
}

fn run_send(config: &PathBuf, name: &str, command: &str) -> Result<()> {
    let registry = FleetFile::load(config)?.build_registry()?;
    registry.connect(name)?;
    let response = registry.send_command(name, command)?;
    println!("{response}");
    registry.disconnect_all();
    Ok(())
}

fn run_broadcast(config: &PathBuf, command: &str, json: bool) -> Result<()> {
    let registry = FleetFile::load(config)?.build_registry()?;
    connect_all(&registry);

    let report = registry.broadcast(command);
    if json {
        println!("{}", serde_json::to_string_pretty(&report_to_json(&report))?);
    } else {
        print!("{report}");
    }

    registry.disconnect_all();
    Ok(())
}

/// 逐台建立会话；单台失败只告警，不中断整批
fn connect_all(registry: &FleetRegistry) {
    for name in registry.names() {
        if let Err(err) = registry.connect(&name) {
            warn!(%name, %err, "member failed to connect");
            eprintln!("{name}: {err}");
        }
    }
}

fn report_to_json(report: &BroadcastReport) -> serde_json::Value {
    let mut outcomes = serde_json::Map::new();
    for (name, outcome) in report.iter() {
        let value = match outcome {
            SendOutcome::Delivered(response) => json!({
                "result": "delivered",
                "response": response.as_str(),
            }),
            SendOutcome::Failed(error) => json!({
                "result": "failed",
                "kind": error.kind_label(),
                "error": error.to_string(),
            }),
            SendOutcome::Skipped(state) => json!({
                "result": "skipped",
                "state": state.label(),
            }),
        };
        outcomes.insert(name.to_string(), value);
    }
    json!({
        "command": report.command(),
        "outcomes": outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_fleet_builds_and_broadcasts() {
        let registry = build_demo_fleet().unwrap();
        assert_eq!(registry.len(), 6);

        connect_all(&registry);
        let report = registry.broadcast("STATUS?");
        assert_eq!(report.delivered(), 6);
        assert!(report.is_complete_success());
    }

    #[test]
    fn test_report_json_shape() {
        let registry = build_demo_fleet().unwrap();
        registry.connect("kuka-cell").unwrap();

        let report = registry.broadcast("STATUS?");
        let value = report_to_json(&report);
        assert_eq!(value["command"], "STATUS?");
        assert_eq!(value["outcomes"]["kuka-cell"]["result"], "delivered");
        assert_eq!(value["outcomes"]["abb-cell"]["result"], "skipped");
    }
}
