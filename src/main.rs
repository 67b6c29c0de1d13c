use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use deck_grader::models::{Assessment, EvaluationReport, Persona, PresentationBrief};
use deck_grader::utils::logging;
use deck_grader::{App, Config, EvaluationRequest};

/// 按评分标准或开放式点评评估 .pptx 演示文稿
#[derive(Parser, Debug)]
#[command(name = "deck-grader", version, about = "Evaluate a .pptx slide deck against a rubric")]
struct Cli {
    /// 演示文稿（.pptx）
    deck: PathBuf,

    /// 评分标准（.pdf），学校类受众必填
    #[arg(long)]
    rubric: Option<PathBuf>,

    /// 目标受众，例如 secondary、university、professional、general
    #[arg(long, default_value = "general", value_parser = parse_persona)]
    persona: Persona,

    #[arg(long)]
    theme: Option<String>,

    /// 演示类型
    #[arg(long)]
    kind: Option<String>,

    #[arg(long)]
    goal: Option<String>,

    /// TOML 配置文件，环境变量优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 以 JSON 输出完整报告
    #[arg(long)]
    json: bool,
}

fn parse_persona(value: &str) -> std::result::Result<Persona, String> {
    Persona::from_str(value).ok_or_else(|| format!("未知的受众: {}", value))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init(config.verbose_logging);

    let mut request = EvaluationRequest::new(cli.deck, cli.persona).with_brief(PresentationBrief {
        theme: cli.theme,
        kind: cli.kind,
        goal: cli.goal,
    });
    if let Some(rubric) = cli.rubric {
        request = request.with_rubric(rubric);
    }

    let app = App::initialize(&config)?;
    let report = match app.run(&request).await {
        Ok(report) => report,
        Err(e) => {
            error!("❌ {}", e);
            eprintln!("{}", e);
            return Ok(ExitCode::from(if e.is_rejection() { 2 } else { 1 }));
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("报告序列化失败")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &EvaluationReport) {
    match &report.assessment {
        Assessment::Rubric(result) => {
            match result.percentage() {
                Some(ratio) => println!(
                    "Score: {}/{} ({:.0}%)",
                    result.total_score,
                    result.max_score,
                    ratio * 100.0
                ),
                None => println!("Score: {}/{}", result.total_score, result.max_score),
            }
            println!("Grade: {}", result.grade);
        }
        Assessment::Open { .. } => println!("Score: not applicable"),
    }
    println!();
    for line in report.assessment.feedback() {
        println!("{}", line);
    }
    if let Some(table) = report.rubric.as_ref().and_then(|r| r.table.as_ref()) {
        println!();
        for row in table.rows() {
            println!("{}", row.join(" | "));
        }
    }
}
