//! 指南更新生成工作流

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::llm::ResearchClient;
use crate::types::Document;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<String, Instant>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        self.phase_durations
            .push((phase_name.to_string(), duration));
        Some(duration)
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.start_time.elapsed().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const DOCUMENT_GENERATION: &'static str = "document_generation";
    pub const OUTPUT: &'static str = "output";
}

/// 启动指南更新生成工作流
pub async fn launch(config: &Config) -> Result<()> {
    config.validate()?;

    let client = ResearchClient::new(&config.llm)?;
    // 启动时检查模型连接
    client.check_connection().await?;

    let context = GeneratorContext::with_researcher(
        config.clone(),
        Arc::new(client),
        crate::generator::progress::ProgressHandle::stdout(),
    )
    .await?;

    let mut timing = TimingScope::new();

    timing.start_phase(TimingKeys::DOCUMENT_GENERATION);
    run(&context).await?;
    timing.end_phase(TimingKeys::DOCUMENT_GENERATION);

    timing.start_phase(TimingKeys::OUTPUT);
    crate::generator::outlet::save(&context).await?;
    timing.end_phase(TimingKeys::OUTPUT);

    if config.verbose {
        println!("\n{}", timing.generate_timing_report());
    }

    Ok(())
}

/// 执行核心生成流程（研究 + 装配），不触达磁盘输出
///
/// 嵌入与测试场景的入口，研究实现由上下文注入。
pub async fn run(context: &GeneratorContext) -> Result<Document> {
    context.config.validate()?;

    crate::generator::research::execute(context).await?;

    context
        .progress
        .report("Assembling complete guidelines document...", 98);
    let document = crate::generator::compose::execute(context).await?;
    context.progress.report("Guidelines update complete", 100);

    Ok(document)
}
