//! 研究客户端 - 提供统一的深度研究服务接口

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::config::{LLMConfig, ResearchMode};

mod providers;

use providers::ProviderClient;

/// 研究Agent的固定系统提示词
const SYSTEM_PROMPT: &str = "You are an expert medical guideline researcher and analyst. \
Respond in well-structured Markdown.";

/// 一次结构化研究请求
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    /// 医学主题
    pub topic: String,
    /// 任务指令（完整的研究prompt）
    pub instructions: String,
    /// 研究模式，决定使用的模型
    pub mode: ResearchMode,
}

/// 外部研究能力的契约
///
/// 核心流水线只依赖这个接口：同一个逻辑请求最终返回文本或失败。
/// 模式是不透明的质量/时延旋钮，不对模型内部行为做任何假设。
#[async_trait]
pub trait Researcher: Send + Sync {
    async fn research(&self, request: &ResearchRequest) -> Result<String>;
}

/// 研究客户端 - 基于LLM provider实现Researcher契约
#[derive(Clone)]
pub struct ResearchClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl ResearchClient {
    /// 创建新的研究客户端
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(config)?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        let probe = ResearchRequest {
            topic: "connection check".to_string(),
            instructions: "Reply with a single word.".to_string(),
            mode: ResearchMode::Fast,
        };
        match self.research(&probe).await {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    /// 通用重试逻辑，用于处理异步操作的重试机制
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let max_retries = self.config.retry_attempts;
        let retry_delay_ms = self.config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    eprintln!(
                        "❌ 调用研究模型出错，重试中 (第 {} / {}次尝试): {}",
                        retries, max_retries, err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl Researcher for ResearchClient {
    async fn research(&self, request: &ResearchRequest) -> Result<String> {
        let model = self.config.model_for(request.mode);
        let agent = self.client.create_agent(model, SYSTEM_PROMPT, &self.config);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        self.retry_with_backoff(|| async {
            // 任何外部调用都有超时上界，超时按失败处理
            let content = tokio::time::timeout(timeout, agent.prompt(&request.instructions))
                .await
                .map_err(|_| {
                    anyhow!(
                        "research call timed out after {}s (model {})",
                        timeout.as_secs(),
                        model
                    )
                })??;

            if content.trim().is_empty() {
                return Err(anyhow!("research model returned empty content"));
            }
            Ok(content)
        })
        .await
    }
}
