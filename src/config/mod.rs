use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    /// OpenAI兼容接口，Perplexity等深度研究服务通过api_base_url接入
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 研究模式：快速（sonar-pro类）或深度（sonar-deep-research类）
///
/// 传递给研究模型的不透明质量/时延旋钮，同时参与缓存键，
/// 避免快速与深度研究的结果互相污染。
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResearchMode {
    #[serde(rename = "fast")]
    Fast,
    #[serde(rename = "thorough")]
    #[default]
    Thorough,
}

impl std::fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResearchMode::Fast => write!(f, "fast"),
            ResearchMode::Thorough => write!(f, "thorough"),
        }
    }
}

impl std::str::FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(ResearchMode::Fast),
            "thorough" | "deep" => Ok(ResearchMode::Thorough),
            _ => Err(format!("Unknown research mode: {}", s)),
        }
    }
}

/// 流水线前置条件错误，这是唯一会阻止流水线启动的致命错误
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    #[error("research topic must not be empty")]
    EmptyTopic,

    #[error("missing API key for provider '{0}' (set PERPLEXITY_API_KEY / LLM_API_KEY or pass --llm-api-key)")]
    MissingApiKey(LLMProvider),
}

/// 应用程序配置
///
/// 所有字段都有默认值，配置文件可以只覆盖关心的部分
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 医学主题，例如 "fever evaluation in critically ill patients"
    pub topic: String,

    /// 要研究的临床章节，按调用方给定顺序输出
    pub sections: Vec<String>,

    /// 研究模式
    pub mode: ResearchMode,

    /// 是否对长章节使用分步生成（三段式调用链，避免单次响应截断）
    pub chunked: bool,

    /// 是否研究全新推荐意见
    pub include_new_recommendations: bool,

    /// 是否生成综合结论
    pub include_conclusion: bool,

    /// 是否生成不同医疗场景的适配方案
    pub include_context_adaptations: bool,

    /// 输出目录
    pub output_path: PathBuf,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 缓存配置
    pub cache: CacheConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 快速研究模型
    pub model_fast: String,

    /// 深度研究模型
    pub model_thorough: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 单次研究调用超时（秒），超时按调用失败处理
    pub timeout_seconds: u64,

    /// 独立子任务（章节、缺口主题）的最大并行数
    pub max_parallels: usize,
}

/// 缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存目录
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: "fever evaluation in critically ill patients".to_string(),
            sections: vec![
                "Temperature Measurement".to_string(),
                "Diagnostic Approach".to_string(),
                "Microbiological Evaluation".to_string(),
                "Imaging Studies".to_string(),
            ],
            mode: ResearchMode::Thorough,
            chunked: true,
            include_new_recommendations: true,
            include_conclusion: true,
            include_context_adaptations: true,
            output_path: PathBuf::from("./guideline.out"),
            verbose: false,
            llm: LLMConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        let api_key = std::env::var("PERPLEXITY_API_KEY")
            .or_else(|_| std::env::var("LLM_API_KEY"))
            .unwrap_or_default();

        Self {
            provider: LLMProvider::OpenAI,
            api_key,
            api_base_url: "https://api.perplexity.ai".to_string(),
            model_fast: "sonar-pro".to_string(),
            model_thorough: "sonar-deep-research".to_string(),
            max_tokens: 16384,
            temperature: 0.2,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            timeout_seconds: 600,
            max_parallels: 2,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: PathBuf::from("./.guideline/cache"),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 校验前置条件。缺失条件会在任何阶段执行之前拒绝启动
    pub fn validate(&self) -> Result<(), PreconditionError> {
        if self.topic.trim().is_empty() {
            return Err(PreconditionError::EmptyTopic);
        }

        // 本地Ollama不需要API key
        if self.llm.provider != LLMProvider::Ollama && self.llm.api_key.trim().is_empty() {
            return Err(PreconditionError::MissingApiKey(self.llm.provider.clone()));
        }

        Ok(())
    }

}

impl LLMConfig {
    /// 根据研究模式选择模型
    pub fn model_for(&self, mode: ResearchMode) -> &str {
        match mode {
            ResearchMode::Fast => &self.model_fast,
            ResearchMode::Thorough => &self.model_thorough,
        }
    }
}
