use crate::config::{Config, LLMProvider, ResearchMode};
use clap::Parser;
use std::path::PathBuf;

/// guideline-rs - 由Rust与AI深度研究驱动的医学指南更新引擎
#[derive(Parser, Debug)]
#[command(name = "guideline-rs")]
#[command(
    about = "AI-powered research and update engine for evidence-based medical guidelines. It researches the most recent authoritative guidelines for a clinical topic, mines practice-changing evidence, and assembles a complete guideline update document."
)]
#[command(author = "Sopaco")]
#[command(version)]
pub struct Args {
    /// 医学主题
    #[arg(short, long)]
    pub topic: Option<String>,

    /// 要研究的临床章节（可多次指定，按给定顺序输出）
    #[arg(short, long)]
    pub section: Vec<String>,

    /// 输出路径
    #[arg(short, long, default_value = "./guideline.out")]
    pub output_path: PathBuf,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 使用快速研究模式（更快但不如深度研究详尽）
    #[arg(long)]
    pub fast: bool,

    /// 禁用分步生成（单次调用生成整个章节，长章节可能被截断）
    #[arg(long)]
    pub no_chunked: bool,

    /// 跳过全新推荐意见研究
    #[arg(long)]
    pub skip_new_recommendations: bool,

    /// 跳过综合结论生成
    #[arg(long)]
    pub skip_conclusion: bool,

    /// 跳过医疗场景适配方案生成
    #[arg(long)]
    pub skip_adaptations: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (openai, deepseek, openrouter, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 快速研究模型
    #[arg(long)]
    pub model_fast: Option<String>,

    /// 深度研究模型
    #[arg(long)]
    pub model_thorough: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 独立子任务的最大并行数
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// 单次研究调用超时（秒）
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// 缓存目录
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// 是否禁用缓存
    #[arg(long)]
    pub no_cache: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|e| {
                panic!("⚠️ 警告: 无法读取配置文件 {:?}: {}", config_path, e)
            })
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."))
                .join("guideline.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|e| {
                    panic!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?}: {}",
                        default_config_path, e
                    )
                })
            } else {
                // 默认配置文件不存在，使用默认值
                Config::default()
            }
        };

        // 覆盖配置文件中的设置
        if let Some(topic) = self.topic {
            config.topic = topic;
        }
        if !self.section.is_empty() {
            config.sections = self.section;
        }
        config.output_path = self.output_path;

        if self.fast {
            config.mode = ResearchMode::Fast;
        }
        if self.no_chunked {
            config.chunked = false;
        }
        if self.skip_new_recommendations {
            config.include_new_recommendations = false;
        }
        if self.skip_conclusion {
            config.include_conclusion = false;
        }
        if self.skip_adaptations {
            config.include_context_adaptations = false;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_fast) = self.model_fast {
            config.llm.model_fast = model_fast;
        }
        if let Some(model_thorough) = self.model_thorough {
            config.llm.model_thorough = model_thorough;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.llm.max_parallels = max_parallels;
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.llm.timeout_seconds = timeout_seconds;
        }

        // 缓存配置
        if let Some(cache_dir) = self.cache_dir {
            config.cache.cache_dir = cache_dir;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }

        // 其他配置
        config.verbose = self.verbose;

        config
    }
}
