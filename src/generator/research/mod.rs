//! 研究阶段流水线
//!
//! 固定顺序推进各阶段：元数据（必选）→ 章节逐条更新（必选）→
//! 全新推荐意见（可选）→ 综合结论（可选）→ 场景适配（可选）。
//! 每个阶段独立地读透缓存、成功后写透；外部调用失败一律就地降级为
//! 阶段兜底文本，绝不向上传播为致命错误。

use anyhow::Result;

use crate::cache::CacheKey;
use crate::generator::context::GeneratorContext;
use crate::llm::ResearchRequest;

pub mod adaptations;
pub mod conclusion;
pub mod metadata;
pub mod new_recommendations;
pub mod prompts;
pub mod sections;

/// 执行研究阶段
pub async fn execute(context: &GeneratorContext) -> Result<()> {
    let pipeline = StagePipeline;
    pipeline.execute(context).await
}

/// 章节阶段占用的进度窗口（百分点）
pub(crate) fn section_window(context: &GeneratorContext) -> f64 {
    if context.config.include_context_adaptations {
        50.0
    } else {
        60.0
    }
}

/// 研究阶段编排器
#[derive(Default)]
pub struct StagePipeline;

impl StagePipeline {
    /// 按固定顺序执行所有研究阶段
    pub async fn execute(&self, context: &GeneratorContext) -> Result<()> {
        println!("🚀 开始执行指南更新研究流程...");
        let config = &context.config;

        // 元数据与执行摘要（必选）
        context.progress.report(
            "Researching guideline metadata and writing executive summary...",
            10,
        );
        let metadata = metadata::execute(context).await;
        context.store_stage(&metadata).await?;
        context.progress.report("Executive summary complete", 20);

        // 逐章节更新（必选），内部负责并行派发与进度上报
        let sections = sections::execute(context).await;
        context.store_stage(&sections).await?;

        // 可选阶段的进度分摊：剩余窗口在启用的阶段间均分，98%留给装配
        let mut current = 20.0 + section_window(context);
        let optional_count = [
            config.include_new_recommendations,
            config.include_conclusion,
            config.include_context_adaptations,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count();
        let per_component = if optional_count > 0 {
            (98.0 - current) / optional_count as f64
        } else {
            0.0
        };

        if config.include_new_recommendations {
            context
                .progress
                .report("Researching potential new recommendations...", current as u8);
            let result = new_recommendations::execute(context).await;
            context.store_stage(&result).await?;
            current += per_component;
            context
                .progress
                .report("New recommendations complete", current as u8);
        }

        if config.include_conclusion {
            context
                .progress
                .report("Creating comprehensive conclusion...", current as u8);
            let result = conclusion::execute(context, &metadata.text, &sections.text).await;
            context.store_stage(&result).await?;
            current += per_component;
            context.progress.report("Conclusion complete", current as u8);
        }

        if config.include_context_adaptations {
            context
                .progress
                .report("Generating setting-specific adaptations...", current as u8);
            let result = adaptations::execute(context, &sections.text).await;
            context.store_stage(&result).await?;
            current += per_component;
            context
                .progress
                .report("Setting-specific adaptations complete", current as u8);
        }

        println!("✓ 指南研究流程执行完毕");
        Ok(())
    }
}

/// 读透缓存的研究调用
///
/// 命中缓存时绝不触发外部调用；未命中则调用研究能力并在成功后写透。
/// 缓存键带当天日期与研究模式，换天或切换模式自然失效。
pub(crate) async fn cached_research(
    context: &GeneratorContext,
    stage: &str,
    sub: Option<&str>,
    instructions: String,
) -> Result<String> {
    let config = &context.config;
    let key = CacheKey::today(&config.topic, stage, sub, config.mode);

    if let Some(text) = context.cache.get(&key).await {
        println!("   📦 使用缓存结果: {}", key.storage_key());
        return Ok(text);
    }

    let text = research_uncached(context, instructions).await?;
    store_in_cache(context, &key, &text).await;
    Ok(text)
}

/// 不经缓存的研究调用（分步调用链的中间步骤，只缓存链的整体结果）
pub(crate) async fn research_uncached(
    context: &GeneratorContext,
    instructions: String,
) -> Result<String> {
    let request = ResearchRequest {
        topic: context.config.topic.clone(),
        instructions,
        mode: context.config.mode,
    };
    context.researcher.research(&request).await
}

/// 写透缓存。写入失败只记录日志，缓存失败退化为下次重新计算，不中断流水线
pub(crate) async fn store_in_cache(context: &GeneratorContext, key: &CacheKey, text: &str) {
    if let Err(e) = context.cache.put(key, text).await {
        eprintln!("⚠️ 缓存写入失败 ({}): {}", key.storage_key(), e);
    }
}
