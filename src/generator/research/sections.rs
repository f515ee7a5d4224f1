//! 逐章节更新阶段
//!
//! 各章节互相独立，按配置的并行度并发研究；产出按配置中的章节顺序
//! 拼接，与派发完成顺序无关。分步模式下单个章节内部是严格串行的
//! 三步调用链，任何一步失败只降级该步，不中断整条链。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;

use crate::cache::CacheKey;
use crate::generator::StageKeys;
use crate::generator::context::GeneratorContext;
use crate::generator::research::{
    cached_research, prompts, research_uncached, section_window, store_in_cache,
};
use crate::types::StageResult;

/// 研究所有配置的章节并拼接为章节阶段产出
pub async fn execute(context: &GeneratorContext) -> StageResult {
    let config = &context.config;
    let sections = &config.sections;

    if sections.is_empty() {
        eprintln!("⚠️ 未配置任何章节，跳过章节研究");
        return StageResult::new(StageKeys::SECTIONS, String::new(), true);
    }

    println!(
        "📝 开始研究 {} 个章节（并行度 {}）...",
        sections.len(),
        config.llm.max_parallels
    );

    let total = sections.len();
    let window = section_window(context);
    let completed = Arc::new(AtomicUsize::new(0));

    let tasks = sections.iter().map(|section| {
        let completed = Arc::clone(&completed);
        async move {
            let (text, success) = if context.config.chunked {
                research_section_chunked(context, section).await
            } else {
                research_section(context, section).await
            };

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            let percent = 20.0 + done as f64 * window / total as f64;
            context.progress.report(
                &format!("Section complete: {} ({}/{})", section, done, total),
                percent as u8,
            );
            (text, success)
        }
    });

    // buffered 保持输入顺序，章节产出与配置顺序一致
    let results: Vec<(String, bool)> = futures::stream::iter(tasks)
        .buffered(config.llm.max_parallels.max(1))
        .collect()
        .await;

    let success = results.iter().all(|(_, ok)| *ok);
    let combined = results
        .into_iter()
        .map(|(text, _)| text)
        .collect::<Vec<_>>()
        .join("\n\n");

    StageResult::new(StageKeys::SECTIONS, combined, success)
}

/// 单次调用研究一个章节（非分步模式）
async fn research_section(context: &GeneratorContext, section: &str) -> (String, bool) {
    let topic = &context.config.topic;
    println!("   🔍 研究章节: {}", section);

    let instructions = prompts::section_instructions(topic, section);
    match cached_research(context, section, None, instructions).await {
        Ok(text) => (text, true),
        Err(e) => {
            eprintln!("❌ 章节研究失败 ({}): {}", section, e);
            (
                format!(
                    "### {}\n\nAn error occurred while researching this section: {}",
                    section, e
                ),
                false,
            )
        }
    }
}

/// 分步调用链研究一个章节
///
/// 三步：原始推荐意见 → 新证据分析 → 综合出更新后的推荐意见。
/// 每步失败降级为该步的兜底文本后继续；只有三步全部成功的链整体
/// 结果才写入缓存。
async fn research_section_chunked(context: &GeneratorContext, section: &str) -> (String, bool) {
    let config = &context.config;
    let topic = &config.topic;
    let key = CacheKey::today(topic, section, Some("chunked"), config.mode);

    if let Some(text) = context.cache.get(&key).await {
        println!("   📦 使用缓存结果: {}", key.storage_key());
        return (text, true);
    }

    println!("   🔍 分步研究章节: {}", section);
    let mut chain_ok = true;

    // 第一步：原始指南中该章节的推荐意见
    let original = match research_uncached(
        context,
        prompts::original_recommendations_instructions(topic, section),
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            eprintln!("❌ 原始推荐意见提取失败 ({}): {}", section, e);
            chain_ok = false;
            format!(
                "1. \"No specific recommendations found for {}\" [Grade Unknown, Unknown date]",
                section
            )
        }
    };

    // 第二步：针对原始推荐意见分析新证据
    let evidence = match research_uncached(
        context,
        prompts::evidence_analysis_instructions(topic, section, &original),
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            eprintln!("❌ 新证据分析失败 ({}): {}", section, e);
            chain_ok = false;
            "### Evidence Analysis\nNo substantial new evidence was found that would change the original recommendations."
                .to_string()
        }
    };

    // 第三步：综合前两步产出生成更新后的推荐意见
    let updated = match research_uncached(
        context,
        prompts::synthesis_instructions(topic, section, &original, &evidence),
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            eprintln!("❌ 推荐意见综合失败 ({}): {}", section, e);
            chain_ok = false;
            format!(
                "No updates to {} recommendations could be generated based on current evidence.",
                section
            )
        }
    };

    let full = format!("### {}\n\n{}", section, updated);
    if chain_ok {
        store_in_cache(context, &key, &full).await;
    }
    (full, chain_ok)
}
