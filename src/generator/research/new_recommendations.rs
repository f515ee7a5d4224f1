//! 全新推荐意见阶段（可选）
//!
//! 分步模式下先识别现行指南的缺口主题，再对每个主题并发研究新推荐
//! 意见；缺口识别本身失败时使用兜底缺口列表继续。

use futures::StreamExt;

use crate::cache::CacheKey;
use crate::generator::StageKeys;
use crate::generator::context::GeneratorContext;
use crate::generator::extractors::extract_gap_topics;
use crate::generator::research::{
    cached_research, prompts, research_uncached, store_in_cache,
};
use crate::types::StageResult;

/// 分步模式下整条调用链的缓存阶段名
const CHUNKED_STAGE: &str = "new_recs_chunked";

/// 研究现行指南未覆盖领域的全新推荐意见
pub async fn execute(context: &GeneratorContext) -> StageResult {
    let (text, success) = if context.config.chunked {
        research_chunked(context).await
    } else {
        research_direct(context).await
    };
    StageResult::new(StageKeys::NEW_RECOMMENDATIONS, text, success)
}

/// 单次调用生成全部新推荐（非分步模式）
async fn research_direct(context: &GeneratorContext) -> (String, bool) {
    let topic = &context.config.topic;
    println!("🆕 研究全新推荐意见: {}", topic);

    let instructions = prompts::new_recommendations_instructions(topic);
    match cached_research(context, StageKeys::NEW_RECOMMENDATIONS, None, instructions).await {
        Ok(text) => (text, true),
        Err(e) => {
            eprintln!("❌ 新推荐意见研究失败: {}", e);
            (
                "## New Recommendations\n\nAn error occurred while researching new recommendations. Please check the logs for details."
                    .to_string(),
                false,
            )
        }
    }
}

/// 分步模式：缺口识别 + 逐缺口并发研究
async fn research_chunked(context: &GeneratorContext) -> (String, bool) {
    let config = &context.config;
    let topic = &config.topic;
    let key = CacheKey::today(topic, CHUNKED_STAGE, None, config.mode);

    if let Some(text) = context.cache.get(&key).await {
        println!("   📦 使用缓存结果: {}", key.storage_key());
        return (text, true);
    }

    println!("🆕 分步研究全新推荐意见: {}", topic);
    let mut chain_ok = true;

    // 第一步：识别现行指南的缺口主题
    let gap_analysis =
        match research_uncached(context, prompts::gap_identification_instructions(topic)).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ 指南缺口识别失败: {}", e);
                chain_ok = false;
                "### Gap Areas in Current Guidelines\n\n1. **Implementation Guidance**\n   - Why this is a gap: Current guidelines lack specific implementation strategies\n   - Clinical importance: Clinicians need practical guidance for real-world application"
                    .to_string()
            }
        };

    let gap_topics = extract_gap_topics(&gap_analysis);
    println!("   识别到 {} 个缺口主题", gap_topics.len());

    // 第二步：逐缺口主题并发研究新推荐意见，产出顺序跟随识别顺序
    let tasks = gap_topics.iter().map(|gap| async move {
        match research_uncached(context, prompts::gap_research_instructions(topic, gap)).await {
            Ok(text) => (text, true),
            Err(e) => {
                eprintln!("❌ 缺口主题研究失败 ({}): {}", gap, e);
                (
                    format!(
                        "### {}\n\nInsufficient evidence is currently available to make formal recommendations in this area.",
                        gap
                    ),
                    false,
                )
            }
        }
    });
    let results: Vec<(String, bool)> = futures::stream::iter(tasks)
        .buffered(config.llm.max_parallels.max(1))
        .collect()
        .await;

    chain_ok = chain_ok && results.iter().all(|(_, ok)| *ok);
    let all = results
        .into_iter()
        .map(|(text, _)| text)
        .collect::<Vec<_>>()
        .join("\n\n");
    let full = format!("## New Recommendations\n\n{}", all);

    if chain_ok {
        store_in_cache(context, &key, &full).await;
    }
    (full, chain_ok)
}
