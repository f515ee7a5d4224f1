//! 医疗场景适配阶段（可选）

use crate::generator::StageKeys;
use crate::generator::context::GeneratorContext;
use crate::generator::extractors::recommendation_digest;
use crate::generator::research::{cached_research, prompts};
use crate::types::StageResult;

/// 基于章节产出的推荐意见摘要生成场景适配建议
pub async fn execute(context: &GeneratorContext, sections: &str) -> StageResult {
    let topic = &context.config.topic;
    println!("🏥 生成场景适配建议: {}", topic);

    let recommendations = recommendation_digest(sections);
    let instructions = prompts::adaptations_instructions(topic, &recommendations);

    match cached_research(context, StageKeys::CONTEXT_ADAPTATIONS, None, instructions).await {
        Ok(text) => StageResult::new(StageKeys::CONTEXT_ADAPTATIONS, text, true),
        Err(e) => {
            eprintln!("❌ 场景适配生成失败: {}", e);
            StageResult::new(
                StageKeys::CONTEXT_ADAPTATIONS,
                "## Contextual Adaptations\n\nNo setting-specific adaptations could be generated. Please check the logs for details."
                    .to_string(),
                false,
            )
        }
    }
}
