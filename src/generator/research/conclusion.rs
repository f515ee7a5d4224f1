//! 综合结论阶段（可选）

use crate::generator::StageKeys;
use crate::generator::context::GeneratorContext;
use crate::generator::extractors::key_points_digest;
use crate::generator::research::{cached_research, prompts};
use crate::types::StageResult;

/// 基于元数据与章节产出的要点摘要生成综合结论
pub async fn execute(context: &GeneratorContext, metadata: &str, sections: &str) -> StageResult {
    let topic = &context.config.topic;
    println!("📝 生成综合结论: {}", topic);

    // 只向外部传递提炼后的要点摘要，避免指令超长
    let key_points = key_points_digest(metadata, sections);
    let instructions = prompts::conclusion_instructions(topic, &key_points);

    match cached_research(context, StageKeys::CONCLUSION, None, instructions).await {
        Ok(text) => StageResult::new(StageKeys::CONCLUSION, text, true),
        Err(e) => {
            eprintln!("❌ 结论生成失败: {}", e);
            StageResult::new(
                StageKeys::CONCLUSION,
                "## Conclusion\n\nThis concludes the updated guidelines. Implementation should be tailored to local contexts and resources."
                    .to_string(),
                false,
            )
        }
    }
}
