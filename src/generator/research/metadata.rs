//! 元数据与执行摘要阶段

use crate::generator::StageKeys;
use crate::generator::context::GeneratorContext;
use crate::generator::research::{cached_research, prompts};
use crate::types::StageResult;

/// 研究指南元数据、执行摘要与参考文献框架
///
/// 失败时降级为兜底文本，保证后续阶段和装配仍可进行。
pub async fn execute(context: &GeneratorContext) -> StageResult {
    let topic = &context.config.topic;
    println!("🔍 研究指南元数据与执行摘要: {}", topic);

    let instructions = prompts::metadata_instructions(topic);
    match cached_research(context, StageKeys::METADATA, None, instructions).await {
        Ok(text) => StageResult::new(StageKeys::METADATA, text, true),
        Err(e) => {
            eprintln!("❌ 元数据研究失败: {}", e);
            StageResult::new(
                StageKeys::METADATA,
                "# Guidelines Update\n\n## Failed to generate metadata.\n\nPlease check the logs for details."
                    .to_string(),
                false,
            )
        }
    }
}
