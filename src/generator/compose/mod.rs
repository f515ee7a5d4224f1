//! 文档装配
//!
//! 纯确定性装配：相同的阶段产出永远装配出字节一致的文档。
//! 各阶段内嵌的参考文献块被剥离并统一收敛到文末的 References 章节。

use anyhow::{Result, anyhow};

use crate::generator::context::GeneratorContext;
use crate::generator::extractors::{
    combine_references, extract_headings, extract_numbered_headings, extract_numbered_references,
    heading_anchor, split_references, strip_references,
};
use crate::generator::{MemoryScope, StageKeys};
use crate::types::{Document, StageResult, TocEntry};

/// 章节对比部分的固定标题
pub const COMPARISON_LABEL: &str = "## 📋 Side-by-Side Comparison of Recommendations";
/// 全新推荐意见部分的固定标题
pub const NEW_RECOMMENDATIONS_LABEL: &str = "## 🆕 New Recommendations";
/// 结论部分的固定标题
pub const CONCLUSION_LABEL: &str = "## 📝 Conclusion and Implementation";
/// 场景适配部分的固定标题
pub const ADAPTATIONS_LABEL: &str = "## 🏥 Setting-Specific Adaptations";
/// 参考文献部分的固定标题
pub const REFERENCES_LABEL: &str = "## 📚 References";
/// 部分之间的分隔线
pub const SEPARATOR: &str = "---";
/// 全文都找不到参考文献时的占位文本
pub const REFERENCES_PLACEHOLDER: &str = "[References will be added here]";

/// 从共享存储读取各阶段产出并装配完整文档
pub async fn execute(context: &GeneratorContext) -> Result<Document> {
    println!("📄 装配完整指南文档...");

    let metadata = context
        .get_stage(StageKeys::METADATA)
        .await
        .ok_or_else(|| anyhow!("missing metadata stage result"))?;
    let sections = context
        .get_stage(StageKeys::SECTIONS)
        .await
        .ok_or_else(|| anyhow!("missing sections stage result"))?;
    let new_recommendations = context.get_stage(StageKeys::NEW_RECOMMENDATIONS).await;
    let conclusion = context.get_stage(StageKeys::CONCLUSION).await;
    let adaptations = context.get_stage(StageKeys::CONTEXT_ADAPTATIONS).await;

    let document = assemble(
        &metadata,
        &sections,
        new_recommendations.as_ref(),
        conclusion.as_ref(),
        adaptations.as_ref(),
    );

    context
        .store_to_memory(MemoryScope::DOCUMENTATION, StageKeys::DOCUMENT, &document)
        .await?;
    println!("✓ 文档装配完成 ({} 字符)", document.markdown.len());
    Ok(document)
}

/// 将各阶段产出装配为最终文档
///
/// 固定顺序：标题部分 → 目录 → 章节对比 → 新推荐（可选）→
/// 结论（可选）→ 场景适配（可选）→ 参考文献。空的可选阶段整体省略。
pub fn assemble(
    metadata: &StageResult,
    sections: &StageResult,
    new_recommendations: Option<&StageResult>,
    conclusion: Option<&StageResult>,
    adaptations: Option<&StageResult>,
) -> Document {
    let (title_section, metadata_references) = split_references(&metadata.text);
    let references = resolve_references(
        &title_section,
        &metadata_references,
        sections,
        new_recommendations,
        conclusion,
        adaptations,
    );

    let clean_sections = strip_references(&sections.text).trim().to_string();
    let clean_new = clean_optional(new_recommendations);
    let clean_conclusion = clean_optional(conclusion);
    let clean_adaptations = clean_optional(adaptations);

    let toc = build_table_of_contents(
        &clean_sections,
        &clean_new,
        &clean_conclusion,
        &clean_adaptations,
    );

    let mut document = String::new();
    document.push_str(title_section.trim());
    document.push_str("\n\n");
    document.push_str(SEPARATOR);
    document.push_str("\n\n");
    document.push_str(&toc);
    document.push_str("\n\n");
    document.push_str(SEPARATOR);
    document.push_str("\n\n");

    push_part(&mut document, COMPARISON_LABEL, &clean_sections);
    if !clean_new.is_empty() {
        push_part(&mut document, NEW_RECOMMENDATIONS_LABEL, &clean_new);
    }
    if !clean_conclusion.is_empty() {
        push_part(&mut document, CONCLUSION_LABEL, &clean_conclusion);
    }
    if !clean_adaptations.is_empty() {
        push_part(&mut document, ADAPTATIONS_LABEL, &clean_adaptations);
    }

    document.push_str(REFERENCES_LABEL);
    document.push_str("\n\n");
    document.push_str(references.trim());

    Document::new(document)
}

/// 追加一个带固定标题与分隔线的文档部分
fn push_part(document: &mut String, label: &str, body: &str) {
    document.push_str(label);
    document.push_str("\n\n");
    document.push_str(body);
    document.push_str("\n\n");
    document.push_str(SEPARATOR);
    document.push_str("\n\n");
}

/// 剥离可选阶段的内嵌参考文献块并修剪空白；缺席的阶段归一为空串
fn clean_optional(stage: Option<&StageResult>) -> String {
    stage
        .map(|s| strip_references(&s.text).trim().to_string())
        .unwrap_or_default()
}

/// 参考文献恢复链
///
/// 优先使用元数据内嵌的参考文献块；缺失时拼接去重其余各阶段的
/// 内嵌块；仍为空时对标题与章节正文做编号引用扫描；最后退化为
/// 占位文本。
fn resolve_references(
    title_section: &str,
    metadata_references: &str,
    sections: &StageResult,
    new_recommendations: Option<&StageResult>,
    conclusion: Option<&StageResult>,
    adaptations: Option<&StageResult>,
) -> String {
    if !metadata_references.trim().is_empty() {
        return metadata_references.trim().to_string();
    }

    let blocks: Vec<String> = [
        Some(sections),
        new_recommendations,
        conclusion,
        adaptations,
    ]
    .into_iter()
    .flatten()
    .map(StageResult::reference_block)
    .collect();
    let combined = combine_references(&blocks);
    if !combined.is_empty() {
        return combined;
    }

    let scanned =
        extract_numbered_references(&format!("{}\n{}", title_section, sections.text)).join("\n");
    if !scanned.is_empty() {
        return scanned;
    }

    REFERENCES_PLACEHOLDER.to_string()
}

/// 构建目录
///
/// 顶层条目固定编号，存在的可选部分依次递增；每个顶层条目下挂其
/// 正文中提取到的三级标题。场景适配的子标题带"N."前缀，入目录前
/// 剥掉编号。
fn build_table_of_contents(
    sections: &str,
    new_recommendations: &str,
    conclusion: &str,
    adaptations: &str,
) -> String {
    let mut toc = String::from("## Table of Contents\n\n");
    let mut number = 1;

    push_toc_part(
        &mut toc,
        &mut number,
        "Side-by-Side Comparison of Recommendations",
        toc_entries(extract_headings(sections)),
    );

    if !new_recommendations.is_empty() {
        push_toc_part(
            &mut toc,
            &mut number,
            "New Recommendations",
            toc_entries(extract_headings(new_recommendations)),
        );
    }
    if !conclusion.is_empty() {
        push_toc_part(
            &mut toc,
            &mut number,
            "Conclusion and Implementation",
            toc_entries(extract_headings(conclusion)),
        );
    }
    if !adaptations.is_empty() {
        push_toc_part(
            &mut toc,
            &mut number,
            "Setting-Specific Adaptations",
            toc_entries(extract_numbered_headings(adaptations)),
        );
    }

    toc.push_str(&format!("{}. [References](#references)\n", number));
    toc
}

fn toc_entries(headings: Vec<String>) -> Vec<TocEntry> {
    headings
        .into_iter()
        .map(|heading| {
            let anchor = heading_anchor(&heading);
            TocEntry { heading, anchor }
        })
        .collect()
}

fn push_toc_part(toc: &mut String, number: &mut usize, title: &str, entries: Vec<TocEntry>) {
    toc.push_str(&format!(
        "{}. [{}](#{})\n",
        number,
        title,
        heading_anchor(title)
    ));
    for entry in entries {
        toc.push_str(&format!("   - [{}](#{})\n", entry.heading, entry.anchor));
    }
    *number += 1;
}

#[cfg(test)]
mod tests;
