use super::*;

fn metadata_with_refs() -> StageResult {
    StageResult::new(
        StageKeys::METADATA,
        "# Sepsis Guidelines Update (2025)\n\n## Original Publication: March 2021 by SCCM | Current Update: April 2025\n\n### Executive Summary\nSummary text.\n\n## References\n1. Smith J, et al. Sepsis outcomes. 2023.\n2. Lee K, et al. Lactate clearance. 2024.".to_string(),
        true,
    )
}

fn metadata_without_refs() -> StageResult {
    StageResult::new(
        StageKeys::METADATA,
        "# Sepsis Guidelines Update (2025)\n\n### Executive Summary\nSummary text.".to_string(),
        true,
    )
}

fn sections_plain() -> StageResult {
    StageResult::new(
        StageKeys::SECTIONS,
        "### Diagnostic Approach\n\n| Original | Updated |\n|---|---|\n| old [Grade B] | new [Grade A] |".to_string(),
        true,
    )
}

fn position(document: &Document, needle: &str) -> usize {
    document
        .markdown
        .find(needle)
        .unwrap_or_else(|| panic!("missing part: {}", needle))
}

#[test]
fn test_assemble_fixed_part_order_with_all_optionals() {
    let new_recs = StageResult::new(
        StageKeys::NEW_RECOMMENDATIONS,
        "## New Recommendations\n\n### Telemedicine Follow-Up\n\n1. **\"Use remote monitoring\"** [Suggested Grade: B]".to_string(),
        true,
    );
    let conclusion = StageResult::new(
        StageKeys::CONCLUSION,
        "## Conclusion and Implementation\n\n### Summary of Key Changes\nChanges.".to_string(),
        true,
    );
    let adaptations = StageResult::new(
        StageKeys::CONTEXT_ADAPTATIONS,
        "## Contextual Adaptations\n\n### 1. Resource-Limited Settings\nAdapt.".to_string(),
        true,
    );

    let document = assemble(
        &metadata_with_refs(),
        &sections_plain(),
        Some(&new_recs),
        Some(&conclusion),
        Some(&adaptations),
    );

    let comparison = position(&document, COMPARISON_LABEL);
    let new_recs_pos = position(&document, NEW_RECOMMENDATIONS_LABEL);
    let conclusion_pos = position(&document, CONCLUSION_LABEL);
    let adaptations_pos = position(&document, ADAPTATIONS_LABEL);
    let references = position(&document, REFERENCES_LABEL);

    assert!(comparison < new_recs_pos);
    assert!(new_recs_pos < conclusion_pos);
    assert!(conclusion_pos < adaptations_pos);
    assert!(adaptations_pos < references);
    // 标题部分在最前
    assert!(document.markdown.starts_with("# Sepsis Guidelines Update"));
    // 目录顶层条目全部编号
    assert!(document.markdown.contains(
        "1. [Side-by-Side Comparison of Recommendations](#side-by-side-comparison-of-recommendations)"
    ));
    assert!(
        document
            .markdown
            .contains("2. [New Recommendations](#new-recommendations)")
    );
    assert!(
        document
            .markdown
            .contains("3. [Conclusion and Implementation](#conclusion-and-implementation)")
    );
    assert!(
        document
            .markdown
            .contains("4. [Setting-Specific Adaptations](#setting-specific-adaptations)")
    );
    assert!(document.markdown.contains("5. [References](#references)"));
}

#[test]
fn test_assemble_omits_absent_optionals_and_renumbers_toc() {
    let document = assemble(&metadata_with_refs(), &sections_plain(), None, None, None);

    assert!(!document.markdown.contains(NEW_RECOMMENDATIONS_LABEL));
    assert!(!document.markdown.contains(CONCLUSION_LABEL));
    assert!(!document.markdown.contains(ADAPTATIONS_LABEL));
    // References紧随对比部分，编号顺延
    assert!(document.markdown.contains("2. [References](#references)"));
    let comparison = position(&document, COMPARISON_LABEL);
    let references = position(&document, REFERENCES_LABEL);
    assert!(comparison < references);
}

#[test]
fn test_assemble_metadata_references_take_precedence() {
    let sections = StageResult::new(
        StageKeys::SECTIONS,
        "### Diagnostic Approach\nBody.\n\n### References\n1. Section-only ref. 2024.".to_string(),
        true,
    );
    let document = assemble(&metadata_with_refs(), &sections, None, None, None);

    assert!(document.markdown.contains("1. Smith J, et al."));
    // 章节内嵌的引用块被剥离，不应再出现
    assert!(!document.markdown.contains("Section-only ref"));
}

#[test]
fn test_assemble_falls_back_to_stage_reference_blocks_deduped() {
    let sections = StageResult::new(
        StageKeys::SECTIONS,
        "### Diagnostic Approach\nBody.\n\n### References\n1. Shared ref. 2024.\n2. Section ref. 2023.".to_string(),
        true,
    );
    let conclusion = StageResult::new(
        StageKeys::CONCLUSION,
        "## Conclusion\nDone.\n\n### References\n1. Shared ref. 2024.\n3. Conclusion ref. 2025.".to_string(),
        true,
    );
    let document = assemble(
        &metadata_without_refs(),
        &sections,
        None,
        Some(&conclusion),
        None,
    );

    assert_eq!(document.markdown.matches("1. Shared ref. 2024.").count(), 1);
    assert!(document.markdown.contains("2. Section ref. 2023."));
    assert!(document.markdown.contains("3. Conclusion ref. 2025."));
    // 内嵌块从结论正文中剥离，只留在文末References部分
    let references = position(&document, REFERENCES_LABEL);
    assert!(position(&document, "3. Conclusion ref. 2025.") > references);
}

#[test]
fn test_assemble_numbered_reference_scan_fallback() {
    let metadata = StageResult::new(
        StageKeys::METADATA,
        "# Guidelines Update\n\nInline citations follow.\n1. Scanned citation. 2024.".to_string(),
        true,
    );
    let document = assemble(&metadata, &sections_plain(), None, None, None);

    let references = position(&document, REFERENCES_LABEL);
    let citation = position(&document, "1. Scanned citation. 2024.");
    // 扫描到的编号引用出现在标题部分和References部分两处
    assert!(document.markdown[references..].contains("1. Scanned citation. 2024."));
    assert!(citation < references);
}

#[test]
fn test_assemble_references_placeholder_when_nothing_found() {
    let document = assemble(
        &metadata_without_refs(),
        &sections_plain(),
        None,
        None,
        None,
    );
    assert!(document.markdown.ends_with(REFERENCES_PLACEHOLDER));
}

#[test]
fn test_toc_anchors_drop_parentheses() {
    let sections = StageResult::new(
        StageKeys::SECTIONS,
        "### Diagnostic Approach (Adults)\nBody.".to_string(),
        true,
    );
    let document = assemble(&metadata_with_refs(), &sections, None, None, None);
    assert!(
        document
            .markdown
            .contains("   - [Diagnostic Approach (Adults)](#diagnostic-approach-adults)")
    );
}

#[test]
fn test_toc_adaptation_subentries_strip_numbering() {
    let adaptations = StageResult::new(
        StageKeys::CONTEXT_ADAPTATIONS,
        "## Contextual Adaptations\n\n### 1. Resource-Limited Settings\nA.\n\n### 2. Primary Care Settings\nB.".to_string(),
        true,
    );
    let document = assemble(
        &metadata_with_refs(),
        &sections_plain(),
        None,
        None,
        Some(&adaptations),
    );
    assert!(
        document
            .markdown
            .contains("   - [Resource-Limited Settings](#resource-limited-settings)")
    );
    assert!(
        document
            .markdown
            .contains("   - [Primary Care Settings](#primary-care-settings)")
    );
}

#[test]
fn test_assemble_is_deterministic() {
    let new_recs = StageResult::new(
        StageKeys::NEW_RECOMMENDATIONS,
        "## New Recommendations\n\n### Wearables\nUse them.".to_string(),
        true,
    );
    let first = assemble(
        &metadata_with_refs(),
        &sections_plain(),
        Some(&new_recs),
        None,
        None,
    );
    let second = assemble(
        &metadata_with_refs(),
        &sections_plain(),
        Some(&new_recs),
        None,
        None,
    );
    assert_eq!(first, second);
}
