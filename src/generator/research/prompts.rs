//! 各研究阶段的任务指令构造
//!
//! 指令中的输出格式锚点（"## Original Publication: ..."、"### {section}"、
//! "## References" 等）被提取器和装配器依赖，修改时需同步调整。

/// 元数据与执行摘要
pub fn metadata_instructions(topic: &str) -> String {
    format!(
        r#"# Guideline Research Task: {topic} - Metadata and Executive Summary

## Task Overview
1. Identify the most recent authoritative {topic} guidelines from major medical societies, including the publishing organization(s), exact publication date (month/year), primary authors/committee, and the evidence grading methodology used.
2. Write a comprehensive executive summary (4-5 paragraphs) covering the clinical significance of {topic}, 5-7 major areas where significant new evidence has emerged since the original guidelines, specific practice-changing studies with precise statistics, and areas of continued debate.
3. Build a references framework: 5-10 citations to the original guidelines and foundation documents, plus 15-20 high-impact studies published AFTER the original guidelines, with outcome measures and statistical significance.

## Output Format
# {topic} Guidelines Update (2025)

## Original Publication: [Month YEAR] by [ORGANIZATION] | Current Update: April 2025

### Executive Summary
[4-5 detailed paragraphs with specific study mentions and statistics]

## Evidence Framework and Key Updates
[Numbered areas of practice with original approach, new evidence, and clinical implication]

## References
[Numbered citations in standard academic format]"#
    )
}

/// 单次调用生成整个章节（非分步模式）
pub fn section_instructions(topic: &str, section: &str) -> String {
    format!(
        r#"# Guideline Section Research Task: {topic} - {section} Section

## Critical Research Objectives
1. Identify exactly what the most recent authoritative guidelines recommend for {section}, including evidence grades and acknowledged limitations.
2. Research Level 1 evidence published AFTER the original guidelines specifically about {section}: systematic reviews, meta-analyses, large multi-center RCTs, with statistical detail (p-values, confidence intervals).
3. Create a side-by-side comparison of original vs. updated recommendations, with ALL changes in bold and a precise evidence-linked rationale for every modification, graded with the original guideline methodology.

## Output Format
### {section}

| Original Recommendation (YEAR) | Updated Recommendation (2025) |
|--------------------------------|--------------------------------|
| Original text [Grade X] | Updated text with **bold changes** [Grade Y] |

#### Rationale for Changes
1. **[Key change #1]**: Evidence, analysis and implementation considerations
2. **[Key change #2]**: [Same format]

#### Special Considerations
- [Patient subgroups, implementation challenges, resource implications]"#
    )
}

/// 分步链第一步：提取原始指南中该章节的推荐意见
pub fn original_recommendations_instructions(topic: &str, section: &str) -> String {
    format!(
        r#"# Research Task: Original {topic} Guidelines for {section}

Research and identify the exact recommendations from the most authoritative and recent guidelines on {topic}, focusing ONLY on the {section} aspect. Include the exact wording, evidence grade, and year published for EVERY recommendation in this section.

## Output Format
Format as a numbered list:
1. "Recommendation text exactly as written in guidelines" [Grade B, 2019]
2. "Second recommendation text" [Grade A, 2019]"#
    )
}

/// 分步链第二步：针对第一步产出的每条推荐意见分析新证据
pub fn evidence_analysis_instructions(
    topic: &str,
    section: &str,
    original_recommendations: &str,
) -> String {
    format!(
        r#"# Research Task: New Evidence Analysis for {topic} - {section}

## Original Recommendations
{original_recommendations}

## Task Description
For EACH original recommendation above, find 2-3 high-quality studies published AFTER the original guideline (systematic reviews, meta-analyses, large RCTs) that support, contradict, or refine it, with new statistical data. Analyze whether the evidence would strengthen or weaken the recommendation, change its grade, or expand it to new populations.

## Output Format
### Evidence for Recommendation 1
- **Study 1**: [Citation] - Sample size, design, key findings with statistics
  - Impact: How this would change the recommendation
### Evidence for Recommendation 2
[Same format]"#
    )
}

/// 分步链第三步：综合前两步产出生成更新后的推荐意见
pub fn synthesis_instructions(
    topic: &str,
    section: &str,
    original_recommendations: &str,
    evidence_analysis: &str,
) -> String {
    format!(
        r#"# Task: Generate Updated Recommendations for {topic} - {section}

## Original Recommendations
{original_recommendations}

## Evidence Analysis
{evidence_analysis}

## Task Description
Based on the original recommendations and new evidence analysis, create a side-by-side comparison of original vs. updated recommendations. BOLD all changes, update evidence grades where warranted, and tie every change to specific evidence. Consider real clinical implications rather than minor wording changes.

## Output Format
| Original Recommendation | Updated Recommendation |
|-------------------------|------------------------|
| Original text [Grade X] | Updated text with **bold changes** [Grade Y] |

#### Rationale for Changes
1. **First change**: Evidence and reasoning
2. **Second change**: Evidence and reasoning"#
    )
}

/// 单次调用生成全新推荐意见（非分步模式）
pub fn new_recommendations_instructions(topic: &str) -> String {
    format!(
        r#"# Guideline Research Task: {topic} - Completely New Recommendations

Develop 4-6 entirely new recommendations for {topic} guidelines that were NOT addressed in previous guidelines: areas where clinicians lack guidance, new technologies or approaches, unaddressed patient populations, or practice that has evolved without formal guidance. Ground each recommendation in specific studies with statistics, assign evidence grades using the original guideline methodology, and provide implementation guidance.

## Output Format
## New Recommendations

### [Category 1 - e.g., Prevention, Diagnosis, etc.]

1. **"[New recommendation exact text]"** [Suggested Grade: X]
    - **Rationale**: [At least 3 supporting studies with sample sizes and statistics]
    - **Implementation Considerations**: [Practical guidance for clinicians]
    - **Special Populations**: [Modifications for specific patient groups]

### [Category 2 - Different aspect]
[Same format, continue for all new recommendations]"#
    )
}

/// 分步新推荐第一步：识别现行指南的缺口
pub fn gap_identification_instructions(topic: &str) -> String {
    format!(
        r#"# Research Task: Identify Gaps in Current {topic} Guidelines

Identify 3-5 specific clinical areas related to {topic} that are NOT adequately addressed in current guidelines but where clinicians need guidance: areas with no specific recommendations, evidence that emerged after publication, significantly evolved practice, new technologies, or inadequately addressed special populations.

## Output Format
### Gap Areas in Current Guidelines

1. **[Gap Area 1]**
    - Why this is a gap: [Explanation]
    - Clinical importance: [Why clinicians need guidance here]

2. **[Gap Area 2]**
    [Same format, continue for all identified gaps]"#
    )
}

/// 分步新推荐第二步：针对单个缺口主题研究新推荐意见
pub fn gap_research_instructions(topic: &str, gap_area: &str) -> String {
    format!(
        r#"# Research Task: Develop New {topic} Recommendations for {gap_area}

Create 1-2 new evidence-based recommendations for {topic} addressing the gap area of {gap_area}. Each recommendation must address a specific clinical scenario, rest on the best available evidence, carry an evidence grade, and include implementation guidance.

## Output Format
### {gap_area}

1. **"[Exact recommendation text]"** [Suggested Grade: X]
    - **Rationale**: [Evidence-based justification with 2-3 key studies]
    - **Implementation**: [Practical guidance for clinicians]
    - **Special Considerations**: [Important caveats or subpopulations]"#
    )
}

/// 综合结论，嵌入由元数据与章节汇总提炼的要点摘要
pub fn conclusion_instructions(topic: &str, key_points: &str) -> String {
    format!(
        r#"# Task: Create Comprehensive Conclusion for {topic} Guidelines

## Key Points from Previous Sections
{key_points}

## Task Description
Create a comprehensive conclusion section that integrates all guideline updates: a summary of the 5-7 most significant changes and their expected impact on outcomes, a phased implementation strategy with quality metrics, 3-5 future research priorities with suggested study designs, and a review schedule with triggers for earlier review.

## Output Format
## Conclusion and Implementation

### Summary of Key Changes
### Implementation Strategy
### Future Research Priorities
### Review Schedule"#
    )
}

/// 医疗场景适配，嵌入由章节汇总提炼的推荐意见摘要
pub fn adaptations_instructions(topic: &str, recommendations: &str) -> String {
    format!(
        r#"# Task: Generate Setting-Specific Adaptations for {topic} Guidelines

## Guidelines Overview
{recommendations}

## Task Description
Create practical adaptations of these guidelines for three healthcare settings: resource-limited settings, primary care settings, and specialty care settings. For each setting cover resource considerations, implementation priorities (what to prioritize, modify, or delay), and setting-specific guidance including training needs and referral thresholds.

## Output Format
## Contextual Adaptations

### 1. Resource-Limited Settings

#### Key Adaptations
- [3-5 key modifications for this setting]

#### Priority Recommendations
| Recommendation | Adaptation | Resource Requirements |
|----------------|------------|------------------------|

#### Implementation Guidance
- [Implementation tips, training considerations, quality metrics]

### 2. Primary Care Settings
[Follow same format as above]

### 3. Specialty Care Settings
[Follow same format as above]"#
    )
}
