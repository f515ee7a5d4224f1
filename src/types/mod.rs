use serde::{Deserialize, Serialize};

use crate::generator::extractors::split_references;

/// 单个研究阶段的产出
///
/// 创建后不再修改。references为该阶段文本内嵌参考文献块的行列表，
/// 文档装配时据此兜底恢复参考文献。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// 阶段名
    pub stage: String,
    /// 阶段原始文本
    pub text: String,
    /// 内嵌参考文献块的行（按出现顺序）
    pub references: Vec<String>,
    /// 外部调用是否成功（false表示使用了兜底文本）
    pub success: bool,
}

impl StageResult {
    pub fn new(stage: &str, text: String, success: bool) -> Self {
        let (_, reference_block) = split_references(&text);
        let references = reference_block
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.to_string())
            .collect();

        Self {
            stage: stage.to_string(),
            text,
            references,
            success,
        }
    }

    /// 该阶段内嵌参考文献块（按行拼接）
    pub fn reference_block(&self) -> String {
        self.references.join("\n")
    }
}

/// 最终装配的指南更新文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub markdown: String,
}

impl Document {
    pub fn new(markdown: String) -> Self {
        Self { markdown }
    }
}

/// 目录条目，锚点由标题规范化得到
///
/// 已知限制：仅大小写或括号不同的两个标题会规范化出同一锚点，
/// 与源行为保持一致，不做消歧。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    pub heading: String,
    pub anchor: String,
}
