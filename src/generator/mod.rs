pub mod compose;
pub mod context;
pub mod extractors;
pub mod outlet;
pub mod progress;
pub mod research;
pub mod workflow;

/// Memory作用域常量
pub struct MemoryScope;

impl MemoryScope {
    /// 各研究阶段的StageResult
    pub const STAGES: &'static str = "stages";
    /// 装配完成的最终文档
    pub const DOCUMENTATION: &'static str = "documentation";
}

/// 阶段键常量
pub struct StageKeys;

impl StageKeys {
    pub const METADATA: &'static str = "metadata";
    pub const SECTIONS: &'static str = "sections";
    pub const NEW_RECOMMENDATIONS: &'static str = "new_recommendations";
    pub const CONCLUSION: &'static str = "conclusion";
    pub const CONTEXT_ADAPTATIONS: &'static str = "context_adaptations";

    /// 最终文档在DOCUMENTATION作用域下的键
    pub const DOCUMENT: &'static str = "guideline_update";
}
