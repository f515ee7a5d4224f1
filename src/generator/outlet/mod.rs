//! 文档存储
//!
//! 将装配完成的文档从共享存储落盘到配置的输出目录。

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use regex::Regex;
use tokio::fs;

use crate::generator::context::GeneratorContext;
use crate::generator::{MemoryScope, StageKeys};
use crate::types::Document;

static UNSAFE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w.\-]").unwrap());

/// 保存文档
pub async fn save(context: &GeneratorContext) -> Result<()> {
    let outlet = DiskOutlet;
    outlet.save(context).await
}

#[async_trait]
pub trait Outlet {
    async fn save(&self, context: &GeneratorContext) -> Result<()>;
}

pub struct DiskOutlet;

impl DiskOutlet {
    /// 文档输出路径：{output_path}/{清洗后主题}_guideline_update.md
    fn output_file(context: &GeneratorContext) -> PathBuf {
        let filename = format!(
            "{}_guideline_update.md",
            sanitize_topic(&context.config.topic)
        );
        context.config.output_path.join(filename)
    }
}

#[async_trait]
impl Outlet for DiskOutlet {
    async fn save(&self, context: &GeneratorContext) -> Result<()> {
        println!("\n🖊️ 文档存储中...");

        let document: Document = context
            .get_from_memory(MemoryScope::DOCUMENTATION, StageKeys::DOCUMENT)
            .await
            .ok_or_else(|| anyhow!("no assembled document in memory"))?;

        let path = Self::output_file(context);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &document.markdown).await?;

        println!("✓ 文档已保存: {}", path.display());
        Ok(())
    }
}

/// 主题转安全文件名片段：字母数字、下划线、点、连字符之外的字符一律替换为下划线
pub fn sanitize_topic(topic: &str) -> String {
    UNSAFE_FILENAME_RE.replace_all(topic, "_").to_string()
}
