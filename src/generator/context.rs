use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::generator::MemoryScope;
use crate::generator::progress::ProgressHandle;
use crate::llm::Researcher;
use crate::memory::Memory;
use crate::types::StageResult;

#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Config,
    /// 外部研究能力，核心只依赖其契约
    pub researcher: Arc<dyn Researcher>,
    /// 研究结果缓存
    pub cache: Arc<CacheStore>,
    /// 阶段产出的共享存储
    pub memory: Arc<RwLock<Memory>>,
    /// 进度上报句柄
    pub progress: ProgressHandle,
}

impl GeneratorContext {
    /// 创建生成器上下文，研究实现由调用方注入（真实客户端、测试替身均可）
    pub async fn with_researcher(
        config: Config,
        researcher: Arc<dyn Researcher>,
        progress: ProgressHandle,
    ) -> Result<Self> {
        let cache = Arc::new(CacheStore::load(&config.cache).await);
        let memory = Arc::new(RwLock::new(Memory::new()));

        Ok(Self {
            config,
            researcher,
            cache,
            memory,
            progress,
        })
    }

    /// 存储数据到 Memory
    pub async fn store_to_memory<T>(&self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let mut memory = self.memory.write().await;
        memory.store(scope, key, data)
    }

    /// 从 Memory 获取数据
    pub async fn get_from_memory<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a> + Send + Sync,
    {
        let memory = self.memory.read().await;
        memory.get(scope, key)
    }

    /// 存储阶段产出
    pub async fn store_stage(&self, result: &StageResult) -> Result<()> {
        self.store_to_memory(MemoryScope::STAGES, &result.stage, result)
            .await
    }

    /// 获取阶段产出
    pub async fn get_stage(&self, stage: &str) -> Option<StageResult> {
        self.get_from_memory(MemoryScope::STAGES, stage).await
    }
}
