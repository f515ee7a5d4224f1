use anyhow::{Context, Result};
use chrono::Local;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;

use crate::config::{CacheConfig, ResearchMode};

/// 缓存文件名，存放在缓存目录下的扁平JSON映射
const CACHE_FILE: &str = "research_cache.json";

/// 研究结果缓存键
///
/// 由主题、阶段标识、可选子标识（章节名或缺口主题）、日期与研究模式组成。
/// 键按天与模式自然轮换，因此不需要显式的过期清理。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub topic: String,
    pub stage: String,
    pub sub: Option<String>,
    pub date: String,
    pub mode: ResearchMode,
}

impl CacheKey {
    pub fn new(
        topic: &str,
        stage: &str,
        sub: Option<&str>,
        date: &str,
        mode: ResearchMode,
    ) -> Self {
        Self {
            topic: topic.to_string(),
            stage: stage.to_string(),
            sub: sub.map(|s| s.to_string()),
            date: date.to_string(),
            mode,
        }
    }

    /// 以当天日期构建缓存键
    pub fn today(topic: &str, stage: &str, sub: Option<&str>, mode: ResearchMode) -> Self {
        let date = Local::now().format("%Y-%m-%d").to_string();
        Self::new(topic, stage, sub, &date, mode)
    }

    /// 缓存键的持久化字符串形式
    pub fn storage_key(&self) -> String {
        match &self.sub {
            Some(sub) => format!(
                "{}_{}_{}_{}_{}",
                self.topic, self.stage, sub, self.date, self.mode
            ),
            None => format!("{}_{}_{}_{}", self.topic, self.stage, self.date, self.mode),
        }
    }
}

/// 研究结果缓存
///
/// 键到原始文本的读透/写透存储。`get`绝不触发外部调用；`put`失败由调用方
/// 记录日志后吞掉，缓存写入失败只意味着下次重新计算，绝不中断流水线。
pub struct CacheStore {
    enabled: bool,
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl CacheStore {
    /// 从磁盘加载缓存。损坏或不可读的缓存文件按空缓存处理，不是致命错误
    pub async fn load(config: &CacheConfig) -> Self {
        let path = config.cache_dir.join(CACHE_FILE);

        let entries = if config.enabled && path.exists() {
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                    Ok(map) => map,
                    Err(e) => {
                        eprintln!("⚠️ 缓存文件解析失败，按空缓存处理: {}", e);
                        HashMap::new()
                    }
                },
                Err(e) => {
                    eprintln!("⚠️ 缓存文件读取失败，按空缓存处理: {}", e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            enabled: config.enabled,
            path,
            entries: RwLock::new(entries),
        }
    }

    /// 读取缓存
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.read().await;
        entries.get(&key.storage_key()).cloned()
    }

    /// 写入缓存并落盘
    ///
    /// 相同键的后写覆盖先写。写锁持有到落盘完成，并行写入按序刷新，
    /// 磁盘上的文件不会丢失已写入的条目。
    pub async fn put(&self, key: &CacheKey, text: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut entries = self.entries.write().await;
        entries.insert(key.storage_key(), text.to_string());
        self.persist(&entries).await
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create cache directory")?;
        }

        let content =
            serde_json::to_string_pretty(entries).context("Failed to serialize cache")?;
        fs::write(&self.path, content)
            .await
            .context("Failed to write cache file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchMode;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, enabled: bool) -> CacheConfig {
        CacheConfig {
            enabled,
            cache_dir: dir.path().to_path_buf(),
        }
    }

    fn key(stage: &str) -> CacheKey {
        CacheKey::new(
            "sepsis management",
            stage,
            None,
            "2025-04-01",
            ResearchMode::Fast,
        )
    }

    #[test]
    fn test_storage_key_format() {
        let k = key("metadata");
        assert_eq!(
            k.storage_key(),
            "sepsis management_metadata_2025-04-01_fast"
        );

        let k = CacheKey::new(
            "sepsis management",
            "Diagnostic Approach",
            Some("chunked"),
            "2025-04-01",
            ResearchMode::Thorough,
        );
        assert_eq!(
            k.storage_key(),
            "sepsis management_Diagnostic Approach_chunked_2025-04-01_thorough"
        );
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::load(&test_config(&dir, true)).await;

        let k = key("metadata");
        assert_eq!(store.get(&k).await, None);

        store.put(&k, "generated text").await.unwrap();
        // 任意次读取返回同一内容
        assert_eq!(store.get(&k).await.as_deref(), Some("generated text"));
        assert_eq!(store.get(&k).await.as_deref(), Some("generated text"));
    }

    #[tokio::test]
    async fn test_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, true);

        let store = CacheStore::load(&config).await;
        store.put(&key("metadata"), "persisted").await.unwrap();
        drop(store);

        let store = CacheStore::load(&config).await;
        assert_eq!(store.get(&key("metadata")).await.as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_concurrent_puts_all_reach_disk() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, true);
        let store = std::sync::Arc::new(CacheStore::load(&config).await);

        let writes = (0..8).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .put(&key(&format!("stage-{}", i)), &format!("text-{}", i))
                    .await
                    .unwrap();
            })
        });
        for handle in writes.collect::<Vec<_>>() {
            handle.await.unwrap();
        }

        // 重新加载磁盘上的文件，任何一次写入都不会被并行刷新覆盖掉
        let reloaded = CacheStore::load(&config).await;
        for i in 0..8 {
            assert_eq!(
                reloaded.get(&key(&format!("stage-{}", i))).await.as_deref(),
                Some(format!("text-{}", i).as_str())
            );
        }
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::load(&test_config(&dir, true)).await;

        let k = key("conclusion");
        store.put(&k, "first").await.unwrap();
        store.put(&k, "second").await.unwrap();
        assert_eq!(store.get(&k).await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_disabled_store_is_inert() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::load(&test_config(&dir, false)).await;

        let k = key("metadata");
        store.put(&k, "ignored").await.unwrap();
        assert_eq!(store.get(&k).await, None);
        assert!(!dir.path().join(CACHE_FILE).exists());
    }

    #[tokio::test]
    async fn test_corrupt_cache_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CACHE_FILE), "{not json").unwrap();

        let store = CacheStore::load(&test_config(&dir, true)).await;
        assert_eq!(store.get(&key("metadata")).await, None);

        // 损坏的文件不阻止后续写入
        store.put(&key("metadata"), "fresh").await.unwrap();
        assert_eq!(store.get(&key("metadata")).await.as_deref(), Some("fresh"));
    }
}
