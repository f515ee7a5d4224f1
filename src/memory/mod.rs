use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 统一内存管理器
///
/// 各研究阶段把产出写入指定作用域，文档装配阶段从中读取。
#[derive(Debug, Default)]
pub struct Memory {
    data: HashMap<String, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    fn scoped_key(scope: &str, key: &str) -> String {
        format!("{}.{}", scope, key)
    }

    /// 存储数据到指定作用域和键
    pub fn store<T>(&mut self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(data)?;
        self.data.insert(Self::scoped_key(scope, key), value);
        Ok(())
    }

    /// 从指定作用域和键获取数据
    pub fn get<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        self.data
            .get(&Self::scoped_key(scope, key))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

}
