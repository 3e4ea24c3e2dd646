//! 存储层
//!
//! 服务层只通过 `ProgressTx` 事务句柄访问数据，句柄上的每个查询都是显式函数，
//! 不存在隐式的关联加载。
//!
//! ## 设计原则
//!
//! - 唯一性（用户-主题、用户-徽章、徽章名）由存储保证，而不是内存集合
//! - 事务边界由服务层通过 `ProgressStore::begin` / `ProgressTx::commit` 控制
//! - 句柄被丢弃即回滚
//! - 定义 trait 接口以支持 mock 测试

mod memory_store;
mod pg_store;
mod traits;

pub use memory_store::{MemoryProgressStore, MemoryProgressTx};
pub use pg_store::{PgProgressStore, PgProgressTx};
pub use traits::*;
