//! InMemory Canvas Repository 実装
//!
//! ドメイン層が定義する CanvasRepository trait の具体的な実装。
//! シャード分割された DashMap をインメモリ DB として使用するため、
//! 異なる座標への書き込みは（同一シャードでない限り）互いにブロックしません。

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    CanvasRepository, CanvasState, Cell, Color, Coordinate, RepositoryError, Timestamp, UserId,
};

/// インメモリ Canvas Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryCanvasRepository {
    /// 座標 → セル
    cells: DashMap<Coordinate, Cell>,
}

impl InMemoryCanvasRepository {
    /// 新しい InMemoryCanvasRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 配置済みのセル数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[async_trait]
impl CanvasRepository for InMemoryCanvasRepository {
    async fn get_full_state(&self) -> Result<CanvasState, RepositoryError> {
        Ok(self
            .cells
            .iter()
            .map(|entry| (*entry.key(), entry.value().color.clone()))
            .collect())
    }

    async fn get_cell(&self, coordinate: Coordinate) -> Result<Option<Cell>, RepositoryError> {
        Ok(self.cells.get(&coordinate).map(|cell| cell.value().clone()))
    }

    async fn upsert(
        &self,
        coordinate: Coordinate,
        color: Color,
        user_id: UserId,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError> {
        // レコード全体を 1 回で差し替えるため、フィールド単位の中途半端な状態は見えない
        self.cells
            .insert(coordinate, Cell::new(coordinate, color, user_id, timestamp));
        Ok(())
    }
}
