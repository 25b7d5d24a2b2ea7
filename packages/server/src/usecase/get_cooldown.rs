//! UseCase: クールダウン状態の取得

use std::sync::Arc;

use tsubu_shared::time::Clock;

use crate::domain::{CooldownCheck, CooldownRepository, RepositoryError, Timestamp, UserId};

/// クールダウン状態取得のユースケース
pub struct GetCooldownUseCase {
    cooldowns: Arc<dyn CooldownRepository>,
    clock: Arc<dyn Clock>,
}

impl GetCooldownUseCase {
    pub fn new(cooldowns: Arc<dyn CooldownRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { cooldowns, clock }
    }

    /// 現在時刻でのクールダウン状態を取得
    pub async fn execute(&self, user_id: &UserId) -> Result<CooldownCheck, RepositoryError> {
        let now = Timestamp::new(self.clock.now_millis());
        self.cooldowns.check(user_id, now).await
    }
}
