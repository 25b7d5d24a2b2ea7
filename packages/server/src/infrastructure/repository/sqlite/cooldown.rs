//! SQLite Cooldown Repository 実装
//!
//! `try_acquire` は条件付き UPSERT 1 文で判定と書き込みを行うため、
//! 同一ユーザーの並行リクエストがどちらも成功することはありません。

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Row, sqlite::SqlitePool};

use crate::domain::{
    CooldownAcquisition, CooldownCheck, CooldownEntry, CooldownRepository, RepositoryError,
    Timestamp, UserId,
};

/// SQLite Cooldown Repository 実装
pub struct SqliteCooldownRepository {
    pool: SqlitePool,
}

impl SqliteCooldownRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<CooldownEntry>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT last_placed, can_place_at
            FROM user_cooldowns
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let last_placed: i64 = row.try_get("last_placed")?;
                let can_place_at: i64 = row.try_get("can_place_at")?;
                Ok(Some(CooldownEntry {
                    user_id: user_id.clone(),
                    last_placed: Timestamp::new(last_placed),
                    can_place_at: Timestamp::new(can_place_at),
                }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CooldownRepository for SqliteCooldownRepository {
    async fn check(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<CooldownCheck, RepositoryError> {
        Ok(self
            .find(user_id)
            .await?
            .map(|entry| entry.check(now))
            .unwrap_or_else(CooldownCheck::allowed))
    }

    async fn record(
        &self,
        user_id: &UserId,
        now: Timestamp,
        cooldown: Duration,
    ) -> Result<CooldownEntry, RepositoryError> {
        let entry = CooldownEntry::new(user_id.clone(), now, cooldown);

        sqlx::query(
            r#"
            INSERT INTO user_cooldowns (user_id, last_placed, can_place_at)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                last_placed = excluded.last_placed,
                can_place_at = excluded.can_place_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(entry.last_placed.value())
        .bind(entry.can_place_at.value())
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn try_acquire(
        &self,
        user_id: &UserId,
        now: Timestamp,
        cooldown: Duration,
    ) -> Result<CooldownAcquisition, RepositoryError> {
        let previous = self.find(user_id).await?;
        let entry = CooldownEntry::new(user_id.clone(), now, cooldown);

        // 期限切れ（または未登録）の場合のみ書き込まれる
        let result = sqlx::query(
            r#"
            INSERT INTO user_cooldowns (user_id, last_placed, can_place_at)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                last_placed = excluded.last_placed,
                can_place_at = excluded.can_place_at
            WHERE user_cooldowns.can_place_at <= excluded.last_placed
            "#,
        )
        .bind(user_id.as_str())
        .bind(entry.last_placed.value())
        .bind(entry.can_place_at.value())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(CooldownAcquisition::Acquired { entry, previous });
        }

        let retry_after = self
            .find(user_id)
            .await?
            .map(|current| current.check(now).retry_after)
            .unwrap_or(Duration::ZERO);
        Ok(CooldownAcquisition::Denied { retry_after })
    }

    async fn restore(
        &self,
        acquired: &CooldownEntry,
        previous: Option<CooldownEntry>,
    ) -> Result<bool, RepositoryError> {
        let result = match previous {
            Some(previous) => {
                sqlx::query(
                    r#"
                    UPDATE user_cooldowns
                    SET last_placed = ?, can_place_at = ?
                    WHERE user_id = ? AND last_placed = ? AND can_place_at = ?
                    "#,
                )
                .bind(previous.last_placed.value())
                .bind(previous.can_place_at.value())
                .bind(acquired.user_id.as_str())
                .bind(acquired.last_placed.value())
                .bind(acquired.can_place_at.value())
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    DELETE FROM user_cooldowns
                    WHERE user_id = ? AND last_placed = ? AND can_place_at = ?
                    "#,
                )
                .bind(acquired.user_id.as_str())
                .bind(acquired.last_placed.value())
                .bind(acquired.can_place_at.value())
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::repository::sqlite::memory_pool;

    const COOLDOWN: Duration = Duration::from_secs(30);

    fn user(value: &str) -> UserId {
        UserId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_try_acquire_then_denied() {
        // テスト項目: 1 回目は成功し、期限内の 2 回目は残り時間付きで拒否される
        // given (前提条件):
        let repo = SqliteCooldownRepository::new(memory_pool().await);
        let alice = user("alice");

        // when (操作):
        let first = repo
            .try_acquire(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();
        let second = repo
            .try_acquire(&alice, Timestamp::new(5_000), COOLDOWN)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(matches!(
            first,
            CooldownAcquisition::Acquired { previous: None, .. }
        ));
        assert_eq!(
            second,
            CooldownAcquisition::Denied {
                retry_after: Duration::from_secs(25)
            }
        );
    }

    #[tokio::test]
    async fn test_try_acquire_after_expiry() {
        // テスト項目: 期限後は previous 付きで成功する
        let repo = SqliteCooldownRepository::new(memory_pool().await);
        let alice = user("alice");
        repo.try_acquire(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();

        let result = repo
            .try_acquire(&alice, Timestamp::new(30_000), COOLDOWN)
            .await
            .unwrap();

        assert_eq!(
            result,
            CooldownAcquisition::Acquired {
                entry: CooldownEntry::new(alice.clone(), Timestamp::new(30_000), COOLDOWN),
                previous: Some(CooldownEntry::new(alice, Timestamp::new(0), COOLDOWN)),
            }
        );
    }

    #[tokio::test]
    async fn test_check_and_record() {
        // テスト項目: record 後の check が残り時間を返す
        let repo = SqliteCooldownRepository::new(memory_pool().await);
        let alice = user("alice");
        assert!(repo.check(&alice, Timestamp::new(0)).await.unwrap().allowed);

        repo.record(&alice, Timestamp::new(0), COOLDOWN).await.unwrap();

        let check = repo.check(&alice, Timestamp::new(1_500)).await.unwrap();
        assert!(!check.allowed);
        assert_eq!(check.remaining_seconds(), 28);
    }

    #[tokio::test]
    async fn test_restore_to_previous_and_delete() {
        // テスト項目: restore で以前のエントリに戻る／初回なら削除される
        // given (前提条件):
        let repo = SqliteCooldownRepository::new(memory_pool().await);
        let alice = user("alice");
        let first = CooldownEntry::new(alice.clone(), Timestamp::new(0), COOLDOWN);
        repo.record(&alice, Timestamp::new(0), COOLDOWN).await.unwrap();
        let second = match repo
            .try_acquire(&alice, Timestamp::new(40_000), COOLDOWN)
            .await
            .unwrap()
        {
            CooldownAcquisition::Acquired { entry, .. } => entry,
            other => panic!("unexpected result: {:?}", other),
        };

        // when (操作):
        let restored = repo.restore(&second, Some(first.clone())).await.unwrap();

        // then (期待する結果):
        assert!(restored);
        assert_eq!(repo.find(&alice).await.unwrap(), Some(first.clone()));

        // 一致しないエントリの restore は何もしない
        assert!(!repo.restore(&second, None).await.unwrap());

        assert!(repo.restore(&first, None).await.unwrap());
        assert_eq!(repo.find(&alice).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_try_acquire_single_winner() {
        // テスト項目: 同一ユーザーの並行 try_acquire は 1 回だけ成功する
        // given (前提条件):
        let repo = Arc::new(SqliteCooldownRepository::new(memory_pool().await));
        let alice = user("alice");

        // when (操作):
        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            let alice = alice.clone();
            handles.push(tokio::spawn(async move {
                repo.try_acquire(&alice, Timestamp::new(0), COOLDOWN)
                    .await
                    .unwrap()
            }));
        }
        let mut acquired = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), CooldownAcquisition::Acquired { .. }) {
                acquired += 1;
            }
        }

        // then (期待する結果):
        assert_eq!(acquired, 1);
    }
}
