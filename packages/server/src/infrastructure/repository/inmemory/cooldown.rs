//! InMemory Cooldown Repository 実装
//!
//! DashMap のエントリロックをユーザーごとの直列化ポイントとして使い、
//! `try_acquire` の判定と書き込みをアトミックに行います。

use std::time::Duration;

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{
    CooldownAcquisition, CooldownCheck, CooldownEntry, CooldownRepository, RepositoryError,
    Timestamp, UserId,
};

/// インメモリ Cooldown Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryCooldownRepository {
    /// ユーザー ID → クールダウン
    entries: DashMap<UserId, CooldownEntry>,
}

impl InMemoryCooldownRepository {
    /// 新しい InMemoryCooldownRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーのエントリを取得
    pub fn get(&self, user_id: &UserId) -> Option<CooldownEntry> {
        self.entries.get(user_id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl CooldownRepository for InMemoryCooldownRepository {
    async fn check(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<CooldownCheck, RepositoryError> {
        Ok(self
            .entries
            .get(user_id)
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
        self.entries.insert(user_id.clone(), entry.clone());
        Ok(entry)
    }

    async fn try_acquire(
        &self,
        user_id: &UserId,
        now: Timestamp,
        cooldown: Duration,
    ) -> Result<CooldownAcquisition, RepositoryError> {
        let entry = CooldownEntry::new(user_id.clone(), now, cooldown);

        // エントリロックを保持したまま判定と書き込みを行う
        match self.entries.entry(user_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let check = occupied.get().check(now);
                if !check.allowed {
                    return Ok(CooldownAcquisition::Denied {
                        retry_after: check.retry_after,
                    });
                }
                let previous = occupied.insert(entry.clone());
                Ok(CooldownAcquisition::Acquired {
                    entry,
                    previous: Some(previous),
                })
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry.clone());
                Ok(CooldownAcquisition::Acquired {
                    entry,
                    previous: None,
                })
            }
        }
    }

    async fn restore(
        &self,
        acquired: &CooldownEntry,
        previous: Option<CooldownEntry>,
    ) -> Result<bool, RepositoryError> {
        match self.entries.entry(acquired.user_id.clone()) {
            Entry::Occupied(mut occupied) if occupied.get() == acquired => {
                match previous {
                    Some(previous) => {
                        occupied.insert(previous);
                    }
                    None => {
                        occupied.remove();
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - check / record / try_acquire / restore の基本動作
    // - 同一ユーザーの並行 try_acquire で成功が 1 回だけであること
    //
    // 【なぜこのテストが必要か】
    // - 1 つのクールダウン期間を二重に消費させないことがレート制限の前提
    // ========================================

    const COOLDOWN: Duration = Duration::from_secs(30);

    fn user(value: &str) -> UserId {
        UserId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_check_without_entry_is_allowed() {
        // テスト項目: エントリがなければ配置可能
        let repo = InMemoryCooldownRepository::new();
        let check = repo.check(&user("alice"), Timestamp::new(0)).await.unwrap();
        assert_eq!(check, CooldownCheck::allowed());
    }

    #[tokio::test]
    async fn test_record_then_check() {
        // テスト項目: record 後は期限まで拒否され、期限以降は許可される
        // given (前提条件):
        let repo = InMemoryCooldownRepository::new();
        let alice = user("alice");

        // when (操作):
        let entry = repo
            .record(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(entry.can_place_at, Timestamp::new(30_000));
        let denied = repo.check(&alice, Timestamp::new(5_000)).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.remaining_seconds(), 25);
        assert!(repo.check(&alice, Timestamp::new(30_000)).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_try_acquire_first_time() {
        // テスト項目: 初回の try_acquire は previous なしで成功する
        let repo = InMemoryCooldownRepository::new();
        let alice = user("alice");

        let result = repo
            .try_acquire(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();

        assert_eq!(
            result,
            CooldownAcquisition::Acquired {
                entry: CooldownEntry::new(alice.clone(), Timestamp::new(0), COOLDOWN),
                previous: None,
            }
        );
    }

    #[tokio::test]
    async fn test_try_acquire_denied_does_not_mutate() {
        // テスト項目: クールダウン中の try_acquire は拒否され、エントリは変わらない
        // given (前提条件):
        let repo = InMemoryCooldownRepository::new();
        let alice = user("alice");
        repo.try_acquire(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();

        // when (操作):
        let result = repo
            .try_acquire(&alice, Timestamp::new(10_000), COOLDOWN)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            result,
            CooldownAcquisition::Denied {
                retry_after: Duration::from_secs(20)
            }
        );
        assert_eq!(
            repo.get(&alice).unwrap().can_place_at,
            Timestamp::new(30_000)
        );
    }

    #[tokio::test]
    async fn test_try_acquire_after_expiry_returns_previous() {
        // テスト項目: 期限後の try_acquire は previous 付きで成功する
        let repo = InMemoryCooldownRepository::new();
        let alice = user("alice");
        repo.try_acquire(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();

        let result = repo
            .try_acquire(&alice, Timestamp::new(30_000), COOLDOWN)
            .await
            .unwrap();

        match result {
            CooldownAcquisition::Acquired { entry, previous } => {
                assert_eq!(entry.can_place_at, Timestamp::new(60_000));
                assert_eq!(previous.unwrap().can_place_at, Timestamp::new(30_000));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_restore_rewinds_only_matching_entry() {
        // テスト項目: restore は自分が書き込んだエントリのときだけ巻き戻す
        // given (前提条件):
        let repo = InMemoryCooldownRepository::new();
        let alice = user("alice");
        let acquired = match repo
            .try_acquire(&alice, Timestamp::new(0), COOLDOWN)
            .await
            .unwrap()
        {
            CooldownAcquisition::Acquired { entry, .. } => entry,
            other => panic!("unexpected result: {:?}", other),
        };

        // when (操作): 別のエントリで上書きされている場合
        repo.record(&alice, Timestamp::new(1), COOLDOWN).await.unwrap();
        let stale = repo.restore(&acquired, None).await.unwrap();

        // then (期待する結果): 巻き戻さない
        assert!(!stale);
        assert!(repo.get(&alice).is_some());

        // when (操作): 現在のエントリと一致する場合
        let current = repo.get(&alice).unwrap();
        let restored = repo.restore(&current, None).await.unwrap();

        // then (期待する結果): 削除され、再び配置可能になる
        assert!(restored);
        assert!(repo.check(&alice, Timestamp::new(2)).await.unwrap().allowed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_try_acquire_single_winner() {
        // テスト項目: 同一ユーザーの並行 try_acquire は 1 回だけ成功する
        // given (前提条件):
        let repo = Arc::new(InMemoryCooldownRepository::new());
        let alice = user("alice");

        // when (操作):
        let mut handles = Vec::new();
        for _ in 0..32 {
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

    #[tokio::test]
    async fn test_different_users_are_independent() {
        // テスト項目: あるユーザーのクールダウンは他のユーザーに影響しない
        let repo = InMemoryCooldownRepository::new();
        repo.try_acquire(&user("alice"), Timestamp::new(0), COOLDOWN)
            .await
            .unwrap();

        let result = repo
            .try_acquire(&user("bob"), Timestamp::new(1), COOLDOWN)
            .await
            .unwrap();

        assert!(matches!(result, CooldownAcquisition::Acquired { .. }));
    }
}
