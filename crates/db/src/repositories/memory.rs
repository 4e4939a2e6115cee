use tokio::sync::RwLock;

use expertise_core::domain::expertise::{ExpertiseKey, ExpertiseRecord, ExpertiseUpdate};

use super::{ExpertiseRepository, RepositoryError};

/// Process-local store used by tests and throwaway deployments.
#[derive(Default)]
pub struct InMemoryExpertiseRepository {
    records: RwLock<Vec<ExpertiseRecord>>,
}

impl InMemoryExpertiseRepository {
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ExpertiseRepository for InMemoryExpertiseRepository {
    async fn find_by_key(
        &self,
        key: &ExpertiseKey,
    ) -> Result<Option<ExpertiseRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.key() == *key).cloned())
    }

    async fn find_all(&self) -> Result<Vec<ExpertiseRecord>, RepositoryError> {
        Ok(self.records.read().await.clone())
    }

    async fn upsert(&self, update: ExpertiseUpdate) -> Result<ExpertiseRecord, RepositoryError> {
        let mut records = self.records.write().await;
        let record = update.into_record();

        match records.iter_mut().find(|existing| existing.key() == record.key()) {
            Some(existing) => {
                existing.user_name = record.user_name.clone();
                existing.expertise = record.expertise.clone();
            }
            None => records.push(record.clone()),
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use expertise_core::domain::expertise::{ExpertiseKey, ExpertiseUpdate};
    use expertise_core::fields::parse_expertise_fields;

    use crate::repositories::{ExpertiseRepository, InMemoryExpertiseRepository};

    fn update(user: &str, raw: &str) -> ExpertiseUpdate {
        ExpertiseUpdate {
            key: ExpertiseKey::new("T1", user),
            user_name: format!("{user}-name"),
            fields: parse_expertise_fields(raw).expect("valid fields"),
        }
    }

    #[tokio::test]
    async fn in_memory_repo_replaces_existing_record_in_place() {
        let repo = InMemoryExpertiseRepository::default();

        repo.upsert(update("U1", "rust")).await.expect("first");
        repo.upsert(update("U2", "go")).await.expect("second");
        repo.upsert(update("U1", "zig, c")).await.expect("replace");

        let all = repo.find_all().await.expect("find all");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user_id.0, "U1");
        assert_eq!(all[0].expertise, vec!["zig", " c"]);
        assert_eq!(all[1].user_id.0, "U2");
    }

    #[tokio::test]
    async fn in_memory_repo_reports_missing_member_as_none() {
        let repo = InMemoryExpertiseRepository::default();
        assert!(repo.is_empty().await);

        let found = repo.find_by_key(&ExpertiseKey::new("T1", "U1")).await.expect("lookup");
        assert_eq!(found, None);
    }
}
