//! ListTransactionsHandler - The caller's ledger, newest first.

use std::sync::Arc;

use crate::domain::credits::CreditTransaction;
use crate::domain::foundation::{DomainError, ProfileId};
use crate::ports::CreditLedger;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct ListTransactionsQuery {
    pub profile_id: ProfileId,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct ListTransactionsHandler {
    ledger: Arc<dyn CreditLedger>,
}

impl ListTransactionsHandler {
    pub fn new(ledger: Arc<dyn CreditLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        query: ListTransactionsQuery,
    ) -> Result<Vec<CreditTransaction>, DomainError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = query.offset.unwrap_or(0).max(0);
        self.ledger
            .list_for_profile(&query.profile_id, limit, offset)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::credits::CreditGrant;
    use crate::domain::profile::Profile;

    #[tokio::test]
    async fn pages_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let profile = Profile::new(ProfileId::new(), "l@example.com", None, 0);
        store.put_profile(profile.clone()).await;
        for n in 1..=3 {
            let grant =
                CreditGrant::new(profile.id, n * 10, format!("pi_{}", n), "Purchase").unwrap();
            store.grant(&grant).await.unwrap();
        }
        let handler = ListTransactionsHandler::new(store);

        let first = handler
            .handle(ListTransactionsQuery {
                profile_id: profile.id,
                limit: Some(2),
                offset: None,
            })
            .await
            .unwrap();
        let rest = handler
            .handle(ListTransactionsQuery {
                profile_id: profile.id,
                limit: Some(2),
                offset: Some(2),
            })
            .await
            .unwrap();

        let amounts: Vec<_> = first.iter().chain(rest.iter()).map(|t| t.amount).collect();
        assert_eq!(amounts, vec![30, 20, 10]);
    }
}
