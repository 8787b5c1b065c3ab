//! Persona capability validation.
//!
//! A persona-scoped grant is only honored when the user genuinely holds the
//! persona, i.e. a linked account record exists right now. This closes the
//! loophole where a role grant for the LAWYER persona would otherwise apply
//! to any user merely claiming that persona.

use crate::domain::Persona;
use crate::error::Result;
use crate::repository::AccountRepository;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

pub struct CapabilityValidator<A: AccountRepository> {
    accounts: Arc<A>,
}

impl<A: AccountRepository> Clone for CapabilityValidator<A> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
        }
    }
}

impl<A: AccountRepository> CapabilityValidator<A> {
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    /// True iff the user holds the persona now. Never cached across requests.
    pub async fn has_capability(&self, user_id: Uuid, persona: Persona) -> Result<bool> {
        self.accounts.has_linked_account(user_id, persona).await
    }

    /// Batch form, semantically identical to calling
    /// [`has_capability`](Self::has_capability) per pair; exists purely to
    /// amortize I/O (one lookup per persona kind present).
    pub async fn has_capabilities(
        &self,
        pairs: &[(Uuid, Persona)],
    ) -> Result<HashMap<(Uuid, Persona), bool>> {
        let mut out = HashMap::with_capacity(pairs.len());
        if pairs.is_empty() {
            return Ok(out);
        }

        let lawyer_ids: Vec<Uuid> = pairs
            .iter()
            .filter(|(_, persona)| *persona == Persona::Lawyer)
            .map(|(user_id, _)| *user_id)
            .collect();
        let customer_ids: Vec<Uuid> = pairs
            .iter()
            .filter(|(_, persona)| *persona == Persona::Customer)
            .map(|(user_id, _)| *user_id)
            .collect();

        // lookups only for persona kinds actually present in the batch
        let lookup = |ids: Vec<Uuid>, persona: Persona| async move {
            if ids.is_empty() {
                Ok(HashSet::new())
            } else {
                self.accounts.find_linked_accounts(&ids, persona).await
            }
        };
        let (lawyers, customers) = tokio::try_join!(
            lookup(lawyer_ids, Persona::Lawyer),
            lookup(customer_ids, Persona::Customer),
        )?;

        for (user_id, persona) in pairs {
            let capable = match persona {
                Persona::Lawyer => lawyers.contains(user_id),
                Persona::Customer => customers.contains(user_id),
            };
            out.insert((*user_id, *persona), capable);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::account::MockAccountRepository;

    #[tokio::test]
    async fn test_missing_account_is_not_capable() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_has_linked_account()
            .returning(|_, _| Ok(false));

        let validator = CapabilityValidator::new(Arc::new(accounts));
        let capable = validator
            .has_capability(Uuid::new_v4(), Persona::Lawyer)
            .await
            .unwrap();
        assert!(!capable);
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let lawyer = Uuid::new_v4();
        let pretender = Uuid::new_v4();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_linked_accounts()
            .returning(move |ids, persona| {
                let mut found = HashSet::new();
                if persona == Persona::Lawyer && ids.contains(&lawyer) {
                    found.insert(lawyer);
                }
                Ok(found)
            });

        let validator = CapabilityValidator::new(Arc::new(accounts));
        let result = validator
            .has_capabilities(&[
                (lawyer, Persona::Lawyer),
                (pretender, Persona::Lawyer),
                (lawyer, Persona::Customer),
            ])
            .await
            .unwrap();

        assert_eq!(result[&(lawyer, Persona::Lawyer)], true);
        assert_eq!(result[&(pretender, Persona::Lawyer)], false);
        assert_eq!(result[&(lawyer, Persona::Customer)], false);
    }

    #[tokio::test]
    async fn test_single_persona_batch_skips_the_other_lookup() {
        let customer = Uuid::new_v4();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_linked_accounts()
            .times(1)
            .returning(move |ids, persona| {
                assert_eq!(persona, Persona::Customer);
                Ok(ids.iter().copied().collect())
            });

        let validator = CapabilityValidator::new(Arc::new(accounts));
        let result = validator
            .has_capabilities(&[(customer, Persona::Customer)])
            .await
            .unwrap();
        assert_eq!(result[&(customer, Persona::Customer)], true);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let accounts = MockAccountRepository::new();
        let validator = CapabilityValidator::new(Arc::new(accounts));
        let result = validator.has_capabilities(&[]).await.unwrap();
        assert!(result.is_empty());
    }
}
