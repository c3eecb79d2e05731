//! Processor customer provisioning shared by purchases and subscriptions.

use crate::domain::foundation::DomainError;
use crate::domain::profile::Profile;
use crate::ports::{CreateCustomerRequest, PaymentProvider, ProfileRepository};

/// Returns the profile's Stripe customer id, creating and storing one
/// on first use.
pub(crate) async fn ensure_customer(
    profiles: &dyn ProfileRepository,
    provider: &dyn PaymentProvider,
    profile: &Profile,
) -> Result<String, DomainError> {
    if let Some(id) = &profile.stripe_customer_id {
        return Ok(id.clone());
    }

    let customer = provider
        .create_customer(CreateCustomerRequest {
            profile_id: profile.id,
            email: profile.email.clone(),
            name: profile.full_name.clone(),
        })
        .await?;

    profiles
        .set_stripe_customer_id(&profile.id, &customer.id)
        .await?;
    Ok(customer.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::foundation::ProfileId;

    #[tokio::test]
    async fn creates_customer_once() {
        let store = InMemoryStore::new();
        let provider = MockPaymentProvider::new();
        let profile = Profile::new(ProfileId::new(), "c@example.com", None, 0);
        store.put_profile(profile.clone()).await;

        let id = ensure_customer(&store, &provider, &profile).await.unwrap();
        let stored = ProfileRepository::find(&store, &profile.id)
            .await
            .unwrap()
            .unwrap();
        let again = ensure_customer(&store, &provider, &stored).await.unwrap();

        assert_eq!(stored.stripe_customer_id.as_deref(), Some(id.as_str()));
        assert_eq!(again, id);
        assert_eq!(provider.call_count("create_customer"), 1);
    }
}
