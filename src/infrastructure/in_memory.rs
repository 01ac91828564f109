use crate::domain::cart::{Cart, CartOwner};
use crate::domain::order::OrderDraft;
use crate::domain::payment::{GatewayOutcome, PaymentRequest, Verification};
use crate::domain::ports::{
    CartService, OrderService, PaymentGateway, PaymentVerifier, TaxConfigSource,
};
use crate::domain::pricing::TaxConfig;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

fn unavailable(what: &str) -> CheckoutError {
    CheckoutError::BackendError {
        status: 503,
        message: format!("{what} unavailable"),
    }
}

/// A thread-safe in-memory cart backend keyed by session id.
///
/// Clones share state, so a test can keep a handle and inspect the carts
/// after handing a boxed clone to the orchestrator.
#[derive(Default, Clone)]
pub struct InMemoryCartService {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
    clears: Arc<AtomicUsize>,
    failing_clear: Arc<AtomicBool>,
    failing_fetch: Arc<AtomicBool>,
}

impl InMemoryCartService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, owner: &CartOwner, cart: Cart) {
        self.carts
            .write()
            .await
            .insert(owner.session_id.clone(), cart);
    }

    pub async fn get(&self, owner: &CartOwner) -> Option<Cart> {
        self.carts.read().await.get(&owner.session_id).cloned()
    }

    /// Number of clear calls received, successful or not.
    pub fn clear_calls(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn fail_clear(&self, failing: bool) {
        self.failing_clear.store(failing, Ordering::SeqCst);
    }

    pub fn fail_fetch(&self, failing: bool) {
        self.failing_fetch.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn fetch(&self, owner: &CartOwner) -> Result<Option<Cart>> {
        if self.failing_fetch.load(Ordering::SeqCst) {
            return Err(unavailable("cart service"));
        }
        Ok(self.get(owner).await)
    }

    async fn clear(&self, owner: &CartOwner) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        if self.failing_clear.load(Ordering::SeqCst) {
            return Err(unavailable("cart service"));
        }
        if let Some(cart) = self.carts.write().await.get_mut(&owner.session_id) {
            cart.items.clear();
        }
        Ok(())
    }
}

/// Fixed tax settings; `None` simulates a failing store settings endpoint.
#[derive(Debug, Clone, Default)]
pub struct StaticTaxConfig {
    config: Option<TaxConfig>,
}

impl StaticTaxConfig {
    pub fn new(config: TaxConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    pub fn failing() -> Self {
        Self { config: None }
    }
}

#[async_trait]
impl TaxConfigSource for StaticTaxConfig {
    async fn tax_configuration(&self) -> Result<TaxConfig> {
        self.config
            .clone()
            .ok_or_else(|| unavailable("store settings"))
    }
}

/// A gateway that replays queued outcomes, one per attempt.
///
/// Once the queue is exhausted every attempt resolves to `Closed`.
#[derive(Default, Clone)]
pub struct ScriptedGateway {
    outcomes: Arc<Mutex<VecDeque<GatewayOutcome>>>,
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
}

impl ScriptedGateway {
    pub fn new(outcomes: impl IntoIterator<Item = GatewayOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    pub async fn push(&self, outcome: GatewayOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initiate(&self, request: &PaymentRequest) -> GatewayOutcome {
        self.requests.lock().await.push(request.clone());
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(GatewayOutcome::Closed)
    }
}

/// A verifier answering from a table of references.
///
/// Unknown references are unverified. Every call is recorded.
#[derive(Default, Clone)]
pub struct StaticVerifier {
    verdicts: Arc<RwLock<HashMap<String, Verification>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, reference: impl Into<String>, verdict: Verification) {
        self.verdicts.write().await.insert(reference.into(), verdict);
    }

    /// `(reference, session_id)` pairs received so far.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PaymentVerifier for StaticVerifier {
    async fn verify(&self, reference: &str, session_id: &str) -> Verification {
        self.calls
            .lock()
            .await
            .push((reference.to_string(), session_id.to_string()));
        self.verdicts
            .read()
            .await
            .get(reference)
            .cloned()
            .unwrap_or(Verification::Unverified {
                message: Some(format!("unknown reference {reference}")),
            })
    }
}

/// Records order drafts. Can be told to reject the next N orders.
#[derive(Default, Clone)]
pub struct InMemoryOrderService {
    orders: Arc<RwLock<Vec<OrderDraft>>>,
    attempts: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
}

impl InMemoryOrderService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub async fn orders(&self) -> Vec<OrderDraft> {
        self.orders.read().await.clone()
    }

    /// Create calls received, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn create(&self, draft: &OrderDraft) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let rejected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(unavailable("order service"));
        }
        self.orders.write().await.push(draft.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartItem;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    fn cart() -> Cart {
        Cart::new(
            "c1",
            vec![CartItem {
                product_id: "p1".to_string(),
                name: "Headphones".to_string(),
                quantity: 1,
                unit_price: Money::new(dec!(40)),
            }],
        )
    }

    #[tokio::test]
    async fn test_in_memory_cart_service() {
        let store = InMemoryCartService::new();
        let owner = CartOwner::guest("guest_1");
        store.insert(&owner, cart()).await;

        let fetched = store.fetch(&owner).await.unwrap().unwrap();
        assert_eq!(fetched, cart());
        assert!(
            store
                .fetch(&CartOwner::guest("other"))
                .await
                .unwrap()
                .is_none()
        );

        store.clear(&owner).await.unwrap();
        assert!(store.get(&owner).await.unwrap().is_empty());
        assert_eq!(store.clear_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_clear_keeps_items() {
        let store = InMemoryCartService::new();
        let owner = CartOwner::guest("guest_1");
        store.insert(&owner, cart()).await;
        store.fail_clear(true);

        assert!(store.clear(&owner).await.is_err());
        assert!(!store.get(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scripted_gateway_replays_then_closes() {
        let gateway = ScriptedGateway::new([GatewayOutcome::Unavailable]);
        let request = PaymentRequest {
            reference: "TXN_1".to_string(),
            email: "a@b.c".to_string(),
            amount_minor: 100,
            currency: "GHS".to_string(),
            customer: Default::default(),
            shipping_address: Default::default(),
            shipping_method: Default::default(),
            items: vec![],
            cart_id: "c1".to_string(),
            order_total: Money::new(dec!(1)),
        };
        assert_eq!(gateway.initiate(&request).await, GatewayOutcome::Unavailable);
        assert_eq!(gateway.initiate(&request).await, GatewayOutcome::Closed);
        assert_eq!(gateway.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_static_verifier_defaults_to_unverified() {
        let verifier = StaticVerifier::new();
        verifier
            .set("TXN_456", Verification::Verified { data: serde_json::Value::Null })
            .await;

        assert!(verifier.verify("TXN_456", "s1").await.is_verified());
        assert!(!verifier.verify("TXN_999", "s1").await.is_verified());
        assert_eq!(verifier.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_tax_source() {
        assert!(StaticTaxConfig::failing().tax_configuration().await.is_err());
        let config = StaticTaxConfig::new(TaxConfig::disabled())
            .tax_configuration()
            .await
            .unwrap();
        assert!(!config.enabled());
    }
}
