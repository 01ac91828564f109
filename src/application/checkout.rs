use crate::config::CheckoutConfig;
use crate::domain::cart::{Cart, CartOwner};
use crate::domain::checkout::{CheckoutSession, Step};
use crate::domain::identifiers;
use crate::domain::money::Money;
use crate::domain::order::{OrderConfirmation, OrderDraft};
use crate::domain::payment::{PaymentAttempt, PaymentRequest, PaymentStatus, Verification};
use crate::domain::ports::{
    CartServiceBox, OrderServiceBox, PaymentGatewayBox, PaymentVerifierBox, TaxConfigSourceBox,
};
use crate::domain::pricing::{TaxConfig, Totals};
use crate::error::{CheckoutError, Result};
use tracing::{debug, error, info, warn};

/// External services a checkout depends on.
pub struct Collaborators {
    pub carts: CartServiceBox,
    pub taxes: TaxConfigSourceBox,
    pub gateway: PaymentGatewayBox,
    pub verifier: PaymentVerifierBox,
    pub orders: OrderServiceBox,
}

/// Drives one checkout visit from the first form step to a confirmed order.
///
/// The orchestrator owns the cart snapshot, the tax settings fetched at entry
/// and the [`CheckoutSession`] state machine. It guarantees that an order is
/// only created after the backend verified the payment, and that the cart is
/// cleared at most once, after the order was accepted.
///
/// Every operation takes `&mut self`, so a session never runs two operations
/// concurrently.
pub struct CheckoutOrchestrator {
    collaborators: Collaborators,
    config: CheckoutConfig,
    owner: CartOwner,
    cart: Cart,
    tax: TaxConfig,
    session: CheckoutSession,
    order_id: Option<String>,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutOrchestrator {
    /// Loads the cart and tax settings for `owner`.
    ///
    /// Fails with [`CheckoutError::EmptyCart`] when there is nothing to check
    /// out; callers send the shopper back to the cart view in that case, and
    /// on any cart fetch error. A failing tax lookup falls back to no tax.
    pub async fn begin(
        owner: CartOwner,
        collaborators: Collaborators,
        config: CheckoutConfig,
    ) -> Result<Self> {
        let cart = match collaborators.carts.fetch(&owner).await {
            Ok(Some(cart)) if !cart.is_empty() => cart,
            Ok(_) => {
                info!(session_id = %owner.session_id, "no items to check out");
                return Err(CheckoutError::EmptyCart);
            }
            Err(e) => {
                warn!(session_id = %owner.session_id, "failed to load cart: {}", e);
                return Err(e);
            }
        };

        let tax = match collaborators.taxes.tax_configuration().await {
            Ok(tax) => tax,
            Err(e) => {
                warn!("failed to load tax configuration, continuing without tax: {}", e);
                TaxConfig::disabled()
            }
        };

        info!(
            session_id = %owner.session_id,
            cart_id = %cart.id,
            items = cart.item_count(),
            "checkout started"
        );

        Ok(Self {
            collaborators,
            config,
            owner,
            cart,
            tax,
            session: CheckoutSession::new(),
            order_id: None,
            confirmation: None,
        })
    }

    pub fn owner(&self) -> &CartOwner {
        &self.owner
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn tax(&self) -> &TaxConfig {
        &self.tax
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    /// Mutable access for form input.
    pub fn session_mut(&mut self) -> &mut CheckoutSession {
        &mut self.session
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn totals(&self) -> Totals {
        Totals::compute(
            self.cart.subtotal(),
            self.session.shipping_method,
            &self.tax,
        )
    }

    pub fn next(&mut self) -> Result<Step> {
        let step = self.session.next()?;
        debug!(step = step.number(), "advanced checkout step");
        Ok(step)
    }

    pub fn previous(&mut self) -> Step {
        self.session.previous()
    }

    /// Runs one payment attempt through the gateway and the backend verifier.
    ///
    /// Returns the resulting status: `Success` only when the verifier confirmed
    /// the gateway's reference, `Pending` when the shopper closed the payment
    /// UI, `Failed` otherwise. Already-verified sessions are returned as-is.
    pub async fn process_payment(&mut self) -> Result<PaymentStatus> {
        if let Some(confirmation) = &self.confirmation {
            return Err(CheckoutError::AlreadyConfirmed(confirmation.order_id.clone()));
        }
        if self.session.payment_status() == PaymentStatus::Success {
            return Ok(PaymentStatus::Success);
        }
        self.session.validate_details()?;
        self.session.ensure_payment_step()?;

        let total = self.totals().total;
        let reference = identifiers::transaction_reference();
        let request = total
            .to_minor_units()
            .map(|amount_minor| self.payment_request(reference.clone(), total, amount_minor));
        let attempt = self.session.start_attempt(PaymentAttempt::start(
            reference.clone(),
            total,
            self.config.currency.clone(),
        ))?;
        let Some(request) = request else {
            warn!(reference = %reference, %total, "payment amount out of range");
            return Ok(attempt.abort());
        };
        info!(
            reference = %request.reference,
            amount = request.amount_minor,
            currency = %request.currency,
            "payment attempt started"
        );

        let outcome = self.collaborators.gateway.initiate(&request).await;
        debug!(reference = %request.reference, ?outcome, "gateway resolved");

        if let Some(gateway_reference) = attempt.apply_outcome(outcome) {
            let verification = match tokio::time::timeout(
                self.config.verification_timeout,
                self.collaborators
                    .verifier
                    .verify(&gateway_reference, &self.owner.session_id),
            )
            .await
            {
                Ok(verification) => verification,
                Err(_) => Verification::TransportError(format!(
                    "verification timed out after {:?}",
                    self.config.verification_timeout
                )),
            };

            match &verification {
                Verification::Verified { .. } => {
                    info!(reference = %gateway_reference, "payment verified")
                }
                Verification::Unverified { message } => warn!(
                    reference = %gateway_reference,
                    "payment not verified: {}",
                    message.as_deref().unwrap_or("no reason given")
                ),
                Verification::TransportError(reason) => warn!(
                    reference = %gateway_reference,
                    "payment verification failed: {}",
                    reason
                ),
            }
            attempt.apply_verification(&verification);
        }

        let status = attempt.status();
        match status {
            PaymentStatus::Pending => info!(reference = %request.reference, "payment window closed"),
            PaymentStatus::Failed => warn!(reference = %request.reference, "payment attempt failed"),
            _ => {}
        }
        Ok(status)
    }

    /// Confirms the order, collecting payment first when needed.
    ///
    /// On success the order has been accepted by the order service and the
    /// cart clear was attempted once. An order service error leaves the
    /// session on the review step with the cart intact; retrying reuses the
    /// same order id. A verified payment whose amount no longer matches the
    /// cart total is refused with [`CheckoutError::PaymentAmountChanged`].
    pub async fn place_order(&mut self) -> Result<OrderConfirmation> {
        if let Some(confirmation) = &self.confirmation {
            return Err(CheckoutError::AlreadyConfirmed(confirmation.order_id.clone()));
        }
        self.session.ensure_payment_step()?;

        if self.session.payment_status() != PaymentStatus::Success {
            let status = self.process_payment().await?;
            if status != PaymentStatus::Success {
                return Err(CheckoutError::PaymentNotCompleted(status));
            }
        }
        let attempt = self
            .session
            .attempt()
            .ok_or(CheckoutError::PaymentNotCompleted(PaymentStatus::Pending))?;
        let payment_reference = attempt
            .gateway_reference()
            .map(str::to_string)
            .ok_or(CheckoutError::PaymentNotCompleted(PaymentStatus::Pending))?;
        let paid = attempt.amount();
        let due = self.totals().total;
        if paid != due || attempt.currency() != self.config.currency {
            warn!(reference = %payment_reference, %paid, %due, "order total changed after payment");
            return Err(CheckoutError::PaymentAmountChanged { paid, due });
        }
        self.session.advance_to_review();

        let order_id = self
            .order_id
            .get_or_insert_with(identifiers::order_id)
            .clone();
        let draft = self.order_draft(order_id.clone(), payment_reference.clone());

        if let Err(e) = self.collaborators.orders.create(&draft).await {
            error!(order_id = %order_id, "error creating order: {}", e);
            return Err(e);
        }
        info!(order_id = %order_id, reference = %payment_reference, "order created");

        let cart_cleared = match self.collaborators.carts.clear(&self.owner).await {
            Ok(()) => true,
            Err(e) => {
                warn!(order_id = %order_id, "order placed but cart was not cleared: {}", e);
                false
            }
        };

        let confirmation = OrderConfirmation {
            order_id,
            payment_reference,
            total: paid,
            cart_cleared,
        };
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    fn payment_request(&self, reference: String, total: Money, amount_minor: i64) -> PaymentRequest {
        PaymentRequest {
            reference,
            email: self.session.customer.email.clone(),
            amount_minor,
            currency: self.config.currency.clone(),
            customer: self.session.customer.clone(),
            shipping_address: self.session.shipping_address.clone(),
            shipping_method: self.session.shipping_method,
            items: self.cart.items.clone(),
            cart_id: self.cart.id.clone(),
            order_total: total,
        }
    }

    fn order_draft(&self, order_id: String, payment_reference: String) -> OrderDraft {
        OrderDraft {
            order_id,
            payment_reference,
            currency: self.config.currency.clone(),
            customer: self.session.customer.clone(),
            shipping_address: self.session.shipping_address.clone(),
            billing_address: self.session.effective_billing_address().clone(),
            shipping_method: self.session.shipping_method,
            items: self.cart.items.clone(),
            totals: self.totals(),
            source: "ecommerce",
        }
    }
}
