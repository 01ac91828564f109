//! HTTP client for the POS backend.
//!
//! One client implements every port the checkout needs from the POS system:
//! cart fetch/clear, store tax settings, payment verification and order
//! creation. The wire format is owned by the backend; the DTOs here only keep
//! the fields the checkout reads.

use crate::config::CheckoutConfig;
use crate::domain::cart::{Cart, CartItem, CartOwner};
use crate::domain::money::Money;
use crate::domain::order::OrderDraft;
use crate::domain::payment::Verification;
use crate::domain::ports::{CartService, OrderService, PaymentVerifier, TaxConfigSource};
use crate::domain::pricing::{TaxConfig, TaxKind};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CART_PATH: &str = "/api/cart";
const STORE_PATH: &str = "/api/store";
const PAYSTACK_PATH: &str = "/api/paystack";
const ORDERS_PATH: &str = "/api/orders";

/// Standard POS response wrapper.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductDto {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CartItemDto {
    product: ProductDto,
    quantity: u32,
    /// Line total, not unit price.
    price: Decimal,
}

impl CartItemDto {
    fn into_item(self) -> Option<CartItem> {
        if self.quantity == 0 {
            return None;
        }
        Some(CartItem {
            product_id: self.product.id,
            name: self.product.name,
            quantity: self.quantity,
            unit_price: Money::new(self.price / Decimal::from(self.quantity)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CartDto {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    items: Vec<CartItemDto>,
}

#[derive(Debug, Deserialize)]
struct TaxSettingsDto {
    rate: Decimal,
    #[serde(rename = "type")]
    kind: Option<TaxKind>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDto {
    tax_settings: Option<TaxSettingsDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartActionRequest<'a> {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    action: &'static str,
    reference: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    data: serde_json::Value,
    message: Option<String>,
}

/// HTTP client for the POS REST API.
///
/// Cheap to clone; clones share the underlying connection pool, so the same
/// client can back several ports at once.
#[derive(Debug, Clone)]
pub struct PosClient {
    client: Client,
    config: CheckoutConfig,
}

impl PosClient {
    pub fn new(config: CheckoutConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }
}

/// Turns non-2xx responses into `BackendError`, keeping the body as the message.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CheckoutError::BackendError {
        status: status.as_u16(),
        message,
    })
}

fn rejected(message: Option<String>) -> CheckoutError {
    CheckoutError::BackendError {
        status: 200,
        message: message.unwrap_or_else(|| "request rejected".to_string()),
    }
}

#[async_trait]
impl CartService for PosClient {
    async fn fetch(&self, owner: &CartOwner) -> Result<Option<Cart>> {
        let mut query = vec![("sessionId", owner.session_id.as_str())];
        if let Some(user_id) = owner.user_id.as_deref() {
            query.push(("userId", user_id));
        }

        let response = self
            .client
            .get(self.url(CART_PATH))
            .query(&query)
            .send()
            .await?;
        let envelope: Envelope<CartDto> = ensure_success(response).await?.json().await?;

        if !envelope.success {
            debug!(
                session_id = %owner.session_id,
                "cart lookup unsuccessful: {}",
                envelope.message.as_deref().unwrap_or("no message")
            );
            return Ok(None);
        }

        Ok(envelope.data.map(|cart| {
            Cart::new(
                cart.id,
                cart.items
                    .into_iter()
                    .filter_map(CartItemDto::into_item)
                    .collect(),
            )
        }))
    }

    async fn clear(&self, owner: &CartOwner) -> Result<()> {
        let request = CartActionRequest {
            action: "clear",
            user_id: owner.user_id.as_deref(),
            session_id: &owner.session_id,
        };
        let response = self
            .client
            .post(self.url(CART_PATH))
            .json(&request)
            .send()
            .await?;
        let envelope: Envelope<serde_json::Value> =
            ensure_success(response).await?.json().await?;
        if envelope.success {
            Ok(())
        } else {
            Err(rejected(envelope.message))
        }
    }
}

#[async_trait]
impl TaxConfigSource for PosClient {
    async fn tax_configuration(&self) -> Result<TaxConfig> {
        let response = self.client.get(self.url(STORE_PATH)).send().await?;
        let envelope: Envelope<StoreDto> = ensure_success(response).await?.json().await?;

        let settings = match envelope.data.and_then(|store| store.tax_settings) {
            Some(settings) if envelope.success => settings,
            _ => return Ok(TaxConfig::disabled()),
        };

        Ok(TaxConfig {
            rate: settings.rate,
            kind: settings.kind.unwrap_or_default(),
            name: settings.name.unwrap_or_else(|| "Tax".to_string()),
        })
    }
}

#[async_trait]
impl PaymentVerifier for PosClient {
    async fn verify(&self, reference: &str, session_id: &str) -> Verification {
        let request = VerifyRequest {
            action: "verify",
            reference,
            session_id,
        };

        let response = match self
            .client
            .post(self.url(PAYSTACK_PATH))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Verification::TransportError(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            warn!(reference, "verification endpoint returned HTTP {}", status);
            return Verification::TransportError(format!("HTTP {status}"));
        }

        match response.json::<VerifyResponse>().await {
            Ok(body) if body.success && body.verified => Verification::Verified { data: body.data },
            Ok(body) => Verification::Unverified {
                message: body.message,
            },
            Err(e) => Verification::TransportError(e.to_string()),
        }
    }
}

#[async_trait]
impl OrderService for PosClient {
    async fn create(&self, draft: &OrderDraft) -> Result<()> {
        let form = reqwest::multipart::Form::new()
            .text("_method", "POST")
            .text("orderData", serde_json::to_string(draft)?);

        let response = self
            .client
            .post(self.url(ORDERS_PATH))
            .multipart(form)
            .send()
            .await?;
        let envelope: Envelope<serde_json::Value> =
            ensure_success(response).await?.json().await?;
        if envelope.success {
            Ok(())
        } else {
            Err(rejected(envelope.message))
        }
    }
}
