use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::client::SwsClient;
use crate::endpoint::Operation;
use crate::error::{Result, SdkError};
use crate::request::Params;
use crate::response::ApiResponse;

/// Ecom service: payment methods, subscriptions, orders, promotions and vouchers
pub struct Ecom<'a> {
    client: &'a mut SwsClient,
}

fn arg(name: &'static str, value: impl ToString) -> (&'static str, String) {
    (name, value.to_string())
}

fn payment_fields(nonce: Option<&str>, device_data: Option<&str>, billing_address_id: Option<&str>) -> Params {
    Params::new()
        .with("nonce", nonce)
        .with("device_data", device_data)
        .with("billing_address_id", billing_address_id)
}

impl<'a> Ecom<'a> {
    pub(crate) fn new(client: &'a mut SwsClient) -> Self {
        Self { client }
    }

    async fn call(
        self,
        operation: Operation,
        path_args: &[(&str, String)],
        fields: Params,
    ) -> Result<ApiResponse> {
        self.client
            .call(operation, path_args, fields, HeaderMap::new())
            .await
    }

    // === Payment methods ===

    /// Add a payment method. `nonce` is the one-time reference to the
    /// payment information provided by the user.
    pub async fn add_payment_method(
        self,
        nonce: Option<&str>,
        device_data: Option<&str>,
        billing_address_id: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = payment_fields(nonce, device_data, billing_address_id);
        self.call(Operation::AddPaymentMethod, &[], fields).await
    }

    pub async fn get_payment_methods(self) -> Result<ApiResponse> {
        self.call(Operation::GetPaymentMethods, &[], Params::new()).await
    }

    pub async fn update_payment_method(
        self,
        payment_token: &str,
        nonce: &str,
        device_data: Option<&str>,
        billing_address_id: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = payment_fields(Some(nonce), device_data, billing_address_id);
        self.call(
            Operation::UpdatePaymentMethod,
            &[arg("payment_token", payment_token)],
            fields,
        )
        .await
    }

    pub async fn delete_payment_method(self, payment_method_token: &str) -> Result<ApiResponse> {
        self.call(
            Operation::DeletePaymentMethod,
            &[arg("payment_method_token", payment_method_token)],
            Params::new(),
        )
        .await
    }

    // === Subscriptions ===

    /// All subscriptions of the acting user, or a single one when an id is given
    pub async fn get_subscriptions(self, subscription_id: Option<&str>) -> Result<ApiResponse> {
        match subscription_id {
            Some(id) => {
                self.call(
                    Operation::GetSubscription,
                    &[arg("subscription_id", id)],
                    Params::new(),
                )
                .await
            }
            None => self.call(Operation::GetSubscriptions, &[], Params::new()).await,
        }
    }

    pub async fn update_subscription(
        self,
        subscription_id: &str,
        number_of_billing_cycle: Option<u32>,
        payment_method_token: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("number_of_billing_cycle", number_of_billing_cycle)
            .with("payment_method_token", payment_method_token);
        self.call(
            Operation::UpdateSubscription,
            &[arg("subscription_id", subscription_id)],
            fields,
        )
        .await
    }

    pub async fn delete_subscription(self, subscription_id: &str) -> Result<ApiResponse> {
        self.call(
            Operation::DeleteSubscription,
            &[arg("subscription_id", subscription_id)],
            Params::new(),
        )
        .await
    }

    /// Request a change of the product a subscription is on
    pub async fn add_plan_change_request(
        self,
        subscription_id: &str,
        catalog_product_id: u64,
    ) -> Result<ApiResponse> {
        let fields = Params::new().with("catalog_product_id", catalog_product_id);
        self.call(
            Operation::AddPlanChangeRequest,
            &[arg("subscription_id", subscription_id)],
            fields,
        )
        .await
    }

    pub async fn update_plan_change(
        self,
        subscription_id: &str,
        plan_change_id: &str,
    ) -> Result<ApiResponse> {
        self.call(
            Operation::UpdatePlanChange,
            &[
                arg("subscription_id", subscription_id),
                arg("plan_change_id", plan_change_id),
            ],
            Params::new(),
        )
        .await
    }

    // === Orders ===

    /// All orders of the acting user, or a single one when an id is given
    pub async fn get_orders(self, order_id: Option<&str>) -> Result<ApiResponse> {
        match order_id {
            Some(id) => {
                self.call(Operation::GetOrder, &[arg("order_id", id)], Params::new())
                    .await
            }
            None => self.call(Operation::GetOrders, &[], Params::new()).await,
        }
    }

    /// Fetch an invoice. `accept` selects the representation
    /// (`application/json`, `application/pdf` or `text/html`).
    pub async fn get_invoice(
        self,
        order_id: &str,
        invoice_id: &str,
        accept: &str,
    ) -> Result<ApiResponse> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(accept)
            .map_err(|_| SdkError::InvalidHeader(ACCEPT.to_string()))?;
        headers.insert(ACCEPT, value);

        self.client
            .call(
                Operation::GetInvoice,
                &[arg("order_id", order_id), arg("invoice_id", invoice_id)],
                Params::new(),
                headers,
            )
            .await
    }

    // === Webhooks ===

    /// Send a Braintree webhook notification, authenticated with the
    /// application's basic credentials
    pub async fn send_braintree_webhook(
        self,
        notification_kind: &str,
        subscription_id: &str,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("notification_kind", notification_kind)
            .with("subscription_id", subscription_id);
        self.call(Operation::SendBraintreeWebhook, &[], fields).await
    }

    // === Promotions ===

    /// Create a promotion. `starts_at`/`ends_at` are datetime strings.
    pub async fn create_promotion(
        self,
        name: &str,
        description: &str,
        coupon_based: bool,
        enabled: bool,
        starts_at: Option<&str>,
        ends_at: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("name", name)
            .with("description", description)
            .with("starts_at", starts_at)
            .with("ends_at", ends_at)
            .with("coupon_based", coupon_based)
            .with("enabled", enabled);
        self.call(Operation::CreatePromotion, &[], fields).await
    }

    pub async fn create_promotion_coupons(
        self,
        promotion_id: u64,
        usage_limit: Option<u64>,
        usage_limit_per_user: Option<u64>,
        expires_at: Option<&str>,
        coupon_code: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("usage_limit", usage_limit)
            .with("usage_limit_per_user", usage_limit_per_user)
            .with("expires_at", expires_at)
            .with("coupon_code", coupon_code);
        self.call(
            Operation::CreatePromotionCoupons,
            &[arg("promotion_id", promotion_id)],
            fields,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_promotion_rule(
        self,
        promotion_id: u64,
        product_type_id: u64,
        discount_percentage: Option<f64>,
        discount_fixed_amount: Option<f64>,
        pre_condition_product_id: Option<u64>,
        braintree_discount_id: Option<&str>,
        subscription_promotion_expires: Option<u64>,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("product_type_id", product_type_id)
            .with("discount_percentage", discount_percentage)
            .with("discount_fixed_amount", discount_fixed_amount)
            .with("pre_condition_product_id", pre_condition_product_id)
            .with("braintree_discount_id", braintree_discount_id)
            .with("subscription_promotion_expires", subscription_promotion_expires);
        self.call(
            Operation::CreatePromotionRule,
            &[arg("promotion_id", promotion_id)],
            fields,
        )
        .await
    }

    pub async fn delete_promotion(self, promotion_id: u64) -> Result<ApiResponse> {
        self.call(
            Operation::DeletePromotion,
            &[arg("promotion_id", promotion_id)],
            Params::new(),
        )
        .await
    }

    pub async fn delete_promotion_coupon(
        self,
        promotion_id: u64,
        coupon_code: &str,
    ) -> Result<ApiResponse> {
        self.call(
            Operation::DeletePromotionCoupon,
            &[arg("promotion_id", promotion_id), arg("coupon_code", coupon_code)],
            Params::new(),
        )
        .await
    }

    // === Vouchers ===

    pub async fn create_voucher(self, voucher_type_id: u64, batch_id: &str) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("voucher_type_id", voucher_type_id)
            .with("batch_id", batch_id);
        self.call(Operation::CreateVoucher, &[], fields).await
    }

    /// Assign a voucher to the acting user
    pub async fn assign_voucher(self, voucher_id: &str) -> Result<ApiResponse> {
        let fields = Params::new().with("voucher_id", voucher_id);
        self.call(Operation::AssignVoucher, &[], fields).await
    }

    pub async fn redeem_voucher(self, voucher_id: &str) -> Result<ApiResponse> {
        self.call(
            Operation::RedeemVoucher,
            &[arg("voucher_id", voucher_id)],
            Params::new(),
        )
        .await
    }
}
