// Endpoint descriptor table
// Static mapping from each facade operation to method, path and auth

use reqwest::Method;

use crate::auth::AuthScheme;
use crate::service::ServiceName;

/// Path prefix for the acting user: `me` for the authenticated caller,
/// `users/{id}` for any positive user id
pub fn acting_user_segment(user_id: u64) -> String {
    if user_id == 0 {
        "me".to_string()
    } else {
        format!("users/{}", user_id)
    }
}

/// Static description of one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub service: ServiceName,
    pub method: Method,
    /// Path template. `{user}` is the acting-user segment, any other
    /// `{name}` is a path argument.
    pub path: &'static str,
    pub auth: AuthScheme,
}

impl EndpointDescriptor {
    fn new(
        service: ServiceName,
        method: Method,
        path: &'static str,
        auth: AuthScheme,
    ) -> Self {
        Self {
            service,
            method,
            path,
            auth,
        }
    }

    /// Render the path template.
    /// Argument values are percent-encoded; unknown placeholders are left as-is.
    pub fn render_path(&self, user_id: u64, args: &[(&str, String)]) -> String {
        let mut path = self.path.replace("{user}", &acting_user_segment(user_id));
        for (name, value) in args {
            let placeholder = format!("{{{}}}", name);
            path = path.replace(&placeholder, &urlencoding::encode(value));
        }
        path
    }
}

/// Every operation exposed by the service facades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // identity
    TokenRefresh,
    Login,

    // license
    GetLicenses,

    // ecom
    AddPaymentMethod,
    AddPlanChangeRequest,
    GetSubscriptions,
    GetSubscription,
    GetInvoice,
    GetOrders,
    GetOrder,
    GetPaymentMethods,
    UpdatePaymentMethod,
    UpdatePlanChange,
    UpdateSubscription,
    DeletePaymentMethod,
    DeleteSubscription,
    SendBraintreeWebhook,
    CreatePromotion,
    CreatePromotionCoupons,
    CreatePromotionRule,
    DeletePromotion,
    DeletePromotionCoupon,
    CreateVoucher,
    AssignVoucher,
    RedeemVoucher,

    // cloudlib
    MeCreateFileUpload,
    UserCreateFileUpload,
    MeGetFile,
    UserGetFile,
}

impl Operation {
    pub fn descriptor(self) -> EndpointDescriptor {
        use AuthScheme::{Basic, Bearer};
        use ServiceName::{CloudLib, Ecom, Identity, License};

        let (service, method, path, auth) = match self {
            Operation::TokenRefresh => (
                Identity,
                Method::POST,
                "/api/v1/tokens/refresh",
                AuthScheme::None,
            ),
            Operation::Login => (Identity, Method::POST, "/api/v1/login", Basic),

            Operation::GetLicenses => (License, Method::GET, "/api/v1/{user}/licenses", Bearer),

            Operation::AddPaymentMethod => {
                (Ecom, Method::POST, "/api/v1/{user}/paymentmethods", Bearer)
            }
            Operation::AddPlanChangeRequest => (
                Ecom,
                Method::POST,
                "/api/v1/{user}/subscriptions/{subscription_id}/planchanges",
                Bearer,
            ),
            Operation::GetSubscriptions => {
                (Ecom, Method::GET, "/api/v1/{user}/subscriptions", Bearer)
            }
            Operation::GetSubscription => (
                Ecom,
                Method::GET,
                "/api/v1/{user}/subscriptions/{subscription_id}",
                Bearer,
            ),
            Operation::GetInvoice => (
                Ecom,
                Method::GET,
                "/api/v1/{user}/orders/{order_id}/invoices/{invoice_id}",
                Bearer,
            ),
            Operation::GetOrders => (Ecom, Method::GET, "/api/v1/{user}/orders", Bearer),
            Operation::GetOrder => (Ecom, Method::GET, "/api/v1/{user}/orders/{order_id}", Bearer),
            Operation::GetPaymentMethods => {
                (Ecom, Method::GET, "/api/v1/{user}/paymentmethods", Bearer)
            }
            Operation::UpdatePaymentMethod => (
                Ecom,
                Method::PUT,
                "/api/v1/{user}/paymentmethods/{payment_token}",
                Bearer,
            ),
            Operation::UpdatePlanChange => (
                Ecom,
                Method::PUT,
                "/api/v1/{user}/subscriptions/{subscription_id}/planchanges/{plan_change_id}",
                Bearer,
            ),
            Operation::UpdateSubscription => (
                Ecom,
                Method::PUT,
                "/api/v1/{user}/subscriptions/{subscription_id}",
                Bearer,
            ),
            Operation::DeletePaymentMethod => (
                Ecom,
                Method::DELETE,
                "/api/v1/{user}/paymentmethods/{payment_method_token}",
                Bearer,
            ),
            Operation::DeleteSubscription => (
                Ecom,
                Method::DELETE,
                "/api/v1/{user}/subscriptions/{subscription_id}",
                Bearer,
            ),
            Operation::SendBraintreeWebhook => {
                (Ecom, Method::POST, "/api/v1/webhook/braintree", Basic)
            }
            Operation::CreatePromotion => (Ecom, Method::POST, "/api/v1/promotions", Bearer),
            Operation::CreatePromotionCoupons => (
                Ecom,
                Method::POST,
                "/api/v1/promotions/{promotion_id}/coupons",
                Bearer,
            ),
            Operation::CreatePromotionRule => (
                Ecom,
                Method::POST,
                "/api/v1/promotions/{promotion_id}/rules",
                Bearer,
            ),
            Operation::DeletePromotion => (
                Ecom,
                Method::DELETE,
                "/api/v1/promotions/{promotion_id}",
                Bearer,
            ),
            Operation::DeletePromotionCoupon => (
                Ecom,
                Method::DELETE,
                "/api/v1/promotions/{promotion_id}/coupons/{coupon_code}",
                Bearer,
            ),
            Operation::CreateVoucher => (Ecom, Method::POST, "/api/v1/vouchers", Bearer),
            Operation::AssignVoucher => (Ecom, Method::POST, "/api/v1/{user}/vouchers", Bearer),
            Operation::RedeemVoucher => (
                Ecom,
                Method::PUT,
                "/api/v1/{user}/vouchers/{voucher_id}",
                Bearer,
            ),

            Operation::MeCreateFileUpload => (CloudLib, Method::POST, "/api/v1/me/files", Bearer),
            Operation::UserCreateFileUpload => (
                CloudLib,
                Method::POST,
                "/api/v1/users/{user_id}/files",
                Bearer,
            ),
            Operation::MeGetFile => (CloudLib, Method::GET, "/api/v1/me/files/{file_id}", Bearer),
            Operation::UserGetFile => (
                CloudLib,
                Method::GET,
                "/api/v1/users/{user_id}/files/{file_id}",
                Bearer,
            ),
        };

        EndpointDescriptor::new(service, method, path, auth)
    }
}
