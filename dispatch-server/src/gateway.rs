//! Online payment gateway contract (VNPay-style redirect flow)
//!
//! The gateway never calls into the state machine directly. We build a
//! signed redirect URL for the customer, and later verify the signed
//! callback parameters; the engine only consumes the resulting
//! [`CallbackVerification`] verdict.
//!
//! Signature scheme: parameters sorted by key (ordinal), url-encoded as
//! `k=v` pairs joined with `&`, HMAC-SHA512 over that string with the
//! merchant secret, hex-encoded. The hash fields themselves are excluded
//! from the signed payload and compared case-insensitively.

use chrono::{TimeZone, Utc};
use ring::hmac;
use shared::order::Order;
use std::collections::BTreeMap;

const SECURE_HASH_KEY: &str = "vnp_SecureHash";
const SECURE_HASH_TYPE_KEY: &str = "vnp_SecureHashType";
const RESPONSE_CODE_KEY: &str = "vnp_ResponseCode";
const TXN_REF_KEY: &str = "vnp_TxnRef";
const TRANSACTION_NO_KEY: &str = "vnp_TransactionNo";

/// Success code in the gateway's response vocabulary
const RESPONSE_OK: &str = "00";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway's payment page
    pub pay_url: String,
    /// Merchant terminal code (`vnp_TmnCode`)
    pub merchant_code: String,
    /// HMAC secret shared with the gateway
    pub secret: String,
    /// Where the gateway redirects the customer after payment
    pub return_url: String,
}

/// Verdict of a callback signature check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackVerification {
    pub signature_valid: bool,
    /// Signature valid and the gateway reported success
    pub success: bool,
    /// Order id carried in `vnp_TxnRef`
    pub order_id: Option<u64>,
    /// Gateway-side transaction number
    pub transaction_id: String,
}

pub struct PaymentGateway {
    config: GatewayConfig,
}

impl PaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Build the signed redirect URL the customer is sent to.
    ///
    /// Amounts are in the gateway's minor unit (price times 100).
    pub fn build_payment_redirect(&self, order: &Order) -> String {
        let created = Utc
            .timestamp_millis_opt(order.created_at)
            .single()
            .unwrap_or_else(Utc::now);
        let amount = (order.total_price * rust_decimal::Decimal::from(100)).trunc();

        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("vnp_Version".into(), "2.1.0".into());
        params.insert("vnp_Command".into(), "pay".into());
        params.insert("vnp_TmnCode".into(), self.config.merchant_code.clone());
        params.insert("vnp_Amount".into(), amount.to_string());
        params.insert("vnp_CurrCode".into(), "VND".into());
        params.insert("vnp_Locale".into(), "vn".into());
        params.insert(
            "vnp_CreateDate".into(),
            created.format("%Y%m%d%H%M%S").to_string(),
        );
        params.insert(
            "vnp_OrderInfo".into(),
            format!("Shipping fee for {}", order.tracking_code),
        );
        params.insert("vnp_OrderType".into(), "other".into());
        params.insert("vnp_ReturnUrl".into(), self.config.return_url.clone());
        params.insert(TXN_REF_KEY.into(), order.id.to_string());

        let query = encode_sorted(&params);
        let hash = self.sign(&query);
        format!("{}?{}&{}={}", self.config.pay_url, query, SECURE_HASH_KEY, hash)
    }

    /// Verify a callback's signature and extract the verdict
    pub fn verify_callback(&self, params: &BTreeMap<String, String>) -> CallbackVerification {
        let provided_hash = params.get(SECURE_HASH_KEY).cloned().unwrap_or_default();

        let mut signed: BTreeMap<String, String> = params.clone();
        signed.remove(SECURE_HASH_KEY);
        signed.remove(SECURE_HASH_TYPE_KEY);

        let expected = self.sign(&encode_sorted(&signed));
        let signature_valid =
            !provided_hash.is_empty() && expected.eq_ignore_ascii_case(&provided_hash);

        let response_code = params.get(RESPONSE_CODE_KEY).map(String::as_str);
        let order_id = params.get(TXN_REF_KEY).and_then(|v| v.parse().ok());
        let transaction_id = params.get(TRANSACTION_NO_KEY).cloned().unwrap_or_default();

        CallbackVerification {
            signature_valid,
            success: signature_valid && response_code == Some(RESPONSE_OK),
            order_id,
            transaction_id,
        }
    }

    fn sign(&self, data: &str) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA512, self.config.secret.as_bytes());
        hex::encode(hmac::sign(&key, data.as_bytes()).as_ref())
    }
}

/// `k=v&k=v` over sorted entries, skipping empty values
fn encode_sorted(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_decode(input: &str) -> String {
        let mut out = Vec::with_capacity(input.len());
        let bytes = input.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                b'%' if i + 2 < bytes.len() => {
                    let hex = &input[i + 1..i + 3];
                    out.push(u8::from_str_radix(hex, 16).unwrap());
                    i += 3;
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        String::from_utf8(out).unwrap()
    }

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(GatewayConfig {
            pay_url: "https://sandbox.gateway.example/pay".into(),
            merchant_code: "TESTCODE".into(),
            secret: "test-secret".into(),
            return_url: "http://localhost/return".into(),
        })
    }

    fn callback_params(gw: &PaymentGateway, order_id: u64, code: &str) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert(TXN_REF_KEY.into(), order_id.to_string());
        params.insert(TRANSACTION_NO_KEY.into(), "14422574".into());
        params.insert(RESPONSE_CODE_KEY.into(), code.into());
        params.insert("vnp_Amount".into(), "5000000".into());
        let hash = gw.sign(&encode_sorted(&params));
        params.insert(SECURE_HASH_KEY.into(), hash);
        params
    }

    #[test]
    fn valid_callback_verifies() {
        let gw = gateway();
        let verdict = gw.verify_callback(&callback_params(&gw, 42, "00"));
        assert!(verdict.signature_valid);
        assert!(verdict.success);
        assert_eq!(verdict.order_id, Some(42));
        assert_eq!(verdict.transaction_id, "14422574");
    }

    #[test]
    fn tampered_params_fail_verification() {
        let gw = gateway();
        let mut params = callback_params(&gw, 42, "00");
        params.insert("vnp_Amount".into(), "9900000".into());
        let verdict = gw.verify_callback(&params);
        assert!(!verdict.signature_valid);
        assert!(!verdict.success);
    }

    #[test]
    fn failure_code_is_signed_but_unsuccessful() {
        let gw = gateway();
        let verdict = gw.verify_callback(&callback_params(&gw, 42, "24"));
        assert!(verdict.signature_valid);
        assert!(!verdict.success);
    }

    #[test]
    fn hash_comparison_is_case_insensitive() {
        let gw = gateway();
        let mut params = callback_params(&gw, 7, "00");
        let hash = params.remove(SECURE_HASH_KEY).unwrap().to_uppercase();
        params.insert(SECURE_HASH_KEY.into(), hash);
        assert!(gw.verify_callback(&params).success);
    }

    #[test]
    fn redirect_url_signature_round_trips() {
        let gw = gateway();
        let order = {
            use rust_decimal::Decimal;
            use shared::order::{OrderStatus, Payer, PaymentMethod, PaymentStatus};
            Order {
                id: 3,
                tracking_code: "MVD300820250003".into(),
                customer_id: 1,
                dispatcher_id: None,
                shipper_id: None,
                pickup_area_id: 1,
                delivery_area_id: 2,
                pickup_warehouse_id: None,
                delivery_warehouse_id: None,
                pickup_address: "a".into(),
                delivery_address: "b".into(),
                receiver_name: "r".into(),
                receiver_phone: "p".into(),
                distance_km: Decimal::from(1),
                weight_kg: Decimal::from(1),
                total_price: Decimal::from(50000),
                payer: Payer::Sender,
                payment_method: PaymentMethod::Online,
                payment_status: PaymentStatus::ProcessingOnline,
                payment_transaction_id: None,
                shipment_batch_id: None,
                status: OrderStatus::Pending,
                created_at: 1_756_500_000_000,
            }
        };

        let url = gw.build_payment_redirect(&order);
        let query = url.split_once('?').unwrap().1;
        // Decode as the web layer would before handing params to us
        let params: BTreeMap<String, String> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (url_decode(k), url_decode(v)))
            .collect();

        let verdict = gw.verify_callback(&params);
        assert!(verdict.signature_valid);
        assert_eq!(verdict.order_id, Some(3));
        assert_eq!(params.get("vnp_Amount").map(String::as_str), Some("5000000"));
    }
}
