use crate::err_custom_create;
use crate::error::GuardError;
use serde::{Deserialize, Serialize};

/// Token metadata as reported by the upstream wallet-data provider.
/// Taken as given, no validation beyond what classification needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub decimals: u32,
    pub possible_spam: bool,
    pub verified_contract: bool,
    #[serde(default)]
    pub usd_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpenderInfo {
    pub address: String,
    #[serde(default)]
    pub address_label: Option<String>,
}

/// One standing permission granted by an owner to a spender over a token.
/// Provenance fields are immutable once observed; a changed allowance shows
/// up as a new record, never as an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRecord {
    #[serde(default)]
    pub block_number: Option<String>,
    pub block_timestamp: String,
    pub transaction_hash: String,
    pub token: TokenInfo,
    pub spender: SpenderInfo,
    /// Raw allowance amount in token base units, decimal string
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default = "Option::default")]
    pub result: Option<Vec<T>>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Fetches all approval records for an owner, following pagination cursors.
/// A fetch failure is surfaced as an error so callers can tell "no data"
/// apart from "zero approvals".
pub async fn fetch_approvals(
    base_url: &str,
    api_key: &str,
    owner: &str,
    chain: &str,
) -> Result<Vec<ApprovalRecord>, GuardError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .map_err(|e| err_custom_create!("Error building provider client {}", e))?;

    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let mut request_url = format!(
            "{}/wallets/{}/approvals?chain={}",
            base_url.trim_end_matches('/'),
            owner,
            chain
        );
        if let Some(cursor) = &cursor {
            request_url = format!("{request_url}&cursor={cursor}");
        }
        log::debug!("Fetching approvals: {}", request_url);

        let response = client
            .get(&request_url)
            .header("X-API-Key", api_key)
            .send()
            .await
            .map_err(|e| err_custom_create!("Error getting response from provider {}", e))?;
        if !response.status().is_success() {
            return Err(err_custom_create!(
                "Provider returned status {} for {}",
                response.status(),
                request_url
            ));
        }
        let page: PaginatedResponse<ApprovalRecord> = response
            .json()
            .await
            .map_err(|e| err_custom_create!("Error decoding provider payload {}", e))?;

        records.extend(page.result.unwrap_or_default());
        match page.cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }
    log::info!("Fetched {} approval records for {}", records.len(), owner);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_provider_payload() {
        let payload = r#"{
            "cursor": null,
            "result": [{
                "block_number": "34211042",
                "block_timestamp": "2024-01-15T09:12:33.000Z",
                "transaction_hash": "0xabc",
                "token": {
                    "address": "0x55d398326f99059ff775485246999027b3197955",
                    "name": "Tether USD",
                    "symbol": "USDT",
                    "logo": null,
                    "decimals": 18,
                    "possible_spam": false,
                    "verified_contract": true,
                    "usd_price": 1.0
                },
                "spender": {
                    "address": "0x10ed43c718714eb63d5aa57b78b54704e256024e",
                    "address_label": "PancakeSwap: Router v2"
                },
                "value": "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            }]
        }"#;
        let page: PaginatedResponse<ApprovalRecord> = serde_json::from_str(payload).unwrap();
        let records = page.result.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].token.symbol, "USDT");
        assert!(records[0].token.verified_contract);
        assert_eq!(
            records[0].spender.address_label.as_deref(),
            Some("PancakeSwap: Router v2")
        );
        assert!(page.cursor.is_none());
    }

    #[test]
    fn test_deserialize_missing_result() {
        let page: PaginatedResponse<ApprovalRecord> =
            serde_json::from_str(r#"{"cursor": null}"#).unwrap();
        assert!(page.result.is_none());
    }
}
