use erc20_approval_guard::provider::{ApprovalRecord, SpenderInfo, TokenInfo};

pub const MAX_UINT256_DEC: &str =
    "115792089237316195423570985008687907853269984665640564039457584007913129639935";

/// Starts an approval record with unremarkable defaults: verified token,
/// no spam flag, unlabeled spender.
pub fn approval(token_address: &str, spender_address: &str, value: &str) -> ApprovalBuilder {
    ApprovalBuilder {
        record: ApprovalRecord {
            block_number: Some("34211042".to_string()),
            block_timestamp: "2024-01-15T09:12:33.000Z".to_string(),
            transaction_hash: "0x1111111111111111111111111111111111111111111111111111111111111111"
                .to_string(),
            token: TokenInfo {
                address: token_address.to_string(),
                name: Some("Test Token".to_string()),
                symbol: "TST".to_string(),
                logo: None,
                decimals: 18,
                possible_spam: false,
                verified_contract: true,
                usd_price: None,
            },
            spender: SpenderInfo {
                address: spender_address.to_string(),
                address_label: None,
            },
            value: value.to_string(),
        },
    }
}

pub struct ApprovalBuilder {
    record: ApprovalRecord,
}

impl ApprovalBuilder {
    pub fn spam(mut self, possible_spam: bool) -> Self {
        self.record.token.possible_spam = possible_spam;
        self
    }

    pub fn verified(mut self, verified_contract: bool) -> Self {
        self.record.token.verified_contract = verified_contract;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.record.spender.address_label = Some(label.to_string());
        self
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.record.token.symbol = symbol.to_string();
        self
    }

    pub fn usd_price(mut self, usd_price: f64) -> Self {
        self.record.token.usd_price = Some(usd_price);
        self
    }

    pub fn build(self) -> ApprovalRecord {
        self.record
    }
}
