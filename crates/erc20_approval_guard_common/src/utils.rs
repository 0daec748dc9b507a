use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use web3::types::U256;

#[derive(Debug, Clone)]
pub struct ConversionError {
    pub msg: String,
}

impl ConversionError {
    pub fn from(msg: String) -> Self {
        Self { msg }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error during conversion: {}", self.msg)
    }
}

impl Error for ConversionError {
    fn description(&self) -> &str {
        "Conversion error"
    }
}

/// Parses a raw base-unit amount as reported by the wallet-data provider.
/// The provider gives amounts as decimal strings of up to 2^256-1.
pub fn u256_from_dec_string(amount: &str) -> Result<U256, ConversionError> {
    // U256::from_dec_str parses "" as 0, an empty amount is not a value
    if amount.is_empty() {
        return Err(ConversionError::from("Empty decimal string".to_string()));
    }
    U256::from_dec_str(amount)
        .map_err(|_| ConversionError::from(format!("Invalid decimal string: {amount}")))
}

///good for token amounts up to around 7.9e28 base units
pub fn u256_to_decimal(amount: U256, decimals: u32) -> Result<Decimal, ConversionError> {
    if decimals > 18 {
        return Err(ConversionError::from(format!(
            "Decimals: {decimals} cannot be greater than 18"
        )));
    }
    if amount > U256::from(u128::MAX) {
        return Err(ConversionError::from(format!(
            "Amount too large for decimal conversion: {amount}"
        )));
    }
    let dec_base = Decimal::from(10_u128.pow(decimals));
    let dec_amount = Decimal::from_u128(amount.as_u128()).ok_or_else(|| {
        ConversionError::from(format!("Amount cannot be converted to decimal: {amount}"))
    })?;
    dec_amount
        .checked_div(dec_base)
        .ok_or_else(|| ConversionError::from("Overflow during conversion".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_u256_from_dec_string() {
        assert_eq!(u256_from_dec_string("0").unwrap(), U256::zero());
        assert_eq!(
            u256_from_dec_string(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
            .unwrap(),
            U256::max_value()
        );
        assert!(u256_from_dec_string("").is_err());
        assert!(u256_from_dec_string("0x123").is_err());
        assert!(u256_from_dec_string("12.5").is_err());
        assert!(u256_from_dec_string("-1").is_err());
    }

    #[test]
    fn test_u256_to_decimal() {
        assert_eq!(
            u256_to_decimal(U256::from(1000000000000000000_u128), 18).unwrap(),
            Decimal::from_str("1").unwrap()
        );
        assert_eq!(
            u256_to_decimal(U256::from(1500000_u64), 6).unwrap(),
            Decimal::from_str("1.5").unwrap()
        );
        assert_eq!(
            u256_to_decimal(U256::from(123_u64), 0).unwrap(),
            Decimal::from_str("123").unwrap()
        );
        assert!(u256_to_decimal(U256::max_value(), 18).is_err());
        assert!(u256_to_decimal(U256::from(1), 19).is_err());
    }
}
