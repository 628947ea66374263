use alloy::primitives::U256;

use crate::error::WalletError;

/// Decimals of the native currency's smallest unit.
pub const NATIVE_DECIMALS: u32 = 18;
/// Fractional digits shown for balances.
pub const DISPLAY_DECIMALS: u32 = 4;

/// Convert a hex smallest-unit amount into a decimal string with
/// [`DISPLAY_DECIMALS`] fractional digits, rounding half up.
///
/// `0xde0b6b3a7640000` (10^18) formats as `1.0000`.
pub fn format_native_balance(raw: &str) -> Result<String, WalletError> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return Err(WalletError::InvalidResponse(format!("empty balance '{raw}'")));
    }

    let amount = U256::from_str_radix(digits, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("invalid balance '{raw}': {e}")))?;

    let step = U256::from(10u64).pow(U256::from(NATIVE_DECIMALS - DISPLAY_DECIMALS));
    let mut scaled = amount / step;
    if amount % step >= step / U256::from(2u64) {
        scaled += U256::from(1u64);
    }

    let display = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS));
    let whole = scaled / display;
    let fraction = (scaled % display).to_string();
    Ok(format!("{whole}.{fraction:0>width$}", width = DISPLAY_DECIMALS as usize))
}

/// `0x1234...abcd`; short inputs are returned unchanged.
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Truncate to at most `max_chars` characters.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}

/// Coerce user input to an unsigned integer.
pub fn parse_unsigned(input: &str) -> Result<U256, WalletError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::InvalidValue(input.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| WalletError::InvalidValue(input.to_string()))
}
