use crate::errors::{PriceHubError, Result};

/// 股票代码：去空白、转大写，只允许字母数字、'.'、'-'
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(PriceHubError::InvalidParameter("Ticker symbol is required".to_string()));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(PriceHubError::InvalidParameter(format!(
            "Invalid ticker symbol: {:?}",
            raw
        )));
    }
    Ok(ticker.to_ascii_uppercase())
}

/// 回看窗口必须是正整数分钟
pub fn validate_minutes(minutes: i64) -> Result<u32> {
    if minutes <= 0 {
        return Err(PriceHubError::InvalidParameter(
            "Valid minutes parameter is required".to_string(),
        ));
    }
    u32::try_from(minutes).map_err(|_| {
        PriceHubError::InvalidParameter(format!("Minutes parameter out of range: {}", minutes))
    })
}
