//////////////////////////////////////////////////////////////////
// holdings
//////////////////////////////////////////////////////////////////

/// `etfHoldings` maps each ETF to its constituent stocks; one row per `(etfTicker, stockTicker)`.
pub(crate) static SELECT_HOLDINGS: &'static str = r#"
    SELECT "stockTicker"
    FROM "etfHoldings"
    WHERE "etfTicker" = $1
    ORDER BY "stockTicker"
"#;

/// Update-only; holdings without an existing row are left alone (zero rows affected).
pub(crate) static UPDATE_MARKET_CAP: &'static str = r#"
    UPDATE "etfHoldings"
    SET "marketCap" = $1, "updatedAt" = $2
    WHERE "etfTicker" = $3 AND "stockTicker" = $4
"#;
