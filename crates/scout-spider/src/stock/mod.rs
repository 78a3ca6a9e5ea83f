mod sql;

/// Market-cap refresh for the `etfHoldings` table.
pub mod holdings;

/// Filings metadata from the [SEC]; the latest N-PORT report per ETF.
///
/// [SEC]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod sec;

/// Quote data collected from the Yahoo Finance chart API; inspiration from Python's
/// [yfinance] library.
///
/// [yfinance]: https://github.com/ranaroussi/yfinance/
pub mod yahoo_finance;
