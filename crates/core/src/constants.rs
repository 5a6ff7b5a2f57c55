use std::time::Duration;

/// How long a price-history read stays fresh in the query cache
pub const PRICE_HISTORY_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Number of stocks returned by the top-stocks query when no limit is given
pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound accepted for a top-stocks limit
pub const MAX_TOP_N: usize = 500;

/// BSE equity bhavcopy archive, `{}` is the trade date as `ddmmyy`
pub const BSE_BHAVCOPY_URL_TEMPLATE: &str =
    "https://www.bseindia.com/download/BhavCopy/Equity/EQ{}_CSV.ZIP";

/// User agent sent when downloading the feed archive
pub const DEFAULT_FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; stockview/0.3)";

/// Timeout applied to a single feed download
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);
