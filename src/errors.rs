// Rejection messages. Every rejection reverts the whole call.

pub const ERR_NOT_OWNER: &str = "Caller is not the owner";
pub const ERR_NOT_OPERATOR: &str = "Caller is not an operator";
pub const ERR_PAUSED: &str = "Contract is paused";
pub const ERR_DEPOSITS_PAUSED: &str = "Deposits are paused";
pub const ERR_WITHDRAWALS_PAUSED: &str = "Withdrawals are paused";

pub const ERR_ZERO_AMOUNT: &str = "Amount must be greater than zero";
pub const ERR_WRONG_TOKEN: &str = "Invalid payment token";
pub const ERR_ACCOUNT_CAP: &str = "Per-account deposit cap exceeded";
pub const ERR_GLOBAL_CAP: &str = "Global deposit cap exceeded";
pub const ERR_DEPOSIT_TOO_SMALL: &str = "Deposit too small for shares";
pub const ERR_PRICE_ZERO: &str = "Share price is zero";
pub const ERR_INSUFFICIENT_SHARES: &str = "Insufficient share balance";
pub const ERR_ESCROW_TRANSFER: &str = "Cannot transfer shares into escrow";

pub const ERR_INVALID_BATCH: &str = "Invalid batch size";
pub const ERR_REQUEST_NOT_FOUND: &str = "Withdrawal request does not exist";
pub const ERR_REQUEST_NOT_PENDING: &str = "Withdrawal request is not pending";
pub const ERR_INSUFFICIENT_LIQUIDITY: &str = "Insufficient custody liquidity";
pub const ERR_ESCROW_SHORTFALL: &str = "Escrow balance below pending withdrawals";

pub const ERR_FEE_TOO_HIGH: &str = "Fee exceeds 50% cap";
pub const ERR_INVALID_BPS: &str = "Fraction exceeds 100%";
pub const ERR_NO_ACCRUAL: &str = "No fee accrual to collect";
pub const ERR_ACCRUAL_EXCEEDS_NAV: &str = "Fee accrual exceeds net assets";

pub const ERR_REPORT_TOO_SOON: &str = "Report interval has not elapsed";
pub const ERR_REPORT_TOO_LARGE: &str = "Yield delta exceeds max change";
pub const ERR_LOSS_EXCEEDS_NAV: &str = "Loss exceeds total assets";

pub const ERR_KOL_EXISTS: &str = "KOL already registered";
pub const ERR_KOL_NOT_FOUND: &str = "KOL is not registered";
pub const ERR_KOL_INACTIVE: &str = "KOL is not active";
pub const ERR_NOT_REFERRED: &str = "Depositor has no referrer";
pub const ERR_KOL_SETTLED: &str = "KOL already settled for this epoch";
pub const ERR_DISTRIBUTION_TOO_SOON: &str = "Distribution interval has not elapsed";
pub const ERR_POOL_INSUFFICIENT: &str = "Referral pool cannot cover payout";
