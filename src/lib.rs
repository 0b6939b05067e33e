#![no_std]

multiversx_sc::imports!();

pub mod access_control;
pub mod custody;
pub mod errors;
pub mod events;
pub mod fee_collector;
pub mod referral;
pub mod share_ledger;
pub mod types;
pub mod withdrawal_queue;
pub mod yield_gate;

use errors::{
    ERR_ACCOUNT_CAP, ERR_DEPOSIT_TOO_SMALL, ERR_FEE_TOO_HIGH, ERR_GLOBAL_CAP,
    ERR_INSUFFICIENT_SHARES, ERR_INVALID_BPS, ERR_ZERO_AMOUNT,
};
use fee_collector::{BPS, MAX_FEE_BPS};
use types::DistributionEpoch;
use yield_gate::{DEFAULT_MAX_CHANGE_BPS, DEFAULT_MIN_REPORT_INTERVAL};

// ============================================================
// Contract
// ============================================================

#[multiversx_sc::contract]
pub trait PooledFund:
    access_control::AccessControlModule
    + custody::CustodyModule
    + events::EventsModule
    + fee_collector::FeeCollectorModule
    + referral::ReferralModule
    + share_ledger::ShareLedgerModule
    + withdrawal_queue::WithdrawalQueueModule
    + yield_gate::YieldGateModule
{
    // ========================================================
    // Init / Upgrade
    // ========================================================

    #[init]
    fn init(
        &self,
        asset_token: TokenIdentifier,
        treasury: ManagedAddress,
        performance_fee_bps: u64,
        withdrawal_cooldown: u64,
        protocol_fee_bps: u64,
        distribution_interval: u64,
    ) {
        require!(performance_fee_bps <= MAX_FEE_BPS, ERR_FEE_TOO_HIGH);
        require!(protocol_fee_bps <= BPS, ERR_INVALID_BPS);

        self.asset_token().set(&asset_token);
        self.treasury().set(&treasury);
        self.performance_fee_bps().set(performance_fee_bps);
        self.withdrawal_cooldown().set(withdrawal_cooldown);

        self.total_shares().set(BigUint::zero());
        self.total_assets().set(BigUint::zero());
        self.queue_head().set(1u64);

        self.min_report_interval().set(DEFAULT_MIN_REPORT_INTERVAL);
        self.max_change_bps().set(DEFAULT_MAX_CHANGE_BPS);
        self.report_gate_enabled().set(true);

        self.distribution_epoch().set(DistributionEpoch {
            id: 1,
            last_distribution_time: self.blockchain().get_block_timestamp(),
            interval: distribution_interval,
            protocol_fee_bps,
        });
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: deposit
    // Shares are priced before the deposit lands in NAV.
    // ========================================================

    #[payable("*")]
    #[endpoint(deposit)]
    fn deposit(&self, referrer: OptionalValue<ManagedAddress>) -> BigUint {
        self.require_deposits_open();
        let caller = self.blockchain().get_caller();
        let amount = self.receive_asset();
        self.require_live_price();

        // ── Caps ──
        let per_account_cap = self.per_account_cap().get();
        if per_account_cap > 0u64 {
            let position = self.to_assets(self.shares(&caller).get());
            require!(position + &amount <= per_account_cap, ERR_ACCOUNT_CAP);
        }
        let global_cap = self.global_cap().get();
        if global_cap > 0u64 {
            require!(self.total_assets().get() + &amount <= global_cap, ERR_GLOBAL_CAP);
        }

        // ── Share calculation ──
        let shares_to_mint = self.to_shares(amount.clone());
        require!(shares_to_mint > 0u64, ERR_DEPOSIT_TOO_SMALL);

        self.raise_mark_on_deposit(&amount);
        self.mint(&caller, &shares_to_mint);
        self.total_assets().update(|nav| *nav += &amount);

        self.record_referral(&caller, referrer);
        self.forward_excess_to_strategy();

        self.deposit_event(&caller, &amount, &shares_to_mint);
        shares_to_mint
    }

    // ========================================================
    // ENDPOINT: requestWithdrawal
    // Shares go to escrow and wait in the queue for an operator.
    // ========================================================

    #[endpoint(requestWithdrawal)]
    fn request_withdrawal(&self, shares: BigUint) -> u64 {
        self.require_withdrawals_open();
        let caller = self.blockchain().get_caller();
        require!(shares > 0u64, ERR_ZERO_AMOUNT);
        require!(self.shares(&caller).get() >= shares, ERR_INSUFFICIENT_SHARES);

        self.enqueue_withdrawal(&caller, &shares)
    }

    // ========================================================
    // Configuration
    // ========================================================

    #[endpoint(setDepositCaps)]
    fn set_deposit_caps(&self, per_account_cap: BigUint, global_cap: BigUint) {
        self.require_owner();
        self.per_account_cap().set(&per_account_cap);
        self.global_cap().set(&global_cap);
    }

    #[endpoint(setWithdrawalCooldown)]
    fn set_withdrawal_cooldown(&self, cooldown: u64) {
        self.require_owner();
        self.withdrawal_cooldown().set(cooldown);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getFundStats)]
    fn get_fund_stats(&self) -> MultiValue5<BigUint, BigUint, BigUint, BigUint, BigUint> {
        (
            self.total_assets().get(),
            self.total_shares().get(),
            self.share_price(),
            self.accrued_fees().get(),
            self.pending_total_shares().get(),
        )
            .into()
    }

    #[view(getDepositCaps)]
    fn get_deposit_caps(&self) -> MultiValue2<BigUint, BigUint> {
        (self.per_account_cap().get(), self.global_cap().get()).into()
    }

    // ========================================================
    // STORAGE
    // ========================================================

    /// Max asset value of one account's position, 0 = unlimited
    #[storage_mapper("perAccountCap")]
    fn per_account_cap(&self) -> SingleValueMapper<BigUint>;

    /// Max NAV, 0 = unlimited
    #[storage_mapper("globalCap")]
    fn global_cap(&self) -> SingleValueMapper<BigUint>;
}
