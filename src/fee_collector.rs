multiversx_sc::imports!();

use crate::errors::{ERR_ACCRUAL_EXCEEDS_NAV, ERR_FEE_TOO_HIGH, ERR_NO_ACCRUAL};

/// Basis points denominator
pub const BPS: u64 = 10_000;

/// Performance fee and referral share caps: 50%
pub const MAX_FEE_BPS: u64 = 5_000;

/// High-water-mark performance fee, paid as newly minted treasury shares.
#[multiversx_sc::module]
pub trait FeeCollectorModule:
    crate::share_ledger::ShareLedgerModule
    + crate::access_control::AccessControlModule
    + crate::events::EventsModule
{
    #[endpoint(setPerformanceFee)]
    fn set_performance_fee(&self, fee_bps: u64) {
        self.require_owner();
        require!(fee_bps <= MAX_FEE_BPS, ERR_FEE_TOO_HIGH);
        self.performance_fee_bps().set(fee_bps);
    }

    #[endpoint(setTreasury)]
    fn set_treasury(&self, treasury: ManagedAddress) {
        self.require_owner();
        self.treasury().set(&treasury);
    }

    /// Mints a pending accrual left behind by `reportYield`.
    #[endpoint(collectFees)]
    fn collect_fees(&self) -> BigUint {
        self.require_operator();
        require!(self.accrued_fees().get() > 0u64, ERR_NO_ACCRUAL);
        self.mint_accrued_fees()
    }

    /// Explicit way out of the degenerate state where the accrual is larger
    /// than what the fund still holds.
    #[endpoint(writeOffFeeAccrual)]
    fn write_off_fee_accrual(&self) {
        self.require_owner();
        let accrued = self.accrued_fees().take();
        require!(accrued > 0u64, ERR_NO_ACCRUAL);
        self.fee_accrual_written_off_event(&accrued);
    }

    // ========================================================
    // INTERNAL: accrual and minting
    // ========================================================

    /// Charges the fee on NAV growth above the mark, then moves the mark to
    /// the current NAV whether or not a fee was charged.
    fn accrue_performance_fee(&self) -> BigUint {
        let nav = self.total_assets().get();
        let hwm = self.high_water_mark().get();
        let fee_bps = self.performance_fee_bps().get();

        let mut fee_assets = BigUint::zero();
        if nav > hwm && fee_bps > 0 && self.total_shares().get() > 0u64 {
            let profit = &nav - &hwm;
            fee_assets = (&profit * fee_bps) / BPS;
            if fee_assets > 0u64 {
                self.accrued_fees().update(|a| *a += &fee_assets);
                self.fees_accrued_event(&profit, &nav, &fee_assets);
            }
        }

        self.high_water_mark().set(&nav);
        fee_assets
    }

    /// fee_shares = accrued × total_shares / (NAV − accrued): the dilution
    /// that hands the treasury exactly `accrued` worth at the post-mint price.
    fn mint_accrued_fees(&self) -> BigUint {
        let accrued = self.accrued_fees().get();
        if accrued == 0u64 {
            return BigUint::zero();
        }
        let total_shares = self.total_shares().get();
        if total_shares == 0u64 {
            return BigUint::zero();
        }
        let nav = self.total_assets().get();
        require!(nav > accrued, ERR_ACCRUAL_EXCEEDS_NAV);

        let fee_shares = (&accrued * &total_shares) / (&nav - &accrued);
        self.accrued_fees().clear();

        let treasury = self.treasury().get();
        if fee_shares > 0u64 {
            self.mint(&treasury, &fee_shares);
        }
        self.fees_collected_event(&treasury, &accrued, &fee_shares);
        fee_shares
    }

    // ========================================================
    // INTERNAL: moving the mark with flows
    // The mark moves by the same asset amount as NAV, so NAV − mark
    // is untouched by deposits and payouts.
    // ========================================================

    fn raise_mark_on_deposit(&self, amount: &BigUint) {
        if self.total_shares().get() == 0u64 {
            let nav_after = self.total_assets().get() + amount;
            self.high_water_mark().set(nav_after);
            return;
        }
        self.high_water_mark().update(|hwm| *hwm += amount);
    }

    fn lower_mark_on_payout(&self, assets: &BigUint) {
        self.high_water_mark().update(|hwm| {
            if *assets >= *hwm {
                *hwm = BigUint::zero();
            } else {
                *hwm -= assets;
            }
        });
    }

    // ========================================================
    // VIEWS / STORAGE
    // ========================================================

    #[view(getFeeConfig)]
    fn get_fee_config(&self) -> MultiValue3<u64, ManagedAddress, BigUint> {
        (
            self.performance_fee_bps().get(),
            self.treasury().get(),
            self.high_water_mark().get(),
        )
            .into()
    }

    #[view(getHighWaterMark)]
    #[storage_mapper("highWaterMark")]
    fn high_water_mark(&self) -> SingleValueMapper<BigUint>;

    #[view(getPerformanceFee)]
    #[storage_mapper("performanceFeeBps")]
    fn performance_fee_bps(&self) -> SingleValueMapper<u64>;

    #[view(getTreasury)]
    #[storage_mapper("treasury")]
    fn treasury(&self) -> SingleValueMapper<ManagedAddress>;
}
