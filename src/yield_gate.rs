multiversx_sc::imports!();

use crate::errors::{ERR_INVALID_BPS, ERR_LOSS_EXCEEDS_NAV, ERR_REPORT_TOO_LARGE, ERR_REPORT_TOO_SOON};
use crate::fee_collector::BPS;

/// Default minimum spacing between yield reports: 1 day
pub const DEFAULT_MIN_REPORT_INTERVAL: u64 = 86_400;

/// Default maximum NAV change per report: 1%
pub const DEFAULT_MAX_CHANGE_BPS: u64 = 100;

/// Rate- and magnitude-bounds the reporting authority before a figure
/// reaches the ledger.
#[multiversx_sc::module]
pub trait YieldGateModule:
    crate::fee_collector::FeeCollectorModule
    + crate::share_ledger::ShareLedgerModule
    + crate::access_control::AccessControlModule
    + crate::events::EventsModule
{
    // ========================================================
    // ENDPOINT: reportYieldAndCollectFees
    // ========================================================

    #[endpoint(reportYieldAndCollectFees)]
    fn report_yield_and_collect_fees(&self, delta: BigInt) -> BigUint {
        self.require_owner();
        self.apply_yield_report(&delta);
        self.accrue_performance_fee();
        // a loss that leaves the accrual at or above NAV is still recorded;
        // the price stays at zero until the accrual is written off
        if self.accrued_fees().get() >= self.total_assets().get() {
            return BigUint::zero();
        }
        self.mint_accrued_fees()
    }

    /// Applies and accrues without minting; `collectFees` mints later.
    #[endpoint(reportYield)]
    fn report_yield(&self, delta: BigInt) -> BigUint {
        self.require_owner();
        self.apply_yield_report(&delta);
        self.accrue_performance_fee()
    }

    #[endpoint(setReportLimits)]
    fn set_report_limits(&self, min_report_interval: u64, max_change_bps: u64) {
        self.require_owner();
        require!(max_change_bps <= BPS, ERR_INVALID_BPS);
        self.min_report_interval().set(min_report_interval);
        self.max_change_bps().set(max_change_bps);
    }

    #[endpoint(setReportGateEnabled)]
    fn set_report_gate_enabled(&self, enabled: bool) {
        self.require_owner();
        self.report_gate_enabled().set(enabled);
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn apply_yield_report(&self, delta: &BigInt) {
        let now = self.blockchain().get_block_timestamp();
        let nav = self.total_assets().get();
        let (sign, magnitude) = delta.clone().to_parts();

        if self.report_gate_enabled().get() {
            self.check_report_interval(now);
            let bound = &nav * self.max_change_bps().get();
            require!(&magnitude * BPS <= bound, ERR_REPORT_TOO_LARGE);
        }

        let new_nav = match sign {
            Sign::Minus => {
                require!(magnitude <= nav, ERR_LOSS_EXCEEDS_NAV);
                nav - magnitude
            },
            _ => nav + magnitude,
        };

        self.total_assets().set(&new_nav);
        self.accumulated_yield().update(|y| *y += delta);
        self.last_report_time().set(now);

        let caller = self.blockchain().get_caller();
        self.yield_reported_event(&caller, delta, &new_nav);
    }

    fn check_report_interval(&self, now: u64) {
        let last = self.last_report_time().get();
        // first report has nothing to be spaced from
        if last == 0 {
            return;
        }
        require!(
            now >= last + self.min_report_interval().get(),
            ERR_REPORT_TOO_SOON
        );
    }

    // ========================================================
    // VIEWS / STORAGE
    // ========================================================

    #[view(getNavState)]
    fn get_nav_state(&self) -> MultiValue6<BigUint, BigInt, u64, u64, u64, bool> {
        (
            self.total_assets().get(),
            self.accumulated_yield().get(),
            self.last_report_time().get(),
            self.max_change_bps().get(),
            self.min_report_interval().get(),
            self.report_gate_enabled().get(),
        )
            .into()
    }

    #[storage_mapper("accumulatedYield")]
    fn accumulated_yield(&self) -> SingleValueMapper<BigInt>;

    #[storage_mapper("lastReportTime")]
    fn last_report_time(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("minReportInterval")]
    fn min_report_interval(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("maxChangeBps")]
    fn max_change_bps(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("reportGateEnabled")]
    fn report_gate_enabled(&self) -> SingleValueMapper<bool>;
}
