multiversx_sc::imports!();

use crate::errors::{ERR_ESCROW_TRANSFER, ERR_INSUFFICIENT_SHARES, ERR_PRICE_ZERO, ERR_ZERO_AMOUNT};

/// Fixed-point scale of share prices: 1e18 == one asset unit per share.
pub const PRICE_PRECISION: u64 = 1_000_000_000_000_000_000;

/// Internal share ledger. Balances are keyed by address; the contract's own
/// address is the escrow pseudo-account for pending withdrawals.
#[multiversx_sc::module]
pub trait ShareLedgerModule:
    crate::access_control::AccessControlModule + crate::events::EventsModule
{
    // ========================================================
    // ENDPOINT: transferShares
    // ========================================================

    #[endpoint(transferShares)]
    fn transfer_shares(&self, to: ManagedAddress, amount: BigUint) {
        self.require_not_paused();
        let caller = self.blockchain().get_caller();
        require!(amount > 0u64, ERR_ZERO_AMOUNT);
        require!(to != self.escrow_account(), ERR_ESCROW_TRANSFER);
        require!(self.shares(&caller).get() >= amount, ERR_INSUFFICIENT_SHARES);

        self.shares(&caller).update(|s| *s -= &amount);
        self.shares(&to).update(|s| *s += &amount);

        self.shares_transferred_event(&caller, &to, &amount);
    }

    // ========================================================
    // Price function
    // ========================================================

    /// NAV minus unclaimed fee accrual, floored at zero.
    fn net_assets(&self) -> BigUint {
        let nav = self.total_assets().get();
        let accrued = self.accrued_fees().get();
        if accrued >= nav {
            BigUint::zero()
        } else {
            nav - accrued
        }
    }

    #[view(getSharePrice)]
    fn share_price(&self) -> BigUint {
        let total_shares = self.total_shares().get();
        if total_shares == 0u64 {
            return BigUint::from(PRICE_PRECISION);
        }
        (self.net_assets() * PRICE_PRECISION) / total_shares
    }

    #[view(convertToShares)]
    fn to_shares(&self, amount: BigUint) -> BigUint {
        let total_shares = self.total_shares().get();
        if total_shares == 0u64 {
            return amount;
        }
        let net = self.net_assets();
        if net == 0u64 {
            return BigUint::zero();
        }
        (amount * total_shares) / net
    }

    #[view(convertToAssets)]
    fn to_assets(&self, shares: BigUint) -> BigUint {
        let total_shares = self.total_shares().get();
        if total_shares == 0u64 {
            return shares;
        }
        (shares * self.net_assets()) / total_shares
    }

    /// Degenerate halt: shares outstanding but nothing left to back them.
    fn require_live_price(&self) {
        if self.total_shares().get() > 0u64 {
            require!(self.net_assets() > 0u64, ERR_PRICE_ZERO);
        }
    }

    // ========================================================
    // INTERNAL: mint / burn / escrow moves
    // ========================================================

    fn mint(&self, to: &ManagedAddress, amount: &BigUint) {
        self.shares(to).update(|s| *s += amount);
        self.total_shares().update(|ts| *ts += amount);
    }

    fn burn(&self, from: &ManagedAddress, amount: &BigUint) {
        require!(self.shares(from).get() >= *amount, ERR_INSUFFICIENT_SHARES);
        self.shares(from).update(|s| *s -= amount);
        self.total_shares().update(|ts| *ts -= amount);
    }

    fn move_to_escrow(&self, holder: &ManagedAddress, amount: &BigUint) {
        require!(self.shares(holder).get() >= *amount, ERR_INSUFFICIENT_SHARES);
        let escrow = self.escrow_account();
        self.shares(holder).update(|s| *s -= amount);
        self.shares(&escrow).update(|s| *s += amount);
    }

    fn release_from_escrow(&self, holder: &ManagedAddress, amount: &BigUint) {
        let escrow = self.escrow_account();
        require!(self.shares(&escrow).get() >= *amount, ERR_INSUFFICIENT_SHARES);
        self.shares(&escrow).update(|s| *s -= amount);
        self.shares(holder).update(|s| *s += amount);
    }

    fn escrow_account(&self) -> ManagedAddress {
        self.blockchain().get_sc_address()
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getShareBalance)]
    fn get_share_balance(&self, account: &ManagedAddress) -> BigUint {
        self.shares(account).get()
    }

    #[view(getEscrowBalance)]
    fn get_escrow_balance(&self) -> BigUint {
        self.shares(&self.escrow_account()).get()
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("shares")]
    fn shares(&self, account: &ManagedAddress) -> SingleValueMapper<BigUint>;

    #[view(getTotalShares)]
    #[storage_mapper("totalShares")]
    fn total_shares(&self) -> SingleValueMapper<BigUint>;

    /// Reported NAV, moved only by deposits, payouts and accepted reports.
    #[view(getTotalAssets)]
    #[storage_mapper("totalAssets")]
    fn total_assets(&self) -> SingleValueMapper<BigUint>;

    #[view(getAccruedFees)]
    #[storage_mapper("accruedFees")]
    fn accrued_fees(&self) -> SingleValueMapper<BigUint>;
}
