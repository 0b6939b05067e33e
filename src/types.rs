multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Withdrawal Status: request lifecycle
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum WithdrawalStatus {
    /// Shares sit in escrow waiting for fulfillment.
    Pending,
    /// Shares burned and assets paid. Terminal.
    Fulfilled,
    /// Escrow released back to the requester. Terminal.
    Cancelled,
}

// ============================================================
// Withdrawal Request: one queue slot, never removed
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct WithdrawalRequest<M: ManagedTypeApi> {
    pub id: u64,
    pub requester: ManagedAddress<M>,
    /// Escrowed shares; zeroed once the request is closed
    pub share_amount: BigUint<M>,
    pub request_timestamp: u64,
    pub status: WithdrawalStatus,
}

impl<M: ManagedTypeApi> WithdrawalRequest<M> {
    pub fn is_pending(&self) -> bool {
        self.status == WithdrawalStatus::Pending && self.share_amount > 0u64
    }

    pub fn close(&mut self, status: WithdrawalStatus) {
        self.share_amount = BigUint::zero();
        self.status = status;
    }
}

// ============================================================
// Referral Record: entry point of a referred depositor
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct ReferralRecord<M: ManagedTypeApi> {
    pub snapshot_shares: BigUint<M>,
    /// Size-weighted entry price, scaled by PRICE_PRECISION
    pub entry_share_price: BigUint<M>,
    pub initialized: bool,
}

// ============================================================
// KOL Record: referral partner registry entry
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct KolRecord<M: ManagedTypeApi> {
    pub handle: ManagedBuffer<M>,
    pub fee_share_bps: u64,
    pub active: bool,
    pub cumulative_earned: BigUint<M>,
}

/// Pagination state of one KOL inside a distribution epoch.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub struct KolProgress {
    pub epoch_id: u64,
    /// 1-based index of the next referred depositor to visit
    pub next_index: u64,
    pub settled: bool,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub struct DistributionEpoch {
    pub id: u64,
    pub last_distribution_time: u64,
    pub interval: u64,
    pub protocol_fee_bps: u64,
}
