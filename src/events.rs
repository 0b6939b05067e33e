multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait EventsModule {
    // ── Share ledger / processor ──

    #[event("deposit")]
    fn deposit_event(
        &self,
        #[indexed] depositor: &ManagedAddress,
        #[indexed] amount: &BigUint,
        shares: &BigUint,
    );

    #[event("sharesTransferred")]
    fn shares_transferred_event(
        &self,
        #[indexed] from: &ManagedAddress,
        #[indexed] to: &ManagedAddress,
        shares: &BigUint,
    );

    #[event("custodyForwarded")]
    fn custody_forwarded_event(&self, #[indexed] strategy: &ManagedAddress, amount: &BigUint);

    #[event("liquidityReturned")]
    fn liquidity_returned_event(&self, #[indexed] from: &ManagedAddress, amount: &BigUint);

    // ── Withdrawal queue ──

    #[event("withdrawalRequested")]
    fn withdrawal_requested_event(
        &self,
        #[indexed] request_id: u64,
        #[indexed] requester: &ManagedAddress,
        #[indexed] timestamp: u64,
        shares: &BigUint,
    );

    #[event("withdrawalFulfilled")]
    fn withdrawal_fulfilled_event(
        &self,
        #[indexed] request_id: u64,
        #[indexed] requester: &ManagedAddress,
        #[indexed] shares: &BigUint,
        assets: &BigUint,
    );

    #[event("withdrawalForceProcessed")]
    fn withdrawal_force_processed_event(
        &self,
        #[indexed] request_id: u64,
        #[indexed] operator: &ManagedAddress,
        assets: &BigUint,
    );

    #[event("withdrawalCancelled")]
    fn withdrawal_cancelled_event(
        &self,
        #[indexed] request_id: u64,
        #[indexed] caller: &ManagedAddress,
        shares: &BigUint,
    );

    #[event("fulfillmentStopped")]
    fn fulfillment_stopped_event(
        &self,
        #[indexed] request_id: u64,
        #[indexed] required: &BigUint,
        available: &BigUint,
    );

    // ── Fees / yield ──

    #[event("yieldReported")]
    fn yield_reported_event(
        &self,
        #[indexed] reporter: &ManagedAddress,
        #[indexed] delta: &BigInt,
        total_assets: &BigUint,
    );

    #[event("feesAccrued")]
    fn fees_accrued_event(
        &self,
        #[indexed] profit: &BigUint,
        #[indexed] high_water_mark: &BigUint,
        fee_assets: &BigUint,
    );

    #[event("feesCollected")]
    fn fees_collected_event(
        &self,
        #[indexed] treasury: &ManagedAddress,
        #[indexed] fee_assets: &BigUint,
        fee_shares: &BigUint,
    );

    #[event("feeAccrualWrittenOff")]
    fn fee_accrual_written_off_event(&self, amount: &BigUint);

    // ── Referral ──

    #[event("referralSet")]
    fn referral_set_event(&self, #[indexed] depositor: &ManagedAddress, kol: &ManagedAddress);

    #[event("referralSnapshot")]
    fn referral_snapshot_event(
        &self,
        #[indexed] depositor: &ManagedAddress,
        #[indexed] snapshot_shares: &BigUint,
        entry_share_price: &BigUint,
    );

    #[event("kolRegistered")]
    fn kol_registered_event(
        &self,
        #[indexed] kol: &ManagedAddress,
        #[indexed] fee_share_bps: u64,
        handle: &ManagedBuffer,
    );

    #[event("kolStatusChanged")]
    fn kol_status_changed_event(&self, #[indexed] kol: &ManagedAddress, active: bool);

    #[event("kolDistribution")]
    fn kol_distribution_event(
        &self,
        #[indexed] kol: &ManagedAddress,
        #[indexed] epoch_id: u64,
        #[indexed] attributable_yield: &BigUint,
        payout: &BigUint,
    );

    #[event("referralPoolFunded")]
    fn referral_pool_funded_event(&self, #[indexed] from: &ManagedAddress, amount: &BigUint);

    #[event("epochFinalized")]
    fn epoch_finalized_event(
        &self,
        #[indexed] epoch_id: u64,
        #[indexed] treasury: &ManagedAddress,
        swept: &BigUint,
    );

    // ── Access control ──

    #[event("operatorAdded")]
    fn operator_added_event(&self, #[indexed] operator: &ManagedAddress);

    #[event("operatorRemoved")]
    fn operator_removed_event(&self, #[indexed] operator: &ManagedAddress);

    #[event("pauseChanged")]
    fn pause_changed_event(
        &self,
        #[indexed] paused: bool,
        #[indexed] deposits_paused: bool,
        withdrawals_paused: bool,
    );
}
