multiversx_sc::imports!();

use crate::errors::{
    ERR_ESCROW_SHORTFALL, ERR_INSUFFICIENT_LIQUIDITY, ERR_INVALID_BATCH,
    ERR_REQUEST_NOT_FOUND, ERR_REQUEST_NOT_PENDING,
};
use crate::types::{WithdrawalRequest, WithdrawalStatus};

/// Upper bound of queue entries examined per fulfillment call
pub const MAX_FULFILL_BATCH: u64 = 50;

/// Settlement of a single request, shared by the ordered and forced paths.
pub struct Settlement<M: ManagedTypeApi> {
    pub shares: BigUint<M>,
    pub assets: BigUint<M>,
}

// ============================================================
// FIFO withdrawal queue. Requests are never removed: a closed
// request keeps its slot with share_amount == 0.
// ============================================================

#[multiversx_sc::module]
pub trait WithdrawalQueueModule:
    crate::custody::CustodyModule
    + crate::fee_collector::FeeCollectorModule
    + crate::share_ledger::ShareLedgerModule
    + crate::access_control::AccessControlModule
    + crate::events::EventsModule
{
    // ========================================================
    // ENDPOINT: fulfillWithdrawals
    // Strict arrival order. A request that cannot be paid from
    // current liquidity halts the scan; nothing behind it is paid.
    // ========================================================

    #[endpoint(fulfillWithdrawals)]
    fn fulfill_withdrawals(&self, max_count: u64) -> MultiValue2<u64, BigUint> {
        self.require_operator();
        self.require_withdrawals_open();
        require!(
            max_count > 0 && max_count <= MAX_FULFILL_BATCH,
            ERR_INVALID_BATCH
        );

        let now = self.blockchain().get_block_timestamp();
        let cooldown = self.withdrawal_cooldown().get();
        let queue_len = self.withdrawal_requests().len() as u64;
        let mut head = core::cmp::max(self.queue_head().get(), 1);
        let mut processed = 0u64;
        let mut assets_paid = BigUint::zero();

        let mut examined = 0u64;
        while examined < max_count && head <= queue_len {
            examined += 1;
            let mut request = self.withdrawal_requests().get(head as usize);

            if !request.is_pending() {
                head += 1;
                continue;
            }

            // Cooldown ends in arrival order only while the parameter is
            // unchanged, so wait here instead of stepping past the elder entry.
            if now < request.request_timestamp + cooldown {
                break;
            }

            let settlement = self.settlement_for(&request);
            let available = self.available_liquidity();
            if settlement.assets > available {
                self.fulfillment_stopped_event(request.id, &settlement.assets, &available);
                break;
            }

            self.settle(&mut request, &settlement);
            self.withdrawal_fulfilled_event(
                request.id,
                &request.requester,
                &settlement.shares,
                &settlement.assets,
            );

            assets_paid += &settlement.assets;
            processed += 1;
            head += 1;
        }

        self.queue_head().set(head);
        (processed, assets_paid).into()
    }

    // ========================================================
    // ENDPOINT: forceProcessWithdrawal
    // Emergency out-of-order settlement of one request. Ignores
    // cooldown, never pays past liquidity.
    // ========================================================

    #[endpoint(forceProcessWithdrawal)]
    fn force_process_withdrawal(&self, request_id: u64) -> BigUint {
        self.require_operator();
        let mut request = self.pending_request(request_id);

        let settlement = self.settlement_for(&request);
        require!(
            settlement.assets <= self.available_liquidity(),
            ERR_INSUFFICIENT_LIQUIDITY
        );

        self.settle(&mut request, &settlement);

        let caller = self.blockchain().get_caller();
        self.withdrawal_force_processed_event(request_id, &caller, &settlement.assets);
        settlement.assets
    }

    // ========================================================
    // ENDPOINT: cancelWithdrawal
    // Emergency release of one request. Escrow goes back to the
    // requester; nothing is paid.
    // ========================================================

    #[endpoint(cancelWithdrawal)]
    fn cancel_withdrawal(&self, request_id: u64) {
        self.require_operator();
        let caller = self.blockchain().get_caller();
        let mut request = self.pending_request(request_id);

        let shares = request.share_amount.clone();
        self.release_from_escrow(&request.requester, &shares);
        self.pending_total_shares().update(|p| *p -= &shares);

        request.close(WithdrawalStatus::Cancelled);
        self.withdrawal_requests().set(request_id as usize, &request);

        self.withdrawal_cancelled_event(request_id, &caller, &shares);
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    /// Appends a request and moves its shares into escrow. Escrowed shares
    /// stay in total_shares and keep following the price.
    fn enqueue_withdrawal(&self, requester: &ManagedAddress, shares: &BigUint) -> u64 {
        self.move_to_escrow(requester, shares);
        self.pending_total_shares().update(|p| *p += shares);

        let request_id = self.withdrawal_requests().len() as u64 + 1;
        let timestamp = self.blockchain().get_block_timestamp();
        let request = WithdrawalRequest {
            id: request_id,
            requester: requester.clone(),
            share_amount: shares.clone(),
            request_timestamp: timestamp,
            status: WithdrawalStatus::Pending,
        };
        self.withdrawal_requests().push(&request);

        self.withdrawal_requested_event(request_id, requester, timestamp, shares);
        request_id
    }

    fn pending_request(&self, request_id: u64) -> WithdrawalRequest<Self::Api> {
        require!(
            request_id > 0 && request_id <= self.withdrawal_requests().len() as u64,
            ERR_REQUEST_NOT_FOUND
        );
        let request = self.withdrawal_requests().get(request_id as usize);
        require!(request.is_pending(), ERR_REQUEST_NOT_PENDING);
        request
    }

    /// Sellable shares never exceed what escrow actually holds.
    fn settlement_for(&self, request: &WithdrawalRequest<Self::Api>) -> Settlement<Self::Api> {
        let escrowed = self.get_escrow_balance();
        let shares = if request.share_amount > escrowed {
            escrowed
        } else {
            request.share_amount.clone()
        };
        let assets = self.to_assets(shares.clone());
        Settlement { shares, assets }
    }

    fn settle(
        &self,
        request: &mut WithdrawalRequest<Self::Api>,
        settlement: &Settlement<Self::Api>,
    ) {
        self.lower_mark_on_payout(&settlement.assets);

        let escrow = self.escrow_account();
        self.burn(&escrow, &settlement.shares);
        self.total_assets().update(|nav| *nav -= &settlement.assets);
        self.pending_total_shares()
            .update(|p| *p -= &request.share_amount);

        request.close(WithdrawalStatus::Fulfilled);
        self.withdrawal_requests().set(request.id as usize, &*request);

        self.send_asset(&request.requester, &settlement.assets);
        self.require_escrow_covered();
    }

    fn require_escrow_covered(&self) {
        require!(
            self.get_escrow_balance() >= self.pending_total_shares().get(),
            ERR_ESCROW_SHORTFALL
        );
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getWithdrawalRequest)]
    fn get_withdrawal_request(&self, request_id: u64) -> MultiValue3<ManagedAddress, BigUint, u64> {
        require!(
            request_id > 0 && request_id <= self.withdrawal_requests().len() as u64,
            ERR_REQUEST_NOT_FOUND
        );
        let request = self.withdrawal_requests().get(request_id as usize);
        (request.requester, request.share_amount, request.request_timestamp).into()
    }

    #[view(getWithdrawalStatus)]
    fn get_withdrawal_status(&self, request_id: u64) -> WithdrawalStatus {
        require!(
            request_id > 0 && request_id <= self.withdrawal_requests().len() as u64,
            ERR_REQUEST_NOT_FOUND
        );
        self.withdrawal_requests().get(request_id as usize).status
    }

    #[view(getQueueState)]
    fn get_queue_state(&self) -> MultiValue3<u64, u64, BigUint> {
        (
            self.queue_head().get(),
            self.withdrawal_requests().len() as u64,
            self.pending_total_shares().get(),
        )
            .into()
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("withdrawalRequests")]
    fn withdrawal_requests(&self) -> VecMapper<WithdrawalRequest<Self::Api>>;

    /// Index of the first entry not yet known to be closed
    #[storage_mapper("queueHead")]
    fn queue_head(&self) -> SingleValueMapper<u64>;

    #[view(getPendingTotalShares)]
    #[storage_mapper("pendingTotalShares")]
    fn pending_total_shares(&self) -> SingleValueMapper<BigUint>;

    #[view(getWithdrawalCooldown)]
    #[storage_mapper("withdrawalCooldown")]
    fn withdrawal_cooldown(&self) -> SingleValueMapper<u64>;
}
