multiversx_sc::imports!();

use crate::errors::{
    ERR_DISTRIBUTION_TOO_SOON, ERR_FEE_TOO_HIGH, ERR_INVALID_BATCH, ERR_INVALID_BPS,
    ERR_KOL_EXISTS, ERR_KOL_INACTIVE, ERR_KOL_NOT_FOUND, ERR_KOL_SETTLED, ERR_NOT_REFERRED,
    ERR_POOL_INSUFFICIENT,
};
use crate::fee_collector::{BPS, MAX_FEE_BPS};
use crate::share_ledger::PRICE_PRECISION;
use crate::types::{DistributionEpoch, KolProgress, KolRecord, ReferralRecord};

/// Referred depositors visited per attribution page
pub const MAX_REFERRAL_BATCH: u64 = 100;

/// KOLs settled per batch distribution call
pub const MAX_KOL_BATCH: usize = 20;

/// One page of a KOL's referred set.
pub struct AttributionPage<M: ManagedTypeApi> {
    pub yield_amount: BigUint<M>,
    pub next_index: u64,
    pub reached_end: bool,
}

/// Referral partners earn a slice of protocol fees on the price gain of the
/// depositors they brought in, measured from each depositor's entry price.
#[multiversx_sc::module]
pub trait ReferralModule:
    crate::custody::CustodyModule
    + crate::fee_collector::FeeCollectorModule
    + crate::share_ledger::ShareLedgerModule
    + crate::access_control::AccessControlModule
    + crate::events::EventsModule
{
    // ========================================================
    // KOL registry (owner)
    // ========================================================

    #[endpoint(registerKol)]
    fn register_kol(&self, kol: ManagedAddress, handle: ManagedBuffer, fee_share_bps: u64) {
        self.require_owner();
        require!(fee_share_bps <= MAX_FEE_BPS, ERR_FEE_TOO_HIGH);
        require!(self.kol(&kol).is_empty(), ERR_KOL_EXISTS);

        let record = KolRecord {
            handle: handle.clone(),
            fee_share_bps,
            active: true,
            cumulative_earned: BigUint::zero(),
        };
        self.kol(&kol).set(&record);
        self.registered_kols().insert(kol.clone());

        self.kol_registered_event(&kol, fee_share_bps, &handle);
    }

    #[endpoint(setKolActive)]
    fn set_kol_active(&self, kol: ManagedAddress, active: bool) {
        self.require_owner();
        require!(!self.kol(&kol).is_empty(), ERR_KOL_NOT_FOUND);
        self.kol(&kol).update(|record| record.active = active);
        self.kol_status_changed_event(&kol, active);
    }

    #[endpoint(setKolFeeShare)]
    fn set_kol_fee_share(&self, kol: ManagedAddress, fee_share_bps: u64) {
        self.require_owner();
        require!(fee_share_bps <= MAX_FEE_BPS, ERR_FEE_TOO_HIGH);
        require!(!self.kol(&kol).is_empty(), ERR_KOL_NOT_FOUND);
        self.kol(&kol).update(|record| record.fee_share_bps = fee_share_bps);
    }

    #[endpoint(setDistributionConfig)]
    fn set_distribution_config(&self, interval: u64, protocol_fee_bps: u64) {
        self.require_owner();
        require!(protocol_fee_bps <= BPS, ERR_INVALID_BPS);
        self.distribution_epoch().update(|epoch| {
            epoch.interval = interval;
            epoch.protocol_fee_bps = protocol_fee_bps;
        });
    }

    // ========================================================
    // Snapshots (keeper)
    // ========================================================

    #[endpoint(initializeReferral)]
    fn initialize_referral(&self, depositor: ManagedAddress) {
        self.require_operator();
        require!(!self.referrer_of(&depositor).is_empty(), ERR_NOT_REFERRED);
        self.init_snapshot(&depositor);
    }

    /// Folds shares bought since the snapshot into a size-weighted entry
    /// price. Gain already accrued on the old shares is kept.
    #[endpoint(updateReferralSnapshot)]
    fn update_referral_snapshot(&self, depositor: ManagedAddress) {
        self.require_operator();
        require!(!self.referrer_of(&depositor).is_empty(), ERR_NOT_REFERRED);

        if self.referral_record(&depositor).is_empty()
            || !self.referral_record(&depositor).get().initialized
        {
            self.init_snapshot(&depositor);
            return;
        }

        let mut record = self.referral_record(&depositor).get();
        let current = self.shares(&depositor).get();
        if current <= record.snapshot_shares {
            return;
        }

        let increment = &current - &record.snapshot_shares;
        let price = self.share_price();
        let weighted = &record.snapshot_shares * &record.entry_share_price + &increment * &price;
        record.entry_share_price = weighted / &current;
        record.snapshot_shares = current;
        self.referral_record(&depositor).set(&record);

        self.referral_snapshot_event(&depositor, &record.snapshot_shares, &record.entry_share_price);
    }

    // ========================================================
    // Fee pool and distribution
    // ========================================================

    #[payable("*")]
    #[endpoint(fundReferralPool)]
    fn fund_referral_pool(&self) {
        self.require_operator();
        let amount = self.receive_asset();
        self.referral_pool().update(|pool| *pool += &amount);
        let caller = self.blockchain().get_caller();
        self.referral_pool_funded_event(&caller, &amount);
    }

    #[endpoint(distribute)]
    fn distribute(&self, kol: ManagedAddress) -> BigUint {
        self.require_not_paused();
        self.require_distribution_window();
        self.distribute_kol(&kol, true)
    }

    /// Settles up to MAX_KOL_BATCH partners. A partner that cannot be paid
    /// is skipped so it cannot block the others.
    #[endpoint(distributeBatch)]
    fn distribute_batch(&self, kols: MultiValueEncoded<ManagedAddress>) -> BigUint {
        self.require_not_paused();
        self.require_distribution_window();
        require!(
            !kols.is_empty() && kols.len() <= MAX_KOL_BATCH,
            ERR_INVALID_BATCH
        );

        let mut total = BigUint::zero();
        for kol in kols.into_iter() {
            total += self.distribute_kol(&kol, false);
        }
        total
    }

    /// Closes the epoch: whatever the pool still holds goes to treasury and
    /// the distribution clock restarts.
    #[endpoint(finalizeEpoch)]
    fn finalize_epoch(&self) -> BigUint {
        self.require_operator();
        self.require_distribution_window();

        let swept = self.referral_pool().take();
        let treasury = self.treasury().get();
        self.send_asset(&treasury, &swept);

        let mut epoch = self.distribution_epoch().get();
        let closed_id = epoch.id;
        epoch.id += 1;
        epoch.last_distribution_time = self.blockchain().get_block_timestamp();
        self.distribution_epoch().set(epoch);

        self.epoch_finalized_event(closed_id, &treasury, &swept);
        swept
    }

    // ========================================================
    // INTERNAL: referral bookkeeping on deposit
    // Never fails: a bad referrer is ignored, the deposit goes on.
    // ========================================================

    fn record_referral(&self, depositor: &ManagedAddress, referrer: OptionalValue<ManagedAddress>) {
        let referrer = match referrer {
            OptionalValue::Some(referrer) => referrer,
            OptionalValue::None => return,
        };
        if !self.referrer_of(depositor).is_empty() || referrer == *depositor {
            return;
        }
        if self.kol(&referrer).is_empty() || !self.kol(&referrer).get().active {
            return;
        }

        self.referrer_of(depositor).set(&referrer);
        self.kol_referrals(&referrer).insert(depositor.clone());
        self.init_snapshot(depositor);

        self.referral_set_event(depositor, &referrer);
    }

    fn init_snapshot(&self, depositor: &ManagedAddress) {
        if !self.referral_record(depositor).is_empty()
            && self.referral_record(depositor).get().initialized
        {
            return;
        }
        let record = ReferralRecord {
            snapshot_shares: self.shares(depositor).get(),
            entry_share_price: self.share_price(),
            initialized: true,
        };
        self.referral_record(depositor).set(&record);

        self.referral_snapshot_event(depositor, &record.snapshot_shares, &record.entry_share_price);
    }

    // ========================================================
    // INTERNAL: attribution
    // ========================================================

    /// min(current, snapshot) × price gain. A top-up after the snapshot
    /// earns nothing until the keeper folds it in at the then-current price.
    fn attributable_for(&self, depositor: &ManagedAddress, price: &BigUint) -> BigUint {
        if self.referral_record(depositor).is_empty() {
            return BigUint::zero();
        }
        let record = self.referral_record(depositor).get();
        if !record.initialized || *price <= record.entry_share_price {
            return BigUint::zero();
        }
        let effective = self.effective_shares(depositor, &record);
        (effective * &(price - &record.entry_share_price)) / PRICE_PRECISION
    }

    fn effective_shares(
        &self,
        depositor: &ManagedAddress,
        record: &ReferralRecord<Self::Api>,
    ) -> BigUint {
        let current = self.shares(depositor).get();
        if current < record.snapshot_shares {
            current
        } else {
            record.snapshot_shares.clone()
        }
    }

    fn attribute_page(&self, kol: &ManagedAddress, from_index: u64) -> AttributionPage<Self::Api> {
        let referrals = self.kol_referrals(kol);
        let len = referrals.len() as u64;
        let price = self.share_price();
        let end = core::cmp::min(from_index + MAX_REFERRAL_BATCH - 1, len);

        let mut yield_amount = BigUint::zero();
        for index in from_index..=end {
            let depositor = referrals.get_by_index(index as usize);
            yield_amount += self.attributable_for(&depositor, &price);
        }

        AttributionPage {
            yield_amount,
            next_index: end + 1,
            reached_end: end >= len,
        }
    }

    /// Gain paid for a page is consumed: entries move up to the current
    /// price and snapshots ratchet down to the shares that earned it.
    fn rebase_page(&self, kol: &ManagedAddress, from_index: u64, to_index: u64) {
        let referrals = self.kol_referrals(kol);
        let price = self.share_price();
        for index in from_index..to_index {
            let depositor = referrals.get_by_index(index as usize);
            if self.referral_record(&depositor).is_empty() {
                continue;
            }
            let mut record = self.referral_record(&depositor).get();
            if !record.initialized {
                continue;
            }
            record.snapshot_shares = self.effective_shares(&depositor, &record);
            if price > record.entry_share_price {
                record.entry_share_price = price.clone();
            }
            self.referral_record(&depositor).set(&record);
        }
    }

    fn kol_payout(&self, attributable: &BigUint, fee_share_bps: u64) -> BigUint {
        let protocol_fee_bps = self.distribution_epoch().get().protocol_fee_bps;
        (attributable * protocol_fee_bps * fee_share_bps) / (BPS * BPS)
    }

    fn current_progress(&self, kol: &ManagedAddress, epoch_id: u64) -> KolProgress {
        if !self.kol_progress(kol).is_empty() {
            let progress = self.kol_progress(kol).get();
            if progress.epoch_id == epoch_id {
                return progress;
            }
        }
        KolProgress {
            epoch_id,
            next_index: 1,
            settled: false,
        }
    }

    /// `strict` turns every skip reason into a rejection.
    fn distribute_kol(&self, kol: &ManagedAddress, strict: bool) -> BigUint {
        if self.kol(kol).is_empty() {
            require!(!strict, ERR_KOL_NOT_FOUND);
            return BigUint::zero();
        }
        let mut record = self.kol(kol).get();
        if !record.active {
            require!(!strict, ERR_KOL_INACTIVE);
            return BigUint::zero();
        }

        let epoch_id = self.distribution_epoch().get().id;
        let mut progress = self.current_progress(kol, epoch_id);
        if progress.settled {
            require!(!strict, ERR_KOL_SETTLED);
            return BigUint::zero();
        }

        let page = self.attribute_page(kol, progress.next_index);
        let payout = self.kol_payout(&page.yield_amount, record.fee_share_bps);
        if payout > self.referral_pool().get() {
            require!(!strict, ERR_POOL_INSUFFICIENT);
            return BigUint::zero();
        }

        self.rebase_page(kol, progress.next_index, page.next_index);
        if page.reached_end {
            progress.next_index = 1;
            progress.settled = true;
        } else {
            progress.next_index = page.next_index;
        }
        self.kol_progress(kol).set(progress);

        self.referral_pool().update(|pool| *pool -= &payout);
        record.cumulative_earned += &payout;
        self.kol(kol).set(&record);
        self.send_asset(kol, &payout);

        self.kol_distribution_event(kol, epoch_id, &page.yield_amount, &payout);
        payout
    }

    fn require_distribution_window(&self) {
        let epoch = self.distribution_epoch().get();
        let now = self.blockchain().get_block_timestamp();
        require!(
            now >= epoch.last_distribution_time + epoch.interval,
            ERR_DISTRIBUTION_TOO_SOON
        );
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(computeAttributableYield)]
    fn compute_attributable_yield(&self, kol: ManagedAddress) -> MultiValue2<BigUint, u64> {
        let epoch_id = self.distribution_epoch().get().id;
        let progress = self.current_progress(&kol, epoch_id);
        let page = self.attribute_page(&kol, progress.next_index);
        (page.yield_amount, page.next_index).into()
    }

    /// Payout of the next page only: at most MAX_REFERRAL_BATCH referred
    /// depositors from the KOL's cursor in the current epoch. A KOL with a
    /// longer list is paid over several `distribute` calls.
    #[view(previewKolEarnings)]
    fn preview_kol_earnings(&self, kol: ManagedAddress) -> BigUint {
        if self.kol(&kol).is_empty() {
            return BigUint::zero();
        }
        let record = self.kol(&kol).get();
        let epoch_id = self.distribution_epoch().get().id;
        if !record.active || self.current_progress(&kol, epoch_id).settled {
            return BigUint::zero();
        }
        let (attributable, _) = self.compute_attributable_yield(kol).into_tuple();
        self.kol_payout(&attributable, record.fee_share_bps)
    }

    #[view(getKol)]
    fn get_kol(&self, kol: ManagedAddress) -> KolRecord<Self::Api> {
        require!(!self.kol(&kol).is_empty(), ERR_KOL_NOT_FOUND);
        self.kol(&kol).get()
    }

    #[view(getReferrer)]
    fn get_referrer(&self, depositor: ManagedAddress) -> OptionalValue<ManagedAddress> {
        if self.referrer_of(&depositor).is_empty() {
            OptionalValue::None
        } else {
            OptionalValue::Some(self.referrer_of(&depositor).get())
        }
    }

    #[view(getReferralRecord)]
    fn get_referral_record(&self, depositor: ManagedAddress) -> ReferralRecord<Self::Api> {
        if self.referral_record(&depositor).is_empty() {
            return ReferralRecord {
                snapshot_shares: BigUint::zero(),
                entry_share_price: BigUint::zero(),
                initialized: false,
            };
        }
        self.referral_record(&depositor).get()
    }

    #[view(getKolReferrals)]
    fn get_kol_referrals(
        &self,
        kol: ManagedAddress,
        from: u64,
        count: u64,
    ) -> MultiValueEncoded<ManagedAddress> {
        let mut result = MultiValueEncoded::new();
        let referrals = self.kol_referrals(&kol);
        let total = referrals.len() as u64;
        if count == 0 || total == 0 {
            return result;
        }
        let start = if from == 0 { 1u64 } else { from };
        if start > total {
            return result;
        }
        let end = core::cmp::min(start.saturating_add(count - 1), total);
        for index in start..=end {
            result.push(referrals.get_by_index(index as usize));
        }
        result
    }

    #[view(getKolProgress)]
    fn get_kol_progress(&self, kol: ManagedAddress) -> KolProgress {
        let epoch_id = self.distribution_epoch().get().id;
        self.current_progress(&kol, epoch_id)
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("referrerOf")]
    fn referrer_of(&self, depositor: &ManagedAddress) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("referralRecord")]
    fn referral_record(
        &self,
        depositor: &ManagedAddress,
    ) -> SingleValueMapper<ReferralRecord<Self::Api>>;

    #[storage_mapper("kol")]
    fn kol(&self, kol: &ManagedAddress) -> SingleValueMapper<KolRecord<Self::Api>>;

    #[storage_mapper("kolReferrals")]
    fn kol_referrals(&self, kol: &ManagedAddress) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("kolProgress")]
    fn kol_progress(&self, kol: &ManagedAddress) -> SingleValueMapper<KolProgress>;

    #[view(getRegisteredKols)]
    #[storage_mapper("registeredKols")]
    fn registered_kols(&self) -> UnorderedSetMapper<ManagedAddress>;

    #[view(getDistributionEpoch)]
    #[storage_mapper("distributionEpoch")]
    fn distribution_epoch(&self) -> SingleValueMapper<DistributionEpoch>;
}
