multiversx_sc::imports!();

use crate::errors::{ERR_WRONG_TOKEN, ERR_ZERO_AMOUNT};

/// Physical custody of the asset token: what can be paid out right now,
/// and the execution counterparty that deploys everything above the buffer.
#[multiversx_sc::module]
pub trait CustodyModule:
    crate::access_control::AccessControlModule + crate::events::EventsModule
{
    #[endpoint(setStrategy)]
    fn set_strategy(&self, strategy: ManagedAddress) {
        self.require_owner();
        self.strategy_address().set(&strategy);
    }

    #[endpoint(setCustodyBuffer)]
    fn set_custody_buffer(&self, buffer: BigUint) {
        self.require_owner();
        self.custody_buffer().set(&buffer);
    }

    /// Capital coming back from the strategy. Does not move NAV: the
    /// reported figure already includes deployed capital.
    #[payable("*")]
    #[endpoint(returnLiquidity)]
    fn return_liquidity(&self) {
        self.require_operator();
        let amount = self.receive_asset();
        let caller = self.blockchain().get_caller();
        self.liquidity_returned_event(&caller, &amount);
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    /// Validates the single asset payment of the current call.
    fn receive_asset(&self) -> BigUint {
        let (token_id, amount) = self.call_value().single_fungible_esdt();
        require!(token_id == self.asset_token().get(), ERR_WRONG_TOKEN);
        require!(amount > 0u64, ERR_ZERO_AMOUNT);
        amount
    }

    fn custody_balance(&self) -> BigUint {
        let token = EgldOrEsdtTokenIdentifier::esdt(self.asset_token().get());
        self.blockchain().get_sc_balance(&token, 0)
    }

    /// Custody balance not earmarked for the referral pool.
    fn available_liquidity(&self) -> BigUint {
        let balance = self.custody_balance();
        let reserved = self.referral_pool().get();
        if reserved >= balance {
            BigUint::zero()
        } else {
            balance - reserved
        }
    }

    fn forward_excess_to_strategy(&self) {
        if self.strategy_address().is_empty() {
            return;
        }
        let liquidity = self.available_liquidity();
        let buffer = self.custody_buffer().get();
        if liquidity <= buffer {
            return;
        }
        let excess = liquidity - buffer;
        let strategy = self.strategy_address().get();
        self.send_asset(&strategy, &excess);
        self.custody_forwarded_event(&strategy, &excess);
    }

    fn send_asset(&self, to: &ManagedAddress, amount: &BigUint) {
        if *amount == 0u64 {
            return;
        }
        let token = self.asset_token().get();
        self.send().direct_esdt(to, &token, 0, amount);
    }

    #[view(getLiquidity)]
    fn get_liquidity(&self) -> BigUint {
        self.available_liquidity()
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[view(getAssetToken)]
    #[storage_mapper("assetToken")]
    fn asset_token(&self) -> SingleValueMapper<TokenIdentifier>;

    #[view(getStrategy)]
    #[storage_mapper("strategyAddress")]
    fn strategy_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[view(getCustodyBuffer)]
    #[storage_mapper("custodyBuffer")]
    fn custody_buffer(&self) -> SingleValueMapper<BigUint>;

    /// Segregated referral fee pool, held in custody but outside NAV.
    #[view(getReferralPool)]
    #[storage_mapper("referralPool")]
    fn referral_pool(&self) -> SingleValueMapper<BigUint>;
}
