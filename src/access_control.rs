multiversx_sc::imports!();

use crate::errors::{
    ERR_DEPOSITS_PAUSED, ERR_NOT_OPERATOR, ERR_NOT_OWNER, ERR_PAUSED, ERR_WITHDRAWALS_PAUSED,
};

/// Capability checks shared by every other module: owner, operators and
/// the three pause switches.
#[multiversx_sc::module]
pub trait AccessControlModule: crate::events::EventsModule {
    #[endpoint(addOperator)]
    fn add_operator(&self, operator: ManagedAddress) {
        self.require_owner();
        if self.operators().insert(operator.clone()) {
            self.operator_added_event(&operator);
        }
    }

    #[endpoint(removeOperator)]
    fn remove_operator(&self, operator: ManagedAddress) {
        self.require_owner();
        if self.operators().swap_remove(&operator) {
            self.operator_removed_event(&operator);
        }
    }

    #[endpoint(setPaused)]
    fn set_paused(&self, paused: bool) {
        self.require_operator();
        self.paused().set(paused);
        self.emit_pause_state();
    }

    #[endpoint(setDepositsPaused)]
    fn set_deposits_paused(&self, paused: bool) {
        self.require_operator();
        self.deposits_paused().set(paused);
        self.emit_pause_state();
    }

    #[endpoint(setWithdrawalsPaused)]
    fn set_withdrawals_paused(&self, paused: bool) {
        self.require_operator();
        self.withdrawals_paused().set(paused);
        self.emit_pause_state();
    }

    // ── Checks ──

    #[view(isOperator)]
    fn is_operator(&self, address: &ManagedAddress) -> bool {
        *address == self.blockchain().get_owner_address() || self.operators().contains(address)
    }

    fn require_owner(&self) {
        let caller = self.blockchain().get_caller();
        require!(caller == self.blockchain().get_owner_address(), ERR_NOT_OWNER);
    }

    fn require_operator(&self) {
        let caller = self.blockchain().get_caller();
        require!(self.is_operator(&caller), ERR_NOT_OPERATOR);
    }

    fn require_not_paused(&self) {
        require!(!self.paused().get(), ERR_PAUSED);
    }

    fn require_deposits_open(&self) {
        self.require_not_paused();
        require!(!self.deposits_paused().get(), ERR_DEPOSITS_PAUSED);
    }

    fn require_withdrawals_open(&self) {
        self.require_not_paused();
        require!(!self.withdrawals_paused().get(), ERR_WITHDRAWALS_PAUSED);
    }

    fn emit_pause_state(&self) {
        self.pause_changed_event(
            self.paused().get(),
            self.deposits_paused().get(),
            self.withdrawals_paused().get(),
        );
    }

    #[view(getPauseState)]
    fn get_pause_state(&self) -> MultiValue3<bool, bool, bool> {
        (
            self.paused().get(),
            self.deposits_paused().get(),
            self.withdrawals_paused().get(),
        )
            .into()
    }

    // ── Storage ──

    #[view(getOperators)]
    #[storage_mapper("operators")]
    fn operators(&self) -> UnorderedSetMapper<ManagedAddress>;

    #[storage_mapper("paused")]
    fn paused(&self) -> SingleValueMapper<bool>;

    #[storage_mapper("depositsPaused")]
    fn deposits_paused(&self) -> SingleValueMapper<bool>;

    #[storage_mapper("withdrawalsPaused")]
    fn withdrawals_paused(&self) -> SingleValueMapper<bool>;
}
