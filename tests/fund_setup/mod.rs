// Shared whitebox harness for the pooled fund tests.
#![allow(dead_code)]

use multiversx_sc::codec::multi_types::OptionalValue;
use multiversx_sc::types::{Address, BigInt};
use multiversx_sc_scenario::{
    managed_address, managed_biguint, managed_token_id, rust_biguint, whitebox_legacy::*,
    DebugApi,
};

use pooled_fund::access_control::AccessControlModule;
use pooled_fund::fee_collector::FeeCollectorModule;
use pooled_fund::share_ledger::ShareLedgerModule;
use pooled_fund::types::WithdrawalStatus;
use pooled_fund::withdrawal_queue::WithdrawalQueueModule;
use pooled_fund::yield_gate::YieldGateModule;
use pooled_fund::PooledFund;

pub const WASM_PATH: &str = "output/pooled-fund.wasm";
pub const ASSET: &[u8] = b"USDC-abcdef";
pub const OTHER_TOKEN: &[u8] = b"WEGLD-abcdef";
pub const DAY: u64 = 86_400;
pub const START: u64 = 1_000_000;
pub const PROTOCOL_FEE_BPS: u64 = 2_000;
pub const OPERATOR_FUNDS: u64 = 10_000_000;

pub struct FundSetup<Builder>
where
    Builder: 'static + Copy + Fn() -> pooled_fund::ContractObj<DebugApi>,
{
    pub b_mock: BlockchainStateWrapper,
    pub owner: Address,
    pub operator: Address,
    pub treasury: Address,
    pub fund: ContractObjWrapper<pooled_fund::ContractObj<DebugApi>, Builder>,
}

pub fn setup_fund<Builder>(
    builder: Builder,
    performance_fee_bps: u64,
    cooldown: u64,
) -> FundSetup<Builder>
where
    Builder: 'static + Copy + Fn() -> pooled_fund::ContractObj<DebugApi>,
{
    let rust_zero = rust_biguint!(0u64);
    let mut b_mock = BlockchainStateWrapper::new();
    let owner = b_mock.create_user_account(&rust_zero);
    let operator = b_mock.create_user_account(&rust_zero);
    let treasury = b_mock.create_user_account(&rust_zero);
    b_mock.set_esdt_balance(&operator, ASSET, &rust_biguint!(OPERATOR_FUNDS));

    let fund = b_mock.create_sc_account(&rust_zero, Some(&owner), builder, WASM_PATH);

    b_mock.set_block_timestamp(START);
    b_mock
        .execute_tx(&owner, &fund, &rust_zero, |sc| {
            sc.init(
                managed_token_id!(ASSET),
                managed_address!(&treasury),
                performance_fee_bps,
                cooldown,
                PROTOCOL_FEE_BPS,
                DAY,
            );
            sc.add_operator(managed_address!(&operator));
        })
        .assert_ok();

    FundSetup {
        b_mock,
        owner,
        operator,
        treasury,
        fund,
    }
}

impl<Builder> FundSetup<Builder>
where
    Builder: 'static + Copy + Fn() -> pooled_fund::ContractObj<DebugApi>,
{
    pub fn new_user(&mut self, asset_balance: u64) -> Address {
        let user = self.b_mock.create_user_account(&rust_biguint!(0u64));
        self.b_mock
            .set_esdt_balance(&user, ASSET, &rust_biguint!(asset_balance));
        user
    }

    pub fn set_time(&mut self, timestamp: u64) {
        self.b_mock.set_block_timestamp(timestamp);
    }

    // ── Processor ──

    pub fn deposit(&mut self, user: &Address, amount: u64) -> TxResult {
        self.b_mock.execute_esdt_transfer(
            user,
            &self.fund,
            ASSET,
            0,
            &rust_biguint!(amount),
            |sc| {
                sc.deposit(OptionalValue::None);
            },
        )
    }

    pub fn deposit_referred(&mut self, user: &Address, amount: u64, referrer: &Address) -> TxResult {
        self.b_mock.execute_esdt_transfer(
            user,
            &self.fund,
            ASSET,
            0,
            &rust_biguint!(amount),
            |sc| {
                sc.deposit(OptionalValue::Some(managed_address!(referrer)));
            },
        )
    }

    pub fn request_withdrawal(&mut self, user: &Address, shares: u64) -> TxResult {
        self.b_mock
            .execute_tx(user, &self.fund, &rust_biguint!(0u64), |sc| {
                sc.request_withdrawal(managed_biguint!(shares));
            })
    }

    // ── Queue ──

    pub fn fulfill(&mut self, max_count: u64, expected_processed: u64, expected_paid: u64) {
        self.b_mock
            .execute_tx(&self.operator, &self.fund, &rust_biguint!(0u64), |sc| {
                let (processed, paid) = sc.fulfill_withdrawals(max_count).into_tuple();
                assert_eq!(processed, expected_processed);
                assert_eq!(paid, managed_biguint!(expected_paid));
            })
            .assert_ok();
    }

    pub fn fulfill_and_report_paid(&mut self, max_count: u64) -> u64 {
        let mut assets_paid = 0u64;
        self.b_mock
            .execute_tx(&self.operator, &self.fund, &rust_biguint!(0u64), |sc| {
                let (_, paid) = sc.fulfill_withdrawals(max_count).into_tuple();
                assets_paid = paid.to_u64().unwrap();
            })
            .assert_ok();
        assets_paid
    }

    pub fn cancel(&mut self, caller: &Address, request_id: u64) -> TxResult {
        self.b_mock
            .execute_tx(caller, &self.fund, &rust_biguint!(0u64), |sc| {
                sc.cancel_withdrawal(request_id);
            })
    }

    // ── Yield reports ──

    pub fn set_report_limits(&mut self, min_interval: u64, max_change_bps: u64) {
        self.b_mock
            .execute_tx(&self.owner, &self.fund, &rust_biguint!(0u64), |sc| {
                sc.set_report_limits(min_interval, max_change_bps);
            })
            .assert_ok();
    }

    pub fn report(&mut self, delta: i64) -> TxResult {
        self.b_mock
            .execute_tx(&self.owner, &self.fund, &rust_biguint!(0u64), |sc| {
                sc.report_yield_and_collect_fees(BigInt::from(delta));
            })
    }

    // ── Checks ──

    pub fn check_shares(&mut self, account: &Address, expected: u64) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert_eq!(
                    sc.get_share_balance(&managed_address!(account)),
                    managed_biguint!(expected)
                );
            })
            .assert_ok();
    }

    pub fn check_total_shares(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert_eq!(sc.total_shares().get(), managed_biguint!(expected));
            })
            .assert_ok();
    }

    pub fn check_total_assets(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert_eq!(sc.total_assets().get(), managed_biguint!(expected));
            })
            .assert_ok();
    }

    pub fn check_price(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert_eq!(sc.share_price(), managed_biguint!(expected));
            })
            .assert_ok();
    }

    pub fn check_asset_balance(&self, account: &Address, expected: u64) {
        self.b_mock
            .check_esdt_balance(account, ASSET, &rust_biguint!(expected));
    }

    /// Escrow covers every pending request.
    pub fn check_escrow_covers_pending(&mut self) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert!(sc.get_escrow_balance() >= sc.pending_total_shares().get());
            })
            .assert_ok();
    }

    pub fn share_balance(&mut self, account: &Address) -> u64 {
        let mut balance = 0u64;
        self.b_mock
            .execute_query(&self.fund, |sc| {
                balance = sc
                    .get_share_balance(&managed_address!(account))
                    .to_u64()
                    .unwrap();
            })
            .assert_ok();
        balance
    }

    pub fn escrow_balance(&mut self) -> u64 {
        let mut balance = 0u64;
        self.b_mock
            .execute_query(&self.fund, |sc| {
                balance = sc.get_escrow_balance().to_u64().unwrap();
            })
            .assert_ok();
        balance
    }

    pub fn queue_len(&mut self) -> u64 {
        let mut len = 0u64;
        self.b_mock
            .execute_query(&self.fund, |sc| {
                let (_, queue_len, _) = sc.get_queue_state().into_tuple();
                len = queue_len;
            })
            .assert_ok();
        len
    }

    pub fn is_pending(&mut self, request_id: u64) -> bool {
        let mut pending = false;
        self.b_mock
            .execute_query(&self.fund, |sc| {
                pending = sc.get_withdrawal_status(request_id) == WithdrawalStatus::Pending;
            })
            .assert_ok();
        pending
    }

    pub fn check_accrued_fees(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert_eq!(sc.accrued_fees().get(), managed_biguint!(expected));
            })
            .assert_ok();
    }

    pub fn check_high_water_mark(&mut self, expected: u64) {
        self.b_mock
            .execute_query(&self.fund, |sc| {
                assert_eq!(sc.high_water_mark().get(), managed_biguint!(expected));
            })
            .assert_ok();
    }

    pub fn total_shares(&mut self) -> u64 {
        let mut total = 0u64;
        self.b_mock
            .execute_query(&self.fund, |sc| {
                total = sc.total_shares().get().to_u64().unwrap();
            })
            .assert_ok();
        total
    }
}
