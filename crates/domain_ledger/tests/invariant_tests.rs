//! Property-based reconciliation invariant tests
//!
//! After any accepted sequence of expense mutations, every account must
//! satisfy `balance == initial_balance - sum(amounts of its current
//! expenses)`, and rejected mutations must change nothing.

use proptest::prelude::*;
use tokio::runtime::Runtime;

use core_kernel::ExpenseId;
use domain_ledger::{ExpensePatch, Ledger, LedgerError, MemoryStore};
use test_utils::{
    affordable_amount_strategy, amount_strategy, AccountBuilder, ExpenseBuilder,
    STANDARD_BALANCE,
};

/// A randomly chosen mutation against one of two accounts
#[derive(Debug, Clone)]
enum Op {
    Create { account: usize, amount: i64 },
    ChangeAmount { slot: usize, amount: i64 },
    Reassign { slot: usize, account: usize },
    Delete { slot: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..2, affordable_amount_strategy())
            .prop_map(|(account, amount)| Op::Create { account, amount }),
        (0usize..8, amount_strategy())
            .prop_map(|(slot, amount)| Op::ChangeAmount { slot, amount }),
        (0usize..8, 0usize..2).prop_map(|(slot, account)| Op::Reassign { slot, account }),
        (0usize..8).prop_map(|slot| Op::Delete { slot }),
    ]
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("current-thread runtime")
}

async fn assert_reconciled(ledger: &Ledger<MemoryStore>) {
    let accounts = ledger.accounts().await.expect("accounts listable");
    let expenses = ledger.expenses().await.expect("expenses listable");
    for account in accounts {
        let spent: i64 = expenses
            .iter()
            .filter(|expense| expense.account_id == account.id)
            .map(|expense| expense.amount)
            .sum();
        assert_eq!(
            account.balance,
            STANDARD_BALANCE - spent,
            "account {} out of reconciliation",
            account.id
        );
        assert!(account.balance >= 0, "account {} went negative", account.id);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The reconciliation equation survives any mix of accepted and
    /// rejected mutations.
    #[test]
    fn prop_balances_always_reconcile(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        runtime().block_on(async {
            let ledger = Ledger::new(MemoryStore::new());
            let accounts = [
                ledger.create_account(AccountBuilder::new().build()).await.expect("account"),
                ledger.create_account(AccountBuilder::new().build()).await.expect("account"),
            ];
            let mut live: Vec<ExpenseId> = Vec::new();

            for op in ops {
                let result: Result<(), LedgerError> = match op {
                    Op::Create { account, amount } => ledger
                        .create_expense(
                            ExpenseBuilder::new(accounts[account].id)
                                .with_amount(amount)
                                .build(),
                        )
                        .await
                        .map(|expense| live.push(expense.id)),
                    Op::ChangeAmount { slot, amount } if !live.is_empty() => ledger
                        .update_expense(
                            live[slot % live.len()],
                            ExpensePatch { amount: Some(amount), ..Default::default() },
                        )
                        .await
                        .map(|_| ()),
                    Op::Reassign { slot, account } if !live.is_empty() => ledger
                        .update_expense(
                            live[slot % live.len()],
                            ExpensePatch {
                                account_id: Some(accounts[account].id),
                                ..Default::default()
                            },
                        )
                        .await
                        .map(|_| ()),
                    Op::Delete { slot } if !live.is_empty() => {
                        let id = live.remove(slot % live.len());
                        ledger.delete_expense(id).await
                    }
                    _ => Ok(()),
                };

                // Rejections are allowed; only validation rejections are
                // expected from in-range inputs.
                if let Err(err) = result {
                    prop_assert!(
                        matches!(err, LedgerError::Validation(_)),
                        "unexpected failure class: {err:?}"
                    );
                }
                assert_reconciled(&ledger).await;
            }
            Ok(())
        })?;
    }

    /// A deduction past the floor is always refused with the persisted
    /// balance in the message, and persists nothing.
    #[test]
    fn prop_overdraft_always_rejected(
        spent in 0i64..STANDARD_BALANCE,
        excess in 1i64..10_000,
    ) {
        runtime().block_on(async {
            let ledger = Ledger::new(MemoryStore::new());
            let account = ledger
                .create_account(AccountBuilder::new().build())
                .await
                .expect("account");
            if spent > 0 {
                ledger
                    .create_expense(ExpenseBuilder::new(account.id).with_amount(spent).build())
                    .await
                    .expect("affordable expense");
            }
            let remaining = STANDARD_BALANCE - spent;

            let result = ledger
                .create_expense(
                    ExpenseBuilder::new(account.id)
                        .with_amount(remaining + excess)
                        .build(),
                )
                .await;

            match result {
                Err(LedgerError::Validation(errors)) => {
                    prop_assert_eq!(
                        errors.messages("account"),
                        [format!("balance is insufficient: ${remaining}")]
                    );
                }
                other => prop_assert!(false, "expected rejection, got {:?}", other),
            }
            let (account, _) = ledger.account(account.id).await.expect("account readable");
            prop_assert_eq!(account.balance, remaining);
            Ok(())
        })?;
    }
}
