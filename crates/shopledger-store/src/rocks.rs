//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, PoisonError};

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use shopledger_core::{
    CreditBalance, CreditTransaction, Order, OrderId, OrderItem, TransactionId,
    TransactionMetadata, TransactionType, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::locks::UserLocks;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    locks: UserLocks,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            locks: UserLocks::new(),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read a balance record without taking the user lock.
    fn read_balance(&self, user_id: &UserId) -> Result<Option<CreditBalance>> {
        let cf = self.cf(cf::BALANCES)?;
        let key = keys::balance_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Stage a balance, its transaction, and the user index into a batch.
    fn stage_ledger_write(
        &self,
        batch: &mut WriteBatch,
        balance: &CreditBalance,
        transaction: &CreditTransaction,
    ) -> Result<()> {
        let cf_balances = self.cf(cf::BALANCES)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        batch.put_cf(
            &cf_balances,
            keys::balance_key(&balance.user_id),
            Self::serialize(balance)?,
        );
        batch.put_cf(
            &cf_tx,
            keys::transaction_key(&transaction.id),
            Self::serialize(transaction)?,
        );
        batch.put_cf(
            &cf_tx_by_user,
            keys::user_transaction_key(&transaction.user_id, &transaction.id),
            [],
        );

        Ok(())
    }

    /// Shared credit path; `payment_id` enables the idempotency guard.
    fn credit_inner(
        &self,
        user_id: &UserId,
        amount_cents: i64,
        transaction_type: TransactionType,
        description: String,
        metadata: TransactionMetadata,
        payment_id: Option<&str>,
    ) -> Result<CreditTransaction> {
        if amount_cents <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "credit amount must be positive, got {amount_cents}"
            )));
        }
        if !transaction_type.is_credit() {
            return Err(StoreError::InvalidAmount(format!(
                "{transaction_type:?} is not a crediting transaction type"
            )));
        }

        let handle = self.locks.for_user(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(payment_id) = payment_id {
            if self.has_payment_event(payment_id)? {
                return Err(StoreError::DuplicatePayment {
                    payment_id: payment_id.to_string(),
                });
            }
        }

        let mut balance = self
            .read_balance(user_id)?
            .unwrap_or_else(|| CreditBalance::new(user_id.clone()));
        balance.balance_cents += amount_cents;
        balance.last_updated = Utc::now();

        let transaction = match transaction_type {
            TransactionType::Purchase => CreditTransaction::purchase(
                user_id.clone(),
                amount_cents,
                balance.balance_cents,
                description,
                metadata,
            ),
            TransactionType::Refund => CreditTransaction::refund(
                user_id.clone(),
                amount_cents,
                balance.balance_cents,
                description,
                metadata,
            ),
            TransactionType::AdminAdjustment => CreditTransaction::adjustment(
                user_id.clone(),
                amount_cents,
                balance.balance_cents,
                description,
                metadata,
            ),
            // Rejected by the is_credit check above.
            TransactionType::Debit => unreachable!("debit type rejected before this point"),
        };

        let mut batch = WriteBatch::default();
        self.stage_ledger_write(&mut batch, &balance, &transaction)?;

        if let Some(payment_id) = payment_id {
            let cf_events = self.cf(cf::PAYMENT_EVENTS)?;
            batch.put_cf(
                &cf_events,
                keys::payment_event_key(payment_id),
                transaction.id.to_string().as_bytes(),
            );
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(transaction)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Balance Operations
    // =========================================================================

    fn get_balance(&self, user_id: &UserId) -> Result<Option<CreditBalance>> {
        self.read_balance(user_id)
    }

    fn get_or_create_balance(&self, user_id: &UserId) -> Result<CreditBalance> {
        let handle = self.locks.for_user(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(balance) = self.read_balance(user_id)? {
            return Ok(balance);
        }

        let balance = CreditBalance::new(user_id.clone());
        let cf = self.cf(cf::BALANCES)?;
        self.db
            .put_cf(&cf, keys::balance_key(user_id), Self::serialize(&balance)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(balance)
    }

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CreditTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // ULIDs are time-ordered, so the index iterates oldest first;
        // collect and reverse for newest-first listings.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut transactions = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if transactions.len() >= limit {
                break;
            }
            let Some(tx_id) = keys::transaction_id_from_user_key(&key) else {
                continue;
            };
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn credit(
        &self,
        user_id: &UserId,
        amount_cents: i64,
        transaction_type: TransactionType,
        description: String,
        metadata: TransactionMetadata,
    ) -> Result<CreditTransaction> {
        self.credit_inner(
            user_id,
            amount_cents,
            transaction_type,
            description,
            metadata,
            None,
        )
    }

    fn credit_from_payment(
        &self,
        payment_id: &str,
        user_id: &UserId,
        amount_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Result<CreditTransaction> {
        self.credit_inner(
            user_id,
            amount_cents,
            TransactionType::Purchase,
            description,
            metadata,
            Some(payment_id),
        )
    }

    fn debit(
        &self,
        user_id: &UserId,
        amount_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Result<CreditTransaction> {
        if amount_cents <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "debit amount must be positive, got {amount_cents}"
            )));
        }

        let handle = self.locks.for_user(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let mut balance = self.read_balance(user_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "balance",
            id: user_id.to_string(),
        })?;

        if !balance.has_sufficient_credits(amount_cents) {
            return Err(StoreError::InsufficientCredits {
                required: amount_cents,
                available: balance.balance_cents,
            });
        }

        balance.balance_cents -= amount_cents;
        balance.last_updated = Utc::now();

        let transaction = CreditTransaction::debit(
            user_id.clone(),
            amount_cents,
            balance.balance_cents,
            description,
            metadata,
        );

        let mut batch = WriteBatch::default();
        self.stage_ledger_write(&mut batch, &balance, &transaction)?;
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(transaction)
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    fn settle_order(
        &self,
        user_id: &UserId,
        items: Vec<OrderItem>,
    ) -> Result<(Order, CreditTransaction)> {
        if items.is_empty() {
            return Err(StoreError::InvalidAmount("order has no items".into()));
        }
        let total_cents: i64 = items.iter().map(|item| item.total_cents).sum();
        if total_cents <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "order total must be positive, got {total_cents}"
            )));
        }

        let handle = self.locks.for_user(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let mut balance = self.read_balance(user_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "balance",
            id: user_id.to_string(),
        })?;

        // Abort before anything is created, reporting required vs available.
        if !balance.has_sufficient_credits(total_cents) {
            return Err(StoreError::InsufficientCredits {
                required: total_cents,
                available: balance.balance_cents,
            });
        }

        let mut order = Order::new(user_id.clone(), items);

        balance.balance_cents -= total_cents;
        balance.last_updated = Utc::now();

        let transaction = CreditTransaction::debit(
            user_id.clone(),
            total_cents,
            balance.balance_cents,
            format!("Order {}", order.id),
            TransactionMetadata::OrderPayment {
                order_id: order.id,
                items: order.items.clone(),
            },
        );

        order
            .complete()
            .map_err(|e| StoreError::InvalidTransition(e.to_string()))?;

        // Order, debit, and balance land in one batch: the order is only
        // ever persisted in its completed state.
        let mut batch = WriteBatch::default();
        self.stage_ledger_write(&mut batch, &balance, &transaction)?;

        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_orders_by_user = self.cf(cf::ORDERS_BY_USER)?;
        batch.put_cf(&cf_orders, keys::order_key(&order.id), Self::serialize(&order)?);
        batch.put_cf(
            &cf_orders_by_user,
            keys::user_order_key(user_id, &order.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok((order, transaction))
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let cf = self.cf(cf::ORDERS)?;
        let key = keys::order_key(order_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let cf_by_user = self.cf(cf::ORDERS_BY_USER)?;
        let prefix = keys::user_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut orders = Vec::new();
        for key in all_keys {
            let Some(order_id) = keys::order_id_from_user_key(&key) else {
                continue;
            };
            if let Some(order) = self.get_order(&order_id)? {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    // =========================================================================
    // Payment Event Operations
    // =========================================================================

    fn has_payment_event(&self, payment_id: &str) -> Result<bool> {
        let cf = self.cf(cf::PAYMENT_EVENTS)?;
        let key = keys::payment_event_key(payment_id);

        let exists = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopledger_core::OrderStatus;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn user(email: &str) -> UserId {
        UserId::new(email).unwrap()
    }

    fn items_totaling_600() -> Vec<OrderItem> {
        vec![
            OrderItem::new("prod_1".into(), "Widget".into(), 1, 400).unwrap(),
            OrderItem::new("prod_2".into(), "Gadget".into(), 2, 100).unwrap(),
        ]
    }

    #[test]
    fn get_or_create_balance_starts_at_zero_usd() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        let balance = store.get_or_create_balance(&user_id).unwrap();
        assert_eq!(balance.balance_cents, 0);
        assert_eq!(balance.currency, "USD");

        // Idempotent: a second read returns the same record.
        let again = store.get_or_create_balance(&user_id).unwrap();
        assert_eq!(again.balance_cents, 0);
    }

    #[test]
    fn credit_then_debit_scenario() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        let tx = store
            .credit(
                &user_id,
                1000,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();
        assert_eq!(tx.amount_cents, 1000);
        assert_eq!(tx.balance_after_cents, 1000);
        assert_eq!(tx.transaction_type, TransactionType::Purchase);

        let tx = store
            .debit(&user_id, 400, "order_1".into(), TransactionMetadata::None)
            .unwrap();
        assert_eq!(tx.amount_cents, -400);
        assert_eq!(tx.balance_after_cents, 600);

        let balance = store.get_balance(&user_id).unwrap().unwrap();
        assert_eq!(balance.balance_cents, 600);
    }

    #[test]
    fn debit_beyond_balance_fails_and_changes_nothing() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        store
            .credit(
                &user_id,
                600,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let result = store.debit(&user_id, 700, "order_2".into(), TransactionMetadata::None);
        assert!(matches!(
            result,
            Err(StoreError::InsufficientCredits {
                required: 700,
                available: 600
            })
        ));

        // Balance unchanged, no debit transaction written.
        let balance = store.get_balance(&user_id).unwrap().unwrap();
        assert_eq!(balance.balance_cents, 600);
        let history = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn debit_without_balance_record_is_not_found() {
        let (store, _dir) = create_test_store();
        let user_id = user("nobody@x.com");

        let result = store.debit(&user_id, 100, "order".into(), TransactionMetadata::None);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn debit_zero_balance_fails() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");
        store.get_or_create_balance(&user_id).unwrap();

        let result = store.debit(&user_id, 1, "order".into(), TransactionMetadata::None);
        assert!(matches!(
            result,
            Err(StoreError::InsufficientCredits { .. })
        ));
    }

    #[test]
    fn debit_exact_balance_leaves_zero() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");
        store
            .credit(
                &user_id,
                600,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let tx = store
            .debit(&user_id, 600, "order".into(), TransactionMetadata::None)
            .unwrap();
        assert_eq!(tx.balance_after_cents, 0);
        assert_eq!(
            store.get_balance(&user_id).unwrap().unwrap().balance_cents,
            0
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        for amount in [0, -100] {
            let credit = store.credit(
                &user_id,
                amount,
                TransactionType::Purchase,
                "bad".into(),
                TransactionMetadata::None,
            );
            assert!(matches!(credit, Err(StoreError::InvalidAmount(_))));

            let debit = store.debit(&user_id, amount, "bad".into(), TransactionMetadata::None);
            assert!(matches!(debit, Err(StoreError::InvalidAmount(_))));
        }
    }

    #[test]
    fn debit_type_cannot_be_used_to_credit() {
        let (store, _dir) = create_test_store();
        let result = store.credit(
            &user("a@x.com"),
            100,
            TransactionType::Debit,
            "bad".into(),
            TransactionMetadata::None,
        );
        assert!(matches!(result, Err(StoreError::InvalidAmount(_))));
    }

    #[test]
    fn balance_equals_sum_of_transaction_amounts() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        store
            .credit(
                &user_id,
                1000,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();
        store
            .debit(&user_id, 400, "order_1".into(), TransactionMetadata::None)
            .unwrap();
        store
            .credit(
                &user_id,
                250,
                TransactionType::Refund,
                "partial refund".into(),
                TransactionMetadata::None,
            )
            .unwrap();
        store
            .credit(
                &user_id,
                50,
                TransactionType::AdminAdjustment,
                "goodwill".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let history = store.list_transactions_by_user(&user_id, 100, 0).unwrap();
        let sum: i64 = history.iter().map(|tx| tx.amount_cents).sum();
        let balance = store.get_balance(&user_id).unwrap().unwrap();
        assert_eq!(balance.balance_cents, sum);
        assert_eq!(balance.balance_cents, 900);
    }

    #[test]
    fn history_is_newest_first_and_truncation_preserves_order() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        for (amount, label) in [(100, "first"), (200, "second"), (300, "third")] {
            store
                .credit(
                    &user_id,
                    amount,
                    TransactionType::Purchase,
                    label.into(),
                    TransactionMetadata::None,
                )
                .unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2)); // Distinct ULID timestamps
        }

        let all = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].description, "third");
        assert_eq!(all[2].description, "first");
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let limited = store.list_transactions_by_user(&user_id, 2, 0).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].description, "third");
        assert_eq!(limited[1].description, "second");

        let offset = store.list_transactions_by_user(&user_id, 2, 1).unwrap();
        assert_eq!(offset[0].description, "second");
        assert_eq!(offset[1].description, "first");
    }

    #[test]
    fn history_is_isolated_per_user() {
        let (store, _dir) = create_test_store();
        let alice = user("alice@x.com");
        let bob = user("bob@x.com");

        store
            .credit(
                &alice,
                100,
                TransactionType::Purchase,
                "alice top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();
        store
            .credit(
                &bob,
                200,
                TransactionType::Purchase,
                "bob top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let alice_history = store.list_transactions_by_user(&alice, 10, 0).unwrap();
        assert_eq!(alice_history.len(), 1);
        assert_eq!(alice_history[0].description, "alice top-up");
    }

    #[test]
    fn settle_order_completes_and_debits_once() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");
        store
            .credit(
                &user_id,
                600,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let (order, tx) = store.settle_order(&user_id, items_totaling_600()).unwrap();

        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.completed_at.is_some());
        assert_eq!(order.total_cents, 600);
        assert_eq!(tx.amount_cents, -600);
        assert_eq!(tx.balance_after_cents, 0);

        // The debit references the order in its metadata.
        match &tx.metadata {
            TransactionMetadata::OrderPayment { order_id, items } => {
                assert_eq!(*order_id, order.id);
                assert_eq!(items.len(), 2);
            }
            other => panic!("unexpected metadata: {other:?}"),
        }

        // Exactly one debit transaction for the order.
        let history = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(history.len(), 2);

        // The order is readable and listed for the user.
        let stored = store.get_order(&order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert_eq!(store.list_orders_by_user(&user_id).unwrap().len(), 1);
    }

    #[test]
    fn settle_order_insufficient_funds_persists_nothing() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");
        store
            .credit(
                &user_id,
                500,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let result = store.settle_order(&user_id, items_totaling_600());
        assert!(matches!(
            result,
            Err(StoreError::InsufficientCredits {
                required: 600,
                available: 500
            })
        ));

        assert_eq!(
            store.get_balance(&user_id).unwrap().unwrap().balance_cents,
            500
        );
        assert!(store.list_orders_by_user(&user_id).unwrap().is_empty());
        assert_eq!(store.list_transactions_by_user(&user_id, 10, 0).unwrap().len(), 1);
    }

    #[test]
    fn settle_empty_order_is_rejected() {
        let (store, _dir) = create_test_store();
        let result = store.settle_order(&user("a@x.com"), vec![]);
        assert!(matches!(result, Err(StoreError::InvalidAmount(_))));
    }

    #[test]
    fn payment_event_credits_exactly_once() {
        let (store, _dir) = create_test_store();
        let user_id = user("a@x.com");

        let tx = store
            .credit_from_payment(
                "pay_123",
                &user_id,
                2500,
                "Credit purchase: pkg_25".into(),
                TransactionMetadata::None,
            )
            .unwrap();
        assert_eq!(tx.balance_after_cents, 2500);
        assert!(store.has_payment_event("pay_123").unwrap());

        // Redelivery of the same payment id is refused.
        let result = store.credit_from_payment(
            "pay_123",
            &user_id,
            2500,
            "Credit purchase: pkg_25".into(),
            TransactionMetadata::None,
        );
        assert!(matches!(
            result,
            Err(StoreError::DuplicatePayment { .. })
        ));

        assert_eq!(
            store.get_balance(&user_id).unwrap().unwrap().balance_cents,
            2500
        );
    }

    #[test]
    fn concurrent_debits_cannot_both_spend_the_balance() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);
        let user_id = user("a@x.com");

        store
            .credit(
                &user_id,
                600,
                TransactionType::Purchase,
                "top-up".into(),
                TransactionMetadata::None,
            )
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = Arc::clone(&store);
            let user_id = user_id.clone();
            handles.push(std::thread::spawn(move || {
                store.debit(&user_id, 600, "order".into(), TransactionMetadata::None)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let balance = store.get_balance(&user_id).unwrap().unwrap();
        assert_eq!(balance.balance_cents, 0);
    }
}
