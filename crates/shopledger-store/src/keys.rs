//! Key encoding utilities for the shopledger database.
//!
//! User ids are variable-length emails, so user-scoped index keys separate the
//! user id from the record id with a NUL byte (which cannot appear in an
//! email). Record ids are 16-byte ULIDs, so index keys under one user prefix
//! sort chronologically.

use shopledger_core::{OrderId, TransactionId, UserId};

/// Key separator between a user id and a record id in index keys.
const SEPARATOR: u8 = 0x00;

/// Create a balance key from a user id.
#[must_use]
pub fn balance_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_ref().to_vec()
}

/// Create a transaction key from a transaction id.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

/// Create an order key from an order id.
#[must_use]
pub fn order_key(order_id: &OrderId) -> Vec<u8> {
    order_id.to_bytes().to_vec()
}

/// Create a user-transaction index key.
///
/// Format: `user_id || 0x00 || transaction_id (16 bytes)`.
#[must_use]
pub fn user_transaction_key(user_id: &UserId, transaction_id: &TransactionId) -> Vec<u8> {
    user_scoped_key(user_id, &transaction_id.to_bytes())
}

/// Create a user-order index key.
///
/// Format: `user_id || 0x00 || order_id (16 bytes)`.
#[must_use]
pub fn user_order_key(user_id: &UserId, order_id: &OrderId) -> Vec<u8> {
    user_scoped_key(user_id, &order_id.to_bytes())
}

/// Create a prefix for iterating all user-scoped index keys for one user.
#[must_use]
pub fn user_prefix(user_id: &UserId) -> Vec<u8> {
    let email = user_id.as_ref();
    let mut key = Vec::with_capacity(email.len() + 1);
    key.extend_from_slice(email);
    key.push(SEPARATOR);
    key
}

/// Create a payment event key from an external payment id.
#[must_use]
pub fn payment_event_key(payment_id: &str) -> Vec<u8> {
    payment_id.as_bytes().to_vec()
}

/// Extract the transaction id from a user-transaction index key.
///
/// Returns `None` if the key is too short to carry a 16-byte ULID suffix.
#[must_use]
pub fn transaction_id_from_user_key(key: &[u8]) -> Option<TransactionId> {
    ulid_suffix(key).map(TransactionId::from_bytes)
}

/// Extract the order id from a user-order index key.
///
/// Returns `None` if the key is too short to carry a 16-byte ULID suffix.
#[must_use]
pub fn order_id_from_user_key(key: &[u8]) -> Option<OrderId> {
    ulid_suffix(key).map(OrderId::from_bytes)
}

fn user_scoped_key(user_id: &UserId, id_bytes: &[u8; 16]) -> Vec<u8> {
    let mut key = user_prefix(user_id);
    key.extend_from_slice(id_bytes);
    key
}

fn ulid_suffix(key: &[u8]) -> Option<[u8; 16]> {
    if key.len() < 17 {
        return None;
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[key.len() - 16..]);
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("a@x.com").unwrap()
    }

    #[test]
    fn balance_key_is_email_bytes() {
        assert_eq!(balance_key(&user()), b"a@x.com".to_vec());
    }

    #[test]
    fn user_transaction_key_format() {
        let user_id = user();
        let tx_id = TransactionId::generate();
        let key = user_transaction_key(&user_id, &tx_id);

        assert_eq!(key.len(), 7 + 1 + 16);
        assert!(key.starts_with(b"a@x.com\x00"));
        assert_eq!(&key[8..], tx_id.to_bytes());
    }

    #[test]
    fn prefix_does_not_match_longer_emails() {
        // "a@x.com" must not collect keys belonging to "a@x.comm".
        let longer = UserId::new("a@x.comm").unwrap();
        let tx_id = TransactionId::generate();
        let key = user_transaction_key(&longer, &tx_id);

        assert!(!key.starts_with(&user_prefix(&user())));
    }

    #[test]
    fn extract_transaction_id_roundtrip() {
        let user_id = user();
        let tx_id = TransactionId::generate();
        let key = user_transaction_key(&user_id, &tx_id);

        assert_eq!(transaction_id_from_user_key(&key), Some(tx_id));
    }

    #[test]
    fn extract_order_id_roundtrip() {
        let user_id = user();
        let order_id = OrderId::generate();
        let key = user_order_key(&user_id, &order_id);

        assert_eq!(order_id_from_user_key(&key), Some(order_id));
    }

    #[test]
    fn short_keys_extract_nothing() {
        assert!(transaction_id_from_user_key(b"short").is_none());
    }
}
