//! Catalog entities sold at the register

pub mod category;
pub mod product;

pub use category::{Category, CategoryPayload};
pub use product::{Product, ProductPayload};

use serde::{de::DeserializeOwned, Serialize};

/// A record kept by a resource store, keyed by a store-assigned integer id.
///
/// The payload is the client-supplied body for create and replace. It never
/// carries an id; the store decides identity.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    type Payload: DeserializeOwned + Send + Sync;

    /// Human-readable label used in messages ("Product", "Category")
    const KIND: &'static str;

    fn id(&self) -> i64;

    /// Build the stored record for `id` from a payload
    fn from_payload(id: i64, payload: Self::Payload) -> Self;
}

/// Decode a request body into a payload.
///
/// Missing fields fall back to their zero value and unknown fields (including
/// any `id`) are ignored. Anything that is not a JSON object of the right
/// field types is rejected.
pub fn decode<P: DeserializeOwned>(body: &[u8]) -> Result<P, DecodeError> {
    serde_json::from_slice(body).map_err(DecodeError)
}

/// Request body could not be decoded into the entity shape
#[derive(Debug, thiserror::Error)]
#[error("Invalid request body: {0}")]
pub struct DecodeError(#[source] serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_zero_values() {
        let payload: ProductPayload = decode(br#"{"name":"Air Mineral"}"#).unwrap();
        assert_eq!(payload.name, "Air Mineral");
        assert_eq!(payload.price, 0);
        assert_eq!(payload.stock, 0);

        let empty: ProductPayload = decode(b"{}").unwrap();
        assert_eq!(empty, ProductPayload::default());
    }

    #[test]
    fn client_id_is_ignored() {
        let payload: CategoryPayload = decode(br#"{"id":99,"name":"Snack"}"#).unwrap();
        let category = Category::from_payload(4, payload);
        assert_eq!(category.id, 4);
        assert_eq!(category.name, "Snack");
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert!(decode::<ProductPayload>(b"").is_err());
        assert!(decode::<ProductPayload>(b"{\"name\":").is_err());
        assert!(decode::<ProductPayload>(b"null").is_err());
        assert!(decode::<ProductPayload>(b"[1,2]").is_err());
        assert!(decode::<ProductPayload>(br#"{"price":"mahal"}"#).is_err());
        assert!(decode::<CategoryPayload>(br#"{"name":12}"#).is_err());
    }

    #[test]
    fn negative_values_are_accepted() {
        let payload: ProductPayload = decode(br#"{"name":"Retur","price":-500,"stock":-2}"#).unwrap();
        assert_eq!(payload.price, -500);
        assert_eq!(payload.stock, -2);
    }
}
