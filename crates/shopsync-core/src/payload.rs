//! Upstream payload schemas.
//!
//! Every field is optional at the deserialization layer so that a missing
//! field surfaces as a [`RecordError::Malformed`] naming that field instead
//! of a generic decode failure. Conversion into the canonical models in
//! [`crate::models`] enforces which fields are required.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::RecordError;
use crate::models::{Cart, DedupKey, LineItem, Product, User};

pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const CARTS: &str = "carts";

/// Decode one raw record from a page into its payload type.
pub fn decode<T: DeserializeOwned>(
    collection: &'static str,
    raw: serde_json::Value,
) -> Result<T, RecordError> {
    serde_json::from_value(raw).map_err(|e| RecordError::Undecodable {
        collection,
        message: e.to_string(),
    })
}

fn require<T>(
    value: Option<T>,
    collection: &'static str,
    field: &'static str,
) -> Result<T, RecordError> {
    value.ok_or(RecordError::malformed(collection, field))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub birth_date: Option<String>,
    pub address: Option<AddressPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPayload {
    pub address: Option<String>,
    pub city: Option<String>,
    pub coordinates: Option<CoordinatesPayload>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CoordinatesPayload {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl UserPayload {
    /// Users dedup on email; an absent or empty email yields no key.
    pub fn dedup_key(&self) -> Option<DedupKey> {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| DedupKey::UserEmail(e.to_string()))
    }

    /// Latitude and longitude of the user's address.
    pub fn coordinates(&self) -> Result<(f64, f64), RecordError> {
        let address = require(self.address.as_ref(), USERS, "address")?;
        let coords = require(address.coordinates, USERS, "address.coordinates")?;
        let lat = require(coords.lat, USERS, "address.coordinates.lat")?;
        let lng = require(coords.lng, USERS, "address.coordinates.lng")?;
        Ok((lat, lng))
    }

    pub fn to_user(&self, country: String) -> Result<User, RecordError> {
        let address = require(self.address.as_ref(), USERS, "address")?;
        Ok(User {
            user_id: require(self.id, USERS, "id")?,
            first_name: require(self.first_name.clone(), USERS, "firstName")?,
            last_name: require(self.last_name.clone(), USERS, "lastName")?,
            email: require(self.email.clone(), USERS, "email")?,
            age: require(self.age, USERS, "age")?,
            birth_date: require(self.birth_date.clone(), USERS, "birthDate")?,
            street: require(address.address.clone(), USERS, "address.address")?,
            city: require(address.city.clone(), USERS, "address.city")?,
            country,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPayload {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
}

impl ProductPayload {
    pub fn dedup_key(&self) -> Option<DedupKey> {
        self.id.map(DedupKey::ProductId)
    }

    pub fn to_product(&self) -> Result<Product, RecordError> {
        Ok(Product {
            product_id: require(self.id, PRODUCTS, "id")?,
            title: require(self.title.clone(), PRODUCTS, "title")?,
            description: require(self.description.clone(), PRODUCTS, "description")?,
            category: require(self.category.clone(), PRODUCTS, "category")?,
            price: require(self.price, PRODUCTS, "price")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    /// Missing and empty are equivalent: the cart has no line items.
    pub products: Option<Vec<CartProductPayload>>,
}

/// One entry of a cart's nested product list. Other upstream fields
/// (title, price, discount, ...) are ignored.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CartProductPayload {
    pub id: Option<i64>,
    pub quantity: Option<i64>,
}

impl CartPayload {
    pub fn dedup_key(&self) -> Option<DedupKey> {
        self.id.map(DedupKey::CartId)
    }

    pub fn to_cart(&self) -> Result<Cart, RecordError> {
        Ok(Cart {
            cart_id: require(self.id, CARTS, "id")?,
            user_id: require(self.user_id, CARTS, "userId")?,
        })
    }

    /// Line items for `cart`, one per nested product entry. Quantities must
    /// be at least 1.
    pub fn line_items(&self, cart: &Cart) -> Result<Vec<LineItem>, RecordError> {
        self.products
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|entry| {
                Ok(LineItem {
                    cart_id: cart.cart_id,
                    product_id: require(entry.id, CARTS, "products.id")?,
                    quantity: require(
                        entry.quantity.filter(|&q| q >= 1),
                        CARTS,
                        "products.quantity",
                    )?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_payload_camel_case() {
        let raw = json!({
            "id": 1,
            "firstName": "Emily",
            "lastName": "Johnson",
            "email": "emily.johnson@x.dummyjson.com",
            "age": 28,
            "birthDate": "1996-5-30",
            "address": {
                "address": "626 Main Street",
                "city": "Phoenix",
                "coordinates": { "lat": -77.16213, "lng": -92.084824 }
            },
            "hair": { "color": "Brown" }
        });
        let payload: UserPayload = decode(USERS, raw).unwrap();
        assert_eq!(
            payload.dedup_key(),
            Some(DedupKey::UserEmail("emily.johnson@x.dummyjson.com".into()))
        );
        assert_eq!(payload.coordinates().unwrap(), (-77.16213, -92.084824));

        let user = payload.to_user("Antarctica".into()).unwrap();
        assert_eq!(user.user_id, 1);
        assert_eq!(user.street, "626 Main Street");
        assert_eq!(user.country, "Antarctica");
    }

    #[test]
    fn test_empty_email_has_no_key() {
        let payload = UserPayload {
            email: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(payload.dedup_key(), None);
        assert_eq!(UserPayload::default().dedup_key(), None);
    }

    #[test]
    fn test_missing_city_is_malformed() {
        let raw = json!({
            "id": 2, "firstName": "A", "lastName": "B", "email": "a@b.c",
            "age": 3, "birthDate": "2000-1-1",
            "address": { "address": "1 Road", "coordinates": { "lat": 0.0, "lng": 0.0 } }
        });
        let payload: UserPayload = decode(USERS, raw).unwrap();
        let err = payload.to_user("X".into()).unwrap_err();
        assert_eq!(err, RecordError::malformed(USERS, "address.city"));
    }

    #[test]
    fn test_wrong_type_is_undecodable() {
        let err = decode::<ProductPayload>(PRODUCTS, json!({ "id": "seven" })).unwrap_err();
        assert!(matches!(err, RecordError::Undecodable { collection: "products", .. }));
    }

    #[test]
    fn test_cart_line_items() {
        let raw = json!({
            "id": 4,
            "userId": 9,
            "products": [
                { "id": 10, "title": "Mascara", "quantity": 2 },
                { "id": 11, "title": "Lipstick", "quantity": 1 }
            ]
        });
        let payload: CartPayload = decode(CARTS, raw).unwrap();
        let cart = payload.to_cart().unwrap();
        let items = payload.line_items(&cart).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            LineItem {
                cart_id: 4,
                product_id: 10,
                quantity: 2
            }
        );
    }

    #[test]
    fn test_cart_without_products_list() {
        let payload: CartPayload = decode(CARTS, json!({ "id": 1, "userId": 2 })).unwrap();
        let cart = payload.to_cart().unwrap();
        assert!(payload.line_items(&cart).unwrap().is_empty());
    }

    #[test]
    fn test_non_positive_quantity_is_malformed() {
        for quantity in [0, -3] {
            let raw = json!({
                "id": 4,
                "userId": 9,
                "products": [{ "id": 10, "quantity": 2 }, { "id": 11, "quantity": quantity }]
            });
            let payload: CartPayload = decode(CARTS, raw).unwrap();
            let cart = payload.to_cart().unwrap();
            assert_eq!(
                payload.line_items(&cart),
                Err(RecordError::malformed(CARTS, "products.quantity"))
            );
        }
    }
}
