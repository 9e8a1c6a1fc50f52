//! crates/studio_booking_core/src/cart.rs
//!
//! The in-memory cart of classes picked but not yet booked. Nothing here is
//! persisted: the cart lives and dies with the process.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{CartItem, ClassId};

/// Holds at most one entry per class id, in the order they were added.
#[derive(Default)]
pub struct Cart {
    items: Mutex<Vec<CartItem>>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` unless its class is already in the cart.
    /// Returns whether the item was added.
    pub fn add_to_cart(&self, item: CartItem) -> bool {
        let mut items = self.lock();
        if items.iter().any(|i| i.class_id == item.class_id) {
            return false;
        }
        items.push(item);
        true
    }

    /// Removes every entry for `class_id`. Removing an absent class is fine.
    pub fn remove_from_cart(&self, class_id: ClassId) {
        self.lock().retain(|i| i.class_id != class_id);
    }

    /// Removes every entry whose class is in `class_ids`.
    pub fn remove_classes(&self, class_ids: &[ClassId]) {
        self.lock().retain(|i| !class_ids.contains(&i.class_id));
    }

    pub fn clear_cart(&self) {
        self.lock().clear();
    }

    pub fn is_in_cart(&self, class_id: ClassId) -> bool {
        self.lock().iter().any(|i| i.class_id == class_id)
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.lock().clone()
    }

    pub fn total(&self) -> f64 {
        self.lock().iter().map(|i| i.price).sum()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(class_id: ClassId, price: f64) -> CartItem {
        CartItem {
            class_id,
            class_name: format!("Class {class_id}"),
            course_id: 1,
            course_name: "Flow".to_string(),
            date: "2024-11-25".to_string(),
            instructor_name: "Ana".to_string(),
            price,
        }
    }

    #[test]
    fn adding_same_class_twice_keeps_one_entry() {
        let cart = Cart::new();
        assert!(cart.add_to_cart(item(7, 10.0)));
        assert!(!cart.add_to_cart(item(7, 99.0)));

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, 10.0);
    }

    #[test]
    fn remove_then_membership_is_false() {
        let cart = Cart::new();
        cart.add_to_cart(item(1, 10.0));
        cart.add_to_cart(item(2, 15.5));

        cart.remove_from_cart(1);
        cart.remove_from_cart(1);
        cart.remove_from_cart(42);

        assert!(!cart.is_in_cart(1));
        assert!(!cart.is_in_cart(42));
        assert!(cart.is_in_cart(2));
    }

    #[test]
    fn keeps_insertion_order_and_totals_prices() {
        let cart = Cart::new();
        cart.add_to_cart(item(3, 10.0));
        cart.add_to_cart(item(1, 15.5));

        let ids: Vec<ClassId> = cart.items().iter().map(|i| i.class_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cart.total(), 25.5);
    }

    #[test]
    fn remove_classes_keeps_the_rest() {
        let cart = Cart::new();
        cart.add_to_cart(item(1, 10.0));
        cart.add_to_cart(item(2, 15.5));
        cart.add_to_cart(item(3, 12.0));

        cart.remove_classes(&[1, 3, 99]);

        let ids: Vec<ClassId> = cart.items().iter().map(|i| i.class_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn clear_empties_the_cart() {
        let cart = Cart::new();
        cart.add_to_cart(item(3, 10.0));
        cart.clear_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
        assert_eq!(cart.total(), 0.0);
    }
}
