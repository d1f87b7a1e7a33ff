use chrono::{NaiveTime, Timelike, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{MenuCategory, MenuItem};
use truck_server::availability::{SLOT_MINUTES, TimeSlot, time_slots};
use truck_server::cart::Cart;

fn time_at(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}

fn minutes_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

fn item(n: u8) -> MenuItem {
    MenuItem {
        id: format!("item-{n}"),
        name: format!("Item {n}"),
        description: None,
        price: Decimal::new(250 + i64::from(n) * 100, 2),
        image_url: None,
        category: MenuCategory::Sides,
        is_vegetarian: true,
        is_spicy: false,
        is_gluten_free: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn slot_count_for_aligned_windows(start_half in 0u32..47, len in 1u32..48) {
        let end_half = start_half + len;
        prop_assume!(end_half < 48);
        let start = time_at(start_half * 30);
        let end = time_at(end_half * 30);

        let slots = time_slots(start, end);
        prop_assert_eq!(slots.len() as u32, len + 1);
        prop_assert_eq!(slots.first().map(TimeSlot::time), Some(start));
        prop_assert_eq!(slots.last().map(TimeSlot::time), Some(end));
    }

    #[test]
    fn slots_are_increasing_and_inside_window(start_min in 0u32..1440, end_min in 0u32..1440) {
        let start = time_at(start_min);
        let end = time_at(end_min);
        let slots = time_slots(start, end);

        if start >= end {
            prop_assert!(slots.is_empty());
        } else {
            prop_assert_eq!(slots[0].time(), start);
            for pair in slots.windows(2) {
                prop_assert!(pair[0] < pair[1]);
                prop_assert_eq!(
                    i64::from(minutes_of(pair[1].time()) - minutes_of(pair[0].time())),
                    SLOT_MINUTES
                );
            }
            for slot in &slots {
                prop_assert!(slot.time() >= start && slot.time() <= end);
            }
        }
    }

    #[test]
    fn labels_parse_back(minutes in 0u32..1440) {
        let slot = TimeSlot::new(time_at(minutes));
        prop_assert_eq!(TimeSlot::parse_label(&slot.label()), Some(slot));
    }

    #[test]
    fn cart_never_holds_zero_quantities(ops in proptest::collection::vec((any::<bool>(), 0u8..4), 0..60)) {
        let items: Vec<MenuItem> = (0..4).map(item).collect();
        let mut cart = Cart::new();
        for (add, idx) in ops {
            let it = &items[idx as usize];
            if add {
                cart.add(it);
            } else {
                cart.remove(&it.id);
            }
        }

        prop_assert!(cart.entries().iter().all(|e| e.quantity > 0));
        let expected: Decimal = cart
            .entries()
            .iter()
            .map(|e| e.unit_price * Decimal::from(e.quantity))
            .sum();
        prop_assert_eq!(cart.total(), Some(expected));
    }

    #[test]
    fn add_add_remove_is_add(prefix in proptest::collection::vec(0u8..4, 0..10), target in 0u8..4) {
        let items: Vec<MenuItem> = (0..4).map(item).collect();
        let mut base = Cart::new();
        for idx in prefix {
            base.add(&items[idx as usize]);
        }

        let target = &items[target as usize];
        let mut left = base.clone();
        left.add(target);
        left.add(target);
        left.remove(&target.id);

        let mut right = base;
        right.add(target);

        prop_assert_eq!(left, right);
    }
}
