use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{
    Location, LocationCreate, MenuCategory, MenuItem, MenuItemCreate, OrderStatus,
    ScheduleCreate,
};
use shared::util::today;
use truck_server::call::CallPolicy;
use truck_server::cart::Cart;
use truck_server::catalog::{CatalogStore, FailurePoint, MemoryCatalog, TimedCatalog};
use truck_server::notifier::{
    NoopNotifier, NotifierError, NotifierReceipt, OrderEmail, OrderNotifier,
};
use truck_server::orders::{
    BookingRequest, CustomerDetails, OrderError, OrderService, SubmissionWarning,
    pickup_timestamp,
};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<OrderEmail>>,
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn send_order_confirmation(
        &self,
        email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError> {
        self.sent.lock().push(email.clone());
        Ok(NotifierReceipt {
            message_id: Some("msg_1".into()),
        })
    }
}

struct FailingNotifier;

#[async_trait]
impl OrderNotifier for FailingNotifier {
    async fn send_order_confirmation(
        &self,
        _email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError> {
        Err(NotifierError::from_body(
            r#"{"error":"Failed to send confirmation email","details":"Domain not verified"}"#,
        ))
    }
}

struct SlowNotifier;

#[async_trait]
impl OrderNotifier for SlowNotifier {
    async fn send_order_confirmation(
        &self,
        _email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(NotifierReceipt::default())
    }
}

struct Seeded {
    location: Location,
    jerk: MenuItem,
    plantains: MenuItem,
}

fn menu_payload(name: &str, cents: i64) -> MenuItemCreate {
    MenuItemCreate {
        name: name.into(),
        description: None,
        price: Decimal::new(cents, 2),
        image_url: None,
        category: MenuCategory::Signatures,
        is_vegetarian: false,
        is_spicy: false,
        is_gluten_free: true,
    }
}

async fn seed(store: &MemoryCatalog) -> Seeded {
    let location = store
        .create_location(&LocationCreate {
            name: "Uptown".into(),
            address: "100 Main St".into(),
            lat: Some(40.8),
            lng: Some(-73.9),
            image_url: None,
        })
        .await
        .unwrap();
    let jerk = store
        .create_menu_item(&menu_payload("Jerk Chicken", 1000))
        .await
        .unwrap();
    let plantains = store
        .create_menu_item(&menu_payload("Plantains", 550))
        .await
        .unwrap();
    store
        .create_schedule(&ScheduleCreate {
            location_id: location.id.clone(),
            date: pickup_day(),
            start_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        })
        .await
        .unwrap();
    Seeded {
        location,
        jerk,
        plantains,
    }
}

fn cart(seeded: &Seeded) -> Cart {
    let mut cart = Cart::new();
    cart.add(&seeded.jerk);
    cart.add(&seeded.jerk);
    cart.add(&seeded.plantains);
    cart
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Ama Mensah".into(),
        email: "ama@example.com".into(),
        phone: "555-0100".into(),
    }
}

/// The seeded stop: a week out, 11:00 AM to 1:00 PM
fn pickup_day() -> NaiveDate {
    today() + Days::new(7)
}

fn booking(location_id: Option<&str>, slot: Option<&str>, cart: Cart) -> BookingRequest {
    BookingRequest {
        location_id: location_id.map(String::from),
        date: pickup_day(),
        time_slot: slot.map(String::from),
        customer: customer(),
        cart,
    }
}

fn service(
    store: Arc<MemoryCatalog>,
    notifier: Arc<dyn OrderNotifier>,
    timeout: Duration,
) -> OrderService {
    OrderService::new(store, notifier, CallPolicy::new(timeout))
}

#[tokio::test]
async fn test_order_placed_and_confirmation_sent() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(store.clone(), notifier.clone(), Duration::from_secs(5));

    let confirmation = svc
        .submit(booking(Some(&seeded.location.id), Some("11:30 AM"), cart(&seeded)))
        .await
        .unwrap();

    assert_eq!(confirmation.order.status, OrderStatus::Pending);
    assert_eq!(confirmation.order.total_amount, Decimal::new(2550, 2));
    assert_eq!(
        confirmation.order.pickup_time,
        pickup_timestamp(pickup_day(), "11:30 AM").unwrap()
    );
    assert_eq!(confirmation.location_name, "Uptown");
    assert_eq!(confirmation.items.len(), 2);
    assert_eq!(confirmation.email_message_id.as_deref(), Some("msg_1"));
    assert!(confirmation.warnings.is_empty());

    assert_eq!(store.order_count(), 1);
    assert_eq!(store.order_item_count(), 2);

    let sent = notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    let email = &sent[0].order;
    assert_eq!(email.id, confirmation.order.id);
    assert_eq!(email.location_name, "Uptown");
    assert_eq!(email.total_amount, Decimal::new(2550, 2));
    assert_eq!(email.items[0].menu_item.name, "Jerk Chicken");
    assert_eq!(email.items[0].quantity, 2);
}

#[tokio::test]
async fn test_preconditions_make_no_store_calls() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let before = store.call_count();
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));
    let loc = seeded.location.id.as_str();

    let err = svc
        .submit(booking(Some(loc), Some("11:00 AM"), Cart::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyCart));

    let err = svc
        .submit(booking(None, Some("11:00 AM"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NoLocation));

    let err = svc
        .submit(booking(Some(loc), None, cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NoTimeSlot));

    let err = svc
        .submit(booking(Some(loc), Some("noonish"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTimeSlot(_)));

    let mut bad_customer = booking(Some(loc), Some("11:00 AM"), cart(&seeded));
    bad_customer.customer.email = "not-an-email".into();
    let err = svc.submit(bad_customer).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidCustomer(_)));

    let mut yesterday = booking(Some(loc), Some("11:00 AM"), cart(&seeded));
    yesterday.date = today() - Days::new(1);
    let err = svc.submit(yesterday).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTimeSlot(_)));

    let mut refund = seeded.jerk.clone();
    refund.price = Decimal::new(-5000, 2);
    let mut negative = Cart::new();
    negative.add(&refund);
    let err = svc
        .submit(booking(Some(loc), Some("11:00 AM"), negative))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidCart(_)));

    let mut bulk = Cart::new();
    for _ in 0..100 {
        bulk.add(&seeded.plantains);
    }
    let err = svc
        .submit(booking(Some(loc), Some("11:00 AM"), bulk))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidCart(_)));

    assert_eq!(store.call_count(), before);
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_items_failure_leaves_partial_order() {
    let store = Arc::new(MemoryCatalog::non_transactional());
    let seeded = seed(&store).await;
    store.fail_at(FailurePoint::InsertOrderItems);
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));

    let err = svc
        .submit(booking(Some(&seeded.location.id), Some("12:00 PM"), cart(&seeded)))
        .await
        .unwrap_err();

    let order_id = match err {
        OrderError::PartialOrder { order_id, .. } => order_id,
        other => panic!("expected a partial order error, got {other:?}"),
    };
    let snapshot = store.orders_snapshot();
    assert_eq!(snapshot.len(), 1);
    let (order, items) = &snapshot[0];
    assert_eq!(order.id, order_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::new(2550, 2));
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_items_failure_in_transaction_leaves_nothing() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    store.fail_at(FailurePoint::InsertOrderItems);
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));

    let err = svc
        .submit(booking(Some(&seeded.location.id), Some("12:00 PM"), cart(&seeded)))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::CreateFailed(_)));
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.order_item_count(), 0);
}

#[tokio::test]
async fn test_email_failure_is_a_warning() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let svc = service(store.clone(), Arc::new(FailingNotifier), Duration::from_secs(5));

    let confirmation = svc
        .submit(booking(Some(&seeded.location.id), Some("1:00 PM"), cart(&seeded)))
        .await
        .unwrap();

    assert_eq!(
        confirmation.warnings,
        vec![SubmissionWarning::EmailNotSent {
            message: "Domain not verified".into()
        }]
    );
    assert_eq!(confirmation.order.total_amount, Decimal::new(2550, 2));
    assert_eq!(confirmation.items.len(), 2);
    assert!(confirmation.email_message_id.is_none());
    assert_eq!(store.order_count(), 1);
    assert_eq!(store.order_item_count(), 2);
}

#[tokio::test]
async fn test_slow_email_times_out_without_losing_order() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let svc = service(store.clone(), Arc::new(SlowNotifier), Duration::from_millis(50));

    let confirmation = svc
        .submit(booking(Some(&seeded.location.id), Some("1:00 PM"), cart(&seeded)))
        .await
        .unwrap();

    assert_eq!(confirmation.warnings.len(), 1);
    assert_eq!(store.order_count(), 1);
}

#[tokio::test]
async fn test_slow_order_write_is_outcome_unknown() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    store.set_write_latency(Some(Duration::from_millis(400)));
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_millis(50));

    let err = svc
        .submit(booking(Some(&seeded.location.id), Some("1:00 PM"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::OutcomeUnknown(_)));
}

#[tokio::test]
async fn test_unknown_location() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));

    let err = svc
        .submit(booking(Some("nowhere"), Some("1:00 PM"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::UnknownLocation(id) if id == "nowhere"));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_slot_must_be_offered_by_schedule() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));
    let loc = seeded.location.id.as_str();

    let err = svc
        .submit(booking(Some(loc), Some("3:00 PM"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTimeSlot(label) if label == "3:00 PM"));

    let mut unscheduled_day = booking(Some(loc), Some("11:30 AM"), cart(&seeded));
    unscheduled_day.date = pickup_day() + Days::new(1);
    let err = svc.submit(unscheduled_day).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTimeSlot(_)));

    let other = store
        .create_location(&LocationCreate {
            name: "Harbor".into(),
            address: "2 Pier Rd".into(),
            lat: Some(40.7),
            lng: Some(-74.0),
            image_url: None,
        })
        .await
        .unwrap();
    let err = svc
        .submit(booking(Some(&other.id), Some("11:30 AM"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTimeSlot(_)));

    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_unknown_menu_item_is_rejected() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));

    let mut ghost = seeded.jerk.clone();
    ghost.id = "ghost".into();
    let mut with_ghost = cart(&seeded);
    with_ghost.add(&ghost);

    let err = svc
        .submit(booking(Some(&seeded.location.id), Some("12:00 PM"), with_ghost))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::UnknownMenuItem(id) if id == "ghost"));
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.order_item_count(), 0);
}

#[tokio::test]
async fn test_lines_priced_from_catalog() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    let svc = service(store.clone(), Arc::new(NoopNotifier), Duration::from_secs(5));

    let mut bargain = seeded.jerk.clone();
    bargain.price = Decimal::new(1, 2);
    bargain.name = "Cheap Chicken".into();
    let mut stale = Cart::new();
    stale.add(&bargain);
    stale.add(&bargain);
    stale.add(&seeded.plantains);

    let confirmation = svc
        .submit(booking(Some(&seeded.location.id), Some("12:00 PM"), stale))
        .await
        .unwrap();
    assert_eq!(confirmation.order.total_amount, Decimal::new(2550, 2));
    assert_eq!(confirmation.items[0].name, "Jerk Chicken");
    assert_eq!(confirmation.items[0].price, Decimal::new(1000, 2));
    assert_eq!(confirmation.items[0].line_total, Decimal::new(2000, 2));

    let (_, items) = &store.orders_snapshot()[0];
    assert!(items.iter().all(|i| i.price > Decimal::ONE));
}

#[tokio::test]
async fn test_slow_lookup_before_write_is_a_timeout() {
    let store = Arc::new(MemoryCatalog::new());
    let seeded = seed(&store).await;
    store.set_latency(Some(Duration::from_millis(300)));

    let policy = CallPolicy::new(Duration::from_millis(50));
    let timed: Arc<dyn CatalogStore> = Arc::new(TimedCatalog::new(store.clone(), policy));
    let svc = OrderService::new(timed, Arc::new(NoopNotifier), policy);

    let err = svc
        .submit(booking(Some(&seeded.location.id), Some("1:00 PM"), cart(&seeded)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::LookupTimedOut(_)));

    store.set_latency(None);
    assert_eq!(store.order_count(), 0);
}
