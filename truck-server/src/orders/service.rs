use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use shared::models::{NewOrder, Schedule, ScheduleQuery};
use shared::util::{now, today};

use super::{
    BookingRequest, ConfirmedItem, CustomerDetails, OrderConfirmation, OrderError,
    SubmissionWarning,
};
use crate::availability::{TimeSlot, available_times};
use crate::call::CallPolicy;
use crate::cart::Cart;
use crate::catalog::{CatalogStore, StoreError};
use crate::notifier::{EmailMenuItem, OrderEmail, OrderEmailBody, OrderEmailItem, OrderNotifier};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_required_text,
};

/// Pickup instant for a day and a 12-hour slot label, read in local time.
///
/// A label that does not parse, or a local time skipped by a clock change,
/// is an invalid slot. An ambiguous local time takes the earlier instant.
pub fn pickup_timestamp(date: NaiveDate, label: &str) -> Result<DateTime<Utc>, OrderError> {
    let slot =
        TimeSlot::parse_label(label).ok_or_else(|| OrderError::InvalidTimeSlot(label.into()))?;
    date.and_time(slot.time())
        .and_local_timezone(Local)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| OrderError::InvalidTimeSlot(label.into()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_customer(customer: &CustomerDetails) -> Result<(), OrderError> {
    validate_required_text(&customer.name, "customer_name", MAX_NAME_LEN)
        .and_then(|_| validate_email(&customer.email, "customer_email"))
        .and_then(|_| validate_required_text(&customer.phone, "customer_phone", MAX_SHORT_TEXT_LEN))
        .map_err(OrderError::InvalidCustomer)
}

/// Reads before the write: nothing has been stored yet
fn classify_lookup_error(e: StoreError) -> OrderError {
    match e {
        StoreError::NotFound {
            entity: "location",
            id,
        } => OrderError::UnknownLocation(id),
        StoreError::NotFound {
            entity: "menu item",
            id,
        } => OrderError::UnknownMenuItem(id),
        StoreError::Call(call) if call.is_timeout() => OrderError::LookupTimedOut(call.message),
        other => OrderError::CreateFailed(other.to_string()),
    }
}

/// The order write itself
fn classify_write_error(e: StoreError) -> OrderError {
    match e {
        StoreError::PartialOrder { order_id, reason } => {
            OrderError::PartialOrder { order_id, reason }
        }
        StoreError::Call(call) if call.is_timeout() => OrderError::OutcomeUnknown(call.message),
        other => OrderError::CreateFailed(other.to_string()),
    }
}

pub struct OrderService {
    store: Arc<dyn CatalogStore>,
    notifier: Arc<dyn OrderNotifier>,
    policy: CallPolicy,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        notifier: Arc<dyn OrderNotifier>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    async fn lookup<T, F>(&self, what: &str, fut: F) -> Result<T, OrderError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match self.policy.run(what, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(classify_lookup_error(e)),
            Err(call) => Err(OrderError::LookupTimedOut(call.message)),
        }
    }

    /// Validate, store the order with its lines, then try to send the email.
    ///
    /// The slot must be one the location's schedule offers for that day,
    /// and every cart line must name a stored menu item; lines are priced
    /// from the catalog. Nothing is written when validation fails. An email
    /// failure never undoes the order; it comes back as a warning on the
    /// confirmation.
    pub async fn submit(&self, req: BookingRequest) -> Result<OrderConfirmation, OrderError> {
        let location_id = non_blank(req.location_id).ok_or(OrderError::NoLocation)?;
        let label = non_blank(req.time_slot).ok_or(OrderError::NoTimeSlot)?;
        let mut cart = req.cart.normalized();
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        validate_customer(&req.customer)?;
        cart.validated_total().map_err(OrderError::InvalidCart)?;
        let slot = TimeSlot::parse_label(&label)
            .ok_or_else(|| OrderError::InvalidTimeSlot(label.clone()))?;
        let pickup_time = pickup_timestamp(req.date, &label)?;
        if pickup_time <= now() {
            return Err(OrderError::InvalidTimeSlot(label));
        }

        let location = self
            .lookup("get_location", self.store.get_location(&location_id))
            .await?;

        let query = ScheduleQuery {
            from: Some(today()),
            location_id: Some(location.id.clone()),
            ..Default::default()
        };
        let schedules: Vec<Schedule> = self
            .lookup("list_schedules", self.store.list_schedules(&query))
            .await?
            .into_iter()
            .map(|s| s.schedule)
            .collect();
        if !available_times(&schedules, req.date, &location.id).contains(&slot.label()) {
            tracing::info!(
                location_id = %location.id,
                date = %req.date,
                slot = %label,
                "Slot not offered"
            );
            return Err(OrderError::InvalidTimeSlot(label));
        }

        let ids: Vec<String> = cart.entries().iter().map(|e| e.menu_item.id.clone()).collect();
        for id in ids {
            let stored = self
                .lookup("get_menu_item", self.store.get_menu_item(&id))
                .await?;
            cart.reprice(&stored);
        }
        let total_amount = cart.validated_total().map_err(OrderError::InvalidCart)?;

        let customer = req.customer;
        let new_order = NewOrder {
            customer_name: customer.name.trim().to_string(),
            customer_email: customer.email.trim().to_string(),
            customer_phone: customer.phone.trim().to_string(),
            location_id: location.id.clone(),
            total_amount,
            pickup_time,
        };
        let lines = cart.order_items();

        let (order, _stored) = match self
            .policy
            .run("create_order", self.store.create_order(&new_order, &lines))
            .await
        {
            Ok(Ok(created)) => created,
            Ok(Err(e)) => {
                let err = classify_write_error(e);
                tracing::error!(location_id = %location.id, error = %err, "Order write failed");
                return Err(err);
            }
            Err(call) => {
                tracing::error!(location_id = %location.id, error = %call, "Order write timed out");
                return Err(OrderError::OutcomeUnknown(call.message));
            }
        };
        tracing::info!(
            order_id = %order.id,
            location_id = %order.location_id,
            total = %order.total_amount,
            items = lines.len(),
            "Order placed"
        );

        let items = confirmed_items(&cart);
        let email = OrderEmail {
            order: OrderEmailBody {
                id: order.id.clone(),
                customer_name: order.customer_name.clone(),
                customer_email: order.customer_email.clone(),
                location_name: location.name.clone(),
                pickup_time: order.pickup_time,
                total_amount: order.total_amount,
                items: items
                    .iter()
                    .map(|i| OrderEmailItem {
                        menu_item: EmailMenuItem {
                            name: i.name.clone(),
                            price: i.price,
                        },
                        quantity: i.quantity,
                    })
                    .collect(),
            },
        };

        let mut warnings = Vec::new();
        let mut email_message_id = None;
        let sent = self
            .policy
            .run(
                "send_order_confirmation",
                self.notifier.send_order_confirmation(&email),
            )
            .await;
        match sent.map_err(Into::into).and_then(|r| r) {
            Ok(receipt) => email_message_id = receipt.message_id,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Confirmation email failed");
                warnings.push(SubmissionWarning::EmailNotSent {
                    message: e.user_message(),
                });
            }
        }

        Ok(OrderConfirmation {
            order,
            location_name: location.name,
            items,
            email_message_id,
            warnings,
        })
    }
}

fn confirmed_items(cart: &Cart) -> Vec<ConfirmedItem> {
    cart.entries()
        .iter()
        .map(|e| ConfirmedItem {
            menu_item_id: e.menu_item.id.clone(),
            name: e.menu_item.name.clone(),
            quantity: i32::try_from(e.quantity).unwrap_or(i32::MAX),
            price: e.unit_price,
            line_total: e.line_total().unwrap_or_default(),
        })
        .collect()
}
