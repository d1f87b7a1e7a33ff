//! Confirmation email rendering

use chrono::{DateTime, Local, TimeZone};
use rust_decimal::Decimal;

use super::OrderEmailBody;

pub const SUBJECT: &str = "Order Confirmation - Afro Jerk Food Truck";

const CELL: &str = "padding: 8px; border-bottom: 1px solid #e5e7eb;";
const HEAD: &str = "text-align: left; padding: 8px;";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// "Saturday, June 1, 2024 at 11:00 AM"
pub fn format_pickup_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

/// "$25.50"
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the confirmation with the pickup time in the server's local zone
pub fn render_order_email(order: &OrderEmailBody, support_email: &str) -> RenderedEmail {
    let pickup = format_pickup_time(&order.pickup_time.with_timezone(&Local));
    render_with_pickup(order, &pickup, support_email)
}

pub(crate) fn render_with_pickup(
    order: &OrderEmailBody,
    pickup: &str,
    support_email: &str,
) -> RenderedEmail {
    let rows: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td></tr>",
                escape(&item.menu_item.name),
                item.quantity,
                item.line_total().map(format_money).unwrap_or_default(),
            )
        })
        .collect();

    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #edba3a;">Thank you for your order!</h1>
  <p>Hi {name},</p>
  <p>Your order has been confirmed and will be ready for pickup at {pickup}.</p>
  <h2>Order Details:</h2>
  <p><strong>Order ID:</strong> {id}</p>
  <p><strong>Pickup Location:</strong> {location}</p>
  <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
    <thead>
      <tr style="background-color: #f3f4f6;">
        <th style="{HEAD}">Item</th>
        <th style="{HEAD}">Quantity</th>
        <th style="{HEAD}">Price</th>
      </tr>
    </thead>
    <tbody>{rows}</tbody>
    <tfoot>
      <tr style="border-top: 2px solid #e5e7eb;">
        <td colspan="2" style="padding: 8px;"><strong>Total</strong></td>
        <td style="padding: 8px;"><strong>{total}</strong></td>
      </tr>
    </tfoot>
  </table>
  <p>If you have any questions, please contact us at {support}</p>
  <div style="margin-top: 40px; padding-top: 20px; border-top: 1px solid #e5e7eb; font-size: 12px; color: #6b7280;">
    <p>Afro Jerk Food Truck</p>
    <p>This is an automated message, please do not reply to this email.</p>
  </div>
</div>"#,
        name = escape(&order.customer_name),
        pickup = pickup,
        id = escape(&order.id),
        location = escape(&order.location_name),
        rows = rows,
        total = format_money(order.total_amount),
        support = escape(support_email),
    );

    RenderedEmail {
        to: order.customer_email.clone(),
        subject: SUBJECT.to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::tests::sample_email;
    use chrono::Utc;

    #[test]
    fn test_pickup_time_format() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap();
        assert_eq!(format_pickup_time(&t), "Saturday, June 1, 2024 at 11:00 AM");

        let t = Utc.with_ymd_and_hms(2024, 12, 25, 13, 30, 0).unwrap();
        assert_eq!(
            format_pickup_time(&t),
            "Wednesday, December 25, 2024 at 1:30 PM"
        );
    }

    #[test]
    fn test_money_format() {
        assert_eq!(format_money(Decimal::new(2550, 2)), "$25.50");
        assert_eq!(format_money(Decimal::new(10, 0)), "$10.00");
    }

    #[test]
    fn test_render_contains_lines_and_total() {
        let email = sample_email();
        let rendered = render_with_pickup(
            &email.order,
            "Saturday, June 1, 2024 at 11:00 AM",
            "support@afrojerk.com",
        );

        assert_eq!(rendered.to, "ama@example.com");
        assert_eq!(rendered.subject, SUBJECT);
        assert!(rendered.html.contains("Hi Ama,"));
        assert!(rendered.html.contains("ready for pickup at Saturday, June 1, 2024 at 11:00 AM"));
        assert!(rendered.html.contains("<strong>Pickup Location:</strong> Uptown"));
        assert!(rendered.html.contains("Jerk Chicken"));
        // 2 x $10.00 line total
        assert!(rendered.html.contains("$20.00"));
        assert!(rendered.html.contains("<strong>$25.50</strong>"));
        assert!(rendered.html.contains("support@afrojerk.com"));
    }

    #[test]
    fn test_render_escapes_customer_text() {
        let mut email = sample_email();
        email.order.customer_name = "<b>Kofi</b>".into();
        let rendered = render_with_pickup(&email.order, "soon", "support@afrojerk.com");
        assert!(rendered.html.contains("Hi &lt;b&gt;Kofi&lt;/b&gt;,"));
    }
}
