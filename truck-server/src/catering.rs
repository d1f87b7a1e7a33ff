//! Catering quotes
//!
//! Catering is sold as fixed trays and pans from a short package list, for
//! events of 20 to 100 guests booked at least three days ahead. This module
//! prices a selection; the request itself is handled by the site's form
//! service.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::utils::validation::MAX_LINE_QUANTITY;

/// Days of notice a catering event needs
pub const LEAD_DAYS: u64 = 3;
pub const MIN_GUESTS: u32 = 20;
pub const MAX_GUESTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CateringPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub price: Decimal,
    pub min_quantity: u32,
}

const fn dollars(whole: u32) -> Decimal {
    Decimal::from_parts(whole, 0, 0, false, 0)
}

pub const PACKAGES: [CateringPackage; 6] = [
    CateringPackage {
        id: "jollof-rice",
        name: "Jollof Rice Pan (Serves 8-10)",
        price: dollars(45),
        min_quantity: 2,
    },
    CateringPackage {
        id: "jerk-chicken",
        name: "Jerk Chicken Tray (24 pieces)",
        price: dollars(65),
        min_quantity: 1,
    },
    CateringPackage {
        id: "plantains",
        name: "Fried Plantains Tray (Serves 15-20)",
        price: dollars(35),
        min_quantity: 1,
    },
    CateringPackage {
        id: "cassava-leaf",
        name: "Cassava Leaf Stew Pan (Serves 8-10)",
        price: dollars(55),
        min_quantity: 2,
    },
    CateringPackage {
        id: "curry-chicken",
        name: "Curry Chicken Tray (24 pieces)",
        price: dollars(65),
        min_quantity: 1,
    },
    CateringPackage {
        id: "rice",
        name: "White Rice Pan (Serves 15-20)",
        price: dollars(30),
        min_quantity: 1,
    },
];

pub fn find_package(id: &str) -> Option<&'static CateringPackage> {
    PACKAGES.iter().find(|p| p.id == id)
}

/// First day an event may be booked for
pub fn earliest_event_date(today: NaiveDate) -> NaiveDate {
    today + Days::new(LEAD_DAYS)
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub date: NaiveDate,
    pub guests: u32,
    /// package id → number of trays or pans; zero entries are ignored
    #[serde(default)]
    pub items: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub package_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub date: NaiveDate,
    pub guests: u32,
    pub lines: Vec<QuoteLine>,
    pub total: Decimal,
}

/// Price a catering selection for an event on `req.date`
pub fn quote(req: &QuoteRequest, today: NaiveDate) -> Result<Quote, AppError> {
    let earliest = earliest_event_date(today);
    if req.date < earliest {
        return Err(AppError::new(ErrorCode::CateringTooSoon)
            .with_detail("earliest_date", earliest.to_string()));
    }
    if !(MIN_GUESTS..=MAX_GUESTS).contains(&req.guests) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Guests must be between {MIN_GUESTS} and {MAX_GUESTS}"),
        )
        .with_detail("field", "guests"));
    }

    let mut lines = Vec::new();
    let mut total = Decimal::ZERO;
    for (id, &quantity) in req.items.iter().filter(|(_, q)| **q > 0) {
        let package = find_package(id).ok_or_else(|| {
            AppError::new(ErrorCode::CateringUnknownPackage).with_detail("package_id", id.clone())
        })?;
        if quantity < package.min_quantity {
            return Err(AppError::new(ErrorCode::CateringBelowMinimum)
                .with_detail("package_id", id.clone())
                .with_detail("min_quantity", package.min_quantity));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(AppError::new(ErrorCode::ValueOutOfRange)
                .with_detail("package_id", id.clone())
                .with_detail("max_quantity", MAX_LINE_QUANTITY));
        }
        let line_total = package
            .price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| AppError::new(ErrorCode::ValueOutOfRange))?;
        total = total
            .checked_add(line_total)
            .ok_or_else(|| AppError::new(ErrorCode::ValueOutOfRange))?;
        lines.push(QuoteLine {
            package_id: id.clone(),
            name: package.name.to_string(),
            quantity,
            unit_price: package.price,
            line_total,
        });
    }
    if lines.is_empty() {
        return Err(AppError::required("items"));
    }

    Ok(Quote {
        date: req.date,
        guests: req.guests,
        lines,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn request(date: NaiveDate, items: &[(&str, u32)]) -> QuoteRequest {
        QuoteRequest {
            date,
            guests: 40,
            items: items.iter().map(|(id, q)| (id.to_string(), *q)).collect(),
        }
    }

    #[test]
    fn test_earliest_date_is_three_days_out() {
        assert_eq!(
            earliest_event_date(today()),
            NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
        );
    }

    #[test]
    fn test_quote_totals() {
        let req = request(
            earliest_event_date(today()),
            &[("jollof-rice", 2), ("jerk-chicken", 3), ("rice", 0)],
        );
        let q = quote(&req, today()).unwrap();
        assert_eq!(q.lines.len(), 2);
        assert_eq!(q.total, Decimal::new(28500, 2));
        let jerk = q.lines.iter().find(|l| l.package_id == "jerk-chicken").unwrap();
        assert_eq!(jerk.line_total, Decimal::from(195));
    }

    #[test]
    fn test_too_soon() {
        let req = request(today() + Days::new(2), &[("rice", 1)]);
        let err = quote(&req, today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CateringTooSoon);
        assert_eq!(err.details.unwrap()["earliest_date"], "2024-06-04");
    }

    #[test]
    fn test_package_rules() {
        let date = earliest_event_date(today());

        let err = quote(&request(date, &[("pizza", 1)]), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CateringUnknownPackage);

        let err = quote(&request(date, &[("cassava-leaf", 1)]), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CateringBelowMinimum);

        let err = quote(&request(date, &[("rice", 0)]), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);

        let err = quote(&request(date, &[("rice", u32::MAX)]), today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_guest_range() {
        let mut req = request(earliest_event_date(today()), &[("rice", 1)]);
        req.guests = 10;
        assert_eq!(
            quote(&req, today()).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        req.guests = 100;
        assert!(quote(&req, today()).is_ok());
    }
}
