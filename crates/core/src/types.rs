use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::dates::{format_wire_date, parse_billing_date, parse_optional_date};
use crate::error::{BillingError, BillingResult};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque customer identifier. The REST backend hands out Mongo object ids,
/// locally created customers get a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Payment plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentPlan {
    #[serde(rename = "Monthly")]
    Monthly,
    #[serde(rename = "Half-Yearly")]
    HalfYearly,
    #[serde(rename = "Yearly")]
    Yearly,
}

impl PaymentPlan {
    pub const ALL: &'static [PaymentPlan] = &[Self::Monthly, Self::HalfYearly, Self::Yearly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::HalfYearly => "Half-Yearly",
            Self::Yearly => "Yearly",
        }
    }

    /// Billing-cycle length in calendar months.
    pub fn cycle_months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::HalfYearly => 6,
            Self::Yearly => 12,
        }
    }
}

impl std::fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentPlan {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monthly" => Ok(Self::Monthly),
            "Half-Yearly" => Ok(Self::HalfYearly),
            "Yearly" => Ok(Self::Yearly),
            other => Err(BillingError::InvalidPlan(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Customer status
// ---------------------------------------------------------------------------

/// Payment status as set by operator actions. The billing engine reads it
/// but never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerStatus {
    #[serde(rename = "Paid")]
    Paid,
    #[serde(rename = "Due but Active")]
    DueButActive,
    #[serde(rename = "Overdue")]
    Overdue,
}

impl CustomerStatus {
    pub const ALL: &'static [CustomerStatus] = &[Self::Paid, Self::DueButActive, Self::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::DueButActive => "Due but Active",
            Self::Overdue => "Overdue",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CustomerStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paid" => Ok(Self::Paid),
            "Due but Active" => Ok(Self::DueButActive),
            "Overdue" => Ok(Self::Overdue),
            other => Err(BillingError::InvalidStatus(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Customer & payment records
// ---------------------------------------------------------------------------

/// A cable subscriber as held by the customer store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub payment_plan: PaymentPlan,
    pub last_paid_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub status: CustomerStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of a customer's append-only payment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub customer_id: CustomerId,
    pub payment_date: NaiveDate,
    pub payment_plan: PaymentPlan,
    /// Explicit amount; when absent the plan's list price applies.
    pub amount: Option<u64>,
    pub status: CustomerStatus,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Wire shapes (REST backend JSON)
// ---------------------------------------------------------------------------

/// Response envelope used by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn into_data(self) -> BillingResult<T> {
        if self.success {
            Ok(self.data)
        } else {
            Err(BillingError::Upstream(
                self.message
                    .unwrap_or_else(|| "request reported failure".to_string()),
            ))
        }
    }
}

/// Customer as serialized by the backend: camelCase keys and string dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub payment_plan: String,
    #[serde(default)]
    pub last_paid_date: Option<String>,
    #[serde(default)]
    pub next_due_date: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = BillingError;

    fn try_from(rec: CustomerRecord) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: CustomerId(rec.id),
            name: rec.name,
            phone: rec.phone,
            address: rec.address,
            payment_plan: rec.payment_plan.parse()?,
            last_paid_date: parse_optional_date(rec.last_paid_date.as_deref())?,
            next_due_date: parse_optional_date(rec.next_due_date.as_deref())?,
            status: rec.status.parse()?,
            notes: rec.notes,
            created_at: rec.created_at.unwrap_or_else(Utc::now),
        })
    }
}

impl From<&Customer> for CustomerRecord {
    fn from(c: &Customer) -> Self {
        CustomerRecord {
            id: c.id.0.clone(),
            name: c.name.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            payment_plan: c.payment_plan.as_str().to_string(),
            last_paid_date: c.last_paid_date.map(format_wire_date),
            next_due_date: c.next_due_date.map(format_wire_date),
            status: c.status.as_str().to_string(),
            notes: c.notes.clone(),
            created_at: Some(c.created_at),
        }
    }
}

/// Payment history entry as serialized by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordWire {
    #[serde(alias = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub customer_id: String,
    pub payment_date: String,
    pub payment_plan: String,
    #[serde(default)]
    pub amount: Option<u64>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the entry was written. Orders same-day entries.
    #[serde(alias = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRecordWire> for PaymentRecord {
    type Error = BillingError;

    fn try_from(w: PaymentRecordWire) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            id: w
                .id
                .as_deref()
                .and_then(|raw| Uuid::parse_str(raw).ok())
                .unwrap_or_else(Uuid::new_v4),
            customer_id: CustomerId(w.customer_id),
            payment_date: parse_billing_date(&w.payment_date)?,
            payment_plan: w.payment_plan.parse()?,
            amount: w.amount,
            status: w.status.parse()?,
            notes: w.notes,
            recorded_at: w.recorded_at.unwrap_or_else(Utc::now),
        })
    }
}

impl From<&PaymentRecord> for PaymentRecordWire {
    fn from(p: &PaymentRecord) -> Self {
        PaymentRecordWire {
            id: Some(p.id.to_string()),
            customer_id: p.customer_id.0.clone(),
            payment_date: format_wire_date(p.payment_date),
            payment_plan: p.payment_plan.as_str().to_string(),
            amount: p.amount,
            status: p.status.as_str().to_string(),
            notes: p.notes.clone(),
            recorded_at: Some(p.recorded_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_parsing_and_cycles() {
        assert_eq!("Half-Yearly".parse::<PaymentPlan>().unwrap(), PaymentPlan::HalfYearly);
        assert_eq!(PaymentPlan::Monthly.cycle_months(), 1);
        assert_eq!(PaymentPlan::HalfYearly.cycle_months(), 6);
        assert_eq!(PaymentPlan::Yearly.cycle_months(), 12);
        assert!(matches!(
            "Quarterly".parse::<PaymentPlan>(),
            Err(BillingError::InvalidPlan(p)) if p == "Quarterly"
        ));
        // Matching is exact, as on the wire.
        assert!("monthly".parse::<PaymentPlan>().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&CustomerStatus::DueButActive).unwrap();
        assert_eq!(json, "\"Due but Active\"");
        assert_eq!(
            "Overdue".parse::<CustomerStatus>().unwrap(),
            CustomerStatus::Overdue
        );
        assert!("Late".parse::<CustomerStatus>().is_err());
    }

    #[test]
    fn test_customer_record_from_backend_json() {
        let raw = r#"{
            "_id": "65f0c0ffee",
            "name": "Ravi Kumar",
            "paymentPlan": "Yearly",
            "lastPaidDate": "2024-03-20T00:00:00.000Z",
            "nextDueDate": "2025-03-20T00:00:00.000Z",
            "status": "Paid",
            "notes": "corner house"
        }"#;
        let rec: CustomerRecord = serde_json::from_str(raw).unwrap();
        let customer = Customer::try_from(rec).unwrap();
        assert_eq!(customer.id.as_str(), "65f0c0ffee");
        assert_eq!(customer.payment_plan, PaymentPlan::Yearly);
        assert_eq!(
            customer.last_paid_date,
            NaiveDate::from_ymd_opt(2024, 3, 20)
        );
        assert_eq!(customer.status, CustomerStatus::Paid);
    }

    #[test]
    fn test_customer_record_rejects_bad_fields() {
        let mut rec = CustomerRecord {
            id: "c1".into(),
            name: "A".into(),
            phone: None,
            address: None,
            payment_plan: "Weekly".into(),
            last_paid_date: None,
            next_due_date: None,
            status: "Paid".into(),
            notes: None,
            created_at: None,
        };
        assert!(matches!(
            Customer::try_from(rec.clone()),
            Err(BillingError::InvalidPlan(_))
        ));

        rec.payment_plan = "Monthly".into();
        rec.last_paid_date = Some("32/01/2024".into());
        assert!(matches!(
            Customer::try_from(rec),
            Err(BillingError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_envelope_failure_maps_to_upstream() {
        let env: ApiEnvelope<Vec<CustomerRecord>> =
            serde_json::from_str(r#"{"success": false, "data": [], "message": "db down"}"#)
                .unwrap();
        match env.into_data() {
            Err(BillingError::Upstream(msg)) => assert_eq!(msg, "db down"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_payment_wire_keeps_recorded_at() {
        let json = r#"{"_id": "65f0c1", "customerId": "a1", "paymentDate": "2024-03-15",
            "paymentPlan": "Monthly", "status": "Paid", "createdAt": "2024-03-15T09:30:00Z"}"#;
        let wire: PaymentRecordWire = serde_json::from_str(json).unwrap();
        let rec = PaymentRecord::try_from(wire).unwrap();
        let expected: DateTime<Utc> = "2024-03-15T09:30:00Z".parse().unwrap();
        assert_eq!(rec.recorded_at, expected);

        let back = PaymentRecordWire::from(&rec);
        assert_eq!(back.recorded_at, Some(expected));
        assert_eq!(PaymentRecord::try_from(back).unwrap().recorded_at, expected);
    }
}
