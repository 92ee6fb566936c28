use crate::errors::ConsoleError;
use crate::model::employee::EmbeddedEmployee;
use crate::resource::shaping::{
    date_part, positive_amount, required_date, required_id, to_compact_json, trimmed,
};
use crate::resource::{FormContext, Payload, Resource, Searchable};
use crate::utils::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Kinds of other payment. The backend stores the Arabic labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum PaymentType {
    #[serde(rename = "تكلفة الإقامة", alias = "residency_cost")]
    #[strum(to_string = "تكلفة الإقامة", serialize = "residency_cost")]
    ResidencyCost,
    #[serde(rename = "كارت عمل", alias = "work_card")]
    #[strum(to_string = "كارت عمل", serialize = "work_card")]
    WorkCard,
    #[serde(rename = "تأمين طبي", alias = "medical_insurance")]
    #[strum(to_string = "تأمين طبي", serialize = "medical_insurance")]
    MedicalInsurance,
    #[serde(rename = "رسوم جوازات", alias = "passport_fees")]
    #[strum(to_string = "رسوم جوازات", serialize = "passport_fees")]
    PassportFees,
}

impl PaymentType {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentType::ResidencyCost => "Residency cost",
            PaymentType::WorkCard => "Work card",
            PaymentType::MedicalInsurance => "Medical insurance",
            PaymentType::PassportFees => "Passport fees",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum ResidenceDuration {
    #[serde(rename = "3_months")]
    #[strum(serialize = "3_months")]
    ThreeMonths,
    #[serde(rename = "6_months")]
    #[strum(serialize = "6_months")]
    SixMonths,
    #[serde(rename = "9_months")]
    #[strum(serialize = "9_months")]
    NineMonths,
    #[serde(rename = "1_year")]
    #[strum(serialize = "1_year")]
    OneYear,
}

impl ResidenceDuration {
    pub fn label(&self) -> &'static str {
        match self {
            ResidenceDuration::ThreeMonths => "3 months",
            ResidenceDuration::SixMonths => "6 months",
            ResidenceDuration::NineMonths => "9 months",
            ResidenceDuration::OneYear => "1 year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherPayment {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, rename = "type", deserialize_with = "lenient::string_or_empty")]
    pub payment_type: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub residence_duration: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub payment_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

impl OtherPayment {
    pub fn payment_type(&self) -> Option<PaymentType> {
        lenient::variant(&self.payment_type)
    }

    pub fn duration_label(&self) -> Option<&'static str> {
        self.residence_duration
            .as_deref()
            .and_then(lenient::variant::<ResidenceDuration>)
            .map(|d| d.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OtherPaymentDraft {
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(rename = "type", deserialize_with = "lenient::opt_variant")]
    pub payment_type: Option<PaymentType>,
    /// Only meaningful for residency cost payments
    #[serde(deserialize_with = "lenient::opt_variant")]
    pub residence_duration: Option<ResidenceDuration>,
    #[schema(example = 650.0)]
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub amount: Option<f64>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
}

impl Searchable for OtherPayment {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.payment_type.as_str()];
        fields.extend(self.payment_type().map(|t| t.label()));
        fields.extend(self.notes.as_deref());
        fields
    }

    fn in_category(&self, payment_type: &str) -> bool {
        match lenient::variant::<PaymentType>(payment_type) {
            Some(wanted) => self.payment_type() == Some(wanted),
            None => self.payment_type == payment_type,
        }
    }
}

impl Resource for OtherPayment {
    type Draft = OtherPaymentDraft;

    const KEY: &'static str = "other-payments";
    const ENDPOINT: &'static str = "/other-payments";
    const TITLE: &'static str = "Other payments";
    const NOUN: &'static str = "payment";
    const EMPLOYEE_LOOKUP: bool = true;

    fn id(&self) -> u64 {
        self.id
    }

    fn employee_ref(&self) -> Option<u64> {
        self.employee_id
    }

    fn embedded_employee_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|e| e.name.as_str()).filter(|n| !n.is_empty())
    }

    fn labels(&self) -> BTreeMap<&'static str, String> {
        let mut labels = BTreeMap::new();
        if let Some(kind) = self.payment_type() {
            labels.insert("type", kind.label().to_string());
        }
        if let Some(duration) = self.duration_label() {
            labels.insert("residence_duration", duration.to_string());
        }
        labels
    }

    fn edit_draft(&self) -> OtherPaymentDraft {
        OtherPaymentDraft {
            employee_id: self.employee_id,
            payment_type: self.payment_type(),
            residence_duration: self.residence_duration.as_deref().and_then(lenient::variant),
            amount: Some(self.amount),
            payment_date: self.payment_date.as_deref().and_then(date_part),
            notes: self.notes.clone(),
        }
    }

    /// The residence duration is required for residency costs and dropped
    /// for every other type.
    fn prepare(draft: OtherPaymentDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        let payment_type = draft.payment_type.ok_or_else(|| ConsoleError::Validation {
            field: "type",
            message: "Please select a payment type".to_string(),
        })?;

        let residence_duration = match payment_type {
            PaymentType::ResidencyCost => {
                Some(draft.residence_duration.ok_or_else(|| ConsoleError::Validation {
                    field: "residence_duration",
                    message: "Residency costs need a residence duration".to_string(),
                })?)
            }
            _ => None,
        };

        let shaped = OtherPaymentDraft {
            employee_id: Some(required_id("employee_id", draft.employee_id)?),
            payment_type: Some(payment_type),
            residence_duration,
            amount: Some(positive_amount("amount", draft.amount)?),
            payment_date: Some(required_date(
                "payment_date",
                ctx.date_or_today(draft.payment_date),
            )?),
            notes: trimmed(draft.notes),
        };
        Ok(Payload::Json(to_compact_json(&shaped)?))
    }
}

/// Salary advance repaid in monthly installments. Repayment progress is
/// tracked by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub installment_months: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub monthly_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_deducted: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AdvanceDraft {
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[schema(example = 3000.0)]
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub amount: Option<f64>,
    #[schema(example = 6)]
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub installment_months: Option<u64>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
}

impl Searchable for Advance {
    fn search_fields(&self) -> Vec<&str> {
        self.status.as_deref().into_iter().collect()
    }

    fn in_category(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }
}

impl Resource for Advance {
    type Draft = AdvanceDraft;

    const KEY: &'static str = "advances";
    const ENDPOINT: &'static str = "/advances";
    const TITLE: &'static str = "Advances";
    const NOUN: &'static str = "advance";
    const EMPLOYEE_LOOKUP: bool = true;

    fn id(&self) -> u64 {
        self.id
    }

    fn employee_ref(&self) -> Option<u64> {
        self.employee_id
    }

    fn embedded_employee_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|e| e.name.as_str()).filter(|n| !n.is_empty())
    }

    fn edit_draft(&self) -> AdvanceDraft {
        AdvanceDraft {
            employee_id: self.employee_id,
            amount: Some(self.amount),
            installment_months: self.installment_months,
            start_date: self.start_date.as_deref().and_then(date_part),
        }
    }

    fn prepare(draft: AdvanceDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        let installment_months = draft
            .installment_months
            .filter(|months| *months > 0)
            .or(ctx.defaults.advance_installment_months.map(u64::from));

        let shaped = AdvanceDraft {
            employee_id: Some(required_id("employee_id", draft.employee_id)?),
            amount: Some(positive_amount("amount", draft.amount)?),
            installment_months,
            start_date: ctx.date_or_today(draft.start_date),
        };
        Ok(Payload::Json(to_compact_json(&shaped)?))
    }
}

/// Draft shared by penalties and allowances: a typed amount on a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ChargeDraft {
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(rename = "type", deserialize_with = "lenient::opt_string")]
    pub charge_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub amount: Option<f64>,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(deserialize_with = "lenient::opt_date")]
    pub date: Option<NaiveDate>,
}

fn prepare_charge(
    draft: ChargeDraft,
    ctx: &FormContext<'_>,
    fallback_type: Option<&str>,
) -> Result<Payload, ConsoleError> {
    let shaped = ChargeDraft {
        employee_id: Some(required_id("employee_id", draft.employee_id)?),
        charge_type: trimmed(draft.charge_type).or_else(|| fallback_type.map(str::to_string)),
        amount: Some(positive_amount("amount", draft.amount)?),
        date: ctx.date_or_today(draft.date),
    };
    Ok(Payload::Json(to_compact_json(&shaped)?))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, rename = "type", deserialize_with = "lenient::string_or_empty")]
    pub penalty_type: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

impl Searchable for Penalty {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.penalty_type.as_str()]
    }

    fn in_category(&self, penalty_type: &str) -> bool {
        self.penalty_type == penalty_type
    }
}

impl Resource for Penalty {
    type Draft = ChargeDraft;

    const KEY: &'static str = "penalties";
    const ENDPOINT: &'static str = "/penalties";
    const TITLE: &'static str = "Penalties";
    const NOUN: &'static str = "penalty";
    const EMPLOYEE_LOOKUP: bool = true;

    fn id(&self) -> u64 {
        self.id
    }

    fn employee_ref(&self) -> Option<u64> {
        self.employee_id
    }

    fn embedded_employee_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|e| e.name.as_str()).filter(|n| !n.is_empty())
    }

    fn edit_draft(&self) -> ChargeDraft {
        ChargeDraft {
            employee_id: self.employee_id,
            charge_type: Some(self.penalty_type.clone()).filter(|t| !t.is_empty()),
            amount: Some(self.amount),
            date: self.date.as_deref().and_then(date_part),
        }
    }

    fn prepare(draft: ChargeDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        prepare_charge(draft, ctx, ctx.defaults.penalty_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allowance {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub employee_id: Option<u64>,
    #[serde(default, rename = "type", deserialize_with = "lenient::string_or_empty")]
    pub allowance_type: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub employee: Option<EmbeddedEmployee>,
}

impl Searchable for Allowance {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.allowance_type.as_str()]
    }

    fn in_category(&self, allowance_type: &str) -> bool {
        self.allowance_type == allowance_type
    }
}

impl Resource for Allowance {
    type Draft = ChargeDraft;

    const KEY: &'static str = "allowances";
    const ENDPOINT: &'static str = "/allowances";
    const TITLE: &'static str = "Allowances";
    const NOUN: &'static str = "allowance";
    const EMPLOYEE_LOOKUP: bool = true;

    fn id(&self) -> u64 {
        self.id
    }

    fn employee_ref(&self) -> Option<u64> {
        self.employee_id
    }

    fn embedded_employee_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|e| e.name.as_str()).filter(|n| !n.is_empty())
    }

    fn edit_draft(&self) -> ChargeDraft {
        ChargeDraft {
            employee_id: self.employee_id,
            charge_type: Some(self.allowance_type.clone()).filter(|t| !t.is_empty()),
            amount: Some(self.amount),
            date: self.date.as_deref().and_then(date_part),
        }
    }

    fn prepare(draft: ChargeDraft, ctx: &FormContext<'_>) -> Result<Payload, ConsoleError> {
        prepare_charge(draft, ctx, ctx.defaults.allowance_type.as_deref())
    }
}
