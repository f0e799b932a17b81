use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Critical,
    Standard,
}

impl Sensitivity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Standard => "standard",
        }
    }

    /// Four-letter tag used in per-atom log lines.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Critical => "CRIT",
            Self::Standard => "STND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CoupleRestriction,
    LocalIdRestriction,
    MandatoryCharges,
    AgeRestriction,
    NationalityRestriction,
    FacilityClosure,
    GuestProfile,
    IdDocumentation,
    CheckinCheckout,
    ChildPolicy,
    ExtraBed,
    FoodBeverage,
    SmokingPolicy,
    PetPolicy,
    SecurityDeposit,
    PaymentMethods,
    CancellationRefund,
    OutsideVisitors,
    DamagePolicy,
    LongStay,
    PartyEventPolicy,
    Accessibility,
    SafetyInformation,
    PropertyRules,
    Others,
}

impl Category {
    pub const ALL: [Category; 25] = [
        Self::CoupleRestriction,
        Self::LocalIdRestriction,
        Self::MandatoryCharges,
        Self::AgeRestriction,
        Self::NationalityRestriction,
        Self::FacilityClosure,
        Self::GuestProfile,
        Self::IdDocumentation,
        Self::CheckinCheckout,
        Self::ChildPolicy,
        Self::ExtraBed,
        Self::FoodBeverage,
        Self::SmokingPolicy,
        Self::PetPolicy,
        Self::SecurityDeposit,
        Self::PaymentMethods,
        Self::CancellationRefund,
        Self::OutsideVisitors,
        Self::DamagePolicy,
        Self::LongStay,
        Self::PartyEventPolicy,
        Self::Accessibility,
        Self::SafetyInformation,
        Self::PropertyRules,
        Self::Others,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let slug = value.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_slug() == slug)
    }

    pub fn as_slug(self) -> &'static str {
        match self {
            Self::CoupleRestriction => "couple_restriction",
            Self::LocalIdRestriction => "local_id_restriction",
            Self::MandatoryCharges => "mandatory_charges",
            Self::AgeRestriction => "age_restriction",
            Self::NationalityRestriction => "nationality_restriction",
            Self::FacilityClosure => "facility_closure",
            Self::GuestProfile => "guest_profile",
            Self::IdDocumentation => "id_documentation",
            Self::CheckinCheckout => "checkin_checkout",
            Self::ChildPolicy => "child_policy",
            Self::ExtraBed => "extra_bed",
            Self::FoodBeverage => "food_beverage",
            Self::SmokingPolicy => "smoking_policy",
            Self::PetPolicy => "pet_policy",
            Self::SecurityDeposit => "security_deposit",
            Self::PaymentMethods => "payment_methods",
            Self::CancellationRefund => "cancellation_refund",
            Self::OutsideVisitors => "outside_visitors",
            Self::DamagePolicy => "damage_policy",
            Self::LongStay => "long_stay",
            Self::PartyEventPolicy => "party_event_policy",
            Self::Accessibility => "accessibility",
            Self::SafetyInformation => "safety_information",
            Self::PropertyRules => "property_rules",
            Self::Others => "others",
        }
    }

    /// Tier the category belongs to in the taxonomy. Only the six
    /// check-in-denial / surprise-charge categories are critical.
    pub fn default_sensitivity(self) -> Sensitivity {
        match self {
            Self::CoupleRestriction
            | Self::LocalIdRestriction
            | Self::MandatoryCharges
            | Self::AgeRestriction
            | Self::NationalityRestriction
            | Self::FacilityClosure => Sensitivity::Critical,
            _ => Sensitivity::Standard,
        }
    }

    pub fn is_critical(self) -> bool {
        self.default_sensitivity() == Sensitivity::Critical
    }
}

/// Lower bound below which the model is told to fall back to `others`.
pub const MIN_CLASSIFICATION_CONFIDENCE: f64 = 0.60;

/// Typed view of one extracted policy statement.
///
/// Responses carry atoms as raw JSON so that whatever the model emitted is
/// returned untouched; this struct is what callers use when they want to
/// reason about an atom (logging, auditing, CLI output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAtom {
    pub display_text: String,
    pub category: Category,
    pub sensitivity: Sensitivity,
    pub confidence: f64,
}

impl PolicyAtom {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Body of `POST /process`. Both fields may be missing or `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub policy_text: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliciesResponse {
    pub policies: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
