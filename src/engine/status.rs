//! Compliance verdicts with their display wording.

use std::fmt;

use rust_decimal::Decimal;

use crate::{
    config::HandicapConfig,
    model::{DailyWeight, GliderCard, GliderType},
};

use super::handicap;

/// Weight check shown for a glider card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// Certified against listed non-lifting parts weight.
    NonLifting,
    /// Referential weight against MTOW.
    Mtow,
    /// Pilot weight against the certified seat range.
    Seat,
    /// Referential weight against the listed referential weight.
    Referential,
}

/// Outcome of a weight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// An input is missing.
    NoData,
    /// Compliant.
    Ok,
    /// Over the limit by the given kilograms.
    Overweight(i64),
    /// Under the limit by the given kilograms.
    Underweight(i64),
    /// The check does not apply outside the club class.
    NotUsed,
}

/// A weight check together with its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightStatus {
    /// Which check.
    pub check: Check,
    /// Its outcome.
    pub verdict: Verdict,
}

impl WeightStatus {
    fn from_difference(check: Check, difference: Option<i64>, underweight_counts: bool) -> Self {
        let verdict = match difference {
            None => Verdict::NoData,
            Some(d) if d > 0 => Verdict::Overweight(d),
            Some(d) if d < 0 && underweight_counts => Verdict::Underweight(-d),
            Some(_) => Verdict::Ok,
        };
        Self { check, verdict }
    }

    fn not_used(check: Check) -> Self {
        Self {
            check,
            verdict: Verdict::NotUsed,
        }
    }

    /// Whether the check passed.
    pub fn is_ok(&self) -> bool {
        self.verdict == Verdict::Ok
    }
}

impl fmt::Display for WeightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.check, self.verdict) {
            (_, Verdict::NotUsed) => f.write_str(NOT_USED),
            (Check::NonLifting, Verdict::NoData) => {
                f.write_str("No data for check non-lifting parts weight.")
            }
            (Check::NonLifting, Verdict::Overweight(kg)) => {
                write!(f, "Non-lifting parts are overweight by {kg} kg!")
            }
            (Check::NonLifting, _) => f.write_str("Non-lifting parts weight is OK."),
            (Check::Mtow, Verdict::NoData) => {
                f.write_str("No data for check maximum takeoff weight.")
            }
            (Check::Mtow, Verdict::Overweight(kg)) => {
                write!(f, "Maximum takeoff weight is overweight by {kg} kg!")
            }
            (Check::Mtow, _) => f.write_str("Maximum takeoff weight is OK."),
            (Check::Seat, Verdict::NoData) => f.write_str("No data for check seat weighting."),
            (Check::Seat, Verdict::Overweight(kg)) => {
                write!(f, "Seat weighting is overweight by {kg} kg!")
            }
            (Check::Seat, Verdict::Underweight(kg)) => {
                write!(f, "Seat weighting is underweight by {kg} kg!")
            }
            (Check::Seat, _) => f.write_str("Seat weighting is OK."),
            (Check::Referential, Verdict::NoData) => {
                f.write_str("No data for check referential weight.")
            }
            (Check::Referential, Verdict::Overweight(kg)) => {
                write!(f, "Referential weight is overweight by {kg} kg!")
            }
            (Check::Referential, Verdict::Underweight(kg)) => {
                write!(f, "Referential weight is underweight by {kg} kg!")
            }
            (Check::Referential, _) => f.write_str("Referential weight is OK."),
        }
    }
}

const NOT_USED: &str = "No club class, not used";

/// Competition coefficient shown for a glider card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientStatus {
    /// An input is missing.
    NoData,
    /// Not a club class glider.
    NotUsed,
    /// Computed coefficient at the measured referential weight.
    Value {
        /// Coefficient.
        coefficient: Decimal,
        /// Referential weight, kg.
        weight: i64,
    },
}

impl fmt::Display for CoefficientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoefficientStatus::NoData => f.write_str("No data for count coefficient."),
            CoefficientStatus::NotUsed => f.write_str(NOT_USED),
            CoefficientStatus::Value {
                coefficient,
                weight,
            } => {
                let mut shown = *coefficient;
                if shown.scale() < 3 {
                    shown.rescale(3);
                }
                write!(
                    f,
                    "Competition coefficient is {shown} at weight {weight} kg."
                )
            }
        }
    }
}

/// Every verdict shown for a glider card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardReport {
    /// Non-lifting parts check.
    pub non_lifting: WeightStatus,
    /// MTOW check.
    pub mtow: WeightStatus,
    /// Seat weighting check.
    pub seat: WeightStatus,
    /// Referential weight check.
    pub referential: WeightStatus,
    /// Coefficient.
    pub coefficient: CoefficientStatus,
}

/// Evaluates every check of a card. Only the MTOW check applies outside the
/// club class.
pub fn card_report(card: &GliderCard, glider_type: &GliderType, config: &HandicapConfig) -> CardReport {
    let mtow = WeightStatus::from_difference(
        Check::Mtow,
        handicap::mtow_difference(card, glider_type),
        false,
    );

    if !glider_type.club_class {
        return CardReport {
            non_lifting: WeightStatus::not_used(Check::NonLifting),
            mtow,
            seat: WeightStatus::not_used(Check::Seat),
            referential: WeightStatus::not_used(Check::Referential),
            coefficient: CoefficientStatus::NotUsed,
        };
    }

    let coefficient = match (
        handicap::coefficient(card, glider_type, config),
        handicap::referential_weight(card),
    ) {
        (Some(coefficient), Some(weight)) => CoefficientStatus::Value {
            coefficient,
            weight,
        },
        _ => CoefficientStatus::NoData,
    };

    CardReport {
        non_lifting: WeightStatus::from_difference(
            Check::NonLifting,
            handicap::non_lifting_difference(card, glider_type),
            false,
        ),
        mtow,
        seat: WeightStatus::from_difference(
            Check::Seat,
            handicap::seat_weight_difference(card),
            true,
        ),
        referential: WeightStatus::from_difference(
            Check::Referential,
            handicap::referential_difference(card, glider_type),
            true,
        ),
        coefficient,
    }
}

/// Verdict of a daily tow bar weighing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowBarStatus {
    /// No tow bar weight on the card.
    NoData,
    /// Difference within the allowed tolerance.
    InLimit,
    /// Heavier than on the card.
    Overweight(i64),
    /// Lighter than on the card, rejected for club class.
    Underweight(i64),
    /// Lighter than on the card, accepted outside the club class.
    UnderweightAccepted(i64),
}

impl TowBarStatus {
    /// Whether the weighing is acceptable.
    pub fn is_ok(&self) -> bool {
        matches!(self, TowBarStatus::InLimit | TowBarStatus::UnderweightAccepted(_))
    }
}

impl fmt::Display for TowBarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TowBarStatus::NoData => f.write_str("? No data"),
            TowBarStatus::InLimit => f.write_str("* In the limit"),
            TowBarStatus::Overweight(kg) => write!(f, "! Overweight by {kg} kg"),
            TowBarStatus::Underweight(kg) => write!(f, "! Underweight by {kg} kg"),
            TowBarStatus::UnderweightAccepted(kg) => write!(f, "* Underweight by {kg} kg, OK"),
        }
    }
}

/// Compares a daily weighing with the card's tow bar weight.
pub fn tow_bar_status(
    daily: &DailyWeight,
    card: &GliderCard,
    glider_type: &GliderType,
    config: &HandicapConfig,
) -> TowBarStatus {
    let Some(difference) = handicap::tow_bar_difference(daily, card) else {
        return TowBarStatus::NoData;
    };
    let magnitude = difference.abs();
    if magnitude <= i64::from(config.allowed_difference) {
        TowBarStatus::InLimit
    } else if difference > 0 {
        TowBarStatus::Overweight(magnitude)
    } else if glider_type.club_class {
        TowBarStatus::Underweight(magnitude)
    } else {
        TowBarStatus::UnderweightAccepted(magnitude)
    }
}
