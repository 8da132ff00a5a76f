//! Weight differences and the competition coefficient.
//!
//! Every function is pure. `None` means an input is missing, which callers
//! must keep apart from a compliant or zero result.

use rust_decimal::Decimal;

use crate::{
    config::HandicapConfig,
    model::{DailyWeight, GliderCard, GliderType},
};

/// Measured glider weight plus pilot weight.
pub fn referential_weight(card: &GliderCard) -> Option<i64> {
    Some(i64::from(card.glider_weight?) + i64::from(card.pilot_weight?))
}

/// Certified minus listed weight of non-lifting parts. Club class only.
pub fn non_lifting_difference(card: &GliderCard, glider_type: &GliderType) -> Option<i64> {
    if !glider_type.club_class {
        return None;
    }
    Some(
        i64::from(card.certified_weight_non_lifting?)
            - i64::from(glider_type.weight_non_lifting?),
    )
}

/// Referential weight minus the type's MTOW reference.
pub fn mtow_difference(card: &GliderCard, glider_type: &GliderType) -> Option<i64> {
    Some(referential_weight(card)? - i64::from(glider_type.mtow_reference()?))
}

/// Distance of the pilot weight outside the certified seat range: negative
/// below the minimum, positive above the maximum, zero inside.
pub fn seat_weight_difference(card: &GliderCard) -> Option<i64> {
    let min = i64::from(card.certified_min_seat_weight?);
    let max = i64::from(card.certified_max_seat_weight?);
    let pilot = i64::from(card.pilot_weight?);
    Some(if pilot < min {
        pilot - min
    } else if pilot > max {
        pilot - max
    } else {
        0
    })
}

/// Referential weight minus the type's listed referential weight.
pub fn referential_difference(card: &GliderCard, glider_type: &GliderType) -> Option<i64> {
    Some(referential_weight(card)? - i64::from(glider_type.weight_referential?))
}

/// Competition coefficient of a club class glider.
///
/// Every started overweight step adds `overweight_handicap`, while only
/// full underweight steps subtract `underweight_handicap`.
pub fn coefficient(
    card: &GliderCard,
    glider_type: &GliderType,
    config: &HandicapConfig,
) -> Option<Decimal> {
    if !glider_type.club_class {
        return None;
    }
    let difference = referential_difference(card, glider_type)?;
    let mut value = glider_type.coefficient?;

    if card.landing_gear {
        value += config.gear_handicap;
    }
    if card.winglets {
        value += config.winglets_handicap;
    }

    if difference > 0 {
        let step = i64::from(config.overweight_step.max(1));
        let steps = (difference + step - 1) / step;
        value += Decimal::from(steps) * config.overweight_handicap;
    } else if difference < 0 {
        let step = i64::from(config.underweight_step.max(1));
        let steps = difference.abs() / step;
        value -= Decimal::from(steps) * config.underweight_handicap;
    }
    Some(value)
}

/// Daily tow bar weight minus the weight on the card.
pub fn tow_bar_difference(daily: &DailyWeight, card: &GliderCard) -> Option<i64> {
    Some(i64::from(daily.tow_bar_weight) - i64::from(card.tow_bar_weight?))
}
