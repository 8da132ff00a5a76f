//! Bulk removal of selected data.

use tracing::info;

use crate::{
    column::Value,
    config::Configuration,
    core::store::Store,
    error::Result,
    model::{GliderCard, MEASURED_WEIGHT_COLUMNS, Record},
    photos::PhotoStore,
    session::Session,
    types::EntityKind,
};

/// What [`clean`] removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOptions {
    /// Every daily weighing.
    pub daily_weights: bool,
    /// Every photo row and photo file.
    pub photos: bool,
    /// Measured glider, pilot and tow bar weights on the cards.
    pub measured_weights: bool,
    /// Every glider card.
    pub glider_cards: bool,
    /// Every glider type.
    pub glider_types: bool,
    /// Every pilot.
    pub pilots: bool,
    /// Every organization.
    pub organizations: bool,
    /// Handicap parameters, back to their defaults.
    pub preferences: bool,
}

impl CleanOptions {
    /// Everything.
    pub fn all() -> Self {
        Self {
            daily_weights: true,
            photos: true,
            measured_weights: true,
            glider_cards: true,
            glider_types: true,
            pilots: true,
            organizations: true,
            preferences: true,
        }
    }

    /// Adds the selections implied by the ones made: removing the rows a
    /// card refers to removes the cards, and removing cards removes what
    /// they own.
    pub fn resolved(mut self) -> Self {
        if self.glider_types || self.pilots || self.organizations {
            self.glider_cards = true;
        }
        if self.glider_cards {
            self.daily_weights = true;
            self.photos = true;
            self.measured_weights = true;
        }
        self
    }

    fn removes(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Organization => self.organizations,
            EntityKind::Pilot => self.pilots,
            EntityKind::GliderType => self.glider_types,
            EntityKind::GliderCard => self.glider_cards,
            EntityKind::Photo => self.photos,
            EntityKind::DailyWeight => self.daily_weights,
        }
    }
}

/// What [`clean`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Rows deleted across every record type.
    pub rows: usize,
    /// Cards whose measured weights were cleared.
    pub cleared_cards: usize,
    /// Photo files removed.
    pub photo_files: usize,
}

/// Removes the selected data.
///
/// Row changes are committed as one unit together with anything already
/// pending in `session`, and rolled back as a whole on failure. Photo files
/// and preferences are only touched once the commit succeeded.
pub fn clean(
    session: &mut Session,
    photos: &PhotoStore,
    config: &mut Configuration,
    options: CleanOptions,
) -> Result<CleanSummary> {
    let options = options.resolved();
    let mut summary = CleanSummary::default();

    let applied = remove_rows(session.store_mut(), options).and_then(|counts| {
        session.commit()?;
        Ok(counts)
    });
    (summary.rows, summary.cleared_cards) = match applied {
        Ok(counts) => counts,
        Err(e) => {
            session.rollback();
            return Err(e);
        }
    };

    if options.photos {
        summary.photo_files = photos.clear()?;
    }
    if options.preferences {
        config.reset_to_defaults();
        config.save()?;
    }

    info!(
        rows = summary.rows,
        cleared_cards = summary.cleared_cards,
        photo_files = summary.photo_files,
        "cleaned data"
    );
    Ok(summary)
}

fn remove_rows(store: &mut Store, options: CleanOptions) -> Result<(usize, usize)> {
    let mut rows = 0;
    for kind in EntityKind::ORDERED.into_iter().rev() {
        if !options.removes(kind) {
            continue;
        }
        for row in store.rows(kind) {
            if store.contains(kind, row.id()) {
                rows += store.delete_kind(kind, row.id())?.len();
            }
        }
    }

    let mut cleared = 0;
    if options.measured_weights {
        let cards: Vec<GliderCard> = store
            .all::<GliderCard>()
            .filter(|c| {
                c.glider_weight.is_some() || c.pilot_weight.is_some() || c.tow_bar_weight.is_some()
            })
            .cloned()
            .collect();
        for mut card in cards {
            for column in MEASURED_WEIGHT_COLUMNS {
                card.set(column, Value::Null)?;
            }
            store.update(card)?;
            cleared += 1;
        }
    }
    Ok((rows, cleared))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_pilots_removes_cards_and_what_they_own() {
        let options = CleanOptions {
            pilots: true,
            ..CleanOptions::default()
        }
        .resolved();
        assert!(options.glider_cards);
        assert!(options.photos);
        assert!(options.daily_weights);
        assert!(options.measured_weights);
        assert!(!options.organizations);
        assert!(!options.preferences);
    }

    #[test]
    fn removing_photos_alone_keeps_cards() {
        let options = CleanOptions {
            photos: true,
            ..CleanOptions::default()
        }
        .resolved();
        assert!(!options.glider_cards);
        assert!(!options.daily_weights);
    }
}
