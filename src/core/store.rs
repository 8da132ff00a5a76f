use thiserror::Error;

use crate::{
    column::{ColumnError, Value},
    model::{
        DailyWeight, EntityRow, GliderCard, GliderType, Organization, Photo, Pilot, Record,
        UniqueKey,
    },
    op::Op,
    types::{EntityKind, Id},
};

use super::table::Table;

/// Integrity errors raised by store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row with the given key.
    #[error("{kind} #{id} does not exist")]
    Missing {
        /// Record type.
        kind: EntityKind,
        /// Primary key.
        id: Id,
    },
    /// A row with the given key is already stored.
    #[error("{kind} #{id} already exists")]
    AlreadyExists {
        /// Record type.
        kind: EntityKind,
        /// Primary key.
        id: Id,
    },
    /// A required column is empty.
    #[error("{kind} #{id}: {source}")]
    Invalid {
        /// Record type.
        kind: EntityKind,
        /// Rejected row.
        id: Id,
        /// Offending column.
        source: ColumnError,
    },
    /// A unique constraint value is already held by another row.
    #[error("{kind} #{id} violates {constraint}: value already used by #{other}")]
    Duplicate {
        /// Record type.
        kind: EntityKind,
        /// Rejected row.
        id: Id,
        /// Violated constraint.
        constraint: &'static str,
        /// Row holding the value.
        other: Id,
    },
    /// A foreign key names a row that does not exist.
    #[error("{kind} #{id}: {column} refers to missing {target} #{target_id}")]
    MissingReference {
        /// Record type.
        kind: EntityKind,
        /// Rejected row.
        id: Id,
        /// Foreign key column.
        column: &'static str,
        /// Referenced record type.
        target: EntityKind,
        /// Referenced key.
        target_id: Id,
    },
    /// The row cannot be deleted while another row refers to it.
    #[error("{kind} #{id} is being used by {by} #{by_id}")]
    StillReferenced {
        /// Record type.
        kind: EntityKind,
        /// Row that was to be deleted.
        id: Id,
        /// Referencing record type.
        by: EntityKind,
        /// Referencing row.
        by_id: Id,
    },
}

/// Record types with a table in the [`Store`].
pub trait Stored: Record {
    /// The type's table.
    fn table(store: &Store) -> &Table<Self>;
    /// The type's table, mutably.
    fn table_mut(store: &mut Store) -> &mut Table<Self>;
}

macro_rules! stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn table(store: &Store) -> &Table<Self> {
                &store.$field
            }

            fn table_mut(store: &mut Store) -> &mut Table<Self> {
                &mut store.$field
            }
        }
    };
}

stored!(Organization, organizations);
stored!(Pilot, pilots);
stored!(GliderType, glider_types);
stored!(GliderCard, glider_cards);
stored!(Photo, photos);
stored!(DailyWeight, daily_weights);

/// Delete behavior for a row of `child` that refers to the deleted row.
fn cascades(parent: EntityKind, child: EntityKind) -> bool {
    matches!(
        (parent, child),
        (EntityKind::GliderCard, EntityKind::Photo) | (EntityKind::GliderCard, EntityKind::DailyWeight)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Absent,
    Present,
    Any,
}

/// Glider card search criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GliderCardSearch {
    /// Exact competition number, ignoring case.
    CompetitionNumber(String),
    /// Registration containing the text, ignoring case.
    Registration(String),
    /// Glider type name containing the text, ignoring case.
    GliderTypeName(String),
    /// Pilot surname starting with the text, ignoring case.
    PilotSurname(String),
}

/// Authoritative in-memory entity store.
///
/// Every mutation is checked against the unique, foreign key and delete
/// rules immediately and recorded as a pending [`Op`] until the owner
/// commits it to persistence or rolls it back.
#[derive(Debug, Default)]
pub struct Store {
    organizations: Table<Organization>,
    pilots: Table<Pilot>,
    glider_types: Table<GliderType>,
    glider_cards: Table<GliderCard>,
    photos: Table<Photo>,
    daily_weights: Table<DailyWeight>,
    pending: Vec<Op>,
}

impl Store {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already consistent rows, e.g. loaded from disk.
    /// Nothing is left pending.
    pub fn from_rows(rows: impl IntoIterator<Item = EntityRow>) -> Self {
        let mut store = Self::new();
        for row in rows {
            store.put_row_raw(row);
        }
        store
    }

    /// Inserts `rec` under a newly allocated key and returns the key.
    pub fn insert<T: Stored>(&mut self, mut rec: T) -> Result<Id, StoreError> {
        let id = T::table_mut(self).allocate_id();
        rec.set_id(id);
        self.put_checked(rec, Expect::Absent)?;
        Ok(id)
    }

    /// Overwrites an existing row.
    pub fn update<T: Stored>(&mut self, rec: T) -> Result<(), StoreError> {
        self.put_checked(rec, Expect::Present).map(|_| ())
    }

    /// Inserts `rec` under its own key, or overwrites the row stored there.
    pub fn merge<T: Stored>(&mut self, rec: T) -> Result<(), StoreError> {
        self.put_checked(rec, Expect::Any).map(|_| ())
    }

    /// [`Store::merge`] for a row of any type.
    pub fn merge_row(&mut self, row: EntityRow) -> Result<(), StoreError> {
        match row {
            EntityRow::Organization(r) => self.merge(r),
            EntityRow::Pilot(r) => self.merge(r),
            EntityRow::GliderType(r) => self.merge(r),
            EntityRow::GliderCard(r) => self.merge(r),
            EntityRow::Photo(r) => self.merge(r),
            EntityRow::DailyWeight(r) => self.merge(r),
        }
    }

    /// Deletes a row and every row owned by it.
    ///
    /// Fails without changes while a non-owned row still refers to it.
    /// Returns the removed rows, owned rows first.
    pub fn delete<T: Stored>(&mut self, id: Id) -> Result<Vec<EntityRow>, StoreError> {
        self.delete_kind(T::KIND, id)
    }

    /// [`Store::delete`] by record type.
    pub fn delete_kind(&mut self, kind: EntityKind, id: Id) -> Result<Vec<EntityRow>, StoreError> {
        if !self.contains(kind, id) {
            return Err(StoreError::Missing { kind, id });
        }

        let referrers = self.referrers(kind, id);
        if let Some((by, by_id)) = referrers.iter().copied().find(|(by, _)| !cascades(kind, *by)) {
            return Err(StoreError::StillReferenced { kind, id, by, by_id });
        }

        let mut removed = Vec::new();
        for (child_kind, child_id) in referrers {
            removed.extend(self.delete_kind(child_kind, child_id)?);
        }

        if let Some(row) = self.remove_row_raw(kind, id) {
            self.pending.push(Op::Delete { row: row.clone() });
            removed.push(row);
        }
        Ok(removed)
    }

    /// Row of type `T` stored under `id`.
    pub fn get<T: Stored>(&self, id: Id) -> Option<&T> {
        T::table(self).get(id)
    }

    /// All rows of type `T` in key order.
    pub fn all<T: Stored>(&self) -> impl Iterator<Item = &T> {
        T::table(self).iter()
    }

    /// Number of rows of type `T`.
    pub fn count<T: Stored>(&self) -> usize {
        T::table(self).len()
    }

    /// Rows of type `T` matching `pred`, in key order.
    pub fn filter<T: Stored>(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<&T> {
        self.all::<T>().filter(|r| pred(r)).collect()
    }

    /// Rows of type `T` ordered by `column`, ties kept in key order.
    pub fn sorted_by<T: Stored>(&self, column: &str, descending: bool) -> Result<Vec<&T>, ColumnError> {
        T::column(column)?;
        let mut keyed: Vec<(Value, &T)> = self
            .all::<T>()
            .map(|r| (r.get(column).unwrap_or(Value::Null), r))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ord = a.compare(b);
            if descending { ord.reverse() } else { ord }
        });
        Ok(keyed.into_iter().map(|(_, r)| r).collect())
    }

    /// Whether a row of `kind` is stored under `id`.
    pub fn contains(&self, kind: EntityKind, id: Id) -> bool {
        match kind {
            EntityKind::Organization => self.organizations.contains(id),
            EntityKind::Pilot => self.pilots.contains(id),
            EntityKind::GliderType => self.glider_types.contains(id),
            EntityKind::GliderCard => self.glider_cards.contains(id),
            EntityKind::Photo => self.photos.contains(id),
            EntityKind::DailyWeight => self.daily_weights.contains(id),
        }
    }

    /// Number of rows of `kind`.
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Organization => self.organizations.len(),
            EntityKind::Pilot => self.pilots.len(),
            EntityKind::GliderType => self.glider_types.len(),
            EntityKind::GliderCard => self.glider_cards.len(),
            EntityKind::Photo => self.photos.len(),
            EntityKind::DailyWeight => self.daily_weights.len(),
        }
    }

    /// Whether the store holds no rows at all.
    pub fn is_empty(&self) -> bool {
        EntityKind::ORDERED.iter().all(|k| self.len(*k) == 0)
    }

    /// Cloned rows of `kind` in key order.
    pub fn rows(&self, kind: EntityKind) -> Vec<EntityRow> {
        fn collect<T: Stored>(store: &Store) -> Vec<EntityRow> {
            store.all::<T>().cloned().map(Record::into_row).collect()
        }
        match kind {
            EntityKind::Organization => collect::<Organization>(self),
            EntityKind::Pilot => collect::<Pilot>(self),
            EntityKind::GliderType => collect::<GliderType>(self),
            EntityKind::GliderCard => collect::<GliderCard>(self),
            EntityKind::Photo => collect::<Photo>(self),
            EntityKind::DailyWeight => collect::<DailyWeight>(self),
        }
    }

    /// Glider type of a card.
    pub fn glider_type_of(&self, card: &GliderCard) -> Option<&GliderType> {
        self.glider_types.get(card.glider_type_id)
    }

    /// Pilot of a card.
    pub fn pilot_of(&self, card: &GliderCard) -> Option<&Pilot> {
        self.pilots.get(card.pilot_id)
    }

    /// Organization of a card.
    pub fn organization_of(&self, card: &GliderCard) -> Option<&Organization> {
        self.organizations.get(card.organization_id)
    }

    /// Photos of a card, main photo first, then by key.
    pub fn photos_of(&self, card_id: Id) -> Vec<&Photo> {
        let mut photos = self.filter::<Photo>(|p| p.glider_card_id == card_id);
        photos.sort_by_key(|p| (!p.main, p.id));
        photos
    }

    /// Main photo of a card.
    pub fn main_photo(&self, card_id: Id) -> Option<&Photo> {
        self.all::<Photo>()
            .find(|p| p.glider_card_id == card_id && p.main)
    }

    /// Marks `photo_id` as the only main photo of its card.
    pub fn set_main_photo(&mut self, photo_id: Id) -> Result<(), StoreError> {
        let card_id = self
            .get::<Photo>(photo_id)
            .ok_or(StoreError::Missing {
                kind: EntityKind::Photo,
                id: photo_id,
            })?
            .glider_card_id;

        let changed: Vec<Photo> = self
            .all::<Photo>()
            .filter(|p| p.glider_card_id == card_id && p.main != (p.id == photo_id))
            .map(|p| Photo {
                main: p.id == photo_id,
                ..p.clone()
            })
            .collect();
        for photo in changed {
            self.update(photo)?;
        }
        Ok(())
    }

    /// Daily weights of a card, latest first.
    pub fn daily_weights_of(&self, card_id: Id) -> Vec<&DailyWeight> {
        let mut weights = self.filter::<DailyWeight>(|d| d.glider_card_id == card_id);
        weights.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        weights
    }

    /// Glider cards matching a search criterion, in key order.
    pub fn search_glider_cards(&self, search: &GliderCardSearch) -> Vec<&GliderCard> {
        match search {
            GliderCardSearch::CompetitionNumber(text) => self.filter::<GliderCard>(|c| {
                c.competition_number.to_lowercase() == text.to_lowercase()
            }),
            GliderCardSearch::Registration(text) => {
                let needle = text.to_lowercase();
                self.filter::<GliderCard>(|c| c.registration.to_lowercase().contains(&needle))
            }
            GliderCardSearch::GliderTypeName(text) => {
                let needle = text.to_lowercase();
                self.filter::<GliderCard>(|c| {
                    self.glider_type_of(c)
                        .is_some_and(|t| t.name.to_lowercase().contains(&needle))
                })
            }
            GliderCardSearch::PilotSurname(text) => {
                let needle = text.to_lowercase();
                self.filter::<GliderCard>(|c| {
                    self.pilot_of(c)
                        .is_some_and(|p| p.surname.to_lowercase().starts_with(&needle))
                })
            }
        }
    }

    /// Mutations applied since the last commit or rollback, oldest first.
    pub fn pending_ops(&self) -> &[Op] {
        &self.pending
    }

    /// Whether there are uncommitted mutations.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forgets pending mutations once they are persisted.
    pub fn mark_committed(&mut self) {
        self.pending.clear();
    }

    /// Takes pending mutations out of the store.
    pub fn drain_pending_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.pending)
    }

    /// Reverts every pending mutation, newest first.
    pub fn rollback(&mut self) {
        while let Some(op) = self.pending.pop() {
            self.apply_raw(op.inverse());
        }
    }

    fn put_checked<T: Stored>(&mut self, rec: T, expect: Expect) -> Result<Option<T>, StoreError> {
        let id = rec.id();
        let exists = T::table(self).contains(id);
        match expect {
            Expect::Absent if exists => {
                return Err(StoreError::AlreadyExists { kind: T::KIND, id });
            }
            Expect::Present if !exists => {
                return Err(StoreError::Missing { kind: T::KIND, id });
            }
            _ => {}
        }
        rec.validate()
            .map_err(|source| StoreError::Invalid { kind: T::KIND, id, source })?;

        for reference in rec.references() {
            if !self.contains(reference.kind, reference.id) {
                return Err(StoreError::MissingReference {
                    kind: T::KIND,
                    id,
                    column: reference.column,
                    target: reference.kind,
                    target_id: reference.id,
                });
            }
        }

        if let Some((UniqueKey { constraint, .. }, other)) = T::table(self).conflict(&rec) {
            return Err(StoreError::Duplicate {
                kind: T::KIND,
                id,
                constraint,
                other,
            });
        }

        let prev = T::table_mut(self).put_raw(rec.clone());
        self.pending.push(Op::Put {
            row: rec.into_row(),
            prev: prev.clone().map(Record::into_row),
        });
        Ok(prev)
    }

    fn referrers(&self, kind: EntityKind, id: Id) -> Vec<(EntityKind, Id)> {
        fn collect<T: Stored>(store: &Store, kind: EntityKind, id: Id, out: &mut Vec<(EntityKind, Id)>) {
            for rec in store.all::<T>() {
                if rec.references().iter().any(|r| r.kind == kind && r.id == id) {
                    out.push((T::KIND, rec.id()));
                }
            }
        }

        let mut out = Vec::new();
        collect::<GliderCard>(self, kind, id, &mut out);
        collect::<Photo>(self, kind, id, &mut out);
        collect::<DailyWeight>(self, kind, id, &mut out);
        out
    }

    fn apply_raw(&mut self, op: Op) {
        match op {
            Op::Put { row, .. } => self.put_row_raw(row),
            Op::Delete { row } => {
                self.remove_row_raw(row.kind(), row.id());
            }
        }
    }

    fn put_row_raw(&mut self, row: EntityRow) {
        match row {
            EntityRow::Organization(r) => {
                self.organizations.put_raw(r);
            }
            EntityRow::Pilot(r) => {
                self.pilots.put_raw(r);
            }
            EntityRow::GliderType(r) => {
                self.glider_types.put_raw(r);
            }
            EntityRow::GliderCard(r) => {
                self.glider_cards.put_raw(r);
            }
            EntityRow::Photo(r) => {
                self.photos.put_raw(r);
            }
            EntityRow::DailyWeight(r) => {
                self.daily_weights.put_raw(r);
            }
        }
    }

    fn remove_row_raw(&mut self, kind: EntityKind, id: Id) -> Option<EntityRow> {
        match kind {
            EntityKind::Organization => self.organizations.remove_raw(id).map(Record::into_row),
            EntityKind::Pilot => self.pilots.remove_raw(id).map(Record::into_row),
            EntityKind::GliderType => self.glider_types.remove_raw(id).map(Record::into_row),
            EntityKind::GliderCard => self.glider_cards.remove_raw(id).map(Record::into_row),
            EntityKind::Photo => self.photos.remove_raw(id).map(Record::into_row),
            EntityKind::DailyWeight => self.daily_weights.remove_raw(id).map(Record::into_row),
        }
    }
}
