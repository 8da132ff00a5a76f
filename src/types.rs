//! Shared primitive IDs and entity kinds.

use std::fmt;

/// Primary key of any stored row.
pub type Id = i64;

/// The six persisted record types, in archive dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Clubs and national organizations.
    Organization,
    /// Competing pilots.
    Pilot,
    /// Entries of the IGC handicap list.
    GliderType,
    /// Per-glider competition record.
    GliderCard,
    /// Photo attached to a glider card.
    Photo,
    /// Daily tow bar weighing.
    DailyWeight,
}

impl EntityKind {
    /// All kinds in the order rows must be replayed so that every foreign key
    /// refers to an already present row.
    pub const ORDERED: [EntityKind; 6] = [
        EntityKind::Organization,
        EntityKind::Pilot,
        EntityKind::GliderType,
        EntityKind::GliderCard,
        EntityKind::Photo,
        EntityKind::DailyWeight,
    ];

    /// Storage table name.
    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Organization => "organization",
            EntityKind::Pilot => "pilot",
            EntityKind::GliderType => "glider_type",
            EntityKind::GliderCard => "glider_card",
            EntityKind::Photo => "photo",
            EntityKind::DailyWeight => "daily_weight",
        }
    }

    /// Type name used by the archive document.
    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::Organization => "Organization",
            EntityKind::Pilot => "Pilot",
            EntityKind::GliderType => "GliderType",
            EntityKind::GliderCard => "GliderCard",
            EntityKind::Photo => "Photo",
            EntityKind::DailyWeight => "DailyWeight",
        }
    }

    /// Resolves a kind from its archive type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ORDERED.into_iter().find(|k| k.type_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
