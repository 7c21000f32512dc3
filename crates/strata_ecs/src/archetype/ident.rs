use strata_utils::num::NonMaxU32;

crate::utils::dense_id! {
    /// Index of an [`Archetype`](crate::archetype::Archetype) in its world.
    ArcheId, "archetypes"
}

impl ArcheId {
    /// The archetype without components.
    pub const EMPTY: ArcheId = ArcheId(NonMaxU32::ZERO);
}
