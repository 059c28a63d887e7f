/// Surface identity attached to world colliders.
///
/// # Why this exists
/// Ground queries need two facts about whatever they hit: which query layers the
/// collider belongs to (so a layer mask can exclude it) and which surface tag it
/// carries (e.g. "Grass", "Slide"). Rapier gives every collider a single `u128`
/// `user_data` slot, so both are packed into it.
///
/// # Bit layout
/// (least-significant bit = bit 0)
///
/// - bits 0..=31   : layer membership mask (`u32`)
/// - bits 32..=47  : surface tag id (`u16`, 0 = untagged)
/// - bits 48..=127 : reserved (must be zero)
pub type SurfaceData = u128;

/// Bitmask of query layers.
pub type LayerMask = u32;

/// Every layer.
pub const ALL_LAYERS: LayerMask = u32::MAX;

/// Interned surface tag. Names live in the ground world's tag table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceTag(pub u16);

const TAG_SHIFT: u32 = LayerMask::BITS;

/// Packs layers and an optional tag into a collider's `user_data`.
pub fn pack_surface(layers: LayerMask, tag: Option<SurfaceTag>) -> SurfaceData {
    let tag_bits = tag.map_or(0u128, |t| t.0 as u128);
    (layers as u128) | (tag_bits << TAG_SHIFT)
}

/// Extracts the layer membership mask.
pub fn unpack_layers(data: SurfaceData) -> LayerMask {
    (data & LayerMask::MAX as u128) as LayerMask
}

/// Extracts the surface tag, `None` when untagged.
pub fn unpack_tag(data: SurfaceData) -> Option<SurfaceTag> {
    let id = ((data >> TAG_SHIFT) & u16::MAX as u128) as u16;
    (id != 0).then_some(SurfaceTag(id))
}

/// Whether a collider with `data` is visible to a query using `mask`.
#[inline]
pub fn matches_mask(data: SurfaceData, mask: LayerMask) -> bool {
    unpack_layers(data) & mask != 0
}

/// Validates that `data` conforms to the current packing contract.
pub fn validate_surface(data: SurfaceData) -> Result<(), &'static str> {
    const RESERVED_MASK: u128 = !0u128 << 48;
    if (data & RESERVED_MASK) != 0 {
        return Err("Surface reserved bits are non-zero");
    }
    Ok(())
}
