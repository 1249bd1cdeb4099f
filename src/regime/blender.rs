use rust_decimal::Decimal;

use crate::types::RegimeTag;

/// `new_size * scaling + old_size * (1 - scaling)`, with scaling clamped to [0, 1].
pub fn blend(old_size: Decimal, new_size: Decimal, scaling: Decimal) -> Decimal {
    let scaling = scaling.clamp(Decimal::ZERO, Decimal::ONE);
    new_size * scaling + old_size * (Decimal::ONE - scaling)
}

/// Blends a base size between the per-regime multipliers of `from` and `to`.
pub fn blend_regime_size(base_size: Decimal, from: RegimeTag, to: RegimeTag, scaling: Decimal) -> Decimal {
    blend(
        base_size * from.position_scale_factor(),
        base_size * to.position_scale_factor(),
        scaling,
    )
}
