use schema::ElementType;

/// Combined multiplier of `attack_type` against every defending type.
/// Dual types multiply, so the result is one of 0, 0.25, 0.5, 1, 2, 4.
pub fn effectiveness(attack_type: ElementType, defender_types: &[ElementType]) -> f32 {
    defender_types
        .iter()
        .map(|defending| ElementType::type_effectiveness(attack_type, *defending))
        .product()
}
