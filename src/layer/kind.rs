/// The two boundary layers chargers are joined against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Metro,              // Census Combined Statistical Areas
    BalancingAuthority, // Electricity control areas
}

impl LayerKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            LayerKind::Metro => "metro",
            LayerKind::BalancingAuthority => "balancing_authority",
        }
    }

    /// dBASE fields read from the layer's shapefile.
    pub fn attribute_fields(&self) -> &'static [&'static str] {
        match self {
            LayerKind::Metro => &["NAME", "CSAFP", "ALAND"],
            LayerKind::BalancingAuthority => &["NAME"],
        }
    }

    /// Field holding the area name used as the join and grouping key.
    pub fn name_field(&self) -> &'static str { "NAME" }

    /// Column name the area name takes in charger tables.
    pub fn key_column(&self) -> &'static str {
        match self {
            LayerKind::Metro => "metro_name",
            LayerKind::BalancingAuthority => "ba_name",
        }
    }
}
