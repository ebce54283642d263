//! Administrative levels and place types of the Indonesian hierarchy.

use serde::{Deserialize, Serialize};

/// Rank of a place in the province → regency/city → district hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    /// Provinsi (level 1)
    Province,
    /// Kabupaten / Kota (level 2)
    Regency,
    /// Kecamatan / Distrik (level 3)
    District,
}

impl AdminLevel {
    /// Integer rank, 1 = province
    pub fn rank(&self) -> u8 {
        match self {
            AdminLevel::Province => 1,
            AdminLevel::Regency => 2,
            AdminLevel::District => 3,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(AdminLevel::Province),
            2 => Some(AdminLevel::Regency),
            3 => Some(AdminLevel::District),
            _ => None,
        }
    }

    /// Level of the enclosing place, `None` for provinces
    pub fn parent(&self) -> Option<Self> {
        match self {
            AdminLevel::Province => None,
            AdminLevel::Regency => Some(AdminLevel::Province),
            AdminLevel::District => Some(AdminLevel::Regency),
        }
    }

    /// Get all levels in hierarchical order (province first)
    pub fn all() -> &'static [AdminLevel] {
        &[
            AdminLevel::Province,
            AdminLevel::Regency,
            AdminLevel::District,
        ]
    }
}

/// Domain category of a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceType {
    Provinsi,
    Kabupaten,
    Kota,
    KabupatenAdministrasi,
    KotaAdministrasi,
    Kecamatan,
    /// Kecamatan in the Papua-family provinces
    Distrik,
}

impl PlaceType {
    pub fn level(&self) -> AdminLevel {
        match self {
            PlaceType::Provinsi => AdminLevel::Province,
            PlaceType::Kabupaten
            | PlaceType::Kota
            | PlaceType::KabupatenAdministrasi
            | PlaceType::KotaAdministrasi => AdminLevel::Regency,
            PlaceType::Kecamatan | PlaceType::Distrik => AdminLevel::District,
        }
    }

    /// Class name used in the ontology namespace
    pub fn class_name(&self) -> &'static str {
        match self {
            PlaceType::Provinsi => "Provinsi",
            PlaceType::Kabupaten => "Kabupaten",
            PlaceType::Kota => "Kota",
            PlaceType::KabupatenAdministrasi => "KabupatenAdministrasi",
            PlaceType::KotaAdministrasi => "KotaAdministrasi",
            PlaceType::Kecamatan => "Kecamatan",
            PlaceType::Distrik => "Distrik",
        }
    }

    /// Human-readable prefix of the full name, e.g. "Kota Administrasi"
    pub fn display_prefix(&self) -> &'static str {
        match self {
            PlaceType::Provinsi => "Provinsi",
            PlaceType::Kabupaten => "Kabupaten",
            PlaceType::Kota => "Kota",
            PlaceType::KabupatenAdministrasi => "Kabupaten Administrasi",
            PlaceType::KotaAdministrasi => "Kota Administrasi",
            PlaceType::Kecamatan => "Kecamatan",
            PlaceType::Distrik => "Distrik",
        }
    }

    /// Abbreviated prefix used for the short alternate label
    pub fn short_prefix(&self) -> &'static str {
        match self {
            PlaceType::Provinsi => "Prov.",
            PlaceType::Kabupaten => "Kab.",
            PlaceType::Kota => "Kota",
            PlaceType::KabupatenAdministrasi => "Kab. Adm.",
            PlaceType::KotaAdministrasi => "Kota Adm.",
            PlaceType::Kecamatan => "Kec.",
            PlaceType::Distrik => "Distrik",
        }
    }

    /// District type for a province: Papua-family provinces say "Distrik".
    pub fn district_for_province(province_name: &str) -> Self {
        if province_name.starts_with("Papua") {
            PlaceType::Distrik
        } else {
            PlaceType::Kecamatan
        }
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.class_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_roundtrip() {
        for level in AdminLevel::all() {
            assert_eq!(AdminLevel::from_rank(level.rank()), Some(*level));
        }
        assert_eq!(AdminLevel::from_rank(4), None);
    }

    #[test]
    fn test_parent_level_is_one_up() {
        assert_eq!(AdminLevel::Province.parent(), None);
        assert_eq!(AdminLevel::District.parent(), Some(AdminLevel::Regency));
    }

    #[test]
    fn test_papua_family_uses_distrik() {
        assert_eq!(
            PlaceType::district_for_province("Papua Barat"),
            PlaceType::Distrik
        );
        assert_eq!(PlaceType::district_for_province("Papua"), PlaceType::Distrik);
        assert_eq!(
            PlaceType::district_for_province("Jawa Barat"),
            PlaceType::Kecamatan
        );
    }
}
