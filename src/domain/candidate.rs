// Nearby candidate domain models
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profession {
    pub name: String,
}

/// One user returned by the proximity query service, with the distance from
/// the query center precomputed server-side. Immutable snapshot on the client:
/// held until the next query supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyCandidate {
    pub username: String,
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_img: Option<String>,
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<Profession>,
    /// True coordinates, when the service shares them. Absent for users who
    /// have not opted into exact-position display; the renderer then falls
    /// back to the synthetic ring layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// The user-selected search radius. UI state only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadiusSelection {
    Km5,
    #[default]
    Km10,
    Km15,
    Km25,
    Km50,
}

impl RadiusSelection {
    pub const ALL: [RadiusSelection; 5] = [
        RadiusSelection::Km5,
        RadiusSelection::Km10,
        RadiusSelection::Km15,
        RadiusSelection::Km25,
        RadiusSelection::Km50,
    ];

    pub fn km(&self) -> f64 {
        match self {
            RadiusSelection::Km5 => 5.0,
            RadiusSelection::Km10 => 10.0,
            RadiusSelection::Km15 => 15.0,
            RadiusSelection::Km25 => 25.0,
            RadiusSelection::Km50 => 50.0,
        }
    }

    pub fn try_from_km(km: u32) -> Option<Self> {
        match km {
            5 => Some(RadiusSelection::Km5),
            10 => Some(RadiusSelection::Km10),
            15 => Some(RadiusSelection::Km15),
            25 => Some(RadiusSelection::Km25),
            50 => Some(RadiusSelection::Km50),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_values() {
        let kms: Vec<f64> = RadiusSelection::ALL.iter().map(|r| r.km()).collect();
        assert_eq!(kms, vec![5.0, 10.0, 15.0, 25.0, 50.0]);
    }

    #[test]
    fn test_try_from_km() {
        assert_eq!(RadiusSelection::try_from_km(25), Some(RadiusSelection::Km25));
        assert_eq!(RadiusSelection::try_from_km(7), None);
    }

    #[test]
    fn test_candidate_deserializes_without_optional_fields() {
        let json = r#"{"username":"asha","fullname":"Asha N","distance_km":3.2}"#;
        let c: NearbyCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.username, "asha");
        assert!(c.profession.is_none());
        assert!(c.latitude.is_none());
    }
}
