use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Relation lists embedded in a person record. Upstream carries each relation as a list
/// of absolute URLs; the matching `*_ids` list is derived from it when the person is
/// fetched on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Films,
    Species,
    Vehicles,
    Starships,
    Planets,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Films,
        Relation::Species,
        Relation::Vehicles,
        Relation::Starships,
        Relation::Planets,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Relation::Films => "films",
            Relation::Species => "species",
            Relation::Vehicles => "vehicles",
            Relation::Starships => "starships",
            Relation::Planets => "planets",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub films: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starships: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planets: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub films_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starships_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planets_ids: Option<Vec<u64>>,
}

impl Relations {
    pub fn urls(&self, relation: Relation) -> Option<&[String]> {
        match relation {
            Relation::Films => self.films.as_deref(),
            Relation::Species => self.species.as_deref(),
            Relation::Vehicles => self.vehicles.as_deref(),
            Relation::Starships => self.starships.as_deref(),
            Relation::Planets => self.planets.as_deref(),
        }
    }

    /// The membership set for `relation`. A relation missing from the payload, or not
    /// yet normalized, is empty.
    pub fn ids(&self, relation: Relation) -> &[u64] {
        let ids = match relation {
            Relation::Films => &self.films_ids,
            Relation::Species => &self.species_ids,
            Relation::Vehicles => &self.vehicles_ids,
            Relation::Starships => &self.starships_ids,
            Relation::Planets => &self.planets_ids,
        };
        ids.as_deref().unwrap_or_default()
    }

    pub fn set_ids(&mut self, relation: Relation, ids: Vec<u64>) {
        let slot = match relation {
            Relation::Films => &mut self.films_ids,
            Relation::Species => &mut self.species_ids,
            Relation::Vehicles => &mut self.vehicles_ids,
            Relation::Starships => &mut self.starships_ids,
            Relation::Planets => &mut self.planets_ids,
        };
        *slot = Some(ids);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub relations: Relations,
    /// Every other upstream field, kept as-is.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A film, species, vehicle or starship record. Only the ID is interpreted; the rest
/// of the upstream payload is passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The sub-resources a user can browse through their hero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Films,
    Species,
    Vehicles,
    Starships,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Films,
        ResourceKind::Species,
        ResourceKind::Vehicles,
        ResourceKind::Starships,
    ];

    /// Collection path on the upstream API.
    pub const fn path(&self) -> &'static str {
        match self {
            ResourceKind::Films => "films",
            ResourceKind::Species => "species",
            ResourceKind::Vehicles => "vehicles",
            ResourceKind::Starships => "starships",
        }
    }

    pub fn cache_key(&self, id: u64) -> String {
        let prefix = match self {
            ResourceKind::Films => "film",
            ResourceKind::Species => "species",
            ResourceKind::Vehicles => "vehicles",
            ResourceKind::Starships => "starships",
        };
        format!("{prefix}.{id}")
    }

    pub const fn relation(&self) -> Relation {
        match self {
            ResourceKind::Films => Relation::Films,
            ResourceKind::Species => Relation::Species,
            ResourceKind::Vehicles => Relation::Vehicles,
            ResourceKind::Starships => Relation::Starships,
        }
    }

    pub const fn fallback_message(&self) -> &'static str {
        match self {
            ResourceKind::Films => "Something went wrong during film request.",
            ResourceKind::Species => "Something went wrong during specie request.",
            ResourceKind::Vehicles => "Something went wrong during vehicle request.",
            ResourceKind::Starships => "Something went wrong during starship request.",
        }
    }
}
