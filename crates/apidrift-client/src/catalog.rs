//! Fixed endpoint catalog for the game server API.
//!
//! Hand-maintained: the server does not advertise its surface, so the
//! catalog is the single place that knows which paths exist, which named
//! schema each response should match, and where dynamic `{id}` templates
//! get their sample identifiers.
//!
//! NOTE: the server still answers on its legacy paths (`/team-diplomacy`
//! and friends) even though the spec documents newer ones; the catalog
//! lists what the server actually serves.

use serde_json::Value;

/// Where a dynamic endpoint's sample identifiers come from: a list
/// endpoint and the field of each list item holding the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSource {
    /// List endpoint to fetch identifiers from.
    pub list_path: &'static str,
    /// Field of each list item that carries the identifier.
    pub id_field: &'static str,
}

/// One entry of the endpoint catalog. Static endpoints have no
/// `id_source`; dynamic ones carry a `{id}` placeholder in `path` that is
/// materialized from a discovered identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Request path, possibly containing a `{id}` placeholder.
    pub path: &'static str,
    /// Name of the schema the response should match.
    pub schema: &'static str,
    /// Whether the response is a list of schema instances.
    pub response_is_list: bool,
    /// Identifier source for dynamic endpoints.
    pub id_source: Option<IdSource>,
}

impl Endpoint {
    const fn fixed(path: &'static str, schema: &'static str, response_is_list: bool) -> Self {
        Self {
            path,
            schema,
            response_is_list,
            id_source: None,
        }
    }

    const fn dynamic(
        path: &'static str,
        schema: &'static str,
        response_is_list: bool,
        list_path: &'static str,
        id_field: &'static str,
    ) -> Self {
        Self {
            path,
            schema,
            response_is_list,
            id_source: Some(IdSource {
                list_path,
                id_field,
            }),
        }
    }

    /// Replace the `{id}` placeholder with a discovered identifier.
    /// Strings substitute their raw content; other values substitute
    /// their JSON rendering.
    pub fn materialize(&self, id: &Value) -> String {
        let rendered = match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.path.replace("{id}", &rendered)
    }
}

/// The full catalog, in probe order: static endpoints first, then the
/// dynamic templates that depend on discovered identifiers.
pub fn catalog() -> Vec<Endpoint> {
    vec![
        Endpoint::fixed("/state", "GameState", false),
        Endpoint::fixed("/config", "GameConfig", false),
        Endpoint::fixed("/players", "Player", true),
        Endpoint::fixed("/cities", "City", true),
        Endpoint::fixed("/characters", "Character", true),
        Endpoint::fixed("/units", "Unit", true),
        Endpoint::fixed("/tribes", "Tribe", true),
        Endpoint::fixed("/religions", "Religion", true),
        Endpoint::fixed("/map", "MapMetadata", false),
        Endpoint::fixed("/tiles?limit=10", "PaginatedTiles", false),
        Endpoint::fixed("/team-diplomacy", "TeamDiplomacy", true),
        Endpoint::fixed("/team-alliances", "TeamAlliance", true),
        Endpoint::fixed("/tribe-diplomacy", "TribeDiplomacy", true),
        Endpoint::fixed("/tribe-alliances", "TribeAlliance", true),
        Endpoint::fixed("/character-events", "CharacterEvent", true),
        Endpoint::fixed("/unit-events", "UnitEvent", true),
        Endpoint::fixed("/city-events", "CityEvent", true),
        Endpoint::dynamic("/player/{id}", "Player", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/units", "Unit", true, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/techs", "PlayerTechs", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/families", "PlayerFamilies", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/religion", "PlayerReligion", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/goals", "PlayerGoals", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/decisions", "PlayerDecisions", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/laws", "PlayerLaws", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/missions", "PlayerMissions", false, "/players", "playerInt"),
        Endpoint::dynamic("/player/{id}/resources", "PlayerResources", false, "/players", "playerInt"),
        Endpoint::dynamic("/city/{id}", "City", false, "/cities", "id"),
        Endpoint::dynamic("/character/{id}", "Character", false, "/characters", "id"),
        Endpoint::dynamic("/unit/{id}", "Unit", false, "/units", "id"),
        Endpoint::dynamic("/tile/{id}", "Tile", false, "/tiles?limit=10", "id"),
        Endpoint::dynamic("/tribe/{id}", "Tribe", false, "/tribes", "tribeType"),
    ]
}
