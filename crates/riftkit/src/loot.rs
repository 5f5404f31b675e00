//! Inventory (loot) viewer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;
use crate::network::LocalClient;
use crate::storage::Tabular;

const PLAYER_LOOT: &str = "/lol-loot/v1/player-loot";

/// Raw loot entry from the client API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerLoot {
    pub loot_id: String,
    pub loot_name: String,
    pub localized_name: String,
    pub item_desc: String,
    #[serde(rename = "type")]
    pub loot_type: String,
    pub display_categories: String,
    pub rarity: String,
    pub disenchant_value: i64,
    pub value: i64,
    pub upgrade_essence_value: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LootItem {
    pub id: String,
    pub name: String,
    pub item_type: String,
    pub rarity: String,
    /// Essence gained by disenchanting one copy.
    pub disenchant_value: i64,
    /// Essence needed to upgrade/craft one copy.
    pub upgrade_value: i64,
    pub count: i64,
}

impl From<PlayerLoot> for LootItem {
    fn from(raw: PlayerLoot) -> Self {
        let name = [&raw.localized_name, &raw.item_desc, &raw.loot_name]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default();

        let item_type = if raw.display_categories.is_empty() {
            raw.loot_type
        } else {
            raw.display_categories
        };

        let upgrade_value = if raw.value != 0 {
            raw.value
        } else {
            raw.upgrade_essence_value
        };

        Self {
            id: raw.loot_id,
            name,
            item_type,
            rarity: raw.rarity,
            disenchant_value: raw.disenchant_value,
            upgrade_value,
            count: raw.count,
        }
    }
}

impl LootItem {
    pub fn total_disenchant(&self) -> i64 {
        self.disenchant_value * self.count
    }
}

impl Tabular for LootItem {
    fn headers() -> &'static [&'static str] {
        &["Name", "Type", "Rarity", "Disenchant", "Upgrade", "Count"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.item_type.clone(),
            self.rarity.clone(),
            self.disenchant_value.to_string(),
            self.upgrade_value.to_string(),
            self.count.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LootSort {
    #[default]
    Name,
    /// Total disenchant value, highest first.
    Value,
    /// Quantity, highest first.
    Count,
}

pub fn fetch_loot(client: &LocalClient) -> Result<Vec<LootItem>> {
    let raw: Vec<PlayerLoot> = client.get_json(PLAYER_LOOT)?;
    Ok(raw
        .into_iter()
        .filter(|l| l.count > 0)
        .map(LootItem::from)
        .collect())
}

/// Keep items whose type contains `item_type` (case-insensitive).
pub fn filter_by_type(items: Vec<LootItem>, item_type: &str) -> Vec<LootItem> {
    let needle = item_type.to_lowercase();
    items
        .into_iter()
        .filter(|i| i.item_type.to_lowercase().contains(&needle))
        .collect()
}

pub fn sort_items(items: &mut [LootItem], sort: LootSort) {
    match sort {
        LootSort::Name => items.sort_by_key(|i| i.name.to_lowercase()),
        LootSort::Value => items.sort_by(|a, b| b.total_disenchant().cmp(&a.total_disenchant())),
        LootSort::Count => items.sort_by(|a, b| b.count.cmp(&a.count)),
    }
}

/// Essence gained by disenchanting everything in `items`.
pub fn total_disenchant(items: &[LootItem]) -> i64 {
    items.iter().map(LootItem::total_disenchant).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credentials, StaticSource};
    use crate::network::testing::{Route, TestServer};
    use serde_json::json;
    use std::time::Duration;

    fn item(name: &str, item_type: &str, disenchant: i64, count: i64) -> LootItem {
        LootItem {
            id: name.to_string(),
            name: name.to_string(),
            item_type: item_type.to_string(),
            rarity: "DEFAULT".to_string(),
            disenchant_value: disenchant,
            upgrade_value: 0,
            count,
        }
    }

    #[test]
    fn test_fetch_loot_maps_fields() {
        let server = TestServer::start(vec![Route::json(
            "GET",
            PLAYER_LOOT,
            json!([
                {
                    "lootId": "CHAMPION_RENTAL_103",
                    "lootName": "CHAMPION_RENTAL",
                    "itemDesc": "Ahri",
                    "type": "CHAMPION_RENTAL",
                    "displayCategories": "CHAMPION",
                    "rarity": "DEFAULT",
                    "disenchantValue": 1260,
                    "value": 3150,
                    "count": 2
                },
                {
                    "lootId": "MATERIAL_key",
                    "localizedName": "Hextech Key",
                    "type": "MATERIAL",
                    "count": 3,
                    "unknownField": true
                },
                {
                    "lootId": "CURRENCY_empty",
                    "type": "CURRENCY",
                    "count": 0
                }
            ]),
        )]);
        let creds =
            Credentials::parse(&format!("LeagueClient:1:{}:pw:http", server.port())).unwrap();
        let client = LocalClient::new(StaticSource(creds), Duration::from_secs(5));

        let items = fetch_loot(&client).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Ahri");
        assert_eq!(items[0].item_type, "CHAMPION");
        assert_eq!(items[0].upgrade_value, 3150);
        assert_eq!(items[0].total_disenchant(), 2520);
        assert_eq!(items[1].name, "Hextech Key");
        assert_eq!(items[1].item_type, "MATERIAL");
    }

    #[test]
    fn test_filter_and_sort() {
        let items = vec![
            item("b-skin", "SKIN", 100, 1),
            item("a-champ", "CHAMPION", 450, 3),
            item("c-champ", "CHAMPION", 960, 1),
        ];

        let mut champs = filter_by_type(items.clone(), "champ");
        assert_eq!(champs.len(), 2);

        sort_items(&mut champs, LootSort::Value);
        assert_eq!(champs[0].name, "a-champ");

        let mut all = items;
        sort_items(&mut all, LootSort::Name);
        assert_eq!(all[0].name, "a-champ");
        sort_items(&mut all, LootSort::Count);
        assert_eq!(all[0].count, 3);

        assert_eq!(total_disenchant(&all), 100 + 1350 + 960);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("VALUE".parse::<LootSort>().unwrap(), LootSort::Value);
        assert!("price".parse::<LootSort>().is_err());
    }
}
