//! Typed Open5E v2 resources.
//!
//! These models are deliberately lenient: every field beyond `key` and
//! `name` is defaulted, since the upstream API adds fields between
//! releases and different rulebooks populate different subsets.

use serde::Deserialize;
use serde::Serialize;

/// A reference to another resource, carried inline as `{key, name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyed {
    /// Stable resource key.
    #[serde(default)]
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A source rulebook (e.g. the 5e SRD).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Description of the rulebook.
    #[serde(default)]
    pub desc: String,
    /// The organization that published this rulebook.
    #[serde(default)]
    pub publisher: Option<Keyed>,
}

/// A spell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spell {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    #[serde(default)]
    pub desc: String,
    /// Spell level, 0 for cantrips.
    #[serde(default)]
    pub level: u8,
    /// School of magic (evocation, abjuration, ...).
    #[serde(default)]
    pub school: Option<Keyed>,
    /// Human-readable range ("150 feet", "Touch").
    #[serde(default)]
    pub range_text: Option<String>,
    /// Duration the spell's effect lasts.
    #[serde(default)]
    pub duration: Option<String>,
    /// Whether the spell requires concentration.
    #[serde(default)]
    pub concentration: bool,
    /// Whether the spell can be cast as a ritual.
    #[serde(default)]
    pub ritual: bool,
    /// Time required to cast.
    #[serde(default)]
    pub casting_time: Option<String>,
    /// The rulebook this spell comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A character class (wizard, fighter, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterClass {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Hit die expression per level ("1d6").
    #[serde(default)]
    pub hit_dice: Option<String>,
    /// Spellcasting progression ("full", "half", none).
    #[serde(default)]
    pub caster_type: Option<String>,
    /// The rulebook this class comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A playable species (formerly "race").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Species {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Description and traits.
    #[serde(default)]
    pub desc: String,
    /// Whether this is a variant of another species.
    #[serde(default)]
    pub is_subspecies: bool,
    /// The parent species, when this is a subspecies.
    #[serde(default)]
    pub subspecies_of: Option<Keyed>,
    /// The rulebook this species comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A character background.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Background {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Description and benefits.
    #[serde(default)]
    pub desc: String,
    /// The rulebook this background comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A feat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feat {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    #[serde(default)]
    pub desc: String,
    /// Requirement to take the feat, if any.
    #[serde(default)]
    pub prerequisite: Option<String>,
    /// The rulebook this feat comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A condition (blinded, prone, ...). Cross-document reference data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    #[serde(default)]
    pub desc: String,
    /// The rulebook this condition comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A magic item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagicItem {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    #[serde(default)]
    pub desc: String,
    /// Rarity tier (common, rare, legendary, ...).
    #[serde(default)]
    pub rarity: Option<Keyed>,
    /// Whether the item must be attuned to use.
    #[serde(default)]
    pub requires_attunement: bool,
    /// The rulebook this item comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A weapon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weapon {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Damage roll expression ("1d8").
    #[serde(default)]
    pub damage_dice: Option<String>,
    /// Damage type dealt (slashing, piercing, ...).
    #[serde(default)]
    pub damage_type: Option<Keyed>,
    /// Whether the weapon is martial rather than simple.
    #[serde(default)]
    pub is_martial: bool,
    /// The rulebook this weapon comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

/// A piece of armor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Armor {
    /// Stable resource key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Armor class as displayed ("14 + Dex modifier (max 2)").
    #[serde(default)]
    pub ac_display: Option<String>,
    /// Whether wearing it imposes disadvantage on Stealth checks.
    #[serde(default)]
    pub grants_stealth_disadvantage: bool,
    /// Weight category (light, medium, heavy).
    #[serde(default)]
    pub category: Option<String>,
    /// The rulebook this armor comes from.
    #[serde(default)]
    pub document: Option<Keyed>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_tolerates_sparse_payloads() {
        let spell: Spell = serde_json::from_str(
            r#"{"key": "fireball", "name": "Fireball", "level": 3,
                "school": {"key": "evocation", "name": "Evocation"},
                "unknown_future_field": 42}"#,
        )
        .unwrap();
        assert_eq!(spell.key, "fireball");
        assert_eq!(spell.level, 3);
        assert_eq!(spell.school.unwrap().key, "evocation");
        assert!(spell.range_text.is_none());
        assert!(!spell.concentration);
    }

    #[test]
    fn test_condition_round_trips_through_json() {
        let condition = Condition {
            key: "prone".into(),
            name: "Prone".into(),
            desc: "A prone creature...".into(),
            document: Some(Keyed {
                key: "srd-2014".into(),
                name: "5e SRD".into(),
            }),
        };
        let bytes = serde_json::to_vec(&condition).unwrap();
        let back: Condition = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.key, "prone");
        assert_eq!(back.document.unwrap().key, "srd-2014");
    }
}
