//! Standard Content
//!
//! The compiled-in tables used when no TOML override is supplied. These are
//! data, not behavior: the engine consults them through `ContentTables` and
//! never hard-codes an entry.

use std::collections::BTreeMap;

use chronicle_events::Season;

use crate::components::treasure::{Coin, MagicCategory};
use crate::components::world::{Terrain, WeatherKind};

use super::dice::DiceNotation;
use super::{
    ArchetypePools, CoinSpec, ContentTables, CreatureEntry, Holiday, MagicSpec, NamePools,
    PoolSpec, ShipTypeConfig, TreasureMatchRule, TreasureTypeConfig, WeatherEffects, WeatherOdds,
};

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn coin(chance: f64, count: u32, sides: u32, mult: u32) -> CoinSpec {
    CoinSpec {
        chance,
        dice: DiceNotation::new(count, sides).times(mult),
    }
}

fn pool(chance: f64, count: u32, sides: u32) -> PoolSpec {
    PoolSpec {
        chance,
        dice: DiceNotation::new(count, sides),
    }
}

fn magic(chance: f64, count: u32, categories: &[MagicCategory]) -> MagicSpec {
    MagicSpec {
        chance,
        count,
        categories: categories.to_vec(),
    }
}

/// Builds the full standard table set.
pub fn standard_tables() -> ContentTables {
    ContentTables {
        names: name_pools(),
        creatures: creatures(),
        treasure_match: treasure_match(),
        treasure_types: treasure_types(),
        archetypes: archetypes(),
        weather_odds: weather_odds(),
        weather_effects: weather_effects(),
        ship_types: ship_types(),
        holidays: holidays(),
    }
}

fn name_pools() -> NamePools {
    NamePools {
        settlements: strs(&[
            "Harrowgate", "Vellan", "Marwick", "Duskmere", "Thornby", "Caldreth", "Ashford",
            "Greywater", "Ostmoor", "Brindlehaven", "Saltcliffe", "Wrenholm", "Eastfall",
            "Mirefold", "Coldharbor", "Redwyne", "Larkspur", "Hollowford",
        ]),
        dungeons: strs(&[
            "The Sunken Vault", "Barrow of the Pale King", "The Wyrmgut Caves", "Felgrim Mine",
            "The Drowned Cloister", "Hall of Broken Crowns", "The Serpent Warrens",
            "Tomb of the Nine Lances", "The Gloaming Deep", "Cindermaw Pit",
            "The Weeping Catacombs", "Fort Vane",
        ]),
        parties: strs(&[
            "The Gilded Blades", "Company of the Grey Hart", "The Emberwatch", "Oath of Six",
            "The Hollow Crowns", "Daughters of the Vale", "The Last Lantern", "Red Meridian",
            "The Stoneward Band", "Wolves of Ashford",
        ]),
        factions: strs(&[
            "The Salt Compact", "Order of the Vigil", "The Ledger Court", "House Vexley",
            "The Quiet Hand", "Wardens of the Marches", "The Copper Ring", "Circle of the Reed",
        ]),
        npc_first: strs(&[
            "Aldric", "Maren", "Corvin", "Ysolde", "Brann", "Elsbeth", "Tomas", "Ravenna",
            "Godric", "Sabine", "Ortwin", "Linnea", "Caspar", "Idris", "Rowena", "Fenwick",
            "Oswin", "Thessaly", "Dunstan", "Merrit", "Halla", "Edric", "Vianne", "Searle",
            "Odeth", "Garron", "Petra", "Lysander", "Berenice", "Warin",
        ]),
        npc_roles: strs(&[
            "innkeeper", "blacksmith", "reeve", "priest", "herbalist", "miller", "fisher",
            "merchant", "stablemaster", "scribe", "midwife", "hunter", "ferryman", "brewer",
        ]),
        antagonist_names: strs(&[
            "Vorga", "Malachai", "Szeth", "Karrok", "Ilvane", "Dreth", "Morwenna", "Ghazrek",
            "Selvane", "Ottokar", "Nyxis", "Baelric", "Ursula", "Kragmor", "Velzha",
        ]),
        ships: strs(&[
            "Dawn Hart", "Sea Wren", "The Marigold", "Pride of Vellan", "Stormcrow", "Gull's Wager",
            "The Brine Maiden", "Winter's Edge", "The Cresset", "Fairwind", "The Osprey",
            "Saltkissed",
        ]),
        pirate_fleets: strs(&[
            "The Black Gull", "The Drowned Banner", "Reavers of the Shattered Coast",
            "The Crimson Tide", "Wraiths of the Narrows", "The Broken Chain",
        ]),
        pirate_captains: strs(&[
            "Sessa Redmane", "One-Eyed Calder", "Mad Brenna", "The Eel", "Corsair Vayne",
            "Old Hask",
        ]),
        distant_lands: strs(&[
            "Zephyria", "the Shattered Isles", "Qal-Amun", "the Jade Coast", "Vorthalia",
            "the Sunless Reach", "Mherev", "the Pearl Cities", "Skarnfold", "the Burning Shore",
        ]),
        distant_land_flavors: strs(&[
            "where the towers are glass", "whose kings are crowned at sea",
            "where it rains warm ash", "whose markets never close", "where the dead pay taxes",
            "where every ship flies two flags", "whose harbors freeze in summer",
        ]),
        distant_figures: strs(&[
            "Empress Sulivane", "the Corsair-King", "Tahmel the Undying", "the White Navigator",
            "Queen Vesh of the Nine Banners", "the Shrouded Admiral", "Prince Alukhan",
        ]),
        distant_figure_titles: strs(&[
            "who owns a thousand ships", "who speaks with storms", "who has died twice",
            "whose word moves grain fleets", "who maps the sea floor", "who buys whole harbors",
        ]),
        landmarks: strs(&[
            "a ring of standing stones", "a petrified grove", "an ancient battlefield",
            "a dried lakebed of white clay", "a solitary watchfire cairn", "a sunken milestone road",
            "a cliff face carved with staring faces",
        ]),
        ruins: strs(&[
            "a collapsed watchtower", "a roofless chapel", "a flooded mine head",
            "an abandoned tollhouse", "a toppled aqueduct", "a burned manor",
        ]),
        magic_suffixes: strs(&[
            "the Adder", "Winter Courage", "the Drowned Saint", "Silent Steps", "the Third Dawn",
            "Iron Resolve", "the Long Watch", "Bitter Remedy", "the Fox", "Borrowed Time",
            "the Deep Road", "Quiet Flame",
        ]),
    }
}

fn creatures() -> Vec<CreatureEntry> {
    fn entry(
        name: &str,
        terrains: &[Terrain],
        weight: u32,
        named_chance: f64,
        horde_chance: f64,
        always_hostile: bool,
    ) -> CreatureEntry {
        CreatureEntry {
            name: name.to_string(),
            terrains: terrains.to_vec(),
            weight,
            named_chance,
            horde_chance,
            always_hostile,
        }
    }

    use Terrain::*;
    vec![
        entry("bandits", &[Road, Clear, Forest, Hills], 5, 0.1, 0.1, false),
        entry("merchant caravan", &[Road, Clear], 4, 0.0, 0.0, false),
        entry("pilgrims", &[Road, Clear], 3, 0.0, 0.0, false),
        entry("wolf pack", &[Forest, Hills, Clear], 4, 0.05, 0.2, true),
        entry("dire boar", &[Forest, Swamp], 2, 0.0, 0.0, true),
        entry("goblin scouts", &[Forest, Hills, Mountains], 4, 0.05, 0.3, false),
        entry("orc warband", &[Hills, Mountains, Clear], 3, 0.15, 0.3, true),
        entry("ogre", &[Hills, Mountains], 2, 0.2, 0.0, true),
        entry("hill giant", &[Hills, Mountains], 1, 0.3, 0.0, true),
        entry("griffon", &[Mountains], 1, 0.1, 0.0, true),
        entry("young dragon", &[Mountains, Hills], 1, 0.6, 0.0, true),
        entry("lizardfolk hunters", &[Swamp, River], 4, 0.05, 0.2, false),
        entry("giant leeches", &[Swamp], 3, 0.0, 0.0, true),
        entry("will-o-wisps", &[Swamp], 2, 0.0, 0.0, false),
        entry("troll", &[Swamp, Mountains, Hills], 2, 0.2, 0.0, true),
        entry("nomad riders", &[Desert, Clear], 4, 0.1, 0.1, false),
        entry("giant scorpion", &[Desert], 3, 0.0, 0.0, true),
        entry("dust wraith", &[Desert], 1, 0.1, 0.0, true),
        entry("skeleton patrol", &[Road, Clear, Hills, Desert], 2, 0.0, 0.2, true),
        entry("ghouls", &[Forest, Swamp, Desert], 2, 0.05, 0.1, true),
        entry("wandering knight", &[Road, Clear], 2, 0.3, 0.0, false),
        entry("peddler", &[Road, Forest], 3, 0.0, 0.0, false),
        entry("smugglers", &[Coastal, River, Road], 3, 0.1, 0.0, false),
        entry("harpies", &[Coastal, Mountains], 2, 0.05, 0.1, true),
        entry("giant spiders", &[Forest], 3, 0.0, 0.2, true),
    ]
}

fn treasure_match() -> Vec<TreasureMatchRule> {
    fn rule(pattern: &str, treasure_type: &str) -> TreasureMatchRule {
        TreasureMatchRule {
            pattern: pattern.to_string(),
            treasure_type: treasure_type.to_string(),
        }
    }
    vec![
        rule("dragon|wyrm", "H"),
        rule("bandit|brigand|smuggler", "A"),
        rule("orc|goblin|hobgoblin", "D"),
        rule("ogre|troll|giant", "B"),
        rule("lizardfolk|nomad", "J"),
        rule("wraith|ghoul|skeleton|spectre", "E"),
        rule("griffon|harpy|spider|scorpion", "C"),
        rule("knight|caravan|merchant", "Q"),
        rule("wolf|boar|leech", "Nil"),
        rule("wisp", "Nil"),
    ]
}

fn treasure_types() -> BTreeMap<String, TreasureTypeConfig> {
    let mut types = BTreeMap::new();

    let mut add = |key: &str, config: TreasureTypeConfig| {
        types.insert(key.to_string(), config);
    };

    // Lair types A-I: the big hoards.
    add("A", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Cp, coin(0.25, 1, 6, 100)),
            (Coin::Sp, coin(0.3, 1, 6, 100)),
            (Coin::Ep, coin(0.35, 1, 6, 100)),
            (Coin::Gp, coin(0.4, 2, 6, 100)),
            (Coin::Pp, coin(0.25, 1, 2, 100)),
        ]),
        gems: Some(pool(0.6, 2, 6)),
        jewelry: Some(pool(0.5, 1, 6)),
        magic: Some(magic(0.3, 3, &[])),
        is_lair: true,
        typical_value: (1000, 10000),
    });
    add("B", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Cp, coin(0.5, 1, 8, 100)),
            (Coin::Sp, coin(0.25, 1, 6, 100)),
            (Coin::Ep, coin(0.25, 1, 4, 100)),
            (Coin::Gp, coin(0.25, 1, 3, 100)),
        ]),
        gems: Some(pool(0.3, 1, 8)),
        jewelry: Some(pool(0.2, 1, 4)),
        magic: Some(magic(0.1, 1, &[MagicCategory::Weapon, MagicCategory::Armor])),
        is_lair: true,
        typical_value: (400, 4000),
    });
    add("C", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Cp, coin(0.2, 1, 12, 100)),
            (Coin::Sp, coin(0.3, 1, 4, 100)),
            (Coin::Ep, coin(0.1, 1, 4, 100)),
        ]),
        gems: Some(pool(0.25, 1, 6)),
        jewelry: Some(pool(0.2, 1, 3)),
        magic: Some(magic(0.1, 2, &[])),
        is_lair: true,
        typical_value: (200, 2000),
    });
    add("D", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Cp, coin(0.1, 1, 8, 100)),
            (Coin::Sp, coin(0.15, 1, 12, 100)),
            (Coin::Gp, coin(0.5, 1, 6, 100)),
        ]),
        gems: Some(pool(0.3, 1, 8)),
        jewelry: Some(pool(0.25, 1, 6)),
        magic: Some(magic(0.15, 2, &[])),
        is_lair: true,
        typical_value: (500, 4000),
    });
    add("E", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Cp, coin(0.05, 1, 10, 100)),
            (Coin::Sp, coin(0.25, 1, 12, 100)),
            (Coin::Ep, coin(0.25, 1, 4, 100)),
            (Coin::Gp, coin(0.25, 1, 8, 100)),
        ]),
        gems: Some(pool(0.15, 1, 10)),
        jewelry: Some(pool(0.1, 1, 4)),
        magic: Some(magic(0.25, 3, &[MagicCategory::Scroll, MagicCategory::Ring, MagicCategory::Wand])),
        is_lair: true,
        typical_value: (300, 3500),
    });
    add("F", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Sp, coin(0.1, 2, 10, 100)),
            (Coin::Ep, coin(0.15, 1, 8, 100)),
            (Coin::Gp, coin(0.4, 1, 12, 100)),
            (Coin::Pp, coin(0.35, 1, 3, 100)),
        ]),
        gems: Some(pool(0.2, 2, 12)),
        jewelry: Some(pool(0.1, 1, 12)),
        magic: Some(magic(0.3, 3, &[MagicCategory::Potion, MagicCategory::Scroll, MagicCategory::Misc])),
        is_lair: true,
        typical_value: (1000, 6000),
    });
    add("G", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Gp, coin(0.5, 10, 4, 100)),
            (Coin::Pp, coin(0.5, 1, 20, 50)),
        ]),
        gems: Some(pool(0.3, 3, 6)),
        jewelry: Some(pool(0.25, 1, 10)),
        magic: Some(magic(0.35, 4, &[])),
        is_lair: true,
        typical_value: (2000, 12000),
    });
    add("H", TreasureTypeConfig {
        coins: BTreeMap::from([
            (Coin::Cp, coin(0.25, 3, 8, 100)),
            (Coin::Sp, coin(0.4, 1, 100, 100)),
            (Coin::Ep, coin(0.4, 1, 4, 1000)),
            (Coin::Gp, coin(0.55, 1, 8, 1000)),
            (Coin::Pp, coin(0.25, 5, 4, 100)),
        ]),
        gems: Some(pool(0.5, 1, 100)),
        jewelry: Some(pool(0.5, 1, 40)),
        magic: Some(magic(0.15, 4, &[])),
        is_lair: true,
        typical_value: (5000, 50000),
    });
    add("I", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Pp, coin(0.3, 1, 8, 100))]),
        gems: Some(pool(0.55, 2, 10)),
        jewelry: Some(pool(0.5, 1, 12)),
        magic: Some(magic(0.15, 1, &[])),
        is_lair: true,
        typical_value: (1000, 8000),
    });

    // Individual and small-cache types J-V.
    add("J", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Cp, coin(1.0, 3, 8, 1)), (Coin::Sp, coin(0.5, 1, 6, 1))]),
        gems: None,
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (1, 30),
    });
    add("K", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Sp, coin(1.0, 3, 6, 1)), (Coin::Ep, coin(0.5, 1, 4, 1))]),
        gems: None,
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (2, 40),
    });
    add("L", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Ep, coin(1.0, 2, 6, 1))]),
        gems: Some(pool(0.05, 1, 2)),
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (3, 60),
    });
    add("M", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Gp, coin(1.0, 2, 4, 1)), (Coin::Pp, coin(0.4, 1, 2, 1))]),
        gems: None,
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (5, 100),
    });
    add("N", TreasureTypeConfig {
        coins: BTreeMap::new(),
        gems: None,
        jewelry: None,
        magic: Some(magic(0.4, 1, &[MagicCategory::Potion])),
        is_lair: false,
        typical_value: (0, 400),
    });
    add("O", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Cp, coin(0.25, 1, 4, 10)), (Coin::Sp, coin(0.2, 1, 3, 10))]),
        gems: None,
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (1, 20),
    });
    add("P", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Sp, coin(0.3, 1, 6, 10)), (Coin::Ep, coin(0.25, 1, 2, 10))]),
        gems: None,
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (2, 40),
    });
    add("Q", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Gp, coin(0.5, 1, 4, 10))]),
        gems: Some(pool(0.1, 1, 4)),
        jewelry: Some(pool(0.05, 1, 2)),
        magic: None,
        is_lair: false,
        typical_value: (10, 200),
    });
    add("R", TreasureTypeConfig {
        coins: BTreeMap::from([(Coin::Gp, coin(0.6, 2, 4, 10)), (Coin::Pp, coin(0.6, 10, 6, 1))]),
        gems: Some(pool(0.5, 4, 8)),
        jewelry: Some(pool(0.45, 1, 12)),
        magic: None,
        is_lair: false,
        typical_value: (100, 1500),
    });
    add("S", TreasureTypeConfig {
        coins: BTreeMap::new(),
        gems: None,
        jewelry: None,
        magic: Some(magic(0.4, 2, &[MagicCategory::Potion])),
        is_lair: false,
        typical_value: (0, 800),
    });
    add("T", TreasureTypeConfig {
        coins: BTreeMap::new(),
        gems: None,
        jewelry: None,
        magic: Some(magic(0.5, 1, &[MagicCategory::Scroll])),
        is_lair: false,
        typical_value: (0, 600),
    });
    add("U", TreasureTypeConfig {
        coins: BTreeMap::new(),
        gems: Some(pool(0.9, 10, 8)),
        jewelry: Some(pool(0.8, 5, 6)),
        magic: Some(magic(0.7, 1, &[])),
        is_lair: false,
        typical_value: (500, 5000),
    });
    add("V", TreasureTypeConfig {
        coins: BTreeMap::new(),
        gems: None,
        jewelry: None,
        magic: Some(magic(0.85, 2, &[])),
        is_lair: false,
        typical_value: (0, 2000),
    });
    add("Nil", TreasureTypeConfig {
        coins: BTreeMap::new(),
        gems: None,
        jewelry: None,
        magic: None,
        is_lair: false,
        typical_value: (0, 0),
    });

    types
}

fn archetypes() -> BTreeMap<String, ArchetypePools> {
    fn pools(
        epithets: &[&str],
        motivations: &[&str],
        traits: &[&str],
        weaknesses: &[&str],
        actions: &[&str],
    ) -> ArchetypePools {
        ArchetypePools {
            epithets: strs(epithets),
            motivations: strs(motivations),
            traits: strs(traits),
            weaknesses: strs(weaknesses),
            actions: strs(actions),
        }
    }

    let mut map = BTreeMap::new();
    map.insert("bandit-chief".to_string(), pools(
        &["the Red Hand", "of the Broken Road", "the Toll-Taker"],
        &["plunder", "a kingdom of outcasts", "an old debt to settle"],
        &["ruthless", "charismatic", "patient"],
        &["greed", "pride", "drink"],
        &["waylays a caravan", "raids an outlying farm", "extorts a toll on the road"],
    ));
    map.insert("orc-warlord".to_string(), pools(
        &["Skullgather", "the Unbowed", "of the Burned Plains"],
        &["conquest", "vengeance for the tribes", "tribute"],
        &["brutal", "cunning", "superstitious"],
        &["rage", "rivals within the horde", "omens"],
        &["burns a border hamlet", "demands tribute in iron", "tests a settlement's walls"],
    ));
    map.insert("dark-wizard".to_string(), pools(
        &["the Hollow", "of the Black Library", "Thrice-Cursed"],
        &["forbidden knowledge", "immortality", "a grudge against the learned"],
        &["obsessive", "meticulous", "aloof"],
        &["hubris", "a phylactery of notes", "old colleagues"],
        &["abducts a scholar", "sours the wells with sorcery", "sends a summoned thing hunting"],
    ));
    map.insert("vampire".to_string(), pools(
        &["the Pale", "of the Long Night", "Last of the Old Blood"],
        &["dominion over the living", "an unending thirst", "restoration of a lost house"],
        &["patient", "courtly", "possessive"],
        &["sunlight", "running water", "an old love"],
        &["takes a victim from the lanes at night", "charms a town notable", "empties a lonely farmstead"],
    ));
    map.insert("dragon".to_string(), pools(
        &["the Ember Tide", "of the High Roost", "Goldcounter"],
        &["a greater hoard", "tribute and terror", "sovereignty of the peaks"],
        &["vain", "covetous", "ancient of memory"],
        &["flattery", "a soft underbelly", "counting compulsion"],
        &["burns a granary from the sky", "demands a tithe of gold", "circles the town in warning"],
    ));
    map.insert("cult-leader".to_string(), pools(
        &["the Voice Below", "of the Seventh Sign", "the Awakener"],
        &["the god under the hill", "a harvest of souls", "the end made welcome"],
        &["mesmeric", "secretive", "fervent"],
        &["doctrine schisms", "exposure", "doubt"],
        &["wins a convert among the townsfolk", "holds a midnight rite", "marks a door in ash"],
    ));
    map.insert("corrupt-noble".to_string(), pools(
        &["the Silk Knife", "of the Double Ledger", "the Smiling Lord"],
        &["the seat above this one", "coin without end", "erasure of a rival line"],
        &["urbane", "vindictive", "careful"],
        &["scandal", "debts", "a loyal servant who knows"],
        &["squeezes the market tolls", "buys a magistrate", "ruins an honest family"],
    ));
    map.insert("renegade-knight".to_string(), pools(
        &["the Oathless", "of the Ashen Banner", "Once-Gallant"],
        &["redress for a broken oath", "a warband of his own", "death with a name attached"],
        &["disciplined", "bitter", "honorable in fragments"],
        &["the old code", "former brothers-in-arms", "drink"],
        &["challenges a town champion", "seizes a bridge and holds it", "presses farmers into service"],
    ));
    map.insert("beast-lord".to_string(), pools(
        &["of the Red Antlers", "the Pack-Father", "Wildcrowned"],
        &["the wild reclaiming the fields", "revenge for the felled wood", "dominion of tooth and claw"],
        &["feral", "territorial", "strangely gentle"],
        &["fire", "cold iron", "his own beasts' hunger"],
        &["drives wolves at the herds", "fouls the timber camps", "stampedes cattle through a market"],
    ));
    map.insert("necromancer".to_string(), pools(
        &["the Gravewright", "of the Quiet Congregation", "Deathless"],
        &["an army that needs no bread", "converse with the dead", "contempt for the living"],
        &["methodical", "morbid", "tireless"],
        &["consecrated ground", "daylight", "the names of the dead"],
        &["empties a churchyard", "sends shamblers to the walls", "steals a fresh-dug grave"],
    ));
    map.insert("fey-lord".to_string(), pools(
        &["of the Twilight Court", "the Unseelie", "Thornkindred"],
        &["tribute of names and years", "amusement at mortal cost", "an old bargain enforced"],
        &["capricious", "bound by word", "beautiful and terrible"],
        &["iron", "broken hospitality", "exact wording"],
        &["spirits away a child", "sours a season's milk", "binds a fiddler for a year's dance"],
    ));
    map.insert("demon-bound".to_string(), pools(
        &["the Bargained", "of the Inner Flame", "Twice-Sold"],
        &["feeding the thing inside", "outrunning the contract", "power at any tally"],
        &["volatile", "desperate", "persuasive"],
        &["the contract's terms", "holy ground", "the hollowing"],
        &["burns a shrine", "tempts a desperate debtor", "leaves a field blighted"],
    ));
    map.insert("pirate-captain".to_string(), pools(
        &["the Gullsbane", "of the Long Ninth", "Keelsplitter"],
        &["a fleet to rule the lanes", "one great prize", "spite for the harbor lords"],
        &["daring", "superstitious", "loyal to the crew alone"],
        &["bounties", "storms", "mutiny"],
        &["takes a merchantman in the narrows", "ransoms a captured mate", "burns a customs boat"],
    ));
    map.insert("sea-raider".to_string(), pools(
        &["of the Grey Sails", "Tidehammer", "the Shorewolf"],
        &["plunder before the freeze", "renown among the steadings", "new land for the kin"],
        &["hardy", "boastful", "sea-wise"],
        &["pride", "feuds among the crews", "deep water omens"],
        &["sacks a fishing village", "carries off the salt stores", "beaches for a lightning raid"],
    ));
    map.insert("kraken-cult".to_string(), pools(
        &["of the Ninefold Arm", "the Deep Chorus", "Brine-Blessed"],
        &["the rising of the sleeper", "tithes of salt and blood", "harbors emptied for the deep"],
        &["fanatic", "amphibious rumor", "patient as tides"],
        &["schism", "bright flame", "shallow water"],
        &["drags a night watchman to the quay", "festoons the harbor chain with weed sigils", "sinks a mooring buoy"],
    ));
    map.insert("ghost-ship".to_string(), pools(
        &["the Unharbored", "of the Last Fog", "Lanternless"],
        &["a crew to fill old berths", "the cargo owed a century gone", "rest refused"],
        &["silent", "cold-lit", "unmoored from weather"],
        &["dawn", "a debt repaid", "her true name spoken"],
        &["shadows a merchant through the night", "takes a sleeping deckhand", "is seen against the moon"],
    ));
    map.insert("sea-witch".to_string(), pools(
        &["of the Undertow", "Foamdaughter", "the Saltveiled"],
        &["bargains sealed in drowning", "a harbor beholden to her", "the wind bought and sold"],
        &["sly", "tide-bound", "collector of voices"],
        &["her reflection", "bargains kept exactly", "fresh water"],
        &["becalms a ship for ransom", "sells a fair wind at cruel price", "curses a captain's name"],
    ));
    map
}

fn weather_odds() -> BTreeMap<Season, Vec<WeatherOdds>> {
    fn odds(entries: &[(WeatherKind, u32)]) -> Vec<WeatherOdds> {
        entries
            .iter()
            .map(|&(kind, weight)| WeatherOdds { kind, weight })
            .collect()
    }

    use WeatherKind::*;
    BTreeMap::from([
        (Season::Spring, odds(&[(Clear, 4), (Overcast, 3), (Rain, 4), (Storm, 1), (Fog, 2)])),
        (Season::Summer, odds(&[(Clear, 6), (Overcast, 2), (Rain, 2), (Storm, 2), (Sweltering, 3)])),
        (Season::Autumn, odds(&[(Clear, 3), (Overcast, 4), (Rain, 4), (Storm, 2), (Fog, 3)])),
        (Season::Winter, odds(&[(Clear, 3), (Overcast, 4), (Rain, 1), (Storm, 1), (Snow, 4), (Fog, 2)])),
    ])
}

fn weather_effects() -> BTreeMap<WeatherKind, WeatherEffects> {
    fn fx(travel: f64, encounter: f64, low_vis: bool, mood: i32, magic: i32) -> WeatherEffects {
        WeatherEffects {
            travel_speed_mod: travel,
            encounter_chance_mod: encounter,
            low_visibility: low_vis,
            mood_mod: mood,
            magic_mod: magic,
        }
    }

    use WeatherKind::*;
    BTreeMap::from([
        (Clear, fx(1.0, 1.0, false, 1, 0)),
        (Overcast, fx(1.0, 1.0, false, 0, 0)),
        (Rain, fx(0.75, 0.8, false, -1, 0)),
        (Storm, fx(0.5, 0.6, true, -2, 1)),
        (Fog, fx(0.6, 1.3, true, 0, 1)),
        (Snow, fx(0.5, 0.7, false, -1, 0)),
        (Sweltering, fx(0.8, 0.9, false, -1, 0)),
    ])
}

fn ship_types() -> BTreeMap<String, ShipTypeConfig> {
    fn ship(crew: u32, cargo: u32, speed: u32, seaworthiness: f64, cost: i64, marines: u32) -> ShipTypeConfig {
        ShipTypeConfig {
            crew,
            cargo_capacity: cargo,
            speed_miles_per_day: speed,
            seaworthiness,
            cost,
            marines,
        }
    }

    BTreeMap::from([
        ("cog".to_string(), ship(12, 80, 72, 0.7, 3000, 0)),
        ("carrack".to_string(), ship(30, 200, 84, 0.85, 12000, 8)),
        ("galley".to_string(), ship(60, 60, 96, 0.55, 10000, 20)),
        ("sloop".to_string(), ship(8, 30, 108, 0.65, 1800, 0)),
        ("longship".to_string(), ship(24, 40, 90, 0.75, 4000, 16)),
    ])
}

fn holidays() -> Vec<Holiday> {
    fn day(month: u32, day: u32, name: &str) -> Holiday {
        Holiday {
            month,
            day,
            name: name.to_string(),
        }
    }
    vec![
        day(1, 1, "Feast of the Turning Year"),
        day(3, 21, "Seedtide"),
        day(6, 21, "The Long Sun"),
        day(8, 2, "Lammas Fair"),
        day(9, 22, "Harvest Home"),
        day(10, 31, "Night of Hollow Lanterns"),
        day(12, 21, "The Deep Vigil"),
    ]
}
