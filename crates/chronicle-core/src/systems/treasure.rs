//! Treasure Systems
//!
//! Hoard generation from the type tables, weight-bounded extraction trips,
//! the gold influx that follows a big haul into town, magic item
//! identification, and the rumors treasure leaves in its wake.

use chronicle_events::{LogCategory, LogEntry};
use tracing::debug;

use crate::components::treasure::{
    Coin, DiscoveredHoard, GeneratedTreasure, MagicCategory, MagicItem, Rarity, TreasureExtraction,
    TreasureInflux, TreasureRumor, COIN_WEIGHT, GEM_WEIGHT, JEWELRY_WEIGHT,
};
use crate::components::faction::PriceTrend;
use crate::components::world::Good;
use crate::content::ContentTables;
use crate::state::Sim;
use crate::systems::consequence::ConsequenceKind;

/// Gold value floor for a hoard to move a settlement's economy.
const INFLUX_THRESHOLD: i64 = 1000;

/// Days an influx record lives before pruning.
const INFLUX_LIFETIME_DAYS: i64 = 60;

/// Days a closed extraction lingers before pruning.
const EXTRACTION_RETENTION_DAYS: i64 = 7;

fn gem_values() -> &'static [i64] {
    &[5, 10, 25, 50, 100, 250, 500]
}

fn category_noun(category: MagicCategory) -> &'static str {
    match category {
        MagicCategory::Potion => "Draught",
        MagicCategory::Scroll => "Scroll",
        MagicCategory::Ring => "Ring",
        MagicCategory::Wand => "Wand",
        MagicCategory::Staff => "Staff",
        MagicCategory::Rod => "Rod",
        MagicCategory::Weapon => "Blade",
        MagicCategory::Armor => "Mail",
        MagicCategory::Misc => "Talisman",
        MagicCategory::Artifact => "Relic",
    }
}

fn roll_rarity(sim: &mut Sim) -> Rarity {
    match sim.state.rng.weighted(&[40, 30, 18, 9, 3]) {
        0 => Rarity::Common,
        1 => Rarity::Uncommon,
        2 => Rarity::Rare,
        3 => Rarity::VeryRare,
        _ => Rarity::Legendary,
    }
}

fn rarity_value(sim: &mut Sim, rarity: Rarity) -> i64 {
    let (base, spread) = match rarity {
        Rarity::Common => (50, 100),
        Rarity::Uncommon => (200, 300),
        Rarity::Rare => (800, 1200),
        Rarity::VeryRare => (3000, 4000),
        Rarity::Legendary => (10000, 15000),
    };
    base + sim.state.rng.int(spread) as i64
}

/// Weight of a magic item by id, for load math.
pub fn magic_weight(sim: &Sim, item_id: &str) -> f64 {
    sim.state
        .treasure
        .magic_items
        .get(item_id)
        .map(|i| i.category.weight())
        .unwrap_or(0.0)
}

/// Mints one magic item into circulation and returns its id.
fn mint_magic_item(sim: &mut Sim, content: &ContentTables, categories: &[MagicCategory]) -> String {
    let category = if categories.is_empty() {
        let all = MagicCategory::all();
        all[sim.state.rng.int(all.len() as u64) as usize]
    } else {
        categories[sim.state.rng.int(categories.len() as u64) as usize]
    };
    let rarity = roll_rarity(sim);
    let value = rarity_value(sim, rarity);
    let suffix = sim
        .state
        .rng
        .pick(&content.names.magic_suffixes)
        .cloned()
        .unwrap_or_else(|_| "No Name".to_string());
    let id = sim.next_id("itm");
    let item = MagicItem {
        id: id.clone(),
        name: format!("{} of {}", category_noun(category), suffix),
        category,
        rarity,
        value,
        identified: false,
        owner: None,
    };
    sim.state.treasure.magic_items.insert(item);
    id
}

/// Rolls a treasure of the given type. Returns `None` for unknown types and
/// for rolls that come up entirely empty.
pub fn generate_treasure(
    sim: &mut Sim,
    content: &ContentTables,
    type_key: &str,
) -> Option<GeneratedTreasure> {
    let config = match content.treasure_types.get(type_key) {
        Some(config) => config.clone(),
        None => {
            debug!(treasure_type = %type_key, "unknown treasure type, yielding nothing");
            return None;
        }
    };

    let mut coins = std::collections::BTreeMap::new();
    for (coin, spec) in &config.coins {
        if sim.state.rng.chance(spec.chance) {
            let count = spec.dice.roll(&mut sim.state.rng) as u32;
            if count > 0 {
                coins.insert(*coin, count);
            }
        }
    }

    let mut gems = Vec::new();
    if let Some(spec) = &config.gems {
        if sim.state.rng.chance(spec.chance) {
            let count = spec.dice.roll(&mut sim.state.rng);
            for _ in 0..count {
                let values = gem_values();
                gems.push(values[sim.state.rng.int(values.len() as u64) as usize]);
            }
        }
    }

    let mut jewelry = Vec::new();
    if let Some(spec) = &config.jewelry {
        if sim.state.rng.chance(spec.chance) {
            let count = spec.dice.roll(&mut sim.state.rng);
            for _ in 0..count {
                jewelry.push(sim.state.rng.die(6) as i64 * 50);
            }
        }
    }

    let mut magic_item_ids = Vec::new();
    if let Some(spec) = config.magic.clone() {
        if sim.state.rng.chance(spec.chance) {
            for _ in 0..spec.count {
                magic_item_ids.push(mint_magic_item(sim, content, &spec.categories));
            }
        }
    }

    let coin_value: f64 = coins
        .iter()
        .map(|(c, &n)| c.gold_rate() * f64::from(n))
        .sum();
    let total_gold_value =
        coin_value as i64 + gems.iter().sum::<i64>() + jewelry.iter().sum::<i64>();

    if coins.is_empty() && gems.is_empty() && jewelry.is_empty() && magic_item_ids.is_empty() {
        return None;
    }

    Some(GeneratedTreasure {
        coins,
        gems,
        jewelry,
        magic_item_ids,
        total_gold_value,
        is_hoard: config.is_lair,
        treasure_type: type_key.to_string(),
    })
}

/// Attract-type mapping for a discovered item's category.
fn attract_types(category: MagicCategory) -> &'static [&'static str] {
    match category {
        MagicCategory::Weapon | MagicCategory::Armor => &["antagonist", "bandit"],
        MagicCategory::Ring | MagicCategory::Wand | MagicCategory::Staff | MagicCategory::Rod
        | MagicCategory::Scroll => &["guild", "dragon"],
        MagicCategory::Artifact => &["dragon", "antagonist", "faction"],
        MagicCategory::Potion => &["bandit"],
        MagicCategory::Misc => &["guild", "rival-party"],
    }
}

fn rarity_rumor_chance(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common | Rarity::Uncommon => 0.0,
        Rarity::Rare => 0.3,
        Rarity::VeryRare => 0.5,
        Rarity::Legendary => 0.8,
    }
}

fn attract_priority(attract: &str) -> u8 {
    match attract {
        "dragon" | "antagonist" => 5,
        "bandit" | "monster" => 4,
        _ => 3,
    }
}

/// Word gets out about notable finds. Rare and better items seed treasure
/// rumors whose attract types schedule second-order consequences.
fn spawn_treasure_rumors(
    sim: &mut Sim,
    treasure_type: &str,
    item_ids: &[String],
    settlement_id: &str,
    logs: &mut Vec<LogEntry>,
) {
    for item_id in item_ids {
        let Some((name, rarity, category)) = sim
            .state
            .treasure
            .magic_items
            .get(item_id)
            .map(|i| (i.name.clone(), i.rarity, i.category))
        else {
            continue;
        };
        if rarity < Rarity::Rare {
            continue;
        }
        let attracts: Vec<String> = attract_types(category).iter().map(|s| s.to_string()).collect();
        let rumor_id = sim.next_id("trm");
        let place = sim.world.display_name(settlement_id);
        sim.state.treasure.rumors.insert(TreasureRumor {
            id: rumor_id,
            text: format!("talk of {} carried into {}", name, place),
            treasure_type: treasure_type.to_string(),
            item_id: Some(item_id.clone()),
            attracts: attracts.clone(),
            origin: settlement_id.to_string(),
            freshness: 10,
        });
        logs.push(
            sim.log(
                LogCategory::Rumor,
                format!("Word spreads of {} seen near {}", name, place),
            )
            .at(place),
        );

        let chance = rarity_rumor_chance(rarity);
        for attract in attracts {
            if !sim.state.rng.chance(chance) {
                continue;
            }
            let due = 48 + sim.state.rng.int(120);
            let priority = attract_priority(&attract);
            let kind = match attract.as_str() {
                "dragon" => ConsequenceKind::DragonSeeksTreasure {
                    settlement: settlement_id.to_string(),
                },
                "antagonist" => {
                    // Pin the hunter now; dispatch self-invalidates if they
                    // die first.
                    let living: Vec<String> = sim
                        .world
                        .antagonists
                        .iter()
                        .filter(|a| a.alive)
                        .map(|a| a.id.clone())
                        .collect();
                    if living.is_empty() {
                        ConsequenceKind::TreasureAttract {
                            attract_type: attract.clone(),
                            settlement: settlement_id.to_string(),
                            item_id: Some(item_id.clone()),
                        }
                    } else {
                        let idx = sim.state.rng.int(living.len() as u64) as usize;
                        ConsequenceKind::AntagonistSeeksItem {
                            antagonist: living[idx].clone(),
                            item_id: item_id.clone(),
                        }
                    }
                }
                "guild" => ConsequenceKind::GuildHeistTarget {
                    settlement: settlement_id.to_string(),
                    item_id: item_id.clone(),
                },
                "faction" => {
                    let factions = sim.world.factions.ids();
                    if factions.is_empty() {
                        ConsequenceKind::TreasureAttract {
                            attract_type: attract.clone(),
                            settlement: settlement_id.to_string(),
                            item_id: Some(item_id.clone()),
                        }
                    } else {
                        let idx = sim.state.rng.int(factions.len() as u64) as usize;
                        ConsequenceKind::FactionAcquiresItem {
                            faction: factions[idx].clone(),
                            item_id: item_id.clone(),
                        }
                    }
                }
                "bandit" | "monster" => ConsequenceKind::BanditAmbush {
                    settlement: settlement_id.to_string(),
                },
                "rival-party" => {
                    let parties = sim.world.parties.ids();
                    if parties.len() < 2 {
                        ConsequenceKind::TreasureAttract {
                            attract_type: attract.clone(),
                            settlement: settlement_id.to_string(),
                            item_id: Some(item_id.clone()),
                        }
                    } else {
                        let first = sim.state.rng.int(parties.len() as u64) as usize;
                        let mut second = sim.state.rng.int(parties.len() as u64) as usize;
                        if second == first {
                            second = (second + 1) % parties.len();
                        }
                        ConsequenceKind::RivalPartyConflict {
                            party: parties[first].clone(),
                            rival: parties[second].clone(),
                        }
                    }
                }
                _ => ConsequenceKind::TreasureAttract {
                    attract_type: attract.clone(),
                    settlement: settlement_id.to_string(),
                    item_id: Some(item_id.clone()),
                },
            };
            sim.state
                .consequences
                .enqueue(sim.meta.turn_index, due, priority, kind);
        }
    }
}

/// Full discovery flow: claim outright when the party can carry it, or
/// open a multi-trip extraction with gold-per-weight load priority.
pub fn discover_treasure(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    type_key: &str,
    dungeon_id: Option<&str>,
    logs: &mut Vec<LogEntry>,
) {
    let Some(generated) = generate_treasure(sim, content, type_key) else {
        return;
    };
    let Some((party_name, capacity, party_coord)) = sim
        .world
        .parties
        .get(party_id)
        .map(|p| (p.name.clone(), p.carry_capacity(), p.location))
    else {
        return;
    };

    let weight = {
        let treasure = &generated;
        let state = &sim.state.treasure;
        treasure.total_weight(|id| {
            state
                .magic_items
                .get(id)
                .map(|i| i.category.weight())
                .unwrap_or(0.0)
        })
    };

    let destination = match sim.world.nearest_settlement(party_coord) {
        Some(s) => s.id.clone(),
        None => return,
    };

    let hoard_id = sim.next_id("hrd");
    let discovered_at = sim.meta.world_time;
    let site = dungeon_id.map(|d| d.to_string()).unwrap_or_else(|| destination.clone());
    sim.state.treasure.hoards.insert(DiscoveredHoard {
        id: hoard_id.clone(),
        location: site.clone(),
        discovered_by: party_id.to_string(),
        discovered_at,
        total_value: generated.total_gold_value,
        magic_item_ids: generated.magic_item_ids.clone(),
        liquidated: false,
        percent_spent: 0,
    });

    if weight <= capacity {
        // One trip: claim it all on the spot.
        for item_id in &generated.magic_item_ids {
            if let Some(item) = sim.state.treasure.magic_items.get_mut(item_id) {
                item.owner = Some(party_id.to_string());
            }
        }
        sim.party_state_mut(party_id).resources += generated.total_gold_value;
        if let Some(hoard) = sim.state.treasure.hoards.get_mut(&hoard_id) {
            hoard.liquidated = true;
        }
        if generated.is_hoard && generated.total_gold_value >= INFLUX_THRESHOLD {
            let due = 72 + sim.state.rng.int(168);
            sim.state.consequences.enqueue(
                sim.meta.turn_index,
                due,
                3,
                ConsequenceKind::TreasureInflux {
                    settlement: destination.clone(),
                    amount: generated.total_gold_value,
                },
            );
        }
        logs.push(
            sim.log(
                LogCategory::Treasure,
                format!(
                    "{} claim treasure worth {} gold",
                    party_name, generated.total_gold_value
                ),
            )
            .with_actor(party_name.clone()),
        );
    } else {
        let rooms = dungeon_id
            .and_then(|d| sim.world.dungeons.get(d))
            .map(|d| d.rooms_remaining.max(1))
            .unwrap_or(1);
        let terrain_mod = dungeon_id
            .and_then(|d| sim.world.dungeons.get(d))
            .map(|d| sim.world.terrain_at(d.coord).extraction_mod())
            .unwrap_or(1.0);
        let trip_hours = (((rooms as f64 / 4.0).ceil().max(1.0)) * 2.0 * terrain_mod).ceil() as u32;

        let extraction_id = sim.next_id("ext");
        let now = sim.meta.world_time;
        sim.state.treasure.extractions.insert(TreasureExtraction {
            id: extraction_id,
            hoard_id: hoard_id.clone(),
            party_id: party_id.to_string(),
            dungeon_id: site,
            destination: destination.clone(),
            remaining_coins: generated.coins.clone(),
            remaining_gems: generated.gems.clone(),
            remaining_jewelry: generated.jewelry.clone(),
            remaining_magic: generated.magic_item_ids.clone(),
            total_weight: weight,
            extracted_weight: 0.0,
            trips_completed: 0,
            current_load: 0.0,
            trip_hours: trip_hours.max(1),
            next_trip_completes: now.plus_hours(i64::from(trip_hours.max(1))),
            abandoned: false,
            completed: false,
            closed_at: None,
        });
        logs.push(
            sim.log(
                LogCategory::Treasure,
                format!(
                    "{} find a hoard too heavy to carry and begin hauling it out",
                    party_name
                ),
            )
            .with_details(format!(
                "Roughly {} pounds of coin and plate against {} pounds of packs.",
                weight.round(),
                capacity
            ))
            .with_actor(party_name.clone()),
        );
    }

    let item_ids = generated.magic_item_ids.clone();
    spawn_treasure_rumors(sim, type_key, &item_ids, &destination, logs);
}

/// One planned trip load, taken from an extraction's remainings in
/// gold-per-weight order: magic, then platinum, gems, gold, jewelry,
/// electrum, silver, copper.
struct TripLoad {
    coins: std::collections::BTreeMap<Coin, u32>,
    gems: usize,
    jewelry: usize,
    magic: Vec<String>,
    weight: f64,
    value: i64,
}

fn plan_load(sim: &Sim, extraction: &TreasureExtraction, capacity: f64) -> TripLoad {
    let mut load = TripLoad {
        coins: std::collections::BTreeMap::new(),
        gems: 0,
        jewelry: 0,
        magic: Vec::new(),
        weight: 0.0,
        value: 0,
    };
    let mut room = capacity;

    for item_id in &extraction.remaining_magic {
        let w = magic_weight(sim, item_id);
        if w <= room {
            room -= w;
            load.weight += w;
            load.magic.push(item_id.clone());
        }
    }

    // Platinum outranks gems per pound, but gems outrank gold.
    let mut take_coins = |coin: Coin, room: &mut f64, load: &mut TripLoad| {
        let available = extraction.remaining_coins.get(&coin).copied().unwrap_or(0);
        if available == 0 {
            return;
        }
        let fit = (*room / COIN_WEIGHT).floor() as u32;
        let taken = available.min(fit);
        if taken > 0 {
            *room -= f64::from(taken) * COIN_WEIGHT;
            load.weight += f64::from(taken) * COIN_WEIGHT;
            load.value += (f64::from(taken) * coin.gold_rate()) as i64;
            load.coins.insert(coin, taken);
        }
    };

    take_coins(Coin::Pp, &mut room, &mut load);

    let gem_fit = (room / GEM_WEIGHT).floor() as usize;
    load.gems = extraction.remaining_gems.len().min(gem_fit);
    room -= load.gems as f64 * GEM_WEIGHT;
    load.weight += load.gems as f64 * GEM_WEIGHT;
    load.value += extraction.remaining_gems.iter().take(load.gems).sum::<i64>();

    take_coins(Coin::Gp, &mut room, &mut load);

    let jewelry_fit = (room / JEWELRY_WEIGHT).floor() as usize;
    load.jewelry = extraction.remaining_jewelry.len().min(jewelry_fit);
    room -= load.jewelry as f64 * JEWELRY_WEIGHT;
    load.weight += load.jewelry as f64 * JEWELRY_WEIGHT;
    load.value += extraction
        .remaining_jewelry
        .iter()
        .take(load.jewelry)
        .sum::<i64>();

    take_coins(Coin::Ep, &mut room, &mut load);
    take_coins(Coin::Sp, &mut room, &mut load);
    take_coins(Coin::Cp, &mut room, &mut load);

    load
}

/// Hourly pass over active extractions: complete due trips, roll hazards,
/// commit loads, finish or abandon.
pub fn extraction_tick(sim: &mut Sim, _content: &ContentTables, logs: &mut Vec<LogEntry>) {
    let now = sim.meta.world_time;
    let extraction_ids: Vec<String> = sim
        .state
        .treasure
        .extractions
        .iter()
        .filter(|x| !x.completed && !x.abandoned && x.next_trip_completes <= now)
        .map(|x| x.id.clone())
        .collect();

    for extraction_id in extraction_ids {
        let Some((party_id, capacity, party_name)) = sim
            .state
            .treasure
            .extractions
            .get(&extraction_id)
            .map(|x| x.party_id.clone())
            .and_then(|pid| {
                sim.world
                    .parties
                    .get(&pid)
                    .map(|p| (pid.clone(), p.carry_capacity(), p.name.clone()))
            })
        else {
            // The hauling party is gone; the hoard sits where it lies.
            if let Some(x) = sim.state.treasure.extractions.get_mut(&extraction_id) {
                x.abandoned = true;
                x.closed_at = Some(now);
            }
            continue;
        };

        let load = {
            let Some(extraction) = sim.state.treasure.extractions.get(&extraction_id) else {
                continue;
            };
            plan_load(sim, extraction, capacity)
        };

        // A trip can go wrong in the dark.
        let mut delivered_value = load.value;
        let hazard = sim.state.rng.chance(0.1);
        if hazard {
            let lost_fraction = 0.1 + 0.3 * sim.state.rng.next_f64();
            delivered_value = (load.value as f64 * (1.0 - lost_fraction)) as i64;
            if sim.state.rng.chance(0.4) {
                if let Some(p) = sim.world.parties.get_mut(&party_id) {
                    p.wounded = true;
                }
            }
            logs.push(
                sim.log(
                    LogCategory::Treasure,
                    format!("{} lose part of a load hauling treasure out", party_name),
                )
                .with_actor(party_name.clone()),
            );
        }

        // Commit: goods leave the site whether or not they reach town.
        let (trips, drained, destination, hoard_id, trip_hours) = {
            let Some(x) = sim.state.treasure.extractions.get_mut(&extraction_id) else {
                continue;
            };
            for (coin, taken) in &load.coins {
                if let Some(n) = x.remaining_coins.get_mut(coin) {
                    *n = n.saturating_sub(*taken);
                }
            }
            x.remaining_coins.retain(|_, n| *n > 0);
            x.remaining_gems.drain(0..load.gems.min(x.remaining_gems.len()));
            x.remaining_jewelry
                .drain(0..load.jewelry.min(x.remaining_jewelry.len()));
            x.remaining_magic.retain(|m| !load.magic.contains(m));
            x.extracted_weight += load.weight;
            x.current_load = 0.0;
            x.trips_completed += 1;
            (
                x.trips_completed,
                x.is_drained(),
                x.destination.clone(),
                x.hoard_id.clone(),
                x.trip_hours,
            )
        };

        for item_id in &load.magic {
            if let Some(item) = sim.state.treasure.magic_items.get_mut(item_id) {
                item.owner = Some(party_id.clone());
            }
        }
        sim.party_state_mut(&party_id).resources += delivered_value;

        if trips == 1 || trips % 3 == 0 {
            logs.push(
                sim.log(
                    LogCategory::Treasure,
                    format!("{} haul another load out, {} trips so far", party_name, trips),
                )
                .with_actor(party_name.clone()),
            );
        }

        if drained {
            let total_value = {
                let Some(x) = sim.state.treasure.extractions.get_mut(&extraction_id) else {
                    continue;
                };
                x.completed = true;
                x.closed_at = Some(now);
                sim.state
                    .treasure
                    .hoards
                    .get_mut(&hoard_id)
                    .map(|h| {
                        h.liquidated = true;
                        h.total_value
                    })
                    .unwrap_or(0)
            };
            logs.push(
                sim.log(
                    LogCategory::Treasure,
                    format!("{} bring the last of the hoard into {}", party_name, sim.world.display_name(&destination)),
                )
                .with_actor(party_name.clone()),
            );
            if total_value >= INFLUX_THRESHOLD {
                let due = 72 + sim.state.rng.int(168);
                sim.state.consequences.enqueue(
                    sim.meta.turn_index,
                    due,
                    3,
                    ConsequenceKind::TreasureInflux {
                        settlement: destination,
                        amount: total_value,
                    },
                );
            }
            continue;
        }

        // Low coin left and nothing shiny: sometimes it just is not worth
        // another trip.
        let abandoned = {
            let Some(x) = sim.state.treasure.extractions.get(&extraction_id) else {
                continue;
            };
            x.only_dregs() && x.dreg_value() < 50.0 && sim.state.rng.chance(0.5)
        };
        if abandoned {
            if let Some(x) = sim.state.treasure.extractions.get_mut(&extraction_id) {
                x.abandoned = true;
                x.closed_at = Some(now);
            }
            logs.push(
                sim.log(
                    LogCategory::Treasure,
                    format!("{} leave the last coppers to the dark", party_name),
                )
                .with_actor(party_name),
            );
        } else if let Some(x) = sim.state.treasure.extractions.get_mut(&extraction_id) {
            x.next_trip_completes = now.plus_hours(i64::from(trip_hours));
        }
    }
}

/// Fires when a scheduled influx consequence lands: the gold actually
/// reaches the settlement's economy.
pub fn apply_influx(sim: &mut Sim, settlement_id: &str, amount: i64, logs: &mut Vec<LogEntry>) {
    if !sim.world.settlements.contains(settlement_id) || amount <= 0 {
        return;
    }
    let arrived_day = sim.meta.world_time.days_since_epoch();
    sim.state.treasure.influxes.push(TreasureInflux {
        settlement_id: settlement_id.to_string(),
        amount,
        arrived_day,
    });
    let place = sim.world.display_name(settlement_id);
    logs.push(
        sim.log(
            LogCategory::Treasure,
            format!("Treasure gold floods the markets of {}", place),
        )
        .at(place),
    );
}

/// Daily pass: inflation from recent influxes, and pruning of stale ones.
pub fn influx_daily_tick(sim: &mut Sim, logs: &mut Vec<LogEntry>) {
    let today = sim.meta.world_time.days_since_epoch();

    let snapshots: Vec<(String, i64, i64)> = sim
        .state
        .treasure
        .influxes
        .iter()
        .map(|i| (i.settlement_id.clone(), i.amount, today - i.arrived_day))
        .collect();

    for (settlement_id, amount, age) in snapshots {
        if !(1..=7).contains(&age) {
            continue;
        }
        let population = sim
            .world
            .settlements
            .get(&settlement_id)
            .map(|s| s.population.max(1))
            .unwrap_or(1);
        let inflation = amount as f64 / (f64::from(population) * 10.0);
        if inflation >= 0.5 {
            let flipped = {
                let civic = sim.settlement_state_mut(&settlement_id);
                let mut flipped = false;
                for &good in Good::all() {
                    if civic.price_trends.get(&good) != Some(&PriceTrend::High) {
                        civic.price_trends.insert(good, PriceTrend::High);
                        flipped = true;
                    }
                }
                flipped
            };
            if flipped {
                let place = sim.world.display_name(&settlement_id);
                logs.push(
                    sim.log(
                        LogCategory::Settlement,
                        format!("Prices climb in {} as treasure gold chases goods", place),
                    )
                    .at(place),
                );
            }
        }
    }

    sim.state
        .treasure
        .influxes
        .retain(|i| i.amount > 0 && today - i.arrived_day <= INFLUX_LIFETIME_DAYS);

    // Claimed gold trickles into the economy until the hoard is spent.
    for hoard in sim.state.treasure.hoards.iter_mut() {
        if hoard.liquidated && hoard.percent_spent < 100 {
            hoard.percent_spent = (hoard.percent_spent + 2).min(100);
        }
    }
}

/// Daily pass: unidentified items in circulation get looked at.
pub fn identification_daily_tick(sim: &mut Sim, logs: &mut Vec<LogEntry>) {
    let candidates: Vec<String> = sim
        .state
        .treasure
        .magic_items
        .iter()
        .filter(|i| !i.identified && i.owner.is_some())
        .map(|i| i.id.clone())
        .collect();
    for item_id in candidates {
        if !sim.state.rng.chance(0.15) {
            continue;
        }
        let Some((name, rarity, owner)) = sim
            .state
            .treasure
            .magic_items
            .get_mut(&item_id)
            .map(|i| {
                i.identified = true;
                (i.name.clone(), i.rarity, i.owner.clone())
            })
        else {
            continue;
        };
        if rarity > Rarity::Common {
            let holder = owner
                .as_deref()
                .map(|o| sim.world.display_name(o))
                .unwrap_or_else(|| "unknown hands".to_string());
            logs.push(sim.log(
                LogCategory::Treasure,
                format!("{} is identified in the possession of {}", name, holder),
            ));
        }
    }
}

/// Prunes closed extractions after their retention window.
pub fn prune_closed(sim: &mut Sim) {
    let now = sim.meta.world_time;
    sim.state.treasure.extractions.retain(|x| match x.closed_at {
        Some(closed) => now.days_since(closed) <= EXTRACTION_RETENTION_DAYS,
        None => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentTables;
    use crate::setup;
    use crate::state::WorldArchetype;

    fn world() -> (Sim, ContentTables) {
        let content = ContentTables::default();
        let sim = setup::genesis("treasure-test", WorldArchetype::Standard, &content);
        (sim, content)
    }

    #[test]
    fn test_generate_nil_is_none() {
        let (mut sim, content) = world();
        assert!(generate_treasure(&mut sim, &content, "Nil").is_none());
        assert!(generate_treasure(&mut sim, &content, "ZZ").is_none());
    }

    #[test]
    fn test_generate_h_is_rich() {
        let (mut sim, content) = world();
        // Type H is the dragon hoard; across a few rolls it must produce
        // real value.
        let mut best = 0;
        for _ in 0..10 {
            if let Some(t) = generate_treasure(&mut sim, &content, "H") {
                best = best.max(t.total_gold_value);
                assert!(t.is_hoard);
            }
        }
        assert!(best > 500, "dragon hoards came up empty, best {}", best);
    }

    #[test]
    fn test_immediate_claim_when_light() {
        let (mut sim, content) = world();
        let party_id = sim.world.parties.ids()[0].clone();
        let mut logs = Vec::new();
        // Type M is pocket gold, always carriable.
        discover_treasure(&mut sim, &content, &party_id, "M", None, &mut logs);
        let ps = sim.state.party_states.get(&party_id);
        if let Some(ps) = ps {
            assert!(ps.resources >= 0);
        }
        assert!(sim.state.treasure.extractions.is_empty());
    }

    #[test]
    fn test_extraction_conserves_weight() {
        let (mut sim, content) = world();
        let party_id = sim.world.parties.ids()[0].clone();
        let dungeon_id = sim.world.dungeons.ids()[0].clone();
        let mut logs = Vec::new();

        // Roll until a heavy hoard opens an extraction.
        for _ in 0..20 {
            discover_treasure(&mut sim, &content, &party_id, "H", Some(&dungeon_id), &mut logs);
            if !sim.state.treasure.extractions.is_empty() {
                break;
            }
        }
        let Some(extraction_id) = sim.state.treasure.extractions.ids().first().cloned() else {
            // Light rolls are possible; nothing further to assert.
            return;
        };

        // Run trips to completion.
        for _ in 0..500 {
            let done = sim
                .state
                .treasure
                .extractions
                .get(&extraction_id)
                .map(|x| x.completed || x.abandoned)
                .unwrap_or(true);
            if done {
                break;
            }
            sim.meta.world_time = sim.meta.world_time.plus_hours(1);
            extraction_tick(&mut sim, &content, &mut logs);
        }

        if let Some(x) = sim.state.treasure.extractions.get(&extraction_id) {
            let remaining = x.remaining_weight(|id| magic_weight(&sim, id));
            assert!(
                (x.extracted_weight + remaining - x.total_weight).abs() <= 1.0,
                "weight accounting drifted: extracted {} + remaining {} != total {}",
                x.extracted_weight,
                remaining,
                x.total_weight
            );
            assert!(x.trips_completed >= 1);
        }
    }

    #[test]
    fn test_influx_flips_prices() {
        let (mut sim, content) = world();
        let _ = &content;
        let settlement_id = sim.world.settlements.ids()[0].clone();
        let population = sim.world.settlements.get(&settlement_id).unwrap().population;
        let amount = i64::from(population) * 10; // inflation factor 1.0
        let mut logs = Vec::new();

        apply_influx(&mut sim, &settlement_id, amount, &mut logs);
        // The day after arrival, prices react.
        sim.meta.world_time = sim.meta.world_time.plus_hours(24);
        influx_daily_tick(&mut sim, &mut logs);

        let civic = sim.state.settlement_states.get(&settlement_id).unwrap();
        assert!(civic.price_trends.values().all(|&t| t == PriceTrend::High));
        assert!(logs.iter().any(|l| l.summary.contains("Prices climb")));
    }

    #[test]
    fn test_influx_pruned_after_lifetime() {
        let (mut sim, _content) = world();
        let settlement_id = sim.world.settlements.ids()[0].clone();
        let mut logs = Vec::new();
        apply_influx(&mut sim, &settlement_id, 5000, &mut logs);
        sim.meta.world_time = sim.meta.world_time.plus_days(61);
        influx_daily_tick(&mut sim, &mut logs);
        assert!(sim.state.treasure.influxes.is_empty());
    }

    #[test]
    fn test_identification_only_owned_items() {
        let (mut sim, content) = world();
        let id_owned = mint_magic_item(&mut sim, &content, &[MagicCategory::Ring]);
        let id_loose = mint_magic_item(&mut sim, &content, &[MagicCategory::Ring]);
        if let Some(item) = sim.state.treasure.magic_items.get_mut(&id_owned) {
            item.owner = Some("pty-x".to_string());
        }
        let mut logs = Vec::new();
        for _ in 0..200 {
            identification_daily_tick(&mut sim, &mut logs);
        }
        assert!(sim.state.treasure.magic_items.get(&id_owned).unwrap().identified);
        assert!(!sim.state.treasure.magic_items.get(&id_loose).unwrap().identified);
    }
}
