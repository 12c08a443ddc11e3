#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Health regeneration, defeated-hostile cleanup and level-up offers.
//!
//! [`Progression::handle`] runs once per tick after damage resolution. It
//! heals regenerating actors, removes defeated hostiles and awards experience
//! for them. Level-ups reported by the world are turned into
//! [`UpgradeOffer`]s through [`Progression::record_level_ups`].

use std::collections::{BTreeMap, VecDeque};

use iso_arena_core::{
    ActorView, Allegiance, Command, EntityId, Event, Modifiers, Upgrade, EXPERIENCE_PER_KILL,
};
use rand::{seq::index, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of upgrades presented per level.
pub const OFFER_SIZE: usize = 3;

/// Upgrades the player may pick from after reaching a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UpgradeOffer {
    /// Level that produced the offer.
    pub level: u32,
    /// Distinct upgrades on offer.
    pub choices: [Upgrade; OFFER_SIZE],
}

impl UpgradeOffer {
    /// Upgrade at `index`, if the index is in range.
    #[must_use]
    pub fn choice(&self, index: usize) -> Option<Upgrade> {
        self.choices.get(index).copied()
    }
}

/// Pure system for regeneration, cleanup and upgrade offers.
#[derive(Debug)]
pub struct Progression {
    accumulators: BTreeMap<EntityId, f32>,
    offers: VecDeque<UpgradeOffer>,
    rng: ChaCha8Rng,
}

impl Progression {
    /// Creates a progression system whose offers are drawn from `rng_seed`.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            accumulators: BTreeMap::new(),
            offers: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Emits healing, despawn and experience commands for the current tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        actors: &ActorView,
        modifiers: &Modifiers,
        out: &mut Vec<Command>,
    ) {
        let dt: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();
        if dt <= 0.0 {
            return;
        }

        self.accumulators
            .retain(|entity, _| actors.get(*entity).is_some());
        self.regenerate(dt, actors, out);

        let reward = (EXPERIENCE_PER_KILL as f32 * modifiers.experience_gain).floor() as u32;
        for actor in actors.iter() {
            let defeated = actor
                .health
                .is_some_and(|health| health.is_depleted());
            if actor.allegiance != Allegiance::Hostile || !defeated {
                continue;
            }
            out.push(Command::Despawn { entity: actor.id });
            if reward > 0 {
                out.push(Command::GrantExperience { amount: reward });
            }
        }
    }

    fn regenerate(&mut self, dt: f32, actors: &ActorView, out: &mut Vec<Command>) {
        for actor in actors.iter() {
            let (Some(regeneration), Some(health)) = (actor.regeneration, actor.health) else {
                continue;
            };
            if regeneration.per_second <= 0.0 || health.is_depleted() {
                continue;
            }

            let accumulator = self.accumulators.entry(actor.id).or_insert(0.0);
            *accumulator += regeneration.per_second * dt;
            let mut missing = health.max() - health.current();
            let mut amount = 0;
            while *accumulator >= 1.0 && missing > 0 {
                *accumulator -= 1.0;
                missing -= 1;
                amount += 1;
            }
            if amount > 0 {
                out.push(Command::HealActor {
                    target: actor.id,
                    amount,
                });
            }
        }
    }

    /// Queues one offer for every level reached in `events`.
    pub fn record_level_ups(&mut self, events: &[Event]) {
        for event in events {
            if let Event::LevelReached { level } = event {
                let choices = self.draw_choices();
                self.offers.push_back(UpgradeOffer {
                    level: *level,
                    choices,
                });
            }
        }
    }

    /// Oldest offer still awaiting a choice.
    #[must_use]
    pub fn pending_offer(&self) -> Option<&UpgradeOffer> {
        self.offers.front()
    }

    /// Resolves the oldest offer with the upgrade at `index`.
    ///
    /// Returns `None` and keeps the offer when nothing is pending or the index
    /// is out of range.
    pub fn choose(&mut self, index: usize) -> Option<Upgrade> {
        let upgrade = self.offers.front()?.choice(index)?;
        let _ = self.offers.pop_front();
        Some(upgrade)
    }

    fn draw_choices(&mut self) -> [Upgrade; OFFER_SIZE] {
        let picks = index::sample(&mut self.rng, Upgrade::ALL.len(), OFFER_SIZE);
        let mut choices = [Upgrade::ALL[0]; OFFER_SIZE];
        for (choice, pick) in choices.iter_mut().zip(picks.iter()) {
            *choice = Upgrade::ALL[pick];
        }
        choices
    }
}

/// Chooses among the upgrades of a pending offer when nobody is at the keyboard.
pub trait UpgradePolicy {
    /// Index of the upgrade to take from `offer`.
    fn pick(&mut self, offer: &UpgradeOffer) -> usize;
}

/// Policy that always takes the first upgrade on offer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoice;

impl UpgradePolicy for FirstChoice {
    fn pick(&mut self, _offer: &UpgradeOffer) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_arena_core::{ActorSnapshot, Health, Regeneration};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn tick(seconds: f32) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_secs_f32(seconds),
        }]
    }

    fn regenerating(current: u32, per_second: f32) -> ActorSnapshot {
        let mut snapshot = ActorSnapshot::bare(
            EntityId::new(1),
            Default::default(),
            Allegiance::Player,
        );
        snapshot.health = Some(Health::with_current(current, 100));
        snapshot.regeneration = Some(Regeneration { per_second });
        snapshot
    }

    #[test]
    fn regeneration_accumulates_fractional_healing() {
        let mut progression = Progression::new(1);
        let view = ActorView::from_snapshots(vec![regenerating(50, 2.0)]);
        let mut out = Vec::new();

        progression.handle(&tick(0.25), &view, &Modifiers::default(), &mut out);
        assert!(out.is_empty());

        progression.handle(&tick(0.25), &view, &Modifiers::default(), &mut out);
        assert_eq!(
            out,
            vec![Command::HealActor {
                target: EntityId::new(1),
                amount: 1,
            }]
        );
    }

    #[test]
    fn regeneration_never_overheals() {
        let mut progression = Progression::new(1);
        let view = ActorView::from_snapshots(vec![regenerating(99, 10.0)]);
        let mut out = Vec::new();

        progression.handle(&tick(1.0), &view, &Modifiers::default(), &mut out);

        assert_eq!(
            out,
            vec![Command::HealActor {
                target: EntityId::new(1),
                amount: 1,
            }]
        );
    }

    #[test]
    fn offers_hold_three_distinct_upgrades() {
        let mut progression = Progression::new(9);

        progression.record_level_ups(&[
            Event::LevelReached { level: 1 },
            Event::LevelReached { level: 2 },
        ]);

        let offer = *progression.pending_offer().expect("expected an offer");
        assert_eq!(offer.level, 1);
        let distinct: BTreeSet<Upgrade> = offer.choices.iter().copied().collect();
        assert_eq!(distinct.len(), OFFER_SIZE);

        assert_eq!(progression.choose(OFFER_SIZE), None);
        assert_eq!(progression.choose(2), Some(offer.choices[2]));
        assert_eq!(progression.pending_offer().map(|offer| offer.level), Some(2));
    }

    #[test]
    fn first_choice_policy_takes_index_zero() {
        let offer = UpgradeOffer {
            level: 1,
            choices: [Upgrade::Damage, Upgrade::Radius, Upgrade::Regen],
        };

        assert_eq!(FirstChoice.pick(&offer), 0);
    }
}
