use std::{fmt, time::Duration};

use iso_arena_core::{ActorView, Allegiance, Health};
use iso_arena_session::Session;
use iso_arena_world::query;
use sha2::{Digest, Sha256};

/// Outcome of a headless run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunSummary {
    /// Ticks the simulation advanced.
    pub ticks: u64,
    /// Simulated time, game speed included.
    pub simulated: Duration,
    /// Hostiles defeated.
    pub kills: u32,
    /// Player level reached.
    pub level: u32,
    /// Player hit points at the end, if the player still exists.
    pub player_health: Option<Health>,
    /// Whether the run ended with the player defeated.
    pub game_over: bool,
    /// Frames the presenter showed.
    pub frames_presented: u64,
    /// SHA-256 of the final actor table, hex encoded.
    pub digest: String,
}

impl RunSummary {
    /// Summarizes the current state of `session`.
    #[must_use]
    pub(crate) fn of(session: &Session) -> Self {
        let world = session.world();
        let actors = query::actor_view(world);
        Self {
            ticks: query::tick_index(world),
            simulated: query::clock(world),
            kills: session.kills(),
            level: query::experience(world).level,
            player_health: actors.player().and_then(|player| player.health),
            game_over: session.is_game_over(),
            frames_presented: 0,
            digest: actor_digest(&actors),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:     {}", self.ticks)?;
        writeln!(f, "simulated: {:.2}s", self.simulated.as_secs_f64())?;
        writeln!(f, "kills:     {}", self.kills)?;
        writeln!(f, "level:     {}", self.level)?;
        match self.player_health {
            Some(health) => writeln!(f, "health:    {}/{}", health.current(), health.max())?,
            None => writeln!(f, "health:    -")?,
        }
        writeln!(f, "game over: {}", self.game_over)?;
        writeln!(f, "frames:    {}", self.frames_presented)?;
        write!(f, "digest:    {}", self.digest)
    }
}

/// Hashes identity, side, position and health of every actor in id order.
pub(crate) fn actor_digest(actors: &ActorView) -> String {
    let mut hasher = Sha256::new();
    for actor in actors.iter() {
        hasher.update(actor.id.get().to_le_bytes());
        hasher.update([allegiance_tag(actor.allegiance)]);
        hasher.update(actor.position.x.to_bits().to_le_bytes());
        hasher.update(actor.position.y.to_bits().to_le_bytes());
        if let Some(health) = actor.health {
            hasher.update(health.current().to_le_bytes());
            hasher.update(health.max().to_le_bytes());
        }
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn allegiance_tag(allegiance: Allegiance) -> u8 {
    match allegiance {
        Allegiance::Player => 0,
        Allegiance::Hostile => 1,
        Allegiance::Neutral => 2,
    }
}
