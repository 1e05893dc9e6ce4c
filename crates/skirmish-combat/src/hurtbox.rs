//! The per-entity damage receiver and its Alive -> Dead state machine

use skirmish_core::Color;
use skirmish_scene::Entity;
use tracing::{debug, info};

use crate::damage::DamageInfo;
use crate::events::{CombatEvent, FeedbackCue};
use crate::model::compute_final_damage;
use crate::receiver::{CombatContext, DamageOutcome, Damageable};
use crate::scheduler::ScheduledAction;
use crate::stats::EntityStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifeState {
    #[default]
    Alive,
    /// Terminal
    Dead,
}

/// Short colour pulse shown when a receiver is hurt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashPulse {
    base: Color,
    current: Color,
    in_flight: bool,
}

impl FlashPulse {
    pub fn new(base: Color) -> Self {
        Self {
            base,
            current: base,
            in_flight: false,
        }
    }

    /// Switch to `tint`. Returns false if a pulse is already showing.
    pub fn start(&mut self, tint: Color) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.current = tint;
        true
    }

    pub fn end(&mut self) {
        self.in_flight = false;
        self.current = self.base;
    }

    pub fn color(&self) -> Color {
        self.current
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

impl Default for FlashPulse {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

/// Health-bearing receiver attached to a scene entity.
///
/// Created detached; the world binds it to its host entity when attached.
#[derive(Debug, Clone)]
pub struct Hurtbox {
    host: Option<Entity>,
    owner: Option<Entity>,
    stats: EntityStats,
    state: LifeState,
    flash: FlashPulse,
    inert: bool,
}

impl Hurtbox {
    pub fn new(stats: EntityStats) -> Self {
        Self {
            host: None,
            owner: None,
            stats,
            state: LifeState::Alive,
            flash: FlashPulse::default(),
            inert: false,
        }
    }

    /// Entity destroyed when this receiver dies, instead of the host
    pub fn with_owner(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Resting colour restored after each flash
    pub fn with_base_color(mut self, color: Color) -> Self {
        self.flash = FlashPulse::new(color);
        self
    }

    pub(crate) fn bind(&mut self, host: Entity) {
        self.host = Some(host);
    }

    pub(crate) fn set_inert(&mut self, inert: bool) {
        self.inert = inert;
    }

    pub fn host(&self) -> Option<Entity> {
        self.host
    }

    /// Owner entity; the host unless overridden
    pub fn owner(&self) -> Option<Entity> {
        self.owner.or(self.host)
    }

    pub fn stats(&self) -> &EntityStats {
        &self.stats
    }

    pub fn state(&self) -> LifeState {
        self.state
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Colour presentation should draw this receiver with right now
    pub fn tint(&self) -> Color {
        self.flash.color()
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_in_flight()
    }

    pub(crate) fn end_flash(&mut self) {
        self.flash.end();
    }

    fn die(&mut self, host: Entity, ctx: &mut CombatContext<'_>) {
        self.state = LifeState::Dead;
        let owner = self.owner.unwrap_or(host);
        info!(entity = %host, %owner, "receiver died");

        ctx.bus.publish(&CombatEvent::EntityDied { target: host });
        ctx.cues.push(FeedbackCue::Death {
            target: host,
            owner,
        });
        ctx.scheduler.schedule(
            owner,
            ctx.now + f64::from(ctx.config.death_destroy_delay),
            ScheduledAction::DestroyEntity(owner),
        );
    }
}

impl Damageable for Hurtbox {
    fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    fn current_health(&self) -> f32 {
        self.stats.health()
    }

    fn max_health(&self) -> f32 {
        self.stats.max_health()
    }

    fn take_damage(&mut self, info: &DamageInfo, ctx: &mut CombatContext<'_>) -> DamageOutcome {
        let Some(host) = self.host else {
            return DamageOutcome::Ignored;
        };
        if self.state == LifeState::Dead || self.inert {
            debug!(entity = %host, "hit on dead or inert receiver ignored");
            return DamageOutcome::Ignored;
        }

        let amount = compute_final_damage(info, &self.stats);
        self.stats.take_damage(amount);
        let health = self.stats.health();

        ctx.bus.publish(&CombatEvent::DamageReceived {
            info: info.clone(),
            target: host,
            amount,
        });
        ctx.bus.publish(&CombatEvent::HealthChanged {
            target: host,
            current: health,
            max: self.stats.max_health(),
        });
        ctx.cues.push(FeedbackCue::Hurt {
            target: host,
            point: info.hit_point(),
        });

        if self.flash.start(ctx.config.flash_color) {
            ctx.scheduler.schedule(
                host,
                ctx.now + f64::from(ctx.config.flash_duration),
                ScheduledAction::EndFlash(host),
            );
        }

        if !self.stats.is_alive() {
            self.die(host, ctx);
            return DamageOutcome::Killed { amount };
        }
        DamageOutcome::Damaged { amount, health }
    }

    fn heal(&mut self, amount: f32, ctx: &mut CombatContext<'_>) -> bool {
        let Some(host) = self.host else {
            return false;
        };
        if self.state == LifeState::Dead || self.inert {
            return false;
        }
        let before = self.stats.health();
        self.stats.heal(amount);
        ctx.bus.publish(&CombatEvent::HealthChanged {
            target: host,
            current: self.stats.health(),
            max: self.stats.max_health(),
        });
        self.stats.health() != before
    }
}
