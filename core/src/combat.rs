//! Health, attack, and armour bookkeeping plus the armour-comparison damage rule.

use serde::{Deserialize, Serialize};

/// Health, attack, and armour of a combatant.
///
/// Enemies use the block as defenders, towers as attacker profiles and the
/// player's base only for its health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatStats {
    health: u32,
    base_attack: u32,
    armor: u32,
}

impl CombatStats {
    /// Creates a new stat block.
    #[must_use]
    pub const fn new(health: u32, base_attack: u32, armor: u32) -> Self {
        Self {
            health,
            base_attack,
            armor,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Attack applied when this block strikes another.
    #[must_use]
    pub const fn base_attack(&self) -> u32 {
        self.base_attack
    }

    /// Armour compared against the attacker's armour when hit.
    #[must_use]
    pub const fn armor(&self) -> u32 {
        self.armor
    }

    /// Reports whether health reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Adds a signed delta to the health, clamping the result at zero.
    ///
    /// Returns the health after the change.
    pub fn add_health(&mut self, delta: i64) -> u32 {
        let updated = i64::from(self.health).saturating_add(delta);
        self.health = u32::try_from(updated.max(0)).unwrap_or(u32::MAX);
        self.health
    }

    /// Damage this block would take from `attacker`.
    ///
    /// Equal armour deals the attacker's base attack, a weaker defender takes
    /// one and a half times as much and a stronger defender takes half, but
    /// never less than one point. Halves round up.
    #[must_use]
    pub const fn damage_from(&self, attacker: &CombatStats) -> u32 {
        let attack = attacker.base_attack;
        if self.armor == attacker.armor {
            attack
        } else if self.armor < attacker.armor {
            attack.saturating_mul(3).saturating_add(1) / 2
        } else {
            let halved = attack.saturating_add(1) / 2;
            if halved == 0 {
                1
            } else {
                halved
            }
        }
    }

    /// Applies a hit from `attacker`.
    ///
    /// Returns `None` when `invulnerable` suppresses the hit, otherwise the
    /// damage dealt. Health never drops below zero.
    pub fn hit(&mut self, attacker: &CombatStats, invulnerable: bool) -> Option<u32> {
        if invulnerable {
            return None;
        }

        let damage = self.damage_from(attacker);
        let _ = self.add_health(-i64::from(damage));
        Some(damage)
    }
}

#[cfg(test)]
mod tests {
    use super::CombatStats;

    fn attacker(attack: u32, armor: u32) -> CombatStats {
        CombatStats::new(100, attack, armor)
    }

    #[test]
    fn equal_armour_deals_base_attack() {
        for armor in 0..4 {
            let defender = CombatStats::new(50, 0, armor);
            assert_eq!(defender.damage_from(&attacker(10, armor)), 10);
        }
    }

    #[test]
    fn weaker_defender_takes_rounded_one_and_a_half() {
        let defender = CombatStats::new(50, 0, 0);
        assert_eq!(defender.damage_from(&attacker(10, 1)), 15);
        assert_eq!(defender.damage_from(&attacker(5, 2)), 8);
        assert_eq!(defender.damage_from(&attacker(1, 1)), 2);
        assert_eq!(defender.damage_from(&attacker(0, 1)), 0);
    }

    #[test]
    fn stronger_defender_takes_at_least_one_point() {
        let defender = CombatStats::new(50, 0, 3);
        assert_eq!(defender.damage_from(&attacker(10, 0)), 5);
        assert_eq!(defender.damage_from(&attacker(5, 0)), 3);
        assert_eq!(defender.damage_from(&attacker(1, 0)), 1);
        assert_eq!(defender.damage_from(&attacker(0, 0)), 1);
    }

    #[test]
    fn damage_depends_only_on_armour_pair() {
        for defender_armor in 0..4 {
            for attacker_armor in 0..4 {
                let first = CombatStats::new(30, 0, defender_armor)
                    .damage_from(&attacker(7, attacker_armor));
                let second = CombatStats::new(90, 4, defender_armor)
                    .damage_from(&attacker(7, attacker_armor));
                assert_eq!(first, second, "health and own attack must not matter");
            }
        }
    }

    #[test]
    fn health_never_goes_negative() {
        let mut stats = CombatStats::new(5, 0, 0);
        assert_eq!(stats.add_health(-1000), 0);
        assert!(stats.is_dead());
        assert_eq!(stats.add_health(3), 3);
    }

    #[test]
    fn hit_clamps_and_reports_damage() {
        let mut defender = CombatStats::new(12, 0, 0);
        assert_eq!(defender.hit(&attacker(10, 0), false), Some(10));
        assert_eq!(defender.health(), 2);
        assert_eq!(defender.hit(&attacker(10, 0), false), Some(10));
        assert_eq!(defender.health(), 0);
        assert!(defender.is_dead());
    }

    #[test]
    fn invulnerable_defender_ignores_hits() {
        let mut defender = CombatStats::new(12, 0, 0);
        assert_eq!(defender.hit(&attacker(10, 0), true), None);
        assert_eq!(defender.health(), 12);
    }
}
