//! Cooldown guard: блокировка повторного подбора после drop

use bevy::prelude::*;

/// Cooldown guard carrier'а
///
/// Пока идёт отсчёт, контакты этого carrier'а с мячом не дают владения.
/// Повторный `arm` во время отсчёта ничего не делает (идемпотентно).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CooldownGuard {
    remaining: f32,
}

impl CooldownGuard {
    pub fn is_cooling_down(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// true если guard был взведён этим вызовом
    pub fn arm(&mut self, duration: f32) -> bool {
        if self.is_cooling_down() || duration <= 0.0 {
            return false;
        }
        self.remaining = duration;
        true
    }

    /// true если отсчёт закончился на этом тике
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.is_cooling_down() {
            return false;
        }
        self.remaining -= delta;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            return true;
        }
        false
    }
}

/// Система: отсчёт cooldown guard'ов
pub fn tick_cooldown_guards(
    mut guards: Query<(Entity, &mut CooldownGuard)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut guard) in guards.iter_mut() {
        if guard.tick(delta) {
            crate::logger::log(&format!("🔓 {:?}: pickup cooldown cleared", entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_counts_down_and_clears() {
        let mut guard = CooldownGuard::default();
        assert!(!guard.is_cooling_down());

        assert!(guard.arm(0.1));
        assert!(guard.is_cooling_down());

        assert!(!guard.tick(0.05));
        assert!(guard.is_cooling_down());
        assert!(guard.tick(0.05));
        assert!(!guard.is_cooling_down());
        assert_eq!(guard.remaining(), 0.0);

        // Уже чистый guard не «заканчивается» повторно
        assert!(!guard.tick(0.05));
    }

    #[test]
    fn test_rearm_while_cooling_is_noop() {
        let mut guard = CooldownGuard::default();
        guard.arm(0.1);
        guard.tick(0.06);

        assert!(!guard.arm(5.0));
        assert!((guard.remaining() - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_does_not_arm() {
        let mut guard = CooldownGuard::default();
        assert!(!guard.arm(0.0));
        assert!(!guard.is_cooling_down());
    }
}
