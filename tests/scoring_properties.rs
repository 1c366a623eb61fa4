// Property tests for scoring and the round clock.

use pet_tap::config::LOADING_MS;
use pet_tap::rules::{MEGA_BONUS, base_award};
use pet_tap::session::COUNTDOWN_TOTAL_MS;
use pet_tap::storage::MemoryStore;
use pet_tap::{Controller, GameConfig, GameState, Ruleset, TapPoint};
use proptest::prelude::*;

fn playing(ruleset: Ruleset, store: MemoryStore) -> Controller<MemoryStore> {
    let cfg = GameConfig {
        ruleset,
        ..GameConfig::default()
    };
    let mut c = Controller::new(cfg, store, 0.0);
    c.advance(LOADING_MS);
    c.open_character_select();
    c.start_game();
    c.advance(LOADING_MS + COUNTDOWN_TOTAL_MS);
    assert_eq!(c.state(), GameState::Playing);
    c
}

fn any_ruleset() -> impl Strategy<Value = Ruleset> {
    prop_oneof![Just(Ruleset::Classic), Just(Ruleset::MegaCombo)]
}

proptest! {
    #[test]
    fn score_is_sum_of_awards(
        ruleset in any_ruleset(),
        taps in prop::collection::vec((0.0f64..400.0, 0.0f64..400.0), 0..120),
    ) {
        let mut c = playing(ruleset, MemoryStore::new());
        let mut expected = 0u64;
        let mut last = 0u64;
        for (x, y) in taps {
            let award = c.register_tap(TapPoint::new(x, y)).unwrap();
            expected += award.total();
            prop_assert!(c.score() >= last);
            last = c.score();
        }
        prop_assert_eq!(c.score(), expected);
    }

    #[test]
    fn nth_tap_base_award(n in 0u64..10_000) {
        prop_assert_eq!(base_award(n), 10 + (n / 10) * 5);
        prop_assert_eq!(Ruleset::Classic.award(n).base, base_award(n));
    }

    #[test]
    fn one_bonus_per_ten_taps(count in 0u64..500) {
        let bonuses = (0..count)
            .map(|n| Ruleset::MegaCombo.award(n).bonus)
            .filter(|&b| b > 0)
            .collect::<Vec<_>>();
        prop_assert_eq!(bonuses.len() as u64, count / 10);
        prop_assert!(bonuses.iter().all(|&b| b == MEGA_BONUS));
    }

    #[test]
    fn high_score_is_max_of_before_and_final(
        before in 0u64..2_000,
        taps in 0usize..60,
    ) {
        let store = MemoryStore::new();
        store.insert_raw(pet_tap::settings::HIGH_SCORE_KEY, &before.to_string());
        let mut c = playing(Ruleset::Classic, store);
        for _ in 0..taps {
            c.register_tap(TapPoint::default());
        }
        let final_score = c.score();
        c.advance(c.now_ms() + 30_000.0);
        prop_assert_eq!(c.state(), GameState::GameOver);
        prop_assert_eq!(c.settings().high_score, before.max(final_score));
    }

    #[test]
    fn ticks_never_go_below_zero(extra in 0usize..20) {
        let mut c = playing(Ruleset::Classic, MemoryStore::new());
        for _ in 0..(30 + extra) {
            c.tick();
        }
        prop_assert_eq!(c.time_remaining(), 0);
        prop_assert_eq!(c.state(), GameState::GameOver);
    }
}
