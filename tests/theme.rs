use std::cell::RefCell;
use std::rc::Rc;

use sakura_wasm::error::EffectError;
use sakura_wasm::particles::Rgba;
use sakura_wasm::theme::{KeyValueStore, MemoryStore, PreferenceStore, ThemeController, ThemeMode};
use sakura_wasm::SiteConfig;

fn controller(store: &MemoryStore) -> ThemeController {
    ThemeController::new(PreferenceStore::new(Some(Box::new(store.clone()))), ThemeMode::Dark)
}

#[test]
fn defaults_to_dark_without_stored_choice() {
    let store = MemoryStore::new();
    assert_eq!(controller(&store).current_mode(), ThemeMode::Dark);
    assert_eq!(ThemeMode::default(), ThemeMode::Dark);
}

#[test]
fn toggle_persists_across_sessions() {
    let store = MemoryStore::new();
    let mut first = controller(&store);
    assert_eq!(first.toggle(), ThemeMode::Light);
    assert_eq!(store.get("theme").as_deref(), Some("light"));

    let mut second = controller(&store);
    assert_eq!(second.current_mode(), ThemeMode::Light);
    assert_eq!(second.toggle(), ThemeMode::Dark);
    assert_eq!(store.get("theme").as_deref(), Some("dark"));
}

#[test]
fn unknown_stored_value_falls_back() {
    let mut store = MemoryStore::new();
    store.set("theme", "sepia").ok();
    assert_eq!(controller(&store).current_mode(), ThemeMode::Dark);

    let light_default = ThemeController::new(PreferenceStore::new(Some(Box::new(store))), ThemeMode::Light);
    assert_eq!(light_default.current_mode(), ThemeMode::Light);
}

#[test]
fn listeners_hear_current_mode_then_every_change_in_order() {
    let heard: Rc<RefCell<Vec<(u8, ThemeMode)>>> = Rc::default();
    let mut theme = ThemeController::new(PreferenceStore::new(None), ThemeMode::Dark);
    for id in 0..2u8 {
        let heard = Rc::clone(&heard);
        theme.subscribe(Box::new(move |mode: ThemeMode| heard.borrow_mut().push((id, mode))));
    }
    theme.toggle();
    assert_eq!(
        *heard.borrow(),
        vec![
            (0, ThemeMode::Dark),
            (1, ThemeMode::Dark),
            (0, ThemeMode::Light),
            (1, ThemeMode::Light),
        ]
    );
}

#[test]
fn session_scoped_without_store() {
    let mut theme = ThemeController::new(PreferenceStore::new(None), ThemeMode::Dark);
    assert_eq!(theme.toggle(), ThemeMode::Light);
    assert_eq!(theme.toggle(), ThemeMode::Dark);
}

struct FullStore;

impl KeyValueStore for FullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), EffectError> {
        Err(EffectError::StorageUnavailable("quota exceeded".into()))
    }
}

#[test]
fn failed_save_still_switches() {
    let mut theme = ThemeController::new(PreferenceStore::new(Some(Box::new(FullStore))), ThemeMode::Dark);
    assert_eq!(theme.toggle(), ThemeMode::Light);
    assert_eq!(theme.current_mode(), ThemeMode::Light);
}

#[test]
fn mode_presentation() {
    assert_eq!(ThemeMode::parse("light"), Some(ThemeMode::Light));
    assert_eq!(ThemeMode::parse("Dark"), None);
    assert_eq!(ThemeMode::Dark.icon_class(), "fas fa-sun");
    assert_eq!(ThemeMode::Light.icon_class(), "fas fa-moon");
    assert_eq!(ThemeMode::Dark.clear_color(), Rgba::new(0.1, 0.1, 0.18, 1.0));
    assert_eq!(ThemeMode::Light.clear_color(), Rgba::new(0.98, 0.98, 1.0, 1.0));
}

#[test]
fn config_defaults_and_overrides() {
    let config = SiteConfig::from_json(r#"{"defaultTheme": "light", "volumeParticles": false, "seed": 9}"#);
    assert_eq!(config.default_theme, ThemeMode::Light);
    assert!(config.flat_particles);
    assert!(!config.volume_particles);
    assert_eq!(config.default_volume, 0.5);
    assert_eq!(config.seed, Some(9));

    assert_eq!(SiteConfig::from_json("{not json"), SiteConfig::default());
    assert_eq!(SiteConfig::from_json(r#"{"defaultTheme": "neon"}"#), SiteConfig::default());
}
