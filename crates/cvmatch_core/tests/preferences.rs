use cvmatch_core::{KeyValueStore, MemoryStore, Preferences, Theme, ViewMode};

#[test]
fn preferences_round_trip_through_a_store() {
    let mut store = MemoryStore::new();
    let preferences = Preferences {
        theme: Theme::Dark,
        view_mode: ViewMode::List,
    };

    preferences.save(&mut store);

    assert_eq!(store.get("theme").as_deref(), Some("dark"));
    assert_eq!(Preferences::load(&store), preferences);
}

#[test]
fn unknown_values_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set("theme", "sepia");

    assert_eq!(Preferences::load(&store), Preferences::default());
}
