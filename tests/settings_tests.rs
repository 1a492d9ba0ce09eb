use hydrosim::*;

#[test]
fn partial_settings_fill_in_defaults() {
    let json = r#"{
        "steps_per_second": 500.0,
        "fluid_dynamics": { "damping": false },
        "ic": { "enabled": false, "max_iterations": 2000 }
    }"#;
    let settings: SimulationSettings = serde_json::from_str(json).unwrap();

    let defaults = SimulationSettings::default();
    assert_eq!(settings.steps_per_second, 500.0);
    assert_eq!(settings.time_step(), 0.002);
    assert_eq!(settings.gravity, defaults.gravity);
    assert_eq!(settings.max_substeps, defaults.max_substeps);
    assert!(settings.fluid_dynamics.buoyancy);
    assert!(!settings.fluid_dynamics.damping);
    assert!(!settings.ic.enabled);
    assert_eq!(settings.ic.max_iterations, 2000);
    assert_eq!(settings.ic.warmup_time, defaults.ic.warmup_time);
}

#[test]
fn settings_round_trip_through_json() {
    let mut settings = SimulationSettings::default();
    settings.real_time_factor = 0.25;
    settings.gravity = Vec3::new(0.0, -1.62, 0.0);
    settings.ic.gravity = false;

    let json = serde_json::to_string(&settings).unwrap();
    let restored: SimulationSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, settings);
}

#[test]
fn invalid_rates_are_rejected_at_start() {
    let context = SimulationContext::new(RigidWorld::new());
    context.settings().lock().steps_per_second = 0.0;
    let mut manager = SimulationManager::new(context);
    assert!(matches!(
        manager.start(),
        Err(SimulationError::InvalidTimeStep(_))
    ));
    assert_eq!(manager.mode(), SimulationMode::Idle);
}

#[test]
fn material_table_survives_json() {
    let mut table = MaterialTable::new();
    let steel = table.add(Material::steel());
    let rubber = table.add(Material::rubber());
    table.set_friction(rubber, steel, FrictionPair::new(0.9, 0.6));

    let json = serde_json::to_string(&table).unwrap();
    let restored: MaterialTable = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.len(), 2);
    assert_eq!(restored.find("rubber"), Some(rubber));
    assert_eq!(restored.get(steel), Some(&Material::steel()));
    assert_eq!(restored.friction(steel, rubber), FrictionPair::new(0.9, 0.6));
    assert_eq!(restored.restitution(steel, rubber), table.restitution(steel, rubber));
}

#[test]
fn ocean_config_uses_seawater_by_default() {
    let ocean: Ocean = serde_json::from_str(r#"{ "surface_level": 2.0 }"#).unwrap();
    assert_eq!(ocean.surface_level, 2.0);
    assert_eq!(ocean.properties, FluidProperties::seawater());
    assert_eq!(ocean.depth_at(Vec3::new(0.0, -1.0, 0.0)), 3.0);
}
