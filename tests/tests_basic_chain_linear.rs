#[cfg(test)]
mod tests {
    use log::debug;
    use serde::Deserialize;
    use tf_cache::{TfConfig, Timestamp, TransformCore};

    #[derive(Debug, Deserialize)]
    struct ScenarioEdge {
        parent: String,
        child: String,
        translation: [f64; 3],
        rotation: [f64; 4],
        stamp_nanos: i64,
    }

    #[derive(Debug, Deserialize)]
    struct Scenario {
        edges: Vec<ScenarioEdge>,
    }

    fn load_scenario(core: &TransformCore) {
        let raw = std::fs::read_to_string("tests/fixtures/chain_scenario.yaml").expect("fixture present");
        let scenario: Scenario = serde_yaml::from_str(&raw).expect("fixture parses");
        for edge in scenario.edges {
            let [x, y, z, w] = edge.rotation;
            let rotation = nalgebra::UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(w, x, y, z));
            let [tx, ty, tz] = edge.translation;
            core.insert_transform(
                &edge.parent,
                &edge.child,
                rotation,
                nalgebra::Vector3::new(tx, ty, tz),
                Timestamp::from_nanos(edge.stamp_nanos),
                "fixture",
            )
            .unwrap();
        }
    }

    /// `map -> odom -> base`, each edge 1m along x. The composed
    /// `map -> base` transform should be 2m.
    #[test]
    fn two_hop_chain_composes_additively() {
        let _ = env_logger::try_init();
        let core = TransformCore::new(TfConfig::default());
        load_scenario(&core);

        let t = core.lookup_transform("map", "base", Timestamp::ZERO).unwrap();
        debug!("{t:?}");
        assert!((t.translation.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reverse_direction_lookup_is_the_inverse() {
        let _ = env_logger::try_init();
        let core = TransformCore::new(TfConfig::default());
        load_scenario(&core);

        let forward = core.lookup_transform("map", "base", Timestamp::ZERO).unwrap();
        let backward = core.lookup_transform("base", "map", Timestamp::ZERO).unwrap();
        assert!((forward.translation.x + backward.translation.x).abs() < 1e-9);
    }
}
