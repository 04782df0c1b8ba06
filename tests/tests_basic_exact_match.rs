#[cfg(test)]
mod tests {
    use log::debug;
    use nalgebra::{UnitQuaternion, Vector3};
    use tf_cache::{TfConfig, Timestamp, TransformCore};

    #[test]
    fn exact_sample_hit_needs_no_interpolation() {
        let _ = env_logger::try_init();
        let core = TransformCore::new(TfConfig::default());

        core.insert_transform(
            "map",
            "base",
            UnitQuaternion::identity(),
            Vector3::new(1.0, 0.0, 0.0),
            Timestamp::from_nanos(1_000_000_000),
            "test",
        )
        .unwrap();

        let t = core.lookup_transform("map", "base", Timestamp::from_nanos(1_000_000_000)).unwrap();
        debug!("{t:?}");
        assert!((t.translation.x - 1.0).abs() < 1e-9);
        assert_eq!(t.stamp, Timestamp::from_nanos(1_000_000_000));
    }
}
