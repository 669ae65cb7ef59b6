#[cfg(test)]
mod engine_tests {
    use super::super::engine::normalize_heading;
    use super::super::{Mode, SimulationEngine, SimulationError, Target};
    use crate::config::SimulationConfig;
    use crate::util::round_to;

    fn engine_with(detection_probability: f64) -> SimulationEngine {
        SimulationEngine::new(&SimulationConfig {
            seed: Some(42),
            detection_probability,
            ..Default::default()
        })
    }

    fn quiet_engine() -> SimulationEngine {
        engine_with(0.0)
    }

    #[test]
    fn idle_battery_drains_a_tenth_per_tick() {
        let mut engine = quiet_engine();
        for _ in 0..10 {
            engine.advance();
        }
        assert!((engine.state().battery - 99.0).abs() < 1e-9);
        assert_eq!(engine.snapshot().battery, 99.0);
    }

    #[test]
    fn payload_battery_drains_three_tenths_per_tick() {
        let mut engine = quiet_engine();
        engine.set_payload(true);
        for _ in 0..10 {
            engine.advance();
        }
        assert!((engine.state().battery - 97.0).abs() < 1e-9);
        assert_eq!(engine.snapshot().battery, 97.0);
    }

    #[test]
    fn battery_never_increases_and_floors_at_zero() {
        let mut engine = quiet_engine();
        engine.set_payload(true);
        let mut previous = engine.state().battery;
        // 200 payload ticks drain 60, the idle remainder drains the last 40.
        for tick in 0..800 {
            if tick == 200 {
                engine.set_payload(false);
            }
            engine.advance();
            let battery = engine.state().battery;
            assert!(battery <= previous);
            assert!(battery >= 0.0);
            previous = battery;
        }
        assert_eq!(engine.state().battery, 0.0);
        assert!(engine.is_battery_depleted());

        engine.set_payload(true);
        for _ in 0..10 {
            engine.advance();
            assert_eq!(engine.state().battery, 0.0);
        }
        assert_eq!(engine.snapshot().battery, 0.0);
    }

    #[test]
    fn battery_depleted_latch_starts_clear() {
        let mut engine = quiet_engine();
        for _ in 0..10 {
            engine.advance();
        }
        assert!(!engine.is_battery_depleted());
    }

    #[test]
    fn non_finite_detection_probability_disables_detections() {
        for detection_probability in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut engine = engine_with(detection_probability);
            for _ in 0..50 {
                engine.advance();
            }
            assert!(engine.detections().is_empty());
        }
    }

    #[test]
    fn out_of_range_detection_probability_is_clamped() {
        let mut engine = engine_with(7.5);
        for _ in 0..10 {
            engine.advance();
        }
        assert_eq!(engine.detections().len(), 10);
    }

    #[test]
    fn loiter_heading_turns_one_degree_and_wraps() {
        let mut engine = quiet_engine();
        for _ in 0..359 {
            engine.advance();
        }
        assert_eq!(engine.state().heading, 359.0);

        engine.advance();
        assert_eq!(engine.state().heading, 0.0);

        engine.advance();
        assert_eq!(engine.state().heading, 1.0);
        assert_eq!(engine.state().mode, Mode::Loiter);
    }

    #[test]
    fn heading_stays_in_range_across_modes() {
        let mut engine = quiet_engine();
        let home = (engine.state().lat, engine.state().lon);
        let offsets = [(0.01, 0.0), (-0.01, 0.02), (0.0, -0.03), (-0.02, -0.02)];

        for tick in 0..2000 {
            if tick % 250 == 0 {
                let (d_lat, d_lon) = offsets[(tick / 250) % offsets.len()];
                engine
                    .set_target(Some(home.0 + d_lat), Some(home.1 + d_lon))
                    .unwrap();
            }
            engine.advance();
            let heading = engine.state().heading;
            assert!((0.0..360.0).contains(&heading), "heading {heading} out of range");
        }
    }

    #[test]
    fn mission_heading_points_at_target() {
        let cases = [
            ((1.0, 0.0), 0.0),
            ((0.0, 1.0), 90.0),
            ((-1.0, 0.0), 180.0),
            ((0.0, -1.0), 270.0),
        ];
        for ((d_lat, d_lon), expected) in cases {
            let mut engine = quiet_engine();
            let (lat, lon) = (engine.state().lat, engine.state().lon);
            engine.set_target(Some(lat + d_lat), Some(lon + d_lon)).unwrap();
            engine.advance();
            assert!(
                (engine.state().heading - expected).abs() < 1e-9,
                "expected {expected}, got {}",
                engine.state().heading
            );
        }
    }

    #[test]
    fn set_target_switches_to_mission_on_next_tick() {
        let mut engine = quiet_engine();
        let (lat, lon) = (engine.state().lat, engine.state().lon);

        let target = engine.set_target(Some(lat + 0.01), Some(lon)).unwrap();
        assert_eq!(target, Target { lat: lat + 0.01, lon });
        assert_eq!(engine.state().mode, Mode::Loiter);

        engine.advance();
        assert_eq!(engine.state().mode, Mode::Mission);
        assert_eq!(engine.state().target, Some(target));
    }

    #[test]
    fn target_within_threshold_arrives_immediately() {
        let mut engine = quiet_engine();
        let (lat, lon) = (engine.state().lat, engine.state().lon);

        engine.set_target(Some(lat + 0.00005), Some(lon)).unwrap();
        engine.advance();

        assert_eq!(engine.state().mode, Mode::Loiter);
        assert!(engine.state().target.is_none());
    }

    #[test]
    fn mission_closes_distance_until_arrival() {
        let mut engine = quiet_engine();
        let (lat, lon) = (engine.state().lat, engine.state().lon);
        engine.set_target(Some(lat + 1.0), Some(lon)).unwrap();

        let mut previous = engine.state().distance_to_target().unwrap();
        let mut ticks = 0;
        while engine.state().target.is_some() {
            engine.advance();
            ticks += 1;
            assert!(ticks <= 7000, "did not arrive within bound");

            let state = engine.state();
            assert_eq!(state.mode == Mode::Mission, state.target.is_some());
            if let Some(distance) = state.distance_to_target() {
                assert!(distance < previous);
                previous = distance;
            }
        }

        assert_eq!(engine.state().mode, Mode::Loiter);
        assert!((engine.state().lat - (lat + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn missing_coordinate_leaves_target_unchanged() {
        let mut engine = quiet_engine();
        let original = engine.set_target(Some(1.0), Some(2.0)).unwrap();

        assert_eq!(
            engine.set_target(None, Some(3.0)),
            Err(SimulationError::MissingCoordinate("lat"))
        );
        assert_eq!(
            engine.set_target(Some(3.0), None),
            Err(SimulationError::MissingCoordinate("lon"))
        );
        assert!(matches!(
            engine.set_target(Some(f64::NAN), Some(3.0)),
            Err(SimulationError::InvalidCoordinate { name: "lat", .. })
        ));
        assert_eq!(engine.state().target, Some(original));
    }

    #[test]
    fn missing_coordinate_without_target_keeps_loiter() {
        let mut engine = quiet_engine();
        assert!(engine.set_target(Some(1.0), None).is_err());
        engine.advance();
        assert!(engine.state().target.is_none());
        assert_eq!(engine.state().mode, Mode::Loiter);
    }

    #[test]
    fn out_of_range_target_is_accepted() {
        let mut engine = quiet_engine();
        assert!(engine.set_target(Some(120.0), Some(500.0)).is_ok());
        engine.advance();
        assert_eq!(engine.state().mode, Mode::Mission);
    }

    #[test]
    fn repeated_set_target_overwrites() {
        let mut engine = quiet_engine();
        let (lat, lon) = (engine.state().lat, engine.state().lon);
        engine.set_target(Some(lat + 1.0), Some(lon)).unwrap();
        engine.advance();

        let second = engine.set_target(Some(lat), Some(lon - 1.0)).unwrap();
        engine.advance();
        assert_eq!(engine.state().target, Some(second));
        assert_eq!(engine.state().mode, Mode::Mission);
        assert!((engine.state().heading - 270.0).abs() < 1.0);
    }

    #[test]
    fn detections_are_appended_with_current_tick() {
        let mut engine = engine_with(1.0);
        for tick in 1..=20u64 {
            let before = engine.detections().len();
            engine.advance();
            assert_eq!(engine.detections().len(), before + 1);

            let last = engine.detections().iter().last().copied().unwrap();
            assert_eq!(last.timestamp, tick);
            assert!((last.lat - engine.state().lat).abs() <= 1e-4);
            assert!((last.lon - engine.state().lon).abs() <= 1e-4);
        }

        let timestamps: Vec<u64> = engine.detections().iter().map(|d| d.timestamp).collect();
        assert_eq!(timestamps, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn zero_probability_never_detects() {
        let mut engine = quiet_engine();
        for _ in 0..200 {
            engine.advance();
        }
        assert!(engine.detections().is_empty());
    }

    #[test]
    fn system_status_reports_last_five_detections() {
        let mut engine = engine_with(1.0);
        for _ in 0..3 {
            engine.advance();
        }
        assert_eq!(engine.system_status().detections.len(), 3);

        for _ in 0..9 {
            engine.advance();
        }
        let status = engine.system_status();
        let timestamps: Vec<u64> = status.detections.iter().map(|d| d.timestamp).collect();
        assert_eq!(timestamps, vec![8, 9, 10, 11, 12]);
        assert_eq!(status.connection, "CONNECTED");
        assert_eq!(status.gps_satellites, 12);
        assert_eq!(status.weather.condition, "Clear");
        assert_eq!(status.weather.temperature, 28.0);
    }

    #[test]
    fn snapshot_rounds_display_fields() {
        let mut engine = quiet_engine();
        for _ in 0..7 {
            engine.advance();
        }
        let state = engine.state().clone();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.altitude, round_to(state.altitude, 2));
        assert_eq!(snapshot.battery, round_to(state.battery, 1));
        assert_eq!(snapshot.speed, round_to(state.speed, 1));
        assert_eq!(snapshot.lat, state.lat);
        assert_eq!(snapshot.heading, state.heading);
        assert!((9.0..=11.0).contains(&snapshot.speed));
        assert!((45.0..=55.0).contains(&snapshot.altitude));
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = engine_with(0.3);
        let mut b = engine_with(0.3);
        for _ in 0..100 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.system_status(), b.system_status());
    }

    #[test]
    fn position_does_not_depend_on_speed_noise() {
        let config = |seed| SimulationConfig {
            seed: Some(seed),
            detection_probability: 0.0,
            ..Default::default()
        };
        let mut a = SimulationEngine::new(&config(1));
        let mut b = SimulationEngine::new(&config(2));
        for _ in 0..50 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.state().lat, b.state().lat);
        assert_eq!(a.state().lon, b.state().lon);
    }

    #[test]
    fn normalizes_heading_into_range() {
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(720.0), 0.0);
        assert_eq!(normalize_heading(359.5), 359.5);
        assert_eq!(normalize_heading(-1e-20), 0.0);
    }
}
