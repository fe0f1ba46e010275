//! Unit tests for er-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AccidentId, SegmentId, VehicleId};

    #[test]
    fn ordering_is_numeric() {
        assert!(VehicleId(2) < VehicleId(10));
        assert!(AccidentId(1) < AccidentId(2));
    }

    #[test]
    fn invalid_sentinel_is_max() {
        assert_eq!(VehicleId::INVALID.0, u32::MAX);
        assert_eq!(VehicleId::default(), VehicleId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "VehicleId(7)");
        assert_eq!(SegmentId::from("A_B").to_string(), "A_B");
    }

    #[test]
    fn segment_endpoints() {
        assert_eq!(SegmentId::from("A_B").endpoints(), ("A", "B"));
        assert_eq!(SegmentId::from("C").endpoints(), ("C", "C"));
    }

    #[test]
    fn shared_endpoint_detection() {
        let ab = SegmentId::from("A_B");
        assert!(ab.shares_endpoint(&SegmentId::from("B_C")));
        assert!(ab.shares_endpoint(&SegmentId::from("D_A")));
        assert!(!ab.shares_endpoint(&SegmentId::from("D_G")));
        assert!(!ab.shares_endpoint(&SegmentId::from("H_I")));
    }
}

#[cfg(test)]
mod geo {
    use crate::Position;

    #[test]
    fn pythagorean_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn within_is_inclusive() {
        let a = Position::new(0.0, 0.0);
        assert!(a.within(Position::new(200.0, 0.0), 200.0));
        assert!(!a.within(Position::new(200.1, 0.0), 200.0));
    }

    #[test]
    fn lerp_midpoint() {
        let m = Position::new(0.0, 0.0).lerp(Position::new(100.0, 50.0), 0.5);
        assert_eq!(m, Position::new(50.0, 25.0));
    }
}

#[cfg(test)]
mod time {
    use crate::Tick;

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(t.next(), Tick(11));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn since_saturates() {
        assert_eq!(Tick(3).since(Tick(10)), 0);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = SimRng::new(0);
        for _ in 0..1000 {
            let v = rng.gen_range(0..3usize);
            assert!(v < 3);
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }
}

#[cfg(test)]
mod class {
    use crate::VehicleClass;

    #[test]
    fn ambulances_are_not_civilian() {
        assert!(VehicleClass::Passenger.is_civilian());
        assert!(!VehicleClass::Ambulance.is_civilian());
        assert_eq!(VehicleClass::Ambulance.to_string(), "ambulance");
    }
}

#[cfg(test)]
mod config {
    use crate::EmergencyConfig;

    #[test]
    fn defaults_are_valid() {
        let cfg = EmergencyConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_hop_count, 5);
        assert_eq!(cfg.dispatch.population_size, 20);
        assert_eq!(cfg.reroute.ants, 6);
    }

    #[test]
    fn rejects_bad_probability() {
        let mut cfg = EmergencyConfig::default();
        cfg.dispatch.mutation_rate = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_population() {
        let mut cfg = EmergencyConfig::default();
        cfg.dispatch.population_size = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("population_size"));
    }
}
