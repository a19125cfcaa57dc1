//! Integration tests for rotorlb.
//!
//! These tests exercise the rotor under concurrent callers and the
//! config-to-router path end to end.

use rotorlb::backend::{Backend, PoolRouter, RotorError, RouteError, WeightedRotor};
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

/// Run `threads` threads that each take `calls` selections, returning every
/// selection as `(ticket, position, backend)`.
fn hammer(rotor: Arc<WeightedRotor>, threads: usize, calls: usize) -> Vec<(u64, usize, String)> {
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let rotor = Arc::clone(&rotor);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..calls)
                    .map(|_| {
                        let s = rotor.next_selection().expect("pool is not empty");
                        (s.ticket, s.position, s.backend.to_string())
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|h| h.join().expect("worker panicked"))
        .collect()
}

#[test]
fn test_concurrent_selections_match_reference_sequence() {
    let backends = [
        Backend::new("S1", 3),
        Backend::new("S2", 2),
        Backend::new("S3", 1),
    ];
    let rotor = Arc::new(WeightedRotor::new(&backends).unwrap());
    let reference = WeightedRotor::new(&backends).unwrap();

    let threads = 8;
    let calls = 500;
    let mut results = hammer(Arc::clone(&rotor), threads, calls);
    assert_eq!(results.len(), threads * calls);

    // Ordering by ticket gives lock-acquisition order.
    results.sort_by_key(|(ticket, _, _)| *ticket);

    for (i, (ticket, position, backend)) in results.iter().enumerate() {
        assert_eq!(*ticket, i as u64, "ticket skipped or duplicated");
        assert_eq!(*position, i % rotor.len());
        assert_eq!(backend, reference.next().unwrap());
    }
}

#[test]
fn test_concurrent_distribution_per_position() {
    let rotor = Arc::new(WeightedRotor::round_robin(["a", "b", "c", "d", "e"]));

    // 4 * 251 = 1004 calls over 5 positions: 200 or 201 each.
    let results = hammer(Arc::clone(&rotor), 4, 251);

    let mut per_position: HashMap<usize, usize> = HashMap::new();
    for (_, position, _) in &results {
        *per_position.entry(*position).or_default() += 1;
    }

    for position in 0..5 {
        let count = per_position[&position];
        assert!(count == 200 || count == 201, "position {position} hit {count} times");
    }
    // Cyclic order from index 0: the first 4 positions get the extra call.
    assert_eq!(per_position[&0], 201);
    assert_eq!(per_position[&4], 200);
}

#[test]
fn test_concurrent_empty_pool_always_fails() {
    let rotor = Arc::new(WeightedRotor::new(&[Backend::new("A", 0)]).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let rotor = Arc::clone(&rotor);
            thread::spawn(move || (0..100).all(|_| rotor.next() == Err(RotorError::EmptyPool)))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_config_to_router() {
    use rotorlb::config::load_config;
    use std::io::Write as IoWrite;
    use tempfile::NamedTempFile;

    let config_content = r#"
global:
  log_level: debug
  log_format: pretty

simulation:
  requests: 12
  workers: 3

pools:
  - name: web
    backends:
      - id: "10.0.0.1:80"
        weight: 3
      - id: "10.0.0.2:80"
        weight: 0
      - id: "10.0.0.3:80"
  - name: drained
    backends:
      - id: "10.0.0.9:80"
        weight: 0
"#;

    let mut temp_file = NamedTempFile::new().expect("failed to create temp file");
    temp_file
        .write_all(config_content.as_bytes())
        .expect("failed to write config");

    let config = load_config(temp_file.path()).expect("failed to load config");
    assert_eq!(config.simulation.requests, 12);

    let router = PoolRouter::new(&config.pools).expect("failed to build router");

    let picks: Vec<&str> = (0..5).map(|_| router.select("web").unwrap()).collect();
    assert_eq!(
        picks,
        vec!["10.0.0.1:80", "10.0.0.1:80", "10.0.0.1:80", "10.0.0.3:80", "10.0.0.1:80"]
    );

    let err = router.select("drained").unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(
        err,
        RouteError::Rotor {
            pool: "drained".to_string(),
            source: RotorError::EmptyPool,
        }
    );
}

#[test]
fn test_config_rejects_negative_weight() {
    use rotorlb::config::{parse_config, ConfigError};

    let config_content = r#"
pools:
  - name: web
    backends:
      - id: "10.0.0.1:80"
        weight: -1
"#;

    let result = parse_config(config_content);
    match result {
        Err(ConfigError::ValidationError(message)) => {
            assert!(message.contains("negative weight -1"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_config_with_oversized_weight_fails_router_construction() {
    use rotorlb::config::parse_config;

    let config_content = r#"
pools:
  - name: web
    backends:
      - id: "10.0.0.1:80"
        weight: 9223372036854775807
"#;

    let config = parse_config(config_content).expect("weight is non-negative");
    let err = PoolRouter::new(&config.pools).unwrap_err();
    assert_eq!(
        err,
        RouteError::Rotor {
            pool: "web".to_string(),
            source: RotorError::SequenceTooLong,
        }
    );
}
