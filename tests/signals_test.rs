/*!
 * Signal Resolution and Mask Tests
 * Identifier resolution across the static table and per-thread masks
 */

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use signal_thread::signals::*;
use std::thread;

#[test]
fn test_numbers_in_range_resolve_to_themselves() {
    let limit = SignalTable::signal_limit();
    for n in 0..limit {
        assert_eq!(resolve(n).unwrap(), n);
    }
    assert!(resolve(-1).unwrap_err().is_invalid_argument());
    assert!(resolve(limit).unwrap_err().is_invalid_argument());
}

#[test]
fn test_names_with_and_without_prefix() {
    for spec in SignalTable::iter() {
        assert_eq!(resolve(spec.name).unwrap(), spec.number, "{}", spec.name);
        assert_eq!(
            resolve(format!("SIG{}", spec.name)).unwrap(),
            spec.number,
            "SIG{}",
            spec.name
        );
    }
    assert_eq!(resolve("INT").unwrap(), libc::SIGINT);
    assert_eq!(resolve("SIGUSR2").unwrap(), libc::SIGUSR2);
}

#[test]
fn test_exit_maps_to_zero() {
    assert_eq!(resolve("EXIT").unwrap(), 0);
    assert_eq!(resolve(0).unwrap(), 0);
    assert_eq!(SignalTable::name_of(0), Some("EXIT"));
}

#[test]
fn test_unsupported_names() {
    for name in ["BOGUS", "", "SIG", "RT", "RT-1", "usr1"] {
        let err = resolve(name).unwrap_err();
        assert!(err.is_invalid_argument(), "{:?}", name);
    }
    let err = resolve("BOGUS").unwrap_err();
    assert!(err.to_string().contains("unsupported signal"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_realtime_names() {
    let (min, max) = SignalTable::realtime_range().unwrap();
    assert_eq!(resolve("RT0").unwrap(), min);
    assert_eq!(resolve("SIGRT0").unwrap(), min);
    assert_eq!(resolve("RT1").unwrap(), min + 1);
    assert_eq!(resolve(format!("RT{}", max - min)).unwrap(), max);
    assert!(resolve(format!("RT{}", max - min + 1)).is_err());
    assert!(resolve("RT00").is_err());
    assert_eq!(SignalTable::signal_limit(), max + 1);
    assert_eq!(SignalTable::describe(min + 2), format!("RT2({})", min + 2));
}

#[cfg(target_os = "linux")]
#[test]
fn test_platform_aliases() {
    assert!(SignalTable::is_defined("STKFLT"));
    assert_eq!(resolve("IOT").unwrap(), libc::SIGABRT);
    assert_eq!(resolve("POLL").unwrap(), libc::SIGIO);
    // Reverse lookups prefer the canonical entry
    assert_eq!(SignalTable::name_of(libc::SIGABRT), Some("ABRT"));
}

#[test]
fn test_describe() {
    assert_eq!(SignalTable::describe(libc::SIGUSR1), format!("SIGUSR1({})", libc::SIGUSR1));
    assert_eq!(SignalTable::describe(0), "EXIT(0)");
}

#[test]
fn test_mask_merges_and_resets() {
    // Masks are per thread; keep the harness thread untouched
    thread::spawn(|| {
        assert_eq!(mask("USR1").unwrap(), libc::SIGUSR1);
        assert!(MaskController::is_blocked(libc::SIGUSR1).unwrap());

        mask(libc::SIGUSR2).unwrap();
        assert!(MaskController::is_blocked(libc::SIGUSR1).unwrap());
        assert!(MaskController::is_blocked(libc::SIGUSR2).unwrap());

        MaskController::reset().unwrap();
        assert_eq!(MaskController::current().unwrap(), Vec::<i32>::new());
    })
    .join()
    .unwrap();
}

#[test]
fn test_isolate_for_wait_blocks_every_signal() {
    thread::spawn(|| {
        MaskController::isolate_for_wait(libc::SIGUSR2).unwrap();
        for sig in [libc::SIGUSR1, libc::SIGINT, libc::SIGTERM, libc::SIGUSR2] {
            assert!(MaskController::is_blocked(sig).unwrap(), "signal {sig}");
        }

        // Signal 0 cannot be masked, and the mask is left untouched
        MaskController::reset().unwrap();
        let err = MaskController::isolate_for_wait(0).unwrap_err();
        assert!(err.is_runtime());
        assert!(!MaskController::is_blocked(libc::SIGUSR1).unwrap());
    })
    .join()
    .unwrap();
}

#[test]
fn test_mask_rejects_exit_and_unknown_names() {
    thread::spawn(|| {
        // EXIT resolves, but the OS refuses to mask signal 0
        let err = mask("EXIT").unwrap_err();
        assert!(err.is_runtime());
        assert_eq!(err.errno(), Some(nix::errno::Errno::EINVAL));

        let err = mask("NOPE").unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(MaskController::current().unwrap(), Vec::<i32>::new());
    })
    .join()
    .unwrap();
}

#[test]
fn test_signal_id_conversions() {
    assert_eq!(SignalId::from(2), SignalId::Number(2));
    assert_eq!(SignalId::from("INT"), SignalId::Name("INT".to_string()));
    assert_eq!(
        resolve(nix::sys::signal::Signal::SIGTERM).unwrap(),
        libc::SIGTERM
    );
    assert_eq!(SignalId::from("HUP").to_string(), "HUP");
}

proptest! {
    #[test]
    fn prop_number_resolution_matches_range(n in any::<i32>()) {
        let limit = SignalTable::signal_limit();
        match resolve(n) {
            Ok(sig) => {
                prop_assert!((0..limit).contains(&n));
                prop_assert_eq!(sig, n);
            }
            Err(err) => {
                prop_assert!(!(0..limit).contains(&n));
                prop_assert!(err.is_invalid_argument());
            }
        }
    }

    #[test]
    fn prop_canonical_names_round_trip(index in 0usize..64) {
        let specs: Vec<_> = SignalTable::iter().collect();
        let spec = specs[index % specs.len()];
        let canonical = SignalTable::name_of(spec.number).unwrap();
        prop_assert_eq!(resolve(canonical).unwrap(), spec.number);
    }
}
