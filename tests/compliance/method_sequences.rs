/// Method Engine compliance tests: each built-in method must expand to
/// its published pass sequence, and an end-to-end run against a mock
/// drive must leave the expected bytes behind.
///
/// Requirements under test, per method:
/// - dodshort (3-pass "short DoD"): random, 0xFF, random-with-verify
/// - dod522022m (7-pass): 0x00, 0xFF, random, 0x00, 0x00, 0xFF, random-with-verify
/// - gutmann: 35 passes (4 random, 27 fixed, 4 random), verify-last, final blank allowed
/// - ops2 (RCMP TSSIT OPS-II): 0x00/0xFF pairs repeated by rounds, terminated by one final-ops2 random pass
/// - is5enh (HMG IS5 Enhanced): 0x00, 0xFF, random pass always verified
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};

use wipe_engine::method::{PassDirection, PassLabel};
use wipe_engine::pattern::PatternSpec;
use wipe_engine::{ExitCode, Method, PrngKind, Supervisor, VerifyPolicy, WipeConfig, WorkerResult};

use crate::common::mock_drive::MockDrive;
use crate::common::test_helpers::verify_pattern;

fn fixed_bytes(pattern: PatternSpec) -> Option<&'static [u8]> {
    match pattern {
        PatternSpec::Fixed(bytes) => Some(bytes),
        PatternSpec::Random => None,
    }
}

#[test]
fn dodshort_is_random_then_ff_then_random_verified() {
    let passes = Method::Dodshort.expand(1, VerifyPolicy::Last, false);
    assert_eq!(passes.len(), 3);
    assert!(passes[0].pattern.is_random());
    assert_eq!(fixed_bytes(passes[1].pattern), Some(&[0xFFu8][..]));
    assert!(passes[2].pattern.is_random());
    assert_eq!(passes[2].direction, PassDirection::Write { verify_after: true });
}

#[test]
fn dod522022m_is_the_published_seven_pass_sequence() {
    let passes = Method::Dod522022m.expand(1, VerifyPolicy::Last, false);
    let expected: [Option<&[u8]>; 7] = [
        Some(&[0x00]),
        Some(&[0xFF]),
        None,
        Some(&[0x00]),
        Some(&[0x00]),
        Some(&[0xFF]),
        None,
    ];
    assert_eq!(passes.len(), 7);
    for (pass, expected_pattern) in passes.iter().zip(expected.iter()) {
        assert_eq!(fixed_bytes(pass.pattern), *expected_pattern);
    }
    assert_eq!(passes.last().unwrap().direction, PassDirection::Write { verify_after: true });
}

#[test]
fn gutmann_has_thirty_five_passes_four_random_on_each_end() {
    let passes = Method::Gutmann.expand(1, VerifyPolicy::None, false);
    assert_eq!(passes.len(), 35);
    assert!(passes[0..4].iter().all(|p| p.pattern.is_random()));
    assert!(passes[31..35].iter().all(|p| p.pattern.is_random()));
    assert!(passes[4..31].iter().all(|p| !p.pattern.is_random()));
}

#[test]
fn gutmann_allows_a_final_blank_pass() {
    let passes = Method::Gutmann.expand(1, VerifyPolicy::None, true);
    assert_eq!(passes.len(), 36);
    assert_eq!(passes.last().unwrap().label, PassLabel::FinalBlank);
    assert_eq!(fixed_bytes(passes.last().unwrap().pattern), Some(&[0x00][..]));
}

#[test]
fn ops2_pairs_zero_and_one_per_round_then_one_final_random_pass() {
    let passes = Method::Ops2.expand(2, VerifyPolicy::None, false);
    assert_eq!(passes.len(), 5);
    assert_eq!(fixed_bytes(passes[0].pattern), Some(&[0x00][..]));
    assert_eq!(fixed_bytes(passes[1].pattern), Some(&[0xFF][..]));
    assert_eq!(fixed_bytes(passes[2].pattern), Some(&[0x00][..]));
    assert_eq!(fixed_bytes(passes[3].pattern), Some(&[0xFF][..]));
    assert!(passes[4].pattern.is_random());
    assert_eq!(passes[4].label, PassLabel::FinalOps2);
}

#[test]
fn is5enh_forces_verify_on_its_random_pass_under_every_policy() {
    for policy in [VerifyPolicy::None, VerifyPolicy::Last, VerifyPolicy::All] {
        let passes = Method::Is5enh.expand(1, policy, false);
        assert_eq!(passes.len(), 3);
        assert_eq!(passes[2].direction, PassDirection::Write { verify_after: true }, "policy={policy:?}");
    }
}

#[test]
fn dod522022m_end_to_end_leaves_the_random_tail_verified_clean() {
    let mock = MockDrive::new(128 * 1024, 0xAA).unwrap();
    let config = WipeConfig::new(Method::Dod522022m, PrngKind::Isaac, 1, VerifyPolicy::Last, 0, false, true).unwrap();
    let supervisor = Supervisor::new(config);

    let outcome = supervisor.run(&[mock.device_input(512)]).unwrap();

    assert_eq!(outcome.reports[0].verify_errors, 0);
    assert_eq!(outcome.reports[0].pass_errors, 0);
}

#[test]
fn verify_zero_against_a_clean_zeroed_device_reports_no_mismatches() {
    let mock = MockDrive::new(64 * 1024, 0x00).unwrap();
    let config = WipeConfig::new(Method::VerifyZero, PrngKind::Isaac, 1, VerifyPolicy::None, 0, false, true).unwrap();
    let supervisor = Supervisor::new(config);

    let outcome = supervisor.run(&[mock.device_input(512)]).unwrap();

    assert_eq!(outcome.reports[0].verify_errors, 0);
    assert!(verify_pattern(mock.path(), &[0x00]).unwrap());
}

#[test]
fn verify_zero_against_a_device_with_one_flipped_byte_fails_and_exits_nonzero() {
    let mock = MockDrive::new(64 * 1024, 0x00).unwrap();
    {
        let mut file = OpenOptions::new().write(true).open(mock.path()).unwrap();
        file.seek(SeekFrom::Start(100)).unwrap();
        file.write_all(&[0x01]).unwrap();
    }

    let config = WipeConfig::new(Method::VerifyZero, PrngKind::Isaac, 1, VerifyPolicy::None, 0, false, true).unwrap();
    let supervisor = Supervisor::new(config);

    let outcome = supervisor.run(&[mock.device_input(512)]).unwrap();

    assert_eq!(outcome.reports[0].verify_errors, 1);
    assert_eq!(outcome.reports[0].result, WorkerResult::Failed);
    assert_eq!(outcome.exit_code, ExitCode::WorkerErrors);
    assert_eq!(outcome.exit_code.code(), 1);
}
