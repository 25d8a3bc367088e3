/// Method Engine: expands a named wipe method into an ordered list of
/// passes and verification modes.
use crate::pattern::PatternSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Method {
    Zero,
    One,
    VerifyZero,
    VerifyOne,
    Random,
    Dodshort,
    Dod522022m,
    Gutmann,
    Ops2,
    Is5enh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VerifyPolicy {
    None,
    Last,
    All,
}

impl VerifyPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            VerifyPolicy::None => "none",
            VerifyPolicy::Last => "last",
            VerifyPolicy::All => "all",
        }
    }
}

/// Which phase label a pass is published under. `FinalBlank` and
/// `FinalOps2` are distinct from `Normal` so progress reporting and
/// summary rows can call them out separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassLabel {
    Normal,
    FinalBlank,
    FinalOps2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDirection {
    Write { verify_after: bool },
    VerifyOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct ExpandedPass {
    pub pattern: PatternSpec,
    pub direction: PassDirection,
    pub label: PassLabel,
}

impl ExpandedPass {
    fn write(pattern: PatternSpec, verify_after: bool, label: PassLabel) -> Self {
        Self {
            pattern,
            direction: PassDirection::Write { verify_after },
            label,
        }
    }

    fn verify_only(pattern: PatternSpec) -> Self {
        Self {
            pattern,
            direction: PassDirection::VerifyOnly,
            label: PassLabel::Normal,
        }
    }

    fn is_write(&self) -> bool {
        matches!(self.direction, PassDirection::Write { .. })
    }

    fn set_verify(&mut self, verify: bool) {
        if let PassDirection::Write { verify_after } = &mut self.direction {
            *verify_after = verify;
        }
    }
}

/// A base-sequence entry as written in a method's table: a pattern and
/// whether its published V suffix marks it a candidate for verification
/// (always honoured under `last`/`all`, stripped under `none`, forced
/// regardless of policy only for `is5enh`'s PRNG pass).
struct TablePass {
    pattern: PatternSpec,
    forced_verify: bool,
}

const P00: PatternSpec = PatternSpec::Fixed(&[0x00]);
const PFF: PatternSpec = PatternSpec::Fixed(&[0xFF]);
const R: PatternSpec = PatternSpec::Random;

fn table(bytes: &'static [u8]) -> PatternSpec {
    PatternSpec::Fixed(bytes)
}

/// The 27 fixed-pattern passes of the Gutmann method, in the published
/// order: two single bytes, a three-byte triplet family, sixteen
/// ascending nibble-pair bytes, then the triplet family twice more.
const GUTMANN_FIXED: &[&[u8]] = &[
    &[0x55],
    &[0xAA],
    &[0x92, 0x49, 0x24],
    &[0x49, 0x24, 0x92],
    &[0x24, 0x92, 0x49],
    &[0x00],
    &[0x11],
    &[0x22],
    &[0x33],
    &[0x44],
    &[0x55],
    &[0x66],
    &[0x77],
    &[0x88],
    &[0x99],
    &[0xAA],
    &[0xBB],
    &[0xCC],
    &[0xDD],
    &[0xEE],
    &[0xFF],
    &[0x92, 0x49, 0x24],
    &[0x49, 0x24, 0x92],
    &[0x24, 0x92, 0x49],
    &[0x6D, 0xB6, 0xDB],
    &[0xB6, 0xDB, 0x6D],
    &[0xDB, 0x6D, 0xB6],
];

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Zero => "zero",
            Method::One => "one",
            Method::VerifyZero => "verify_zero",
            Method::VerifyOne => "verify_one",
            Method::Random => "random",
            Method::Dodshort => "dodshort",
            Method::Dod522022m => "dod522022m",
            Method::Gutmann => "gutmann",
            Method::Ops2 => "ops2",
            Method::Is5enh => "is5enh",
        }
    }

    /// Whether a `final_blank` request is honoured for this method.
    fn final_blank_allowed(&self) -> bool {
        matches!(self, Method::Random | Method::Gutmann | Method::Ops2)
    }

    /// The method's base sequence as written in the table, before the
    /// engine applies `rounds` repetition, the verify policy, or an
    /// optional final blank. `Ops2` is handled separately by `expand`
    /// because its round repetition only covers the 0x00/0xFF pair, not
    /// the terminating random pass.
    fn base_sequence(&self, rounds: u32) -> Vec<TablePass> {
        match self {
            Method::Zero => vec![TablePass { pattern: P00, forced_verify: false }],
            Method::One => vec![TablePass { pattern: PFF, forced_verify: false }],
            Method::VerifyZero | Method::VerifyOne | Method::Ops2 => unreachable!(
                "verify-only and ops2 methods are expanded directly by `expand`"
            ),
            Method::Random => (0..rounds).map(|_| TablePass { pattern: R, forced_verify: false }).collect(),
            Method::Dodshort => vec![
                TablePass { pattern: R, forced_verify: false },
                TablePass { pattern: PFF, forced_verify: false },
                TablePass { pattern: R, forced_verify: false },
            ],
            Method::Dod522022m => vec![
                TablePass { pattern: P00, forced_verify: false },
                TablePass { pattern: PFF, forced_verify: false },
                TablePass { pattern: R, forced_verify: false },
                TablePass { pattern: P00, forced_verify: false },
                TablePass { pattern: P00, forced_verify: false },
                TablePass { pattern: PFF, forced_verify: false },
                TablePass { pattern: R, forced_verify: false },
            ],
            Method::Gutmann => {
                let mut seq = vec![TablePass { pattern: R, forced_verify: false }; 4];
                seq.extend(GUTMANN_FIXED.iter().map(|bytes| TablePass {
                    pattern: table(bytes),
                    forced_verify: false,
                }));
                seq.extend((0..4).map(|_| TablePass { pattern: R, forced_verify: false }));
                seq
            }
            Method::Is5enh => vec![
                TablePass { pattern: P00, forced_verify: false },
                TablePass { pattern: PFF, forced_verify: false },
                TablePass { pattern: R, forced_verify: true },
            ],
        }
    }

    /// Expand this method into its full ordered pass list under the given
    /// `rounds`, `verify_policy`, and `final_blank` request.
    pub fn expand(&self, rounds: u32, verify_policy: VerifyPolicy, final_blank: bool) -> Vec<ExpandedPass> {
        assert!(rounds >= 1, "rounds must be >= 1");

        let mut passes = match self {
            Method::VerifyZero => vec![ExpandedPass::verify_only(P00); rounds as usize],
            Method::VerifyOne => vec![ExpandedPass::verify_only(PFF); rounds as usize],
            Method::Ops2 => {
                let mut seq = Vec::with_capacity(rounds as usize * 2 + 1);
                for _ in 0..rounds {
                    seq.push(ExpandedPass::write(P00, false, PassLabel::Normal));
                    seq.push(ExpandedPass::write(PFF, false, PassLabel::Normal));
                }
                seq.push(ExpandedPass::write(R, false, PassLabel::FinalOps2));
                seq
            }
            _ => {
                let base = self.base_sequence(rounds);
                let repeats = if matches!(self, Method::Random) { 1 } else { rounds };
                let mut seq = Vec::with_capacity(base.len() * repeats as usize);
                for _ in 0..repeats {
                    for table_pass in &base {
                        let mut pass = ExpandedPass::write(table_pass.pattern, false, PassLabel::Normal);
                        if table_pass.forced_verify {
                            pass.set_verify(true);
                        }
                        seq.push(pass);
                    }
                }
                seq
            }
        };

        apply_verify_policy(&mut passes, verify_policy);

        if final_blank && self.final_blank_allowed() {
            passes.push(ExpandedPass::write(P00, false, PassLabel::FinalBlank));
        }

        passes
    }
}

/// Apply the verify policy to every write pass that is not already forced
/// (is5enh's PRNG pass). `None` strips everything else; `Last` keeps
/// verification on the final write pass only; `All` verifies every write
/// pass.
fn apply_verify_policy(passes: &mut [ExpandedPass], policy: VerifyPolicy) {
    let forced: Vec<bool> = passes
        .iter()
        .map(|p| matches!(p.direction, PassDirection::Write { verify_after: true }))
        .collect();

    match policy {
        VerifyPolicy::None => {
            for (pass, was_forced) in passes.iter_mut().zip(&forced) {
                if pass.is_write() && !was_forced {
                    pass.set_verify(false);
                }
            }
        }
        VerifyPolicy::All => {
            for pass in passes.iter_mut() {
                if pass.is_write() {
                    pass.set_verify(true);
                }
            }
        }
        VerifyPolicy::Last => {
            for (pass, was_forced) in passes.iter_mut().zip(&forced) {
                if pass.is_write() && !was_forced {
                    pass.set_verify(false);
                }
            }
            if let Some(last_write) = passes.iter_mut().filter(|p| p.is_write()).last() {
                last_write.set_verify(true);
            }
        }
    }
}
