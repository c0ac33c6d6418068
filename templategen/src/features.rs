//! Feature flag resolution.
//!
//! Turns `RV32_FEATURE_<EXTENSION>=<0|1>` tokens into the immutable
//! [`ExclusionSet`] threaded through the rest of the pipeline.

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TemplategenError;

/// Default prefix carried by every feature flag token.
pub const DEFAULT_FLAG_PREFIX: &str = "RV32_FEATURE_";

/// Extension whose flag also controls soft-float extraction.
pub const FLOAT_EXTENSION: &str = "EXT_F";

/// A named, optional group of mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    /// Registry name, as spelled in flag tokens.
    pub name: &'static str,
    /// Mnemonics contributed by the extension, in registry order.
    pub mnemonics: &'static [&'static str],
}

/// Every extension known to the generator, in registry order.
///
/// `Zicsr` lists `csrrw` twice; membership is set-semantic so the repeat is
/// harmless.
pub const EXTENSIONS: &[Extension] = &[
    Extension {
        name: "Zifencei",
        mnemonics: &["fencei"],
    },
    Extension {
        name: "Zicsr",
        mnemonics: &["csrrw", "csrrs", "csrrc", "csrrw", "csrrsi", "csrrci"],
    },
    Extension {
        name: "EXT_M",
        mnemonics: &["mul", "mulh", "mulhsu", "mulhu", "div", "divu", "rem", "remu"],
    },
    Extension {
        name: "EXT_A",
        mnemonics: &[
            "lrw", "scw", "amoswapw", "amoaddw", "amoxorw", "amoandw", "amoorw", "amominw",
            "amomaxw", "amominuw", "amomaxuw",
        ],
    },
    Extension {
        name: "EXT_F",
        mnemonics: &[
            "flw", "fsw", "fmadds", "fmsubs", "fnmsubs", "fnmadds", "fadds", "fsubs", "fmuls",
            "fdivs", "fsqrts", "fsgnjs", "fsgnjns", "fsgnjxs", "fmins", "fmaxs", "fcvtws",
            "fcvtwus", "fmvxw", "feqs", "flts", "fles", "fclasss", "fcvtsw", "fcvtswu", "fmvwx",
        ],
    },
    Extension {
        name: "EXT_C",
        mnemonics: &[
            "caddi4spn", "clw", "csw", "cnop", "caddi", "cjal", "cli", "caddi16sp", "clui",
            "csrli", "csrai", "candi", "csub", "cxor", "cor", "cand", "cj", "cbeqz", "cbnez",
            "cslli", "clwsp", "cjr", "cmv", "cebreak", "cjalr", "cadd", "cswsp",
        ],
    },
];

/// Mnemonics the template mechanism cannot express regardless of flags:
/// branches, jumps, loads, stores, immediate shifts, and their compressed
/// forms.
pub const BASELINE_EXCLUSIONS: &[&str] = &[
    "jal", "jalr", "beq", "bne", "blt", "bge", "bltu", "bgeu", "lb", "lh", "lw", "lbu", "lhu",
    "sb", "sh", "sw", "slli", "srli", "srai", "flw", "fsw", "clw", "csw", "cjal", "cj", "cjalr",
    "cjr", "cbeqz", "cbnez", "clwsp", "cswsp",
];

/// Looks up a registered extension by its exact name.
#[must_use]
pub fn find_extension(name: &str) -> Option<&'static Extension> {
    EXTENSIONS.iter().find(|ext| ext.name == name)
}

/// How flags naming an unregistered extension are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFlagPolicy {
    /// Log a warning and ignore the flag.
    #[default]
    Warn,
    /// Abort with [`TemplategenError::UnrecognizedFeatureFlag`].
    Deny,
}

/// One parsed feature flag token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlag {
    /// Extension name as written after the prefix.
    pub extension: String,
    /// Whether the token enabled the extension.
    pub enabled: bool,
}

impl FeatureFlag {
    /// Parses `<prefix><EXTENSION>=<0|1>`.
    ///
    /// The prefix must start the token, so compiler-style forms such as
    /// `-DRV32_FEATURE_EXT_M=1` are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`TemplategenError::MalformedFeatureFlag`] when the prefix or
    /// `=` is missing, the extension name is empty, or the value is not `0`
    /// or `1`.
    pub fn parse(token: &str, prefix: &str) -> Result<Self, TemplategenError> {
        let malformed = |reason| TemplategenError::MalformedFeatureFlag {
            token: token.to_owned(),
            reason,
        };
        let rest = token
            .strip_prefix(prefix)
            .ok_or_else(|| malformed("missing feature prefix"))?;
        let (extension, value) = rest
            .split_once('=')
            .ok_or_else(|| malformed("expected <EXTENSION>=<0|1>"))?;
        if extension.is_empty() {
            return Err(malformed("empty extension name"));
        }
        let enabled = match value {
            "1" => true,
            "0" => false,
            _ => return Err(malformed("value must be 0 or 1")),
        };
        Ok(Self {
            extension: extension.to_owned(),
            enabled,
        })
    }
}

/// Why a mnemonic is excluded from templating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Listed in [`BASELINE_EXCLUSIONS`].
    Baseline,
    /// Contributed by the named extension, which is disabled.
    Extension(&'static str),
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Baseline => f.write_str("baseline"),
            Self::Extension(name) => f.write_str(name),
        }
    }
}

/// The immutable set of mnemonics that are not templated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    members: BTreeMap<&'static str, ExclusionReason>,
    enabled: Vec<&'static str>,
}

impl ExclusionSet {
    /// Returns `true` when `mnemonic` must not be templated.
    #[must_use]
    pub fn contains(&self, mnemonic: &str) -> bool {
        self.members.contains_key(mnemonic)
    }

    /// Returns why `mnemonic` is excluded, if it is.
    #[must_use]
    pub fn reason(&self, mnemonic: &str) -> Option<ExclusionReason> {
        self.members.get(mnemonic).copied()
    }

    /// Returns `true` when the named extension was enabled by a flag.
    #[must_use]
    pub fn is_enabled(&self, extension: &str) -> bool {
        self.enabled.iter().any(|name| *name == extension)
    }

    /// Extensions enabled by flags, in registry order.
    #[must_use]
    pub fn enabled_extensions(&self) -> &[&'static str] {
        &self.enabled
    }

    /// Number of distinct excluded mnemonics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` when nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates over excluded mnemonics in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ExclusionReason)> + '_ {
        self.members.iter().map(|(name, reason)| (*name, *reason))
    }
}

/// Resolves flag tokens into an [`ExclusionSet`].
///
/// Every registered extension starts disabled. Tokens are applied in order,
/// so the last token for an extension wins.
///
/// # Errors
///
/// Returns [`TemplategenError::MalformedFeatureFlag`] for unparsable tokens
/// and, under [`UnknownFlagPolicy::Deny`],
/// [`TemplategenError::UnrecognizedFeatureFlag`] for unregistered extensions.
pub fn resolve<S: AsRef<str>>(
    tokens: &[S],
    prefix: &str,
    policy: UnknownFlagPolicy,
) -> Result<ExclusionSet, TemplategenError> {
    let mut disabled: Vec<&'static str> = EXTENSIONS.iter().map(|ext| ext.name).collect();

    for token in tokens {
        let raw = token.as_ref();
        let flag = FeatureFlag::parse(raw, prefix)?;
        let Some(extension) = find_extension(&flag.extension) else {
            match policy {
                UnknownFlagPolicy::Warn => {
                    tracing::warn!(flag = raw, "ignoring flag for unregistered extension");
                    continue;
                }
                UnknownFlagPolicy::Deny => {
                    return Err(TemplategenError::UnrecognizedFeatureFlag {
                        flag: raw.to_owned(),
                        extension: flag.extension,
                    });
                }
            }
        };
        if flag.enabled {
            disabled.retain(|name| *name != extension.name);
        } else if !disabled.contains(&extension.name) {
            disabled.push(extension.name);
        }
    }

    let mut members = BTreeMap::new();
    for mnemonic in BASELINE_EXCLUSIONS {
        members.insert(*mnemonic, ExclusionReason::Baseline);
    }
    for extension in EXTENSIONS.iter().filter(|ext| disabled.contains(&ext.name)) {
        for mnemonic in extension.mnemonics {
            members
                .entry(*mnemonic)
                .or_insert(ExclusionReason::Extension(extension.name));
        }
    }

    let enabled = EXTENSIONS
        .iter()
        .map(|ext| ext.name)
        .filter(|name| !disabled.contains(name))
        .collect();
    tracing::debug!(excluded = members.len(), ?enabled, "resolved feature flags");
    Ok(ExclusionSet { members, enabled })
}

#[cfg(test)]
mod tests {
    //! Tests for feature flag parsing and exclusion resolution.

    use super::*;
    use rstest::rstest;

    const NO_FLAGS: &[&str] = &[];

    #[rstest]
    #[case("RV32_FEATURE_EXT_M=1", "EXT_M", true)]
    #[case("RV32_FEATURE_EXT_C=0", "EXT_C", false)]
    #[case("RV32_FEATURE_Zicsr=1", "Zicsr", true)]
    fn parses_well_formed_tokens(#[case] token: &str, #[case] extension: &str, #[case] enabled: bool) {
        let flag = FeatureFlag::parse(token, DEFAULT_FLAG_PREFIX).expect("parse flag");
        assert_eq!(flag.extension, extension);
        assert_eq!(flag.enabled, enabled);
    }

    #[rstest]
    #[case("EXT_M=1")]
    #[case("RV32_FEATURE_EXT_M")]
    #[case("RV32_FEATURE_=1")]
    #[case("RV32_FEATURE_EXT_M=yes")]
    fn rejects_malformed_tokens(#[case] token: &str) {
        let err = FeatureFlag::parse(token, DEFAULT_FLAG_PREFIX).expect_err("token should fail");
        assert!(matches!(err, TemplategenError::MalformedFeatureFlag { .. }));
    }

    #[rstest]
    #[case("-DRV32_FEATURE_EXT_M=1")]
    #[case("CFLAGS+=RV32_FEATURE_EXT_M=1")]
    fn prefix_must_start_the_token(#[case] token: &str) {
        let err = FeatureFlag::parse(token, DEFAULT_FLAG_PREFIX).expect_err("embedded prefix");
        assert!(
            matches!(err, TemplategenError::MalformedFeatureFlag { reason, .. } if reason == "missing feature prefix"),
            "unexpected error: {err:?}"
        );
    }

    #[rstest]
    fn no_flags_excludes_baseline_and_every_extension() {
        let set = resolve(NO_FLAGS, DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Warn).expect("resolve");
        assert!(set.contains("jal"));
        assert!(set.contains("mul"));
        assert!(set.contains("cadd"));
        assert!(!set.contains("add"));
        assert!(set.enabled_extensions().is_empty());
        assert_eq!(set.reason("jal"), Some(ExclusionReason::Baseline));
        assert_eq!(set.reason("mul"), Some(ExclusionReason::Extension("EXT_M")));
    }

    #[rstest]
    fn enabling_extension_removes_exactly_its_mnemonics() {
        let before = resolve(NO_FLAGS, DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Warn).expect("resolve");
        let after = resolve(&["RV32_FEATURE_EXT_C=1"], DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Warn)
            .expect("resolve");

        let removed: Vec<_> = before
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !after.contains(name))
            .collect();
        let ext_c = find_extension("EXT_C").expect("EXT_C registered");
        for name in &removed {
            assert!(ext_c.mnemonics.contains(name), "{name} is not an EXT_C mnemonic");
        }
        for name in ext_c.mnemonics {
            let in_baseline = BASELINE_EXCLUSIONS.contains(name);
            assert_eq!(after.contains(name), in_baseline, "unexpected state for {name}");
        }
        assert!(after.is_enabled("EXT_C"));
    }

    #[rstest]
    fn duplicate_registry_entries_do_not_change_membership() {
        let set = resolve(NO_FLAGS, DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Warn).expect("resolve");
        let distinct = set.iter().filter(|(name, _)| *name == "csrrw").count();
        assert_eq!(distinct, 1);
    }

    #[rstest]
    fn later_tokens_override_earlier_ones() {
        let set = resolve(
            &["RV32_FEATURE_EXT_M=1", "RV32_FEATURE_EXT_M=0"],
            DEFAULT_FLAG_PREFIX,
            UnknownFlagPolicy::Warn,
        )
        .expect("resolve");
        assert!(set.contains("mul"));
        assert!(!set.is_enabled("EXT_M"));
    }

    #[rstest]
    fn unknown_extension_is_ignored_under_warn() {
        let set = resolve(&["RV32_FEATURE_EXT_V=1"], DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Warn)
            .expect("warn policy tolerates unknown flags");
        let baseline = resolve(NO_FLAGS, DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Warn).expect("resolve");
        assert_eq!(set, baseline);
    }

    #[rstest]
    fn unknown_extension_fails_under_deny() {
        let err = resolve(&["RV32_FEATURE_EXT_V=1"], DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Deny)
            .expect_err("deny policy rejects unknown flags");
        assert!(matches!(
            err,
            TemplategenError::UnrecognizedFeatureFlag { ref extension, .. } if extension == "EXT_V"
        ));
    }
}
