//! Bone correspondence inference between two skeletons.
//!
//! The resolver runs an ordered chain of [`Matcher`]s. Each matcher proposes
//! source → target pairs; a pair is kept only if its source bone is still
//! unmapped, so earlier layers always win:
//!
//! 1. [`ExactMatcher`]: identical names.
//! 2. [`AliasMatcher`]: both bones resolve to the same canonical joint.
//! 3. [`FuzzyMatcher`]: separator-insensitive substring similarity, only when
//!    the map is still sparse.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alias::{find_joint, CANONICAL_JOINTS};
use crate::config::Config;
use crate::skeleton::Skeleton;

/// Fuzzy fallback runs while the map holds fewer entries than this.
pub const DEFAULT_FUZZY_TRIGGER_BELOW: usize = 3;
/// Fuzzy candidates must score strictly above this.
pub const DEFAULT_FUZZY_MIN_SCORE: f32 = 0.6;

/// Source bone name → target bone name, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneMap(IndexMap<String, String>);

impl BoneMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from explicit pairs; the first pair for a source bone wins.
    pub fn from_pairs<S, T>(pairs: impl IntoIterator<Item = (S, T)>) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        let mut map = Self::new();
        for (s, t) in pairs {
            map.insert_if_absent(s.into(), t.into());
        }
        map
    }

    fn insert_if_absent(&mut self, source: String, target: String) -> bool {
        if self.0.contains_key(&source) {
            return false;
        }
        self.0.insert(source, target);
        true
    }

    #[inline]
    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    #[inline]
    pub fn contains_source(&self, source: &str) -> bool {
        self.0.contains_key(source)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }
}

/// One layer of the matching chain.
pub trait Matcher {
    fn name(&self) -> &'static str;

    /// Whether this layer runs given the map built so far.
    fn applies(&self, _current: &BoneMap) -> bool {
        true
    }

    /// Candidate pairs; sources already in `current` are discarded by the resolver.
    fn propose(
        &self,
        source: &Skeleton,
        target: &Skeleton,
        current: &BoneMap,
    ) -> Vec<(String, String)>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl Matcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn propose(&self, source: &Skeleton, target: &Skeleton, _: &BoneMap) -> Vec<(String, String)> {
        source
            .names()
            .filter(|n| target.contains(n))
            .map(|n| (n.to_string(), n.to_string()))
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AliasMatcher;

impl Matcher for AliasMatcher {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn propose(&self, source: &Skeleton, target: &Skeleton, _: &BoneMap) -> Vec<(String, String)> {
        CANONICAL_JOINTS
            .iter()
            .filter_map(|joint| {
                let s = find_joint(source, joint.variants)?;
                let t = find_joint(target, joint.variants)?;
                Some((s.to_string(), t.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    pub trigger_below: usize,
    pub min_score: f32,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            trigger_below: DEFAULT_FUZZY_TRIGGER_BELOW,
            min_score: DEFAULT_FUZZY_MIN_SCORE,
        }
    }
}

/// Lower-case and drop `_`, `.` and spaces.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '.' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Shorter/longer length ratio when one normalized name contains the other.
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() || !(a.contains(b) || b.contains(a)) {
        return 0.0;
    }
    let (la, lb) = (a.chars().count() as f32, b.chars().count() as f32);
    la.min(lb) / la.max(lb)
}

impl FuzzyMatcher {
    /// Best-scoring target for one source name; ties keep the earliest target.
    pub fn best_match<'t>(&self, source_name: &str, target: &'t Skeleton) -> Option<&'t str> {
        let needle = normalize_name(source_name);
        let mut best: Option<(&'t str, f32)> = None;
        for cand in target.names() {
            let score = similarity(&needle, &normalize_name(cand));
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((cand, score));
            }
        }
        best.filter(|(_, s)| *s > self.min_score).map(|(n, _)| n)
    }
}

impl Matcher for FuzzyMatcher {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn applies(&self, current: &BoneMap) -> bool {
        current.len() < self.trigger_below
    }

    fn propose(
        &self,
        source: &Skeleton,
        target: &Skeleton,
        current: &BoneMap,
    ) -> Vec<(String, String)> {
        warn!("sparse mapping ({} entries); attempting fuzzy matching", current.len());
        source
            .names()
            .filter(|n| !current.contains_source(n))
            .filter_map(|n| self.best_match(n, target).map(|t| (n.to_string(), t.to_string())))
            .collect()
    }
}

/// Ordered matcher chain.
pub struct Resolver {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Resolver {
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_matchers(vec![
            Box::new(ExactMatcher),
            Box::new(AliasMatcher),
            Box::new(FuzzyMatcher {
                trigger_below: cfg.fuzzy_trigger_below,
                min_score: cfg.fuzzy_min_score,
            }),
        ])
    }

    pub fn with_matchers(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Resolve source → target correspondence. Never mutates either skeleton;
    /// an empty result means nothing could be matched.
    pub fn resolve(&self, source: &Skeleton, target: &Skeleton) -> BoneMap {
        let mut map = BoneMap::new();
        if target.is_empty() || source.is_empty() {
            warn!(
                "cannot map '{}' ({} bones) onto '{}' ({} bones)",
                source.name,
                source.len(),
                target.name,
                target.len()
            );
            return map;
        }

        for matcher in &self.matchers {
            if !matcher.applies(&map) {
                debug!("matcher '{}' skipped at {} entries", matcher.name(), map.len());
                continue;
            }
            let mut added = 0usize;
            for (s, t) in matcher.propose(source, target, &map) {
                if map.insert_if_absent(s, t) {
                    added += 1;
                }
            }
            debug!("matcher '{}' added {added} entries", matcher.name());
        }
        map
    }
}

/// Resolve with the default matcher chain.
pub fn resolve(source: &Skeleton, target: &Skeleton) -> BoneMap {
    Resolver::default().resolve(source, target)
}
