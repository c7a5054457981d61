// Lupine Content Filter
// Compiles a content-blocker rule list into an on-disk store and loads it back.
// Rules use the WebKit content-blocker JSON format, restricted to URL triggers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::types::errors::FilterError;

/// Code reported for malformed sources, matching the engine's "invalid source".
const INVALID_SOURCE: i32 = 0;

/// What a matching rule does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleKind {
    #[serde(rename = "block")]
    Block,
    /// Cancels earlier matching rules for this request.
    #[serde(rename = "ignore-previous-rules")]
    IgnorePreviousRules,
    /// Cosmetic rule; kept in the store but never blocks a request.
    #[serde(rename = "css-display-none")]
    CssDisplayNone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trigger {
    #[serde(rename = "url-filter")]
    pub url_filter: String,
    #[serde(rename = "url-filter-is-case-sensitive", default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// One entry of the rule list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub trigger: Trigger,
    pub action: RuleAction,
}

#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    kind: RuleKind,
}

/// A loaded filter, ready to answer URL queries.
#[derive(Debug)]
pub struct ContentFilter {
    identifier: String,
    rules: Vec<CompiledRule>,
}

impl ContentFilter {
    /// Compiles every trigger. Fails on the first bad pattern.
    pub fn from_rules(identifier: &str, rules: Vec<Rule>) -> Result<Self, FilterError> {
        let compiled = rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| {
                let pattern = RegexBuilder::new(&rule.trigger.url_filter)
                    .case_insensitive(!rule.trigger.case_sensitive)
                    .build()
                    .map_err(|e| FilterError::InvalidPattern {
                        code: INVALID_SOURCE,
                        message: format!("rule {}: {}", i, e),
                    })?;
                Ok(CompiledRule { pattern, kind: rule.action.kind })
            })
            .collect::<Result<Vec<_>, FilterError>>()?;

        Ok(Self { identifier: identifier.to_string(), rules: compiled })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules apply in order; the last matching block or ignore rule wins.
    pub fn should_block(&self, url: &str) -> bool {
        self.rules
            .iter()
            .filter(|r| r.pattern.is_match(url))
            .fold(false, |blocked, rule| match rule.kind {
                RuleKind::Block => true,
                RuleKind::IgnorePreviousRules => false,
                RuleKind::CssDisplayNone => blocked,
            })
    }
}

fn io_error(err: io::Error, context: &str) -> FilterError {
    FilterError::Io {
        code: err.raw_os_error().unwrap_or(-1),
        message: format!("{}: {}", context, err),
    }
}

fn parse_rules(source: &str) -> Result<Vec<Rule>, FilterError> {
    serde_json::from_str(source).map_err(|e| FilterError::Parse {
        code: INVALID_SOURCE,
        message: e.to_string(),
    })
}

/// Directory of compiled filters, one `<identifier>.json` per filter.
pub struct FilterStore {
    dir: PathBuf,
}

impl FilterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}.json", identifier))
    }

    /// Validates `source` and stores it under `identifier`, replacing any previous entry.
    pub fn compile_from_file(
        &self,
        identifier: &str,
        source: &Path,
    ) -> Result<ContentFilter, FilterError> {
        let text = fs::read_to_string(source)
            .map_err(|e| io_error(e, &source.display().to_string()))?;
        let rules = parse_rules(&text)?;
        let filter = ContentFilter::from_rules(identifier, rules.clone())?;

        fs::create_dir_all(&self.dir).map_err(|e| io_error(e, "creating filter store"))?;
        let compiled = serde_json::to_string(&rules).map_err(|e| FilterError::Parse {
            code: INVALID_SOURCE,
            message: e.to_string(),
        })?;
        fs::write(self.entry_path(identifier), compiled)
            .map_err(|e| io_error(e, "writing filter store"))?;

        log::debug!("compiled {} content-filter rules as '{}'", filter.rule_count(), identifier);
        Ok(filter)
    }

    pub fn load(&self, identifier: &str) -> Result<ContentFilter, FilterError> {
        let path = self.entry_path(identifier);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FilterError::NotFound(identifier.to_string()))
            }
            Err(e) => return Err(io_error(e, &path.display().to_string())),
        };
        ContentFilter::from_rules(identifier, parse_rules(&text)?)
    }

    pub fn remove(&self, identifier: &str) -> Result<(), FilterError> {
        match fs::remove_file(self.entry_path(identifier)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FilterError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(io_error(e, "removing filter")),
        }
    }

    /// Compiles then loads, logging failures. Browsing goes on unfiltered on error.
    pub fn refresh(&self, identifier: &str, source: &Path) -> Option<ContentFilter> {
        if let Err(e) = self.compile_from_file(identifier, source) {
            log::warn!("failed to compile {}, err: [{}] {}", source.display(), e.code(), e);
            return None;
        }
        match self.load(identifier) {
            Ok(filter) => {
                log::info!("content-filter '{}' loaded ({} rules)", identifier, filter.rule_count());
                Some(filter)
            }
            Err(e) => {
                log::warn!("failed to load content-filter, err: [{}] {}", e.code(), e);
                None
            }
        }
    }
}
